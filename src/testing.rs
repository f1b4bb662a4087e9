//! Counting doubles for the engine and the managed runtime.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::ffi::{c_char, c_void, CStr};
use std::os::fd::RawFd;
use std::ptr::NonNull;

use crate::engine::{Engine, GoString, TunnelHandle};
use crate::runtime::ManagedRuntime;

/// One recorded `turn_on` invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOn {
    pub ifname: Vec<u8>,
    pub tun_fd: RawFd,
    pub settings: Vec<u8>,
}

/// Engine double handing out real `malloc` buffers.
pub struct MockEngine {
    turn_on_result: Cell<i32>,
    socket_v4_result: Cell<RawFd>,
    socket_v6_result: Cell<RawFd>,
    config: RefCell<Option<Vec<u8>>>,
    version: RefCell<Option<Vec<u8>>>,
    turn_ons: RefCell<Vec<TurnOn>>,
    turn_offs: RefCell<Vec<i32>>,
    queries: RefCell<Vec<(&'static str, i32)>>,
    live: RefCell<HashSet<usize>>,
    releases: Cell<usize>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            turn_on_result: Cell::new(0),
            socket_v4_result: Cell::new(-1),
            socket_v6_result: Cell::new(-1),
            config: RefCell::new(None),
            version: RefCell::new(None),
            turn_ons: RefCell::new(Vec::new()),
            turn_offs: RefCell::new(Vec::new()),
            queries: RefCell::new(Vec::new()),
            live: RefCell::new(HashSet::new()),
            releases: Cell::new(0),
        }
    }

    pub fn with_turn_on(self, ret: i32) -> Self {
        self.turn_on_result.set(ret);
        self
    }

    pub fn with_sockets(self, v4: RawFd, v6: RawFd) -> Self {
        self.socket_v4_result.set(v4);
        self.socket_v6_result.set(v6);
        self
    }

    pub fn with_config(self, text: Option<&str>) -> Self {
        self.with_config_bytes(text.map(|t| t.as_bytes().to_vec()))
    }

    pub fn with_config_bytes(self, bytes: Option<Vec<u8>>) -> Self {
        *self.config.borrow_mut() = bytes;
        self
    }

    pub fn with_version(self, text: Option<&str>) -> Self {
        *self.version.borrow_mut() = text.map(|t| t.as_bytes().to_vec());
        self
    }

    pub fn turn_ons(&self) -> Vec<TurnOn> {
        self.turn_ons.borrow().clone()
    }

    pub fn turn_offs(&self) -> Vec<i32> {
        self.turn_offs.borrow().clone()
    }

    pub fn queries(&self) -> Vec<(&'static str, i32)> {
        self.queries.borrow().clone()
    }

    pub fn releases(&self) -> usize {
        self.releases.get()
    }

    /// Buffers handed out and not yet released.
    pub fn outstanding(&self) -> usize {
        self.live.borrow().len()
    }

    fn hand_out(&self, text: &Option<Vec<u8>>) -> *mut c_char {
        let Some(bytes) = text else {
            return std::ptr::null_mut();
        };
        unsafe {
            let ptr = libc::malloc(bytes.len() + 1) as *mut u8;
            assert!(!ptr.is_null(), "malloc failed in test");
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len());
            *ptr.add(bytes.len()) = 0;
            self.live.borrow_mut().insert(ptr as usize);
            ptr.cast()
        }
    }
}

impl Engine for MockEngine {
    fn turn_on(&self, ifname: GoString<'_>, tun_fd: RawFd, settings: GoString<'_>) -> i32 {
        self.turn_ons.borrow_mut().push(TurnOn {
            ifname: ifname.as_bytes().to_vec(),
            tun_fd,
            settings: settings.as_bytes().to_vec(),
        });
        self.turn_on_result.get()
    }

    fn turn_off(&self, handle: TunnelHandle) {
        self.turn_offs.borrow_mut().push(handle.raw());
    }

    fn socket_v4(&self, handle: TunnelHandle) -> RawFd {
        self.queries.borrow_mut().push(("socket_v4", handle.raw()));
        self.socket_v4_result.get()
    }

    fn socket_v6(&self, handle: TunnelHandle) -> RawFd {
        self.queries.borrow_mut().push(("socket_v6", handle.raw()));
        self.socket_v6_result.get()
    }

    fn config(&self, handle: TunnelHandle) -> *mut c_char {
        self.queries.borrow_mut().push(("config", handle.raw()));
        self.hand_out(&self.config.borrow())
    }

    fn version(&self) -> *mut c_char {
        self.hand_out(&self.version.borrow())
    }

    unsafe fn release(&self, text: *mut c_char) {
        let known = self.live.borrow_mut().remove(&(text as usize));
        assert!(known, "released a buffer that is not live");
        self.releases.set(self.releases.get() + 1);
        libc::free(text.cast::<c_void>());
    }
}

/// Handle to a string owned by [`MockRuntime`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MockStr(usize);

struct Entry {
    bytes: Vec<u8>,
    borrowed: Option<Box<[u8]>>,
    borrows: usize,
    releases: usize,
    fail_borrow: bool,
}

/// Managed runtime double counting every borrow and release.
pub struct MockRuntime {
    strings: RefCell<Vec<Entry>>,
    fail_new_string: Cell<bool>,
    faults: Cell<usize>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            strings: RefCell::new(Vec::new()),
            fail_new_string: Cell::new(false),
            faults: Cell::new(0),
        }
    }

    pub fn string(&self, text: &str) -> MockStr {
        self.string_bytes(text.as_bytes())
    }

    pub fn string_bytes(&self, bytes: &[u8]) -> MockStr {
        let mut strings = self.strings.borrow_mut();
        strings.push(Entry {
            bytes: bytes.to_vec(),
            borrowed: None,
            borrows: 0,
            releases: 0,
            fail_borrow: false,
        });
        MockStr(strings.len() - 1)
    }

    pub fn fail_borrow_of(&self, s: MockStr) {
        self.strings.borrow_mut()[s.0].fail_borrow = true;
    }

    pub fn fail_new_string(&self) {
        self.fail_new_string.set(true);
    }

    pub fn text(&self, s: MockStr) -> String {
        String::from_utf8_lossy(&self.strings.borrow()[s.0].bytes).into_owned()
    }

    pub fn borrows(&self, s: MockStr) -> usize {
        self.strings.borrow()[s.0].borrows
    }

    pub fn releases(&self, s: MockStr) -> usize {
        self.strings.borrow()[s.0].releases
    }

    /// Sum of borrows minus releases over every string.
    pub fn outstanding(&self) -> usize {
        self.strings
            .borrow()
            .iter()
            .map(|e| e.borrows - e.releases)
            .sum()
    }

    pub fn total_borrows(&self) -> usize {
        self.strings.borrow().iter().map(|e| e.borrows).sum()
    }

    /// Faults raised (and cleared) by `new_string`.
    pub fn faults(&self) -> usize {
        self.faults.get()
    }
}

impl ManagedRuntime for MockRuntime {
    type Str = MockStr;

    fn borrow_utf(&self, s: MockStr) -> Option<NonNull<c_char>> {
        let mut strings = self.strings.borrow_mut();
        let entry = &mut strings[s.0];
        if entry.fail_borrow {
            return None;
        }
        assert!(entry.borrowed.is_none(), "string borrowed twice");
        let mut copy = entry.bytes.clone();
        copy.push(0);
        let mut boxed = copy.into_boxed_slice();
        let ptr = NonNull::new(boxed.as_mut_ptr().cast::<c_char>());
        entry.borrowed = Some(boxed);
        entry.borrows += 1;
        ptr
    }

    fn utf_length(&self, s: MockStr) -> usize {
        self.strings.borrow()[s.0].bytes.len()
    }

    unsafe fn release_utf(&self, s: MockStr, chars: NonNull<c_char>) {
        let mut strings = self.strings.borrow_mut();
        let entry = &mut strings[s.0];
        let boxed = entry.borrowed.take().expect("release without borrow");
        assert_eq!(boxed.as_ptr(), chars.as_ptr().cast::<u8>().cast_const());
        entry.releases += 1;
    }

    fn new_string(&self, text: &CStr) -> Option<MockStr> {
        if self.fail_new_string.get() {
            self.faults.set(self.faults.get() + 1);
            return None;
        }
        Some(self.string_bytes(text.to_bytes()))
    }
}
