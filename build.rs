use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=LIBWG_GO_DIR");
    if env::var_os("CARGO_FEATURE_LIBWG").is_none() {
        return;
    }
    // The Go toolchain builds libwg-go.a with `-buildmode=c-archive`.
    if let Some(dir) = env::var_os("LIBWG_GO_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }
    println!("cargo:rustc-link-lib=static=wg-go");
}
