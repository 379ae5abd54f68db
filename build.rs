use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=AACGM_LIB_DIR");

    // only link the C library when the native engine is compiled in
    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }
    if let Some(dir) = env::var_os("AACGM_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }
    println!("cargo:rustc-link-lib=aacgmv2");
}
