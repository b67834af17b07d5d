//! Build script for regctx-core
//!
//! Register layouts are derived with `core::mem::offset_of!`, stable since
//! Rust 1.77.0. Older toolchains are refused with a readable message.

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    if let Ok(rustc_version) = rustc_version::version() {
        let min_rust_version = rustc_version::Version::new(1, 77, 0);

        if rustc_version < min_rust_version {
            panic!(
                "regctx-core requires Rust {} or newer (offset_of!), found {}",
                min_rust_version, rustc_version
            );
        }
    } else {
        // If we can't get version (e.g., in some build environments), just warn
        println!("cargo:warning=could not verify Rust version");
    }
}
