//! Build script for RS232 bridge firmware
//!
//! Handles:
//! - Memory layout configuration (target builds only)

fn main() {
    // Tell Cargo to re-run this if the linker script changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    // Link memory.x from project directory
    if let Ok(dir) = std::env::var("CARGO_MANIFEST_DIR") {
        println!("cargo:rustc-link-search={dir}");
    }
}
