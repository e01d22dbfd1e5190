//! Build script for atulink-lcd-fw
//!
//! Sets up linker search paths for memory.x and the embassy/defmt linker
//! scripts.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => panic!("OUT_DIR not set: {}", e),
    };

    // Copy memory.x to the output directory
    if let Err(e) = fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")) {
        panic!("failed to write memory.x: {}", e);
    }

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
