//! Build Script for Order Service
//!
//! Protobuf stubs are checked in under `packages/schema-gen/rust/`, so this
//! script only tracks them for rebuilds and emits the coverage cfg.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../../packages/schema-gen/rust/order/");
    println!("cargo:rerun-if-changed=../../packages/schema-gen/rust/spot/");

    // Emit cfg for coverage detection
    if env::var("CARGO_LLVM_COV").is_ok()
        || env::var("LLVM_PROFILE_FILE").is_ok()
        || env::var("RUSTFLAGS")
            .map(|f| f.contains("instrument-coverage"))
            .unwrap_or(false)
    {
        println!("cargo:rustc-cfg=coverage");
    }
}
