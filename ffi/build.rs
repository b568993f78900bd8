use std::env;
use std::path::PathBuf;

/// Generates `cars_ffi.h` into `OUT_DIR`. Set `CARS_FFI_HEADER_DIR` to also
/// write it somewhere a C build can pick it up.
fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-env-changed=CARS_FFI_HEADER_DIR");

    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        println!("cargo:warning=C header not generated: cargo build environment missing");
        return;
    };

    let bindings = match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("CARS_FFI_H")
        .with_pragma_once(true)
        .generate()
    {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=C header not generated: {e}");
            return;
        }
    };

    bindings.write_to_file(PathBuf::from(out_dir).join("cars_ffi.h"));

    if let Ok(dir) = env::var("CARS_FFI_HEADER_DIR") {
        let dir = PathBuf::from(dir);
        if let Err(e) = std::fs::create_dir_all(&dir) {
            println!("cargo:warning=cannot create {}: {e}", dir.display());
            return;
        }
        bindings.write_to_file(dir.join("cars_ffi.h"));
    }
}
