use std::env;
use std::path::PathBuf;

/// Copies the generated header here as well, e.g. `EVAL_CLIENT_HEADER_DIR=ffi/include`.
const HEADER_DIR_VAR: &str = "EVAL_CLIENT_HEADER_DIR";

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed={HEADER_DIR_VAR}");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        println!("cargo:warning=OUT_DIR not set, header generation skipped");
        return;
    };

    let bindings = match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("EVAL_CLIENT_H")
        .generate()
    {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=header generation skipped: {e}");
            return;
        }
    };

    bindings.write_to_file(out_dir.join("eval_client.h"));

    if let Some(dir) = env::var_os(HEADER_DIR_VAR).map(PathBuf::from) {
        let dir = if dir.is_absolute() { dir } else { crate_dir.join("..").join(dir) };
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                bindings.write_to_file(dir.join("eval_client.h"));
            }
            Err(e) => println!("cargo:warning=cannot create {}: {e}", dir.display()),
        }
    }
}
