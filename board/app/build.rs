use std::{
    env, fs,
    path::{Path, PathBuf},
};

fn main() {
    // linker scripts for cortex-m-rt and defmt
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo::rerun-if-changed=config/config.toml");
    let path = Path::new("config/config.toml");
    let conf = boardconf::load(path).expect("Error reading config file");
    let string = boardconf::generate(&conf).unwrap_or_else(|e| panic!("{}", e));

    let out_dir = &PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is not set"));
    let out_file = out_dir.join("_ext.rs").to_string_lossy().to_string();
    fs::write(&out_file, string.as_str()).expect("Cannot write generated config");
}
