use std::env;
use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=resources/Info.plist");

    // Copy Info.plist (LSUIElement, accessibility usage string) into OUT_DIR
    // alongside the build outputs.
    let out_dir = env::var("OUT_DIR").unwrap();
    let resources_dir = Path::new("resources");

    if resources_dir.exists() {
        let target_dir = Path::new(&out_dir).join("resources");
        fs::create_dir_all(&target_dir).unwrap();

        for entry in fs::read_dir(resources_dir).unwrap() {
            let entry = entry.unwrap();
            fs::copy(entry.path(), target_dir.join(entry.file_name())).unwrap();
        }
    }

    println!("cargo:rustc-env=MACOSX_DEPLOYMENT_TARGET=14.0");
}
