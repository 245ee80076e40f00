use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=WHATSIT_VERSION");
    let version = env::var("WHATSIT_VERSION")
        .or_else(|_| env::var("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=WHATSIT_VERSION={version}");
}
