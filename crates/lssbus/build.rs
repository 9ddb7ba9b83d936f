// Build provenance for `lssbus version --extended`.
fn main() {
    for (var, exported) in [
        ("TARGET", "LSSBUS_BUILD_TARGET"),
        ("PROFILE", "LSSBUS_BUILD_PROFILE"),
    ] {
        if let Ok(value) = std::env::var(var) {
            println!("cargo:rustc-env={exported}={value}");
        }
        println!("cargo:rerun-if-env-changed={var}");
    }
}
