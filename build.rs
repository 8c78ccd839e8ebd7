/// Termy build script.
///
/// Termy only renders on Windows.  Other hosts still build the platform-neutral
/// core (and run its tests), so a non-Windows target gets a warning rather than
/// a hard failure.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        println!(
            "cargo:warning=Termy renders only on Windows \
             (CARGO_CFG_TARGET_OS = {target_os:?}); the binary will exit with code 6"
        );
    }

    // Only re-run the build script when it changes.
    println!("cargo:rerun-if-changed=build.rs");
}
