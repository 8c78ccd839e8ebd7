// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32,
// Direct2D and DirectWrite FFI).  Each unsafe block in that module MUST carry
// a `// SAFETY:` comment.
#![deny(unsafe_code)]
// Off Windows only the platform-neutral core is compiled, and nothing but the
// tests drives it.
#![cfg_attr(not(windows), allow(dead_code))]

mod error;
mod message;
mod platform;
mod shell;
mod surface;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        // Startup failed, or a handler failed inside the message loop.
        log::error!("{e}");
        std::process::exit(e.exit_code());
    }
}

fn run() -> error::Result<()> {
    platform::run()
}
