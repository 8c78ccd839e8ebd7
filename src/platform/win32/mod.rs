// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is the only module in the codebase where `unsafe` code is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

use windows::Win32::Foundation::HWND;

use super::WindowId;

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub(crate) mod direct2d; // ID2D1Factory / IDWriteFactory backend for `Graphics`
pub mod window; // main window, WndProc, message loop

// ── Handle conversion ─────────────────────────────────────────────────────────

/// HWND is a pointer in windows-crate >=0.58; `WindowId` keeps its bits.
pub(crate) fn window_id(hwnd: HWND) -> WindowId {
    WindowId(hwnd.0 as isize)
}

pub(crate) fn hwnd(window: WindowId) -> HWND {
    HWND(window.0 as *mut core::ffi::c_void)
}

/// A null-terminated UTF-16 copy of `s` for `PCWSTR` parameters.
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
