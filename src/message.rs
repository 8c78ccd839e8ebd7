// ── Window messages ───────────────────────────────────────────────────────────
//
// Source of truth: WinUser.h.  Only the messages the paint surface reacts to
// are decoded; everything else travels as `Message::Other` and ends up in
// default window processing.

use crate::error::TermyError;

/// Sent once when the window is created, before `CreateWindowExW` returns.
pub(crate) const WM_CREATE: u32 = 0x0001;
/// Sent when the window is being destroyed.
pub(crate) const WM_DESTROY: u32 = 0x0002;
/// Client area changed size.  LPARAM low word = width, high word = height.
pub(crate) const WM_SIZE: u32 = 0x0005;
/// Client area needs repainting.
pub(crate) const WM_PAINT: u32 = 0x000F;
/// Display resolution changed.
pub(crate) const WM_DISPLAYCHANGE: u32 = 0x007E;
/// Last message a window receives, after its children are gone.
pub(crate) const WM_NCDESTROY: u32 = 0x0082;

/// A window message with its parameters unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Message {
    Create,
    Size { width: u32, height: u32 },
    DisplayChange,
    Paint,
    Destroy,
    /// Any message without a dedicated handler, kept raw for `DefWindowProcW`.
    Other { id: u32, wparam: usize, lparam: isize },
}

impl Message {
    /// Unpack a raw `(msg, wparam, lparam)` triple.
    pub(crate) fn decode(id: u32, wparam: usize, lparam: isize) -> Self {
        match id {
            WM_CREATE => Self::Create,
            WM_SIZE => Self::Size {
                width: low_word(lparam),
                height: high_word(lparam),
            },
            WM_DISPLAYCHANGE => Self::DisplayChange,
            WM_PAINT => Self::Paint,
            WM_DESTROY => Self::Destroy,
            _ => Self::Other { id, wparam, lparam },
        }
    }
}

/// LOWORD
pub(crate) fn low_word(value: isize) -> u32 {
    (value as usize & 0xFFFF) as u32
}

/// HIWORD
pub(crate) fn high_word(value: isize) -> u32 {
    ((value as usize >> 16) & 0xFFFF) as u32
}

/// Result of offering a message to a handler.
///
/// `Unhandled` is not a failure: the shell answers it with default window
/// processing.  `Failed` carries a fatal error back to the message loop.
#[derive(Debug)]
pub(crate) enum Outcome {
    Handled(isize),
    Unhandled,
    Failed(TermyError),
}

impl From<crate::error::Result<isize>> for Outcome {
    fn from(result: crate::error::Result<isize>) -> Self {
        match result {
            Ok(value) => Self::Handled(value),
            Err(e) => Self::Failed(e),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
