// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the interface that the rest of the codebase uses to
// talk to the OS: the windowing subsystem (`WindowSystem`) and the 2D
// drawing/text subsystem (`Graphics`).  No `unsafe` lives here; all Win32 FFI
// is confined to the `win32` sub-module and never leaks outward.

#[cfg(windows)]
pub mod win32;

#[cfg(test)]
pub(crate) mod fake;

use crate::error::Result;

// ── Shared value types ────────────────────────────────────────────────────────

/// Opaque identifier of a native window (the HWND bits on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WindowId(pub(crate) isize);

/// A size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct PixelSize {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl PixelSize {
    pub(crate) const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Point {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// Layout rectangle in DIPs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct RectF {
    pub(crate) left: f32,
    pub(crate) top: f32,
    pub(crate) right: f32,
    pub(crate) bottom: f32,
}

impl RectF {
    /// The rectangle anchored at the origin that covers `size`.
    pub(crate) fn from_size(size: PixelSize) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: size.width as f32,
            bottom: size.height as f32,
        }
    }
}

/// Straight-alpha RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Color {
    pub(crate) r: f32,
    pub(crate) g: f32,
    pub(crate) b: f32,
    pub(crate) a: f32,
}

impl Color {
    /// Build an opaque colour from a `0xRRGGBB` value, like `D2D1::ColorF(rgb)`.
    pub(crate) fn from_rgb(rgb: u32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xFF) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
            a: 1.0,
        }
    }
}

/// Font used for the display text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FontSpec {
    pub(crate) family: &'static str,
    /// Em size in DIPs.
    pub(crate) size: f32,
    pub(crate) locale: &'static str,
}

/// Result of closing a draw bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndDraw {
    /// The frame was presented (or failed in a way that a repaint can fix).
    Presented,
    /// The device was lost; every device-dependent resource must be rebuilt.
    RecreateTarget,
}

// ── Windowing subsystem ───────────────────────────────────────────────────────

/// The subset of the native windowing API the paint surface calls directly.
///
/// Class registration, window creation and the message loop belong to the
/// platform shell and are not part of this trait.
pub(crate) trait WindowSystem {
    /// Current client-area size of `window`.
    fn client_size(&self, window: WindowId) -> PixelSize;

    /// Mark the whole client area dirty without erasing the background.
    fn invalidate(&self, window: WindowId);

    /// Mark the whole client area clean after a paint.
    fn validate(&self, window: WindowId);

    /// Post a quit message carrying `exit_code` to the UI thread's queue.
    fn request_quit(&self, exit_code: i32);
}

// ── 2D drawing / text subsystem ───────────────────────────────────────────────

/// Device-independent factories plus the immediate-mode draw calls.
///
/// An implementor *is* the device-independent tier: it is created once at
/// startup and hands out the device-dependent objects below.
pub(crate) trait Graphics {
    type Target;
    type Brush;
    type Format;

    /// Create a render target bound to `window` with the given pixel size.
    fn create_render_target(&self, window: WindowId, size: PixelSize) -> Result<Self::Target>;

    fn create_solid_brush(&self, target: &Self::Target, color: Color) -> Result<Self::Brush>;

    /// Create a text format whose text and paragraph alignment are both
    /// centered.
    fn create_text_format(&self, font: &FontSpec) -> Result<Self::Format>;

    /// Resize `target` in place.
    fn resize(&self, target: &Self::Target, size: PixelSize) -> Result<()>;

    /// Current pixel size of `target`.
    fn target_size(&self, target: &Self::Target) -> PixelSize;

    fn begin_draw(&self, target: &Self::Target);

    fn set_identity_transform(&self, target: &Self::Target);

    fn clear(&self, target: &Self::Target, color: Color);

    fn draw_line(
        &self,
        target: &Self::Target,
        from: Point,
        to: Point,
        brush: &Self::Brush,
        stroke_width: f32,
    );

    fn draw_text(
        &self,
        target: &Self::Target,
        text: &[u16],
        format: &Self::Format,
        layout: RectF,
        brush: &Self::Brush,
    );

    fn end_draw(&self, target: &Self::Target) -> EndDraw;
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create the window and run the message loop until the user closes it.
#[cfg(windows)]
pub(crate) fn run() -> Result<()> {
    win32::window::run()
}

/// Termy has no renderer outside Windows.
#[cfg(not(windows))]
pub(crate) fn run() -> Result<()> {
    Err(crate::error::TermyError::UnsupportedPlatform)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_slate_gray_channels() {
        let c = Color::from_rgb(0x778899);
        assert!((c.r - 0x77 as f32 / 255.0).abs() < f32::EPSILON);
        assert!((c.g - 0x88 as f32 / 255.0).abs() < f32::EPSILON);
        assert!((c.b - 0x99 as f32 / 255.0).abs() < f32::EPSILON);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn white_is_all_ones() {
        assert_eq!(
            Color::from_rgb(0xFFFFFF),
            Color {
                r: 1.0,
                g: 1.0,
                b: 1.0,
                a: 1.0
            }
        );
    }

    #[test]
    fn layout_rect_covers_client() {
        let r = RectF::from_size(PixelSize::new(500, 300));
        assert_eq!(
            r,
            RectF {
                left: 0.0,
                top: 0.0,
                right: 500.0,
                bottom: 300.0
            }
        );
    }
}
