// ── Paint surface ─────────────────────────────────────────────────────────────
//
// The application instance that owns the main window's drawing state.
//
// Two resource tiers:
//   • device-independent — the `Graphics` implementor (drawing + text
//     factories), created once before the window exists;
//   • device-dependent   — render target, brush and text format, created
//     together on the first paint and dropped together when the target has
//     to be rebuilt.
//
// All calls happen on the UI thread, one message at a time.

use crate::{
    error::Result,
    message::{Message, Outcome},
    platform::{
        Color, EndDraw, FontSpec, Graphics, PixelSize, Point, RectF, WindowId, WindowSystem,
    },
    shell::Handler,
};

// ── Fixed drawing parameters ──────────────────────────────────────────────────

/// `D2D1::ColorF::White`
const BACKGROUND_RGB: u32 = 0xFFFFFF;
/// `D2D1::ColorF::LightSlateGray`
const BRUSH_RGB: u32 = 0x778899;

const LINE_FROM: Point = Point { x: 0.0, y: 0.0 };
const LINE_TO: Point = Point { x: 50.0, y: 50.0 };
const LINE_WIDTH: f32 = 1.0;

const DISPLAY_TEXT: &str = "Hello, world!";

const FONT: FontSpec = FontSpec {
    family: "Gabriola",
    size: 72.0,
    locale: "en-us",
};

/// Window-procedure return value for the messages handled here.
const HANDLED: isize = 0;

// ── Display text ──────────────────────────────────────────────────────────────

/// The string drawn in the client area, fixed at construction.
///
/// Kept alongside its UTF-16 encoding because that is what DirectWrite
/// consumes; `len` counts UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DisplayText {
    text: String,
    wide: Box<[u16]>,
}

impl DisplayText {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            wide: text.encode_utf16().collect(),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn as_wide(&self) -> &[u16] {
        &self.wide
    }

    pub(crate) fn len(&self) -> u32 {
        self.wide.len() as u32
    }
}

// ── Device-dependent tier ─────────────────────────────────────────────────────

/// Everything bound to the window's surface.  Held as one
/// `Option<DeviceResources>` so the three objects exist together or not at all.
struct DeviceResources<G: Graphics> {
    target: G::Target,
    brush: G::Brush,
    format: G::Format,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    NoDeviceResources,
    DeviceResourcesReady,
}

// ── Draw bracket ──────────────────────────────────────────────────────────────

/// A `BeginDraw` that is always paired with an `EndDraw`.
///
/// `end` reports the result; if the frame is dropped without it (early return
/// or unwind), `EndDraw` still runs and its result is discarded.
struct Frame<'a, G: Graphics> {
    graphics: &'a G,
    target: &'a G::Target,
    open: bool,
}

impl<'a, G: Graphics> Frame<'a, G> {
    fn begin(graphics: &'a G, target: &'a G::Target) -> Self {
        graphics.begin_draw(target);
        Self {
            graphics,
            target,
            open: true,
        }
    }

    fn end(mut self) -> EndDraw {
        self.open = false;
        self.graphics.end_draw(self.target)
    }
}

impl<G: Graphics> Drop for Frame<'_, G> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.graphics.end_draw(self.target);
        }
    }
}

// ── Surface ───────────────────────────────────────────────────────────────────

pub(crate) struct Surface<G: Graphics, W: WindowSystem> {
    system: W,
    window: Option<WindowId>,
    // Declared before `graphics`: fields drop in order, so device objects are
    // released before the factories that made them.
    device: Option<DeviceResources<G>>,
    graphics: G,
    text: DisplayText,
}

impl<G: Graphics, W: WindowSystem> Surface<G, W> {
    /// Build the surface around already-created device-independent resources.
    pub(crate) fn new(system: W, graphics: G) -> Self {
        let text = DisplayText::new(DISPLAY_TEXT);
        log::debug!("display text {:?} ({} UTF-16 units)", text.as_str(), text.len());
        Self {
            system,
            window: None,
            device: None,
            graphics,
            text,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> State {
        match self.device {
            Some(_) => State::DeviceResourcesReady,
            None => State::NoDeviceResources,
        }
    }

    #[cfg(test)]
    pub(crate) fn text(&self) -> &DisplayText {
        &self.text
    }

    /// Pixel size of the current render target, if there is one.
    pub(crate) fn target_size(&self) -> Option<PixelSize> {
        self.device
            .as_ref()
            .map(|d| self.graphics.target_size(&d.target))
    }

    #[cfg(test)]
    pub(crate) fn system(&self) -> &W {
        &self.system
    }

    #[cfg(test)]
    pub(crate) fn graphics(&self) -> &G {
        &self.graphics
    }

    // ── Resource lifecycle ────────────────────────────────────────────────────

    fn create_device_resources(&self, window: WindowId) -> Result<DeviceResources<G>> {
        let size = self.system.client_size(window);
        log::debug!(
            "Create device dependent resources ({}x{}).",
            size.width,
            size.height
        );

        let target = self.graphics.create_render_target(window, size)?;
        let brush = self
            .graphics
            .create_solid_brush(&target, Color::from_rgb(BRUSH_RGB))?;
        let format = self.graphics.create_text_format(&FONT)?;

        Ok(DeviceResources {
            target,
            brush,
            format,
        })
    }

    fn release_device_resources(&mut self) {
        if self.device.take().is_some() {
            log::debug!("Released device dependent resources.");
        }
    }

    fn on_resize(&mut self, size: PixelSize) {
        let Some(device) = &self.device else {
            return;
        };
        if let Err(e) = self.graphics.resize(&device.target, size) {
            log::warn!("resize to {}x{} failed: {e}", size.width, size.height);
            self.release_device_resources();
            return;
        }
        log::trace!("render target now {:?}", self.target_size());
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn on_paint(&mut self, window: WindowId) -> Result<()> {
        if self.device.is_none() {
            let device = self.create_device_resources(window)?;
            self.device = Some(device);
        }
        let Some(device) = &self.device else {
            return Ok(());
        };

        let layout = RectF::from_size(self.system.client_size(window));
        let frame = Frame::begin(&self.graphics, &device.target);
        self.graphics.set_identity_transform(&device.target);
        self.graphics
            .clear(&device.target, Color::from_rgb(BACKGROUND_RGB));
        self.graphics
            .draw_line(&device.target, LINE_FROM, LINE_TO, &device.brush, LINE_WIDTH);
        self.graphics.draw_text(
            &device.target,
            self.text.as_wide(),
            &device.format,
            layout,
            &device.brush,
        );

        match frame.end() {
            EndDraw::Presented => self.system.validate(window),
            // Leave the region invalid so the next WM_PAINT rebuilds.
            EndDraw::RecreateTarget => {
                log::warn!("render target lost; recreating on next paint");
                self.release_device_resources();
            }
        }
        Ok(())
    }
}

impl<G: Graphics, W: WindowSystem> Handler for Surface<G, W> {
    fn attach(&mut self, window: WindowId) {
        self.window = Some(window);
    }

    fn handle(&mut self, message: Message) -> Outcome {
        let Some(window) = self.window else {
            return Outcome::Unhandled;
        };

        match message {
            Message::Size { width, height } => {
                self.on_resize(PixelSize::new(width, height));
                Outcome::Handled(HANDLED)
            }
            Message::DisplayChange => {
                self.system.invalidate(window);
                Outcome::Handled(HANDLED)
            }
            Message::Paint => self.on_paint(window).map(|()| HANDLED).into(),
            Message::Destroy => {
                self.system.request_quit(0);
                Outcome::Handled(HANDLED)
            }
            Message::Create => Outcome::Unhandled,
            Message::Other { id, wparam, lparam } => {
                log::trace!("unhandled message {id:#06x} ({wparam:#x}, {lparam:#x})");
                Outcome::Unhandled
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
