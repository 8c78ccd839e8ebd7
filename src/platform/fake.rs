// ── Recording fakes for the platform traits ───────────────────────────────────
//
// Test-only.  Every call is appended to a log so tests can assert on the exact
// sequence the paint surface issued.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use super::{
    Color, EndDraw, FontSpec, Graphics, PixelSize, Point, RectF, WindowId, WindowSystem,
};
use crate::error::{ResourceStep, Result, TermyError};

// ── Windowing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SystemCall {
    Invalidate(WindowId),
    Validate(WindowId),
    Quit(i32),
}

#[derive(Default)]
pub(crate) struct FakeSystem {
    pub(crate) client: Cell<PixelSize>,
    pub(crate) calls: RefCell<Vec<SystemCall>>,
}

impl FakeSystem {
    pub(crate) fn with_client(size: PixelSize) -> Self {
        Self {
            client: Cell::new(size),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<SystemCall> {
        self.calls.borrow().clone()
    }
}

impl WindowSystem for FakeSystem {
    fn client_size(&self, _window: WindowId) -> PixelSize {
        self.client.get()
    }

    fn invalidate(&self, window: WindowId) {
        self.calls.borrow_mut().push(SystemCall::Invalidate(window));
    }

    fn validate(&self, window: WindowId) {
        self.calls.borrow_mut().push(SystemCall::Validate(window));
    }

    fn request_quit(&self, exit_code: i32) {
        self.calls.borrow_mut().push(SystemCall::Quit(exit_code));
    }
}

// ── Graphics ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawCall {
    CreateTarget(WindowId, PixelSize),
    CreateBrush(Color),
    CreateFormat(FontSpec),
    Resize(PixelSize),
    BeginDraw,
    SetIdentityTransform,
    Clear(Color),
    DrawLine { from: Point, to: Point, width: f32 },
    DrawText { text: String, layout: RectF },
    EndDraw,
}

/// Stand-in render target.  Tracks how many are alive through a shared
/// counter so tests can observe release.
pub(crate) struct FakeTarget {
    size: Cell<PixelSize>,
    live: Rc<Cell<i32>>,
}

impl Drop for FakeTarget {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

pub(crate) struct FakeBrush;

pub(crate) struct FakeFormat;

#[derive(Default)]
pub(crate) struct FakeGraphics {
    pub(crate) calls: RefCell<Vec<DrawCall>>,
    /// Render targets currently alive.
    pub(crate) live: Rc<Cell<i32>>,
    /// Make this creation step fail.
    pub(crate) fail_at: Cell<Option<ResourceStep>>,
    pub(crate) fail_resize: Cell<bool>,
    /// Report device loss from the next `end_draw`.
    pub(crate) lose_device: Cell<bool>,
}

impl FakeGraphics {
    pub(crate) fn calls(&self) -> Vec<DrawCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|&c| pred(c)).count()
    }

    fn record(&self, call: DrawCall) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, step: ResourceStep) -> Result<()> {
        if self.fail_at.get() == Some(step) {
            return Err(TermyError::ResourceCreation {
                step,
                code: 0x8000_4005,
            });
        }
        Ok(())
    }
}

impl Graphics for FakeGraphics {
    type Target = FakeTarget;
    type Brush = FakeBrush;
    type Format = FakeFormat;

    fn create_render_target(&self, window: WindowId, size: PixelSize) -> Result<FakeTarget> {
        self.check(ResourceStep::RenderTarget)?;
        self.record(DrawCall::CreateTarget(window, size));
        self.live.set(self.live.get() + 1);
        Ok(FakeTarget {
            size: Cell::new(size),
            live: Rc::clone(&self.live),
        })
    }

    fn create_solid_brush(&self, _target: &FakeTarget, color: Color) -> Result<FakeBrush> {
        self.check(ResourceStep::Brush)?;
        self.record(DrawCall::CreateBrush(color));
        Ok(FakeBrush)
    }

    fn create_text_format(&self, font: &FontSpec) -> Result<FakeFormat> {
        self.check(ResourceStep::TextFormat)?;
        self.check(ResourceStep::TextAlignment)?;
        self.check(ResourceStep::ParagraphAlignment)?;
        self.record(DrawCall::CreateFormat(*font));
        Ok(FakeFormat)
    }

    fn resize(&self, target: &FakeTarget, size: PixelSize) -> Result<()> {
        self.record(DrawCall::Resize(size));
        if self.fail_resize.get() {
            return Err(TermyError::ResourceCreation {
                step: ResourceStep::RenderTarget,
                code: 0x8899_000c,
            });
        }
        target.size.set(size);
        Ok(())
    }

    fn target_size(&self, target: &FakeTarget) -> PixelSize {
        target.size.get()
    }

    fn begin_draw(&self, _target: &FakeTarget) {
        self.record(DrawCall::BeginDraw);
    }

    fn set_identity_transform(&self, _target: &FakeTarget) {
        self.record(DrawCall::SetIdentityTransform);
    }

    fn clear(&self, _target: &FakeTarget, color: Color) {
        self.record(DrawCall::Clear(color));
    }

    fn draw_line(
        &self,
        _target: &FakeTarget,
        from: Point,
        to: Point,
        _brush: &FakeBrush,
        stroke_width: f32,
    ) {
        self.record(DrawCall::DrawLine {
            from,
            to,
            width: stroke_width,
        });
    }

    fn draw_text(
        &self,
        _target: &FakeTarget,
        text: &[u16],
        _format: &FakeFormat,
        layout: RectF,
        _brush: &FakeBrush,
    ) {
        self.record(DrawCall::DrawText {
            text: String::from_utf16_lossy(text),
            layout,
        });
    }

    fn end_draw(&self, _target: &FakeTarget) -> EndDraw {
        self.record(DrawCall::EndDraw);
        if self.lose_device.replace(false) {
            EndDraw::RecreateTarget
        } else {
            EndDraw::Presented
        }
    }
}
