// ── Direct2D / DirectWrite backend ────────────────────────────────────────────
//
// `Direct2D` is the device-independent tier: one single-threaded
// `ID2D1Factory` and one shared `IDWriteFactory`, created before the window
// and kept for the life of the paint surface.  It implements `Graphics` by
// forwarding to the COM interfaces.
//
// COM objects release themselves on drop, so no explicit teardown is needed.

#![allow(unsafe_code)]

use windows::{
    core::PCWSTR,
    Foundation::Numerics::Matrix3x2,
    Win32::Graphics::{
        Direct2D::{
            Common::{D2D1_COLOR_F, D2D_POINT_2F, D2D_RECT_F, D2D_SIZE_U},
            D2D1CreateFactory, ID2D1Factory, ID2D1HwndRenderTarget, ID2D1SolidColorBrush,
            ID2D1StrokeStyle, D2D1_DRAW_TEXT_OPTIONS_NONE, D2D1_FACTORY_TYPE_SINGLE_THREADED,
            D2D1_HWND_RENDER_TARGET_PROPERTIES, D2D1_PRESENT_OPTIONS_NONE,
            D2D1_RENDER_TARGET_PROPERTIES, D2DERR_RECREATE_TARGET,
        },
        DirectWrite::{
            DWriteCreateFactory, IDWriteFactory, IDWriteFontCollection, IDWriteTextFormat,
            DWRITE_FACTORY_TYPE_SHARED, DWRITE_FONT_STRETCH_NORMAL, DWRITE_FONT_STYLE_NORMAL,
            DWRITE_FONT_WEIGHT_REGULAR, DWRITE_MEASURING_MODE_NATURAL,
            DWRITE_PARAGRAPH_ALIGNMENT_CENTER, DWRITE_TEXT_ALIGNMENT_CENTER,
        },
    },
};

use super::{hwnd, wide};
use crate::{
    error::{ResourceContext, ResourceStep, Result},
    platform::{Color, EndDraw, FontSpec, Graphics, PixelSize, Point, RectF, WindowId},
};

pub(crate) struct Direct2D {
    factory: ID2D1Factory,
    write: IDWriteFactory,
}

impl Direct2D {
    /// Create the drawing and text factories.
    pub(crate) fn new() -> Result<Self> {
        // SAFETY: D2D1CreateFactory has no preconditions.  The single-threaded
        // factory is only ever touched from the UI thread that created it.
        let factory = unsafe {
            D2D1CreateFactory::<ID2D1Factory>(D2D1_FACTORY_TYPE_SINGLE_THREADED, None)
        }
        .step(ResourceStep::DrawingFactory)?;

        // SAFETY: DWriteCreateFactory has no preconditions; the shared factory
        // is reference counted by the system.
        let write = unsafe { DWriteCreateFactory::<IDWriteFactory>(DWRITE_FACTORY_TYPE_SHARED) }
            .step(ResourceStep::TextFactory)?;

        Ok(Self { factory, write })
    }
}

// ── Value conversion ──────────────────────────────────────────────────────────

fn size_u(size: PixelSize) -> D2D_SIZE_U {
    D2D_SIZE_U {
        width: size.width,
        height: size.height,
    }
}

fn color_f(c: Color) -> D2D1_COLOR_F {
    D2D1_COLOR_F {
        r: c.r,
        g: c.g,
        b: c.b,
        a: c.a,
    }
}

fn point_2f(p: Point) -> D2D_POINT_2F {
    D2D_POINT_2F { x: p.x, y: p.y }
}

fn rect_f(r: RectF) -> D2D_RECT_F {
    D2D_RECT_F {
        left: r.left,
        top: r.top,
        right: r.right,
        bottom: r.bottom,
    }
}

// ── Graphics ──────────────────────────────────────────────────────────────────

impl Graphics for Direct2D {
    type Target = ID2D1HwndRenderTarget;
    type Brush = ID2D1SolidColorBrush;
    type Format = IDWriteTextFormat;

    fn create_render_target(&self, window: WindowId, size: PixelSize) -> Result<Self::Target> {
        // All-zero properties are D2D1::RenderTargetProperties(): default type,
        // unknown pixel format, default DPI.
        let props = D2D1_RENDER_TARGET_PROPERTIES::default();
        let hwnd_props = D2D1_HWND_RENDER_TARGET_PROPERTIES {
            hwnd: hwnd(window),
            pixelSize: size_u(size),
            presentOptions: D2D1_PRESENT_OPTIONS_NONE,
        };

        // SAFETY: both property structs are fully initialised and outlive the
        // call; the HWND belongs to the live main window.
        unsafe { self.factory.CreateHwndRenderTarget(&props, &hwnd_props) }
            .step(ResourceStep::RenderTarget)
    }

    fn create_solid_brush(&self, target: &Self::Target, color: Color) -> Result<Self::Brush> {
        // SAFETY: the colour is a plain value; no brush properties are passed.
        unsafe { target.CreateSolidColorBrush(&color_f(color), None) }.step(ResourceStep::Brush)
    }

    fn create_text_format(&self, font: &FontSpec) -> Result<Self::Format> {
        let family = wide(font.family);
        let locale = wide(font.locale);

        // SAFETY: `family` and `locale` are null-terminated UTF-16 buffers that
        // outlive the call.  A null collection selects the system fonts.
        let format = unsafe {
            self.write.CreateTextFormat(
                PCWSTR(family.as_ptr()),
                None::<&IDWriteFontCollection>,
                DWRITE_FONT_WEIGHT_REGULAR,
                DWRITE_FONT_STYLE_NORMAL,
                DWRITE_FONT_STRETCH_NORMAL,
                font.size,
                PCWSTR(locale.as_ptr()),
            )
        }
        .step(ResourceStep::TextFormat)?;

        // SAFETY: `format` is a valid text format we just created.
        unsafe { format.SetTextAlignment(DWRITE_TEXT_ALIGNMENT_CENTER) }
            .step(ResourceStep::TextAlignment)?;
        // SAFETY: as above.
        unsafe { format.SetParagraphAlignment(DWRITE_PARAGRAPH_ALIGNMENT_CENTER) }
            .step(ResourceStep::ParagraphAlignment)?;

        Ok(format)
    }

    fn resize(&self, target: &Self::Target, size: PixelSize) -> Result<()> {
        // SAFETY: target is a live render target owned by the surface.
        unsafe { target.Resize(&size_u(size)) }.step(ResourceStep::RenderTarget)
    }

    fn target_size(&self, target: &Self::Target) -> PixelSize {
        // SAFETY: GetPixelSize only reads the target's current size.
        let size = unsafe { target.GetPixelSize() };
        PixelSize::new(size.width, size.height)
    }

    fn begin_draw(&self, target: &Self::Target) {
        // SAFETY: paired with `end_draw` by the surface's frame guard.
        unsafe { target.BeginDraw() }
    }

    fn set_identity_transform(&self, target: &Self::Target) {
        // SAFETY: the matrix is a temporary that lives for the call.
        unsafe { target.SetTransform(&Matrix3x2::identity()) }
    }

    fn clear(&self, target: &Self::Target, color: Color) {
        // SAFETY: called between BeginDraw and EndDraw.
        unsafe { target.Clear(Some(&color_f(color))) }
    }

    fn draw_line(
        &self,
        target: &Self::Target,
        from: Point,
        to: Point,
        brush: &Self::Brush,
        stroke_width: f32,
    ) {
        // SAFETY: called between BeginDraw and EndDraw; brush was created by
        // this target.  A null stroke style draws a solid line.
        unsafe {
            target.DrawLine(
                point_2f(from),
                point_2f(to),
                brush,
                stroke_width,
                None::<&ID2D1StrokeStyle>,
            )
        }
    }

    fn draw_text(
        &self,
        target: &Self::Target,
        text: &[u16],
        format: &Self::Format,
        layout: RectF,
        brush: &Self::Brush,
    ) {
        // SAFETY: called between BeginDraw and EndDraw; `text` is borrowed for
        // the duration of the call and DirectWrite does not retain it.
        unsafe {
            target.DrawText(
                text,
                format,
                &rect_f(layout),
                brush,
                D2D1_DRAW_TEXT_OPTIONS_NONE,
                DWRITE_MEASURING_MODE_NATURAL,
            )
        }
    }

    fn end_draw(&self, target: &Self::Target) -> EndDraw {
        // SAFETY: closes the BeginDraw issued by the frame guard.
        match unsafe { target.EndDraw(None, None) } {
            Ok(()) => EndDraw::Presented,
            Err(e) if e.code() == D2DERR_RECREATE_TARGET => EndDraw::RecreateTarget,
            Err(e) => {
                log::warn!("EndDraw failed: {e}");
                EndDraw::Presented
            }
        }
    }
}
