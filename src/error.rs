// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in Termy return `error::Result<T>`.  No panics in
// production paths; fatal errors bubble to `main`, which logs them and exits
// with the code returned by `TermyError::exit_code`.

use thiserror::Error;

/// Which half of window creation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowStage {
    /// `RegisterClassExW`.
    RegisterClass,
    /// `CreateWindowExW`.
    CreateWindow,
}

impl std::fmt::Display for WindowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::RegisterClass => "failed to register window class",
            Self::CreateWindow => "unable to create window",
        })
    }
}

/// The graphics resource whose creation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResourceStep {
    DrawingFactory,
    TextFactory,
    RenderTarget,
    Brush,
    TextFormat,
    TextAlignment,
    ParagraphAlignment,
}

impl std::fmt::Display for ResourceStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::DrawingFactory => "Direct2D factory",
            Self::TextFactory => "DirectWrite factory",
            Self::RenderTarget => "render target",
            Self::Brush => "brush",
            Self::TextFormat => "text format",
            Self::TextAlignment => "text alignment",
            Self::ParagraphAlignment => "paragraph alignment",
        })
    }
}

/// Every error that Termy can produce.
#[derive(Debug, Error)]
pub(crate) enum TermyError {
    /// Class registration or window creation failed.
    #[error("{stage} (error {code:#010x})")]
    WindowCreation { stage: WindowStage, code: u32 },

    /// `GetMessage` returned -1.
    #[error("message loop failed (error {code:#010x})")]
    MessageLoop { code: u32 },

    /// A device-independent or device-dependent resource could not be built.
    #[error("failed to create {step} (error {code:#010x})")]
    ResourceCreation { step: ResourceStep, code: u32 },

    /// Termy draws through Direct2D and only runs on Windows.
    #[cfg_attr(windows, allow(dead_code))]
    #[error("Termy requires Windows")]
    UnsupportedPlatform,
}

impl TermyError {
    /// Process exit code reported by `main` for this error.
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::WindowCreation {
                stage: WindowStage::RegisterClass,
                ..
            } => 1,
            Self::WindowCreation {
                stage: WindowStage::CreateWindow,
                ..
            } => 2,
            Self::MessageLoop { .. } => 3,
            Self::ResourceCreation { .. } => 4,
            Self::UnsupportedPlatform => 5,
        }
    }
}

/// Attach a `ResourceStep` to a `windows::core::Result`.
///
/// HRESULT.0 is i32; the bits are reinterpreted as u32 for display so that
/// Win32 errors show up as 0x8007xxxx.
#[cfg(windows)]
pub(crate) trait ResourceContext<T> {
    fn step(self, step: ResourceStep) -> Result<T>;
}

#[cfg(windows)]
impl<T> ResourceContext<T> for windows::core::Result<T> {
    fn step(self, step: ResourceStep) -> Result<T> {
        self.map_err(|e| TermyError::ResourceCreation {
            step,
            code: e.code().0 as u32,
        })
    }
}

/// Convenience alias used throughout the crate.
pub(crate) type Result<T> = std::result::Result<T, TermyError>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            TermyError::WindowCreation {
                stage: WindowStage::RegisterClass,
                code: 0,
            },
            TermyError::WindowCreation {
                stage: WindowStage::CreateWindow,
                code: 0,
            },
            TermyError::MessageLoop { code: 0 },
            TermyError::ResourceCreation {
                step: ResourceStep::Brush,
                code: 0,
            },
            TermyError::UnsupportedPlatform,
        ];
        let mut codes: Vec<i32> = errors.iter().map(TermyError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn window_error_display() {
        let e = TermyError::WindowCreation {
            stage: WindowStage::RegisterClass,
            code: 1410,
        };
        assert_eq!(
            e.to_string(),
            "failed to register window class (error 0x00000582)"
        );
    }

    #[test]
    fn resource_error_names_step() {
        let e = TermyError::ResourceCreation {
            step: ResourceStep::RenderTarget,
            code: 0x8899_000c,
        };
        assert_eq!(
            e.to_string(),
            "failed to create render target (error 0x8899000c)"
        );
    }

    #[test]
    fn fixed_exit_codes() {
        let create = TermyError::WindowCreation {
            stage: WindowStage::CreateWindow,
            code: 0,
        };
        assert_eq!(create.exit_code(), 2);
        assert_eq!(TermyError::MessageLoop { code: 0 }.exit_code(), 3);
        assert_eq!(TermyError::UnsupportedPlatform.exit_code(), 5);
    }
}
