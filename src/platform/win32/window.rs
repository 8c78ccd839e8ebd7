// ── Main window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the main window class.
//   • Create the top-level window and hand it its paint surface.
//   • Run the Win32 message loop.
//   • Route every message through the window table to the surface, falling
//     back to DefWindowProcW for anything the surface leaves unhandled.

#![allow(unsafe_code)]

use std::cell::RefCell;

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{InvalidateRect, UpdateWindow, ValidateRect},
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DispatchMessageW, GetClientRect, GetMessageW,
            LoadCursorW, PostQuitMessage, RegisterClassExW, ShowWindow, TranslateMessage,
            CS_HREDRAW, CS_VREDRAW, IDC_ARROW, MSG, SW_SHOWDEFAULT, WINDOW_EX_STYLE,
            WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
        },
    },
};

use super::{direct2d::Direct2D, hwnd, wide, window_id};
use crate::{
    error::{Result, TermyError, WindowStage},
    message::Message,
    platform::{PixelSize, WindowId, WindowSystem},
    shell::{Registry, Route},
    surface::Surface,
};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the main window class.
const CLASS_NAME: PCWSTR = w!("TermyMain");

const TITLE: &str = "Termy";

/// Initial outer window size in pixels.
const WIDTH: i32 = 500;
const HEIGHT: i32 = 300;

/// The paint surface as instantiated on Windows.
type MainSurface = Surface<Direct2D, Win32Windows>;

thread_local! {
    /// Window → surface table.  Lives on the UI thread, which is the only
    /// thread that ever runs `wnd_proc`.
    static WINDOWS: RefCell<Registry<MainSurface>> = RefCell::new(Registry::new());
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Create the main window and drive the message loop until it is closed.
pub(crate) fn run() -> Result<()> {
    #[cfg(debug_assertions)]
    let t0 = std::time::Instant::now();

    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // always valid for the process lifetime and never fails in practice.
    let hmodule = unsafe { GetModuleHandleW(None) }.map_err(|e| TermyError::WindowCreation {
        stage: WindowStage::RegisterClass,
        code: e.code().0 as u32,
    })?;
    let hinstance = HINSTANCE(hmodule.0);

    log::info!("Create device independent resources.");
    let surface = Surface::new(Win32Windows, Direct2D::new()?);

    log::info!("Create window.");
    create(hinstance, surface)?;

    #[cfg(debug_assertions)]
    log::debug!("window visible in {:.1} ms", t0.elapsed().as_secs_f64() * 1000.0);

    log::info!("Entering message loop.");
    run_loop()
}

/// Register the class, create the window bound to `surface`, and show it.
fn create(hinstance: HINSTANCE, surface: MainSurface) -> Result<HWND> {
    register_class(hinstance)?;

    // The surface is bound to the window by the first message CreateWindowExW
    // delivers, before the call returns.
    WINDOWS.with(|windows| windows.borrow_mut().adopt(surface));

    let title = wide(TITLE);

    // SAFETY: CLASS_NAME was just registered; hinstance is the exe's module;
    // `title` is null-terminated and outlives the call.
    // No parent and no menu: a plain top-level window.
    let created = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            0,
            0,
            WIDTH,
            HEIGHT,
            None,
            None,
            hinstance,
            None,
        )
    };

    let hwnd = match created {
        Ok(hwnd) if !hwnd.is_invalid() => hwnd,
        Ok(_) => {
            WINDOWS.with(|windows| windows.borrow_mut().abandon_pending());
            return Err(last_error(WindowStage::CreateWindow));
        }
        Err(e) => {
            WINDOWS.with(|windows| windows.borrow_mut().abandon_pending());
            return Err(TermyError::WindowCreation {
                stage: WindowStage::CreateWindow,
                code: e.code().0 as u32,
            });
        }
    };

    // SAFETY: hwnd was just returned by CreateWindowExW and is valid.
    // ShowWindow returns the previous visibility state; UpdateWindow returns
    // a success BOOL — both are intentionally ignored here.
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOWDEFAULT);
        let _ = UpdateWindow(hwnd);
    }

    Ok(hwnd)
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    // SAFETY: LoadCursorW with IDC_ARROW always succeeds; the arrow cursor is
    // a built-in resource guaranteed to exist on all Windows versions.
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }.map_err(|e| {
        TermyError::WindowCreation {
            stage: WindowStage::RegisterClass,
            code: e.code().0 as u32,
        }
    })?;

    let wndclass = WNDCLASSEXW {
        // WNDCLASSEXW is ~72 bytes; the cast to u32 is always lossless.
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        // CS_HREDRAW | CS_VREDRAW: repaint on resize.
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        hInstance: hinstance,
        hCursor: cursor,
        // No background brush: Direct2D paints every pixel.
        lpszClassName: CLASS_NAME,
        ..Default::default()
    };

    // SAFETY: wndclass is fully initialised with valid handles;
    // CLASS_NAME is a valid null-terminated UTF-16 string literal.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error(WindowStage::RegisterClass));
    }

    Ok(())
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn run_loop() -> Result<()> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
        // messages for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            // GetMessage returns -1 on error.
            -1 => {
                // SAFETY: GetLastError reads thread-local state and never fails.
                let code = unsafe { GetLastError() };
                return Err(TermyError::MessageLoop { code: code.0 });
            }
            // Returns 0 when WM_QUIT is retrieved — exit the loop cleanly.
            0 => break,
            // Any other value: a normal message to dispatch.
            _ => unsafe {
                // SAFETY: msg was populated by a successful GetMessage call.
                // TranslateMessage return value (whether it generated WM_CHAR)
                // and DispatchMessageW's LRESULT are intentionally unused.
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            },
        }
    }

    log::debug!("WM_QUIT received (exit code {})", msg.wParam.0);

    WINDOWS.with(|windows| windows.borrow_mut().finish())
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; we must not store hwnd beyond the message handler.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let message = Message::decode(msg, wparam.0, lparam.0);

    // The table borrow ends before DefWindowProcW runs: default processing
    // can send further messages to this window synchronously.
    let route = WINDOWS.with(|windows| Registry::route(windows, window_id(hwnd), message));

    match route {
        Route::Handled(value) => LRESULT(value),
        // SAFETY: hwnd and message parameters are valid — provided by Windows.
        Route::Default => DefWindowProcW(hwnd, msg, wparam, lparam),
        Route::Abort(code) => {
            // SAFETY: posts WM_QUIT to this thread's queue; always safe.
            PostQuitMessage(code);
            LRESULT(0)
        }
    }
}

// ── WindowSystem ──────────────────────────────────────────────────────────────

/// The windowing calls the paint surface makes, backed by user32.
pub(crate) struct Win32Windows;

impl WindowSystem for Win32Windows {
    fn client_size(&self, window: WindowId) -> PixelSize {
        let mut rect = RECT::default();
        // SAFETY: `window` is the live main window; rect is a valid out-param.
        if let Err(e) = unsafe { GetClientRect(hwnd(window), &mut rect) } {
            log::warn!("GetClientRect failed: {e}");
            return PixelSize::default();
        }
        PixelSize::new(
            (rect.right - rect.left).max(0) as u32,
            (rect.bottom - rect.top).max(0) as u32,
        )
    }

    fn invalidate(&self, window: WindowId) {
        // SAFETY: null rect = whole client area; FALSE = keep the background.
        unsafe {
            let _ = InvalidateRect(hwnd(window), None, false);
        }
    }

    fn validate(&self, window: WindowId) {
        // SAFETY: null rect = whole client area.
        unsafe {
            let _ = ValidateRect(hwnd(window), None);
        }
    }

    fn request_quit(&self, exit_code: i32) {
        // SAFETY: PostQuitMessage is always safe to call from the UI thread.
        unsafe { PostQuitMessage(exit_code) }
    }
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in a `TermyError`.
///
/// Call immediately after a Win32 function that signals failure — `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(stage: WindowStage) -> TermyError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    TermyError::WindowCreation {
        stage,
        code: code.0,
    }
}
