// ── Window → instance routing ─────────────────────────────────────────────────
//
// The native window procedure is a free function, so it needs a way to find
// the object that owns the window it was called for.  `Registry` is that
// lookup: an explicit table from `WindowId` to handler, owned by the platform
// shell on the UI thread.  A handler is adopted *before* the window exists
// and bound to the first window that delivers a message for it.

use std::{cell::RefCell, collections::HashMap};

use crate::{
    error::{Result, TermyError},
    message::{Message, Outcome, WM_NCDESTROY},
    platform::WindowId,
};

/// Something that owns a window and reacts to its messages.
pub(crate) trait Handler {
    /// Called once, when the handler is bound to its window.
    fn attach(&mut self, window: WindowId);

    fn handle(&mut self, message: Message) -> Outcome;
}

/// What the window procedure should do after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    /// Return this value from the window procedure.
    Handled(isize),
    /// Hand the message to `DefWindowProcW`.
    Default,
    /// A handler failed; post a quit message with this code and return 0.
    Abort(i32),
}

pub(crate) struct Registry<H> {
    /// Handler waiting for its window to deliver the first message.
    pending: Option<H>,
    windows: HashMap<WindowId, H>,
    /// First fatal handler error, reported once the loop exits.
    failure: Option<TermyError>,
}

impl<H: Handler> Registry<H> {
    pub(crate) fn new() -> Self {
        Self {
            pending: None,
            windows: HashMap::new(),
            failure: None,
        }
    }

    /// Queue `handler` for the next window that has no owner yet.
    pub(crate) fn adopt(&mut self, handler: H) {
        self.pending = Some(handler);
    }

    /// Take back a handler whose window was never created.
    pub(crate) fn abandon_pending(&mut self) -> Option<H> {
        self.pending.take()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, window: WindowId) -> Option<&H> {
        self.windows.get(&window)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.windows.len()
    }

    /// Dispatch through a shared table.  A message that arrives while the
    /// table is already borrowed (sent from inside a handler) gets default
    /// processing.
    pub(crate) fn route(table: &RefCell<Self>, window: WindowId, message: Message) -> Route {
        match table.try_borrow_mut() {
            Ok(mut table) => table.dispatch(window, message),
            Err(_) => {
                log::trace!("re-entrant message {message:?}; default processing");
                Route::Default
            }
        }
    }

    /// Route one message to the handler that owns `window`.
    pub(crate) fn dispatch(&mut self, window: WindowId, message: Message) -> Route {
        if let Message::Other {
            id: WM_NCDESTROY, ..
        } = message
        {
            if self.windows.remove(&window).is_some() {
                log::debug!("released handler for window {:#x}", window.0);
            }
            return Route::Default;
        }

        let Some(handler) = self.windows.get_mut(&window) else {
            // The first messages arrive while CreateWindowExW is still
            // running; bind the pending handler and let Windows handle them.
            if let Some(mut handler) = self.pending.take() {
                log::debug!("attached handler to window {:#x}", window.0);
                handler.attach(window);
                self.windows.insert(window, handler);
            }
            return Route::Default;
        };

        match handler.handle(message) {
            Outcome::Handled(value) => Route::Handled(value),
            Outcome::Unhandled => Route::Default,
            Outcome::Failed(e) => {
                log::debug!("handler for window {:#x} failed: {e}", window.0);
                let code = e.exit_code();
                self.failure.get_or_insert(e);
                Route::Abort(code)
            }
        }
    }

    /// The fatal error recorded during dispatch, if any.
    pub(crate) fn take_failure(&mut self) -> Option<TermyError> {
        self.failure.take()
    }

    /// Outcome of the message loop once it has ended.  A handler that
    /// failed posted the quit message, so its error is the loop's result.
    pub(crate) fn finish(&mut self) -> Result<()> {
        match self.take_failure() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
