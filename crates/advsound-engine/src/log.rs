//! Logging collaborator handed to a controller.
//!
//! A `SoundLog` is opened when its controller initializes and closed on
//! cleanup. While open, every message is recorded inside a
//! `sound_controller` span carrying the backend label. A log can also carry
//! its own [`Dispatch`] so a host can route one controller's messages
//! somewhere other than the global subscriber.

use std::fmt;

use tracing::{Dispatch, Span};

#[derive(Debug, Default)]
pub struct SoundLog {
    dispatch: Option<Dispatch>,
    span: Option<Span>,
}

impl SoundLog {
    /// Log through the global default subscriber.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log through `dispatch` instead of the global default.
    pub fn with_dispatch(dispatch: Dispatch) -> Self {
        Self {
            dispatch: Some(dispatch),
            span: None,
        }
    }

    /// Start the controller scope. Reopening replaces the previous scope.
    pub fn open(&mut self, backend: &str) {
        let span = self.dispatched(|| tracing::info_span!("sound_controller", backend = backend));
        self.span = Some(span);
    }

    pub fn close(&mut self) {
        self.span = None;
    }

    pub const fn is_open(&self) -> bool {
        self.span.is_some()
    }

    pub fn debug(&self, message: fmt::Arguments<'_>) {
        self.emit(|| tracing::debug!("{message}"));
    }

    pub fn info(&self, message: fmt::Arguments<'_>) {
        self.emit(|| tracing::info!("{message}"));
    }

    pub fn warn(&self, message: fmt::Arguments<'_>) {
        self.emit(|| tracing::warn!("{message}"));
    }

    pub fn error(&self, message: fmt::Arguments<'_>) {
        self.emit(|| tracing::error!("{message}"));
    }

    fn dispatched<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }

    fn emit(&self, f: impl FnOnce()) {
        self.dispatched(|| match &self.span {
            Some(span) => span.in_scope(f),
            None => f(),
        });
    }
}
