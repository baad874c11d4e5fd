//! Loading/error/result state shared by the AI-backed screens.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

/// Screen lifecycle: `Idle -> Loading -> {Success, Failed}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState<T> {
    /// Nothing requested yet, or results cleared
    Idle,
    /// Request in flight
    Loading,
    /// Last request succeeded
    Success(T),
    /// Last request failed with a user-facing message
    Failed(String),
}

impl<T> ScreenState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ScreenState::Loading)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            ScreenState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ScreenState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// Dismissible inline message scoped to one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn warning(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Identifies one request. Only the most recent token may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

struct Inner<T> {
    state: ScreenState<T>,
    notice: Option<Notice>,
    generation: u64,
}

/// Mutable screen state guarded for use across await points.
pub struct Screen<T> {
    name: &'static str,
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> Screen<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(Inner {
                state: ScreenState::Idle,
                notice: None,
                generation: 0,
            }),
        }
    }

    pub fn state(&self) -> ScreenState<T> {
        self.lock().state.clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.lock().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.lock().notice = None;
    }

    pub fn set_notice(&self, notice: Notice) {
        self.lock().notice = Some(notice);
    }

    /// Enter `Loading` and supersede every outstanding request.
    pub fn begin(&self) -> RequestToken {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = ScreenState::Loading;
        inner.notice = None;
        RequestToken(inner.generation)
    }

    /// Like [`Self::begin`], but refuses while a request is outstanding.
    pub fn try_begin(&self) -> Option<RequestToken> {
        let mut inner = self.lock();
        if inner.state.is_loading() {
            return None;
        }
        inner.generation += 1;
        inner.state = ScreenState::Loading;
        inner.notice = None;
        Some(RequestToken(inner.generation))
    }

    /// Apply a finished request. Returns `false` and leaves the state alone
    /// when the token has been superseded.
    pub fn finish(&self, token: RequestToken, outcome: Result<T, Notice>) -> bool {
        let mut inner = self.lock();
        if token.0 != inner.generation {
            debug!(
                "{}: discarding stale response (generation {}, current {})",
                self.name, token.0, inner.generation
            );
            return false;
        }
        match outcome {
            Ok(value) => {
                inner.state = ScreenState::Success(value);
                inner.notice = None;
            }
            Err(notice) => {
                inner.state = ScreenState::Failed(notice.message.clone());
                inner.notice = Some(notice);
            }
        }
        true
    }

    /// Drop results and invalidate any request in flight.
    pub fn reset(&self, notice: Option<Notice>) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = ScreenState::Idle;
        inner.notice = notice;
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_starts_idle() {
        let screen: Screen<u32> = Screen::new("test");
        assert_eq!(screen.state(), ScreenState::Idle);
        assert!(screen.notice().is_none());
    }

    #[test]
    fn test_begin_then_finish_success() {
        let screen = Screen::new("test");
        let token = screen.begin();
        assert!(screen.state().is_loading());

        assert!(screen.finish(token, Ok(7u32)));
        assert_eq!(screen.state().result(), Some(&7));
    }

    #[test]
    fn test_finish_failure_sets_notice() {
        let screen: Screen<u32> = Screen::new("test");
        let token = screen.begin();
        screen.finish(token, Err(Notice::error("Error", "it broke")));

        assert_eq!(screen.state().error(), Some("it broke"));
        assert_eq!(screen.notice().unwrap().kind, NoticeKind::Error);

        screen.dismiss_notice();
        assert!(screen.notice().is_none());
        assert_eq!(screen.state().error(), Some("it broke"));
    }

    #[test]
    fn test_stale_token_is_discarded() {
        let screen = Screen::new("test");
        let first = screen.begin();
        let second = screen.begin();

        assert!(screen.finish(second, Ok("second")));
        assert!(!screen.finish(first, Ok("first")));
        assert_eq!(screen.state().result(), Some(&"second"));

        // A stale failure must not clobber success either
        assert!(!screen.finish(first, Err(Notice::error("Error", "late"))));
        assert_eq!(screen.state().result(), Some(&"second"));
        assert!(screen.notice().is_none());
    }

    #[test]
    fn test_try_begin_refuses_while_loading() {
        let screen: Screen<u8> = Screen::new("test");
        let token = screen.try_begin().unwrap();
        assert!(screen.try_begin().is_none());

        assert!(screen.finish(token, Ok(1)));
        assert!(screen.try_begin().is_some());
    }

    #[test]
    fn test_reset_invalidates_in_flight_request() {
        let screen = Screen::new("test");
        let token = screen.begin();
        screen.reset(Some(Notice::info("Profile", "incomplete")));

        assert!(!screen.finish(token, Ok(1u8)));
        assert_eq!(screen.state(), ScreenState::Idle);
        assert_eq!(screen.notice().unwrap().message, "incomplete");
    }
}
