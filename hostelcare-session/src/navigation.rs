//! Page navigation as seen by the session layer.

use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Full page load; discards all in-memory state (`window.location.href = ...`).
    Hard(String),
    /// Client-side route change within the running application.
    Push(String),
}

impl Navigation {
    pub fn target(&self) -> &str {
        match self {
            Navigation::Hard(target) | Navigation::Push(target) => target,
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: Navigation);
}

/// Records navigations instead of performing them.
#[derive(Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<Navigation> {
        self.history().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, navigation: Navigation) {
        tracing::info!(target_url = %navigation.target(), "Navigating");
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(navigation);
    }
}

/// Append the `_t=<millis>` cache-busting parameter to `url`.
pub fn cache_busted(url: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}_t={}",
        url,
        separator,
        chrono::Utc::now().timestamp_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_busting_appends_timestamp() {
        let busted = cache_busted("/admin/login");
        let stamp = busted.strip_prefix("/admin/login?_t=").unwrap();
        assert!(stamp.parse::<i64>().unwrap() > 0);

        assert!(cache_busted("/login?next=1").starts_with("/login?next=1&_t="));
    }

    #[test]
    fn recorder_keeps_order() {
        let navigator = RecordingNavigator::new();
        navigator.navigate(Navigation::Push("/dashboard".into()));
        navigator.navigate(Navigation::Hard("/register".into()));

        assert_eq!(navigator.history().len(), 2);
        assert_eq!(navigator.last(), Some(Navigation::Hard("/register".into())));
    }
}
