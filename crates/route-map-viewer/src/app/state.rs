//! Application state management
//!
//! Holds the lifecycle controller, runtime UI settings, and the credential
//! fallback input with its resubmission debounce.

use instant::Instant;
use route_map_lib::Credential;
use std::time::Duration;

/// Minimum delay between two credential submissions
const SUBMIT_DEBOUNCE: Duration = Duration::from_secs(1);

/// UI-specific settings that can be adjusted at runtime
pub struct UiSettings {
    /// Whether sidebar is open
    pub sidebar_open: bool,
    /// Current active tab in sidebar
    pub active_tab: SidebarTab,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            active_tab: SidebarTab::Route,
        }
    }
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SidebarTab {
    Route,
    Status,
}

/// State of the credential fallback view
///
/// The view holds exactly one piece of input: the candidate credential. It
/// performs no validation beyond non-emptiness; validity is only established
/// by the load attempt it triggers.
#[derive(Default)]
pub struct FallbackState {
    /// Candidate credential being typed
    pub input: String,
    last_submit: Option<Instant>,
}

impl FallbackState {
    /// Consume the current input as a credential submission
    ///
    /// Returns `None` for empty input or when a submission happened within
    /// the debounce window. The user may retry indefinitely.
    pub fn try_submit(&mut self) -> Option<Credential> {
        let token = self.input.trim();
        if token.is_empty() {
            return None;
        }
        if let Some(last) = self.last_submit
            && last.elapsed() < SUBMIT_DEBOUNCE
        {
            tracing::debug!("credential resubmission debounced");
            return None;
        }

        self.last_submit = Some(Instant::now());
        Some(Credential::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_not_submitted() {
        let mut fallback = FallbackState::default();
        assert!(fallback.try_submit().is_none());
        fallback.input = "   ".to_string();
        assert!(fallback.try_submit().is_none());
    }

    #[test]
    fn test_submission_is_trimmed() {
        let mut fallback = FallbackState {
            input: "  pk.token  ".to_string(),
            ..Default::default()
        };
        let credential = fallback.try_submit().unwrap();
        assert_eq!(credential.as_str(), "pk.token");
    }

    #[test]
    fn test_rapid_resubmission_is_debounced() {
        let mut fallback = FallbackState {
            input: "pk.token".to_string(),
            ..Default::default()
        };
        assert!(fallback.try_submit().is_some());
        assert!(fallback.try_submit().is_none());
    }
}
