use lsr_srs::StudyWindow;
use serde::{Deserialize, Serialize};

/// Study window settings exactly as stored.
///
/// Dates are kept as the raw strings the user entered (`YYYY-MM-DD`). They are
/// only interpreted when scheduling, where anything malformed is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudySettings {
    /// Study end date; `None` means unbounded scheduling
    pub end_date: Option<String>,
    /// Optional study start date
    pub start_date: Option<String>,
}

impl StudySettings {
    pub fn new(end_date: impl Into<String>) -> Self {
        Self {
            end_date: Some(end_date.into()),
            start_date: None,
        }
    }

    /// The window these settings describe, `None` when unset or malformed.
    pub fn window(&self) -> Option<StudyWindow> {
        StudyWindow::parse(self.end_date.as_deref(), self.start_date.as_deref())
    }

    /// `true` when an end date is stored but does not describe a usable window.
    pub fn is_malformed(&self) -> bool {
        self.end_date.is_some() && self.window().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_unset_settings_have_no_window() {
        let settings = StudySettings::default();
        assert_eq!(settings.window(), None);
        assert!(!settings.is_malformed());
    }

    #[test]
    fn test_window_from_settings() {
        let settings = StudySettings::new("2025-08-01");
        assert_eq!(
            settings.window(),
            Some(StudyWindow::new(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()))
        );
    }

    #[test]
    fn test_malformed_settings_degrade() {
        let settings = StudySettings::new("August 1st");
        assert_eq!(settings.window(), None);
        assert!(settings.is_malformed());
    }
}
