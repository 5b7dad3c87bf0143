use chrono::NaiveDate;
use lsr_srs::SolvedEvent;

use crate::error::ApiError;

/// A study window must end at least this many days after today.
pub const MIN_STUDY_WINDOW_DAYS: i64 = 2;

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::Validation(format!(
            "Invalid {field}: '{raw}'. Expected a date like 2025-12-31"
        ))
    })
}

/// Validate a study end date chosen on `today`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use lsr_api::validation::validate_study_end;
///
/// let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// assert!(validate_study_end("2025-01-03", today).is_ok());
/// assert!(validate_study_end("2025-01-02", today).is_err());
/// ```
pub fn validate_study_end(end_date: &str, today: NaiveDate) -> Result<NaiveDate, ApiError> {
    let end = parse_date("study end date", end_date)?;
    let days_ahead = (end - today).num_days();

    if days_ahead < 0 {
        return Err(ApiError::Validation(
            "Please choose a study end date that is in the future".to_string(),
        ));
    }
    if days_ahead < MIN_STUDY_WINDOW_DAYS {
        return Err(ApiError::Validation(format!(
            "Please choose a study end date that is more than {MIN_STUDY_WINDOW_DAYS} days in the future"
        )));
    }

    Ok(end)
}

/// Validate an optional study start date against the chosen end date.
pub fn validate_study_start(
    start_date: Option<&str>,
    end: NaiveDate,
) -> Result<Option<NaiveDate>, ApiError> {
    let Some(raw) = start_date.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };

    let start = parse_date("study start date", raw)?;
    if start > end {
        return Err(ApiError::Validation(
            "Study start date must not be after the end date".to_string(),
        ));
    }

    Ok(Some(start))
}

/// A solved event must identify its problem somehow.
pub fn validate_solved_event(event: &SolvedEvent) -> Result<(), ApiError> {
    if event.record_key().is_none() {
        return Err(ApiError::Validation(
            "Solved event needs a problem id or url".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lsr_srs::Difficulty;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    #[test]
    fn test_validate_study_end() {
        assert_eq!(
            validate_study_end("2025-06-12", today()).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 12).unwrap()
        );
        assert!(validate_study_end(" 2025-09-01 ", today()).is_ok());

        // Too close or in the past
        assert!(validate_study_end("2025-06-11", today()).is_err());
        assert!(validate_study_end("2025-06-10", today()).is_err());
        assert!(validate_study_end("2025-06-01", today()).is_err());

        // Not a date
        assert!(validate_study_end("", today()).is_err());
        assert!(validate_study_end("12/06/2025", today()).is_err());
    }

    #[test]
    fn test_validate_study_start() {
        let end = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();

        assert_eq!(validate_study_start(None, end).unwrap(), None);
        assert_eq!(validate_study_start(Some("  "), end).unwrap(), None);
        assert_eq!(
            validate_study_start(Some("2025-06-01"), end).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert!(validate_study_start(Some("2025-07-02"), end).is_err());
        assert!(validate_study_start(Some("soon"), end).is_err());
    }

    #[test]
    fn test_validate_solved_event() {
        let mut event = SolvedEvent {
            id: None,
            url: "https://leetcode.com/problems/a/".to_string(),
            title: "A".to_string(),
            difficulty: Difficulty::Easy,
            tags: Vec::new(),
            time_spent: None,
            submitted_at: Utc::now(),
        };
        assert!(validate_solved_event(&event).is_ok());

        event.url.clear();
        assert!(matches!(
            validate_solved_event(&event),
            Err(ApiError::Validation(_))
        ));
    }
}
