//! Input checks shared by every write path. Nothing here mutates state.

use chrono::NaiveDate;
use trio_domain::{EntryCategory, GoalDraft};

use crate::CoreError;

pub fn validate_amount(amount: f64) -> Result<f64, CoreError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(CoreError::InvalidAmount(amount.to_string()));
    }
    Ok(amount)
}

/// Parses user text into a non-negative amount.
pub fn parse_amount(raw: &str) -> Result<f64, CoreError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidAmount(raw.trim().to_string()))?;
    validate_amount(value)
}

/// Trims `note`; blank notes are rejected when `required`.
pub fn normalize_note(note: &str, required: bool, context: &str) -> Result<String, CoreError> {
    let trimmed = note.trim();
    if required && trimmed.is_empty() {
        return Err(CoreError::EmptyNote(context.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn entry_note(category: EntryCategory, note: &str) -> Result<String, CoreError> {
    normalize_note(note, category.requires_note(), &format!("{category} entries"))
}

/// Checks a goal draft against `today`, returning it with the name trimmed.
pub fn validate_draft(mut draft: GoalDraft, today: NaiveDate) -> Result<GoalDraft, CoreError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(CoreError::EmptyName);
    }
    draft.name = name.to_string();
    validate_amount(draft.target_amount)?;
    validate_amount(draft.base_savings)?;
    if draft.end_date < today {
        return Err(CoreError::InvalidDate(draft.end_date));
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn amounts_must_be_finite_and_non_negative() {
        assert!(validate_amount(0.0).is_ok());
        assert!(matches!(validate_amount(-1.0), Err(CoreError::InvalidAmount(_))));
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
        assert_eq!(parse_amount(" 12.5 ").unwrap(), 12.5);
        assert!(parse_amount("ten").is_err());
    }

    #[test]
    fn income_needs_no_note() {
        assert_eq!(entry_note(EntryCategory::Income, "  ").unwrap(), "");
        assert!(matches!(
            entry_note(EntryCategory::Essentials, " "),
            Err(CoreError::EmptyNote(_))
        ));
        assert_eq!(entry_note(EntryCategory::Savings, " fund ").unwrap(), "fund");
    }

    #[test]
    fn draft_rules() {
        let end = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(validate_draft(GoalDraft::new(" Trip ", 10.0, 0.0, end), today()).is_ok());
        assert!(matches!(
            validate_draft(GoalDraft::new("  ", 10.0, 0.0, end), today()),
            Err(CoreError::EmptyName)
        ));
        assert!(matches!(
            validate_draft(GoalDraft::new("Trip", -1.0, 0.0, end), today()),
            Err(CoreError::InvalidAmount(_))
        ));
        let past = NaiveDate::from_ymd_opt(2024, 1, 14).unwrap();
        assert!(matches!(
            validate_draft(GoalDraft::new("Trip", 1.0, 0.0, past), today()),
            Err(CoreError::InvalidDate(_))
        ));
    }
}
