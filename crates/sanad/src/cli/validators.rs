//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute so bad input
//! is rejected at parse time, before the workspace is opened.

use crate::id_generation::{
    DEPENDENCY_ID_PREFIX, MILESTONE_ID_PREFIX, PROJECT_ID_PREFIX, validate_id,
};
use chrono::NaiveDate;

/// Maximum length of titles and names
pub const MAX_TITLE_LENGTH: usize = 200;

fn validate_prefixed_id(s: &str, prefix: &str, what: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err(format!("{what} ID cannot be empty"));
    }
    if !validate_id(s, prefix) {
        return Err(format!(
            "Invalid {} ID format: '{s}'. Expected {prefix}- followed by 4-6 lowercase letters or digits",
            what.to_lowercase()
        ));
    }
    Ok(s.to_string())
}

/// Validate a project ID (`prj-xxxx`).
pub fn validate_project_id(s: &str) -> Result<String, String> {
    validate_prefixed_id(s, PROJECT_ID_PREFIX, "Project")
}

/// Validate a milestone ID (`ms-xxxx`).
pub fn validate_milestone_id(s: &str) -> Result<String, String> {
    validate_prefixed_id(s, MILESTONE_ID_PREFIX, "Milestone")
}

/// Validate a dependency ID (`dep-xxxx`).
pub fn validate_dependency_id(s: &str) -> Result<String, String> {
    validate_prefixed_id(s, DEPENDENCY_ID_PREFIX, "Dependency")
}

/// Validate a title or name: non-blank and at most [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if s.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters (got {})",
            s.chars().count()
        ));
    }
    Ok(s.to_string())
}

/// Validate a user ID: non-blank, no whitespace.
pub fn validate_user_id(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("User ID cannot be empty".to_string());
    }
    if s.chars().any(char::is_whitespace) {
        return Err(format!("User ID cannot contain whitespace: '{s}'"));
    }
    Ok(s.to_string())
}

/// Parse a due date in `YYYY-MM-DD` form.
pub fn parse_due_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::valid("ms-a3f8", true)]
    #[case::padded("  ms-a3f8  ", true)]
    #[case::wrong_prefix("dep-a3f8", false)]
    #[case::too_short("ms-a3", false)]
    #[case::uppercase("ms-A3F8", false)]
    #[case::empty("", false)]
    fn test_validate_milestone_id(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(validate_milestone_id(input).is_ok(), ok);
    }

    #[test]
    fn test_validate_milestone_id_trims() {
        assert_eq!(validate_milestone_id(" ms-a3f8 ").unwrap(), "ms-a3f8");
    }

    #[test]
    fn test_validate_other_ids() {
        assert!(validate_project_id("prj-0a1b2").is_ok());
        assert!(validate_project_id("ms-0a1b2").is_err());
        assert!(validate_dependency_id("dep-zz99").is_ok());
        assert!(validate_dependency_id("dep-").is_err());
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Pilot plant  ").unwrap(), "Pilot plant");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_user_id() {
        assert_eq!(validate_user_id("amal").unwrap(), "amal");
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("amal haddad").is_err());
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(
            parse_due_date("2026-11-30").unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 30).unwrap()
        );
        assert!(parse_due_date("30/11/2026").is_err());
        assert!(parse_due_date("2026-02-30").is_err());
    }
}
