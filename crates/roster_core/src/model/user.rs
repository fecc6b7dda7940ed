//! User directory records.
//!
//! # Responsibility
//! - Define the candidate shape accepted from callers (`UserDraft`).
//! - Define the persisted shape returned to callers (`User`).
//!
//! # Invariants
//! - `UserDraft` is deliberately permissive: every field is optional so the
//!   rule set can report every missing field at once.
//! - `User` only ever holds values that passed the rule set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier assigned by storage on creation.
pub type UserId = Uuid;

/// Mobile number as sent by a caller.
///
/// Browsers post it either as a JSON number or as a string of digits; only
/// its textual form is ever checked. Whole numbers written as floats
/// (`1234567890.0`, `1e10`) read as their integer digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MobileInput {
    Number(serde_json::Number),
    Text(String),
}

impl MobileInput {
    /// Returns the textual form used for validation and storage.
    pub fn to_text(&self) -> String {
        match self {
            Self::Number(value) => number_text(value),
            Self::Text(value) => value.trim().to_string(),
        }
    }
}

// Integral floats below 1e21 print without exponent or fraction.
const MAX_PLAIN_INTEGRAL: f64 = 1e21;

fn number_text(value: &serde_json::Number) -> String {
    if value.is_u64() || value.is_i64() {
        return value.to_string();
    }
    match value.as_f64() {
        Some(float) if float == 0.0 => "0".to_string(),
        Some(float)
            if float.is_finite() && float.fract() == 0.0 && float.abs() < MAX_PLAIN_INTEGRAL =>
        {
            format!("{float:.0}")
        }
        _ => value.to_string(),
    }
}

impl From<&str> for MobileInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<u64> for MobileInput {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// Candidate user attributes, before validation.
///
/// Unknown fields (for example `_id` or timestamps echoed back by an edit
/// form) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub user: Option<String>,
    pub interest: Option<Vec<String>>,
    pub age: Option<i64>,
    pub mobile: Option<MobileInput>,
    pub email: Option<String>,
}

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Serialized as `_id` to keep the document-store wire name.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name, trimmed.
    pub user: String,
    /// Non-empty, trimmed interests in caller order.
    pub interest: Vec<String>,
    pub age: i64,
    /// ASCII digits only.
    pub mobile: String,
    /// Lower-cased.
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns an editable draft holding this record's current values.
    pub fn to_draft(&self) -> UserDraft {
        UserDraft {
            user: Some(self.user.clone()),
            interest: Some(self.interest.clone()),
            age: Some(self.age),
            mobile: Some(MobileInput::Text(self.mobile.clone())),
            email: Some(self.email.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MobileInput, UserDraft};

    #[test]
    fn mobile_accepts_number_and_string_forms() {
        let from_number: UserDraft =
            serde_json::from_str(r#"{"mobile": 1234567890}"#).unwrap();
        let from_text: UserDraft =
            serde_json::from_str(r#"{"mobile": " 1234567890 "}"#).unwrap();

        assert_eq!(from_number.mobile.unwrap().to_text(), "1234567890");
        assert_eq!(from_text.mobile.unwrap().to_text(), "1234567890");
    }

    #[test]
    fn negative_and_fractional_numbers_keep_their_textual_form() {
        let negative: UserDraft = serde_json::from_str(r#"{"mobile": -1234567890}"#).unwrap();
        let fractional: UserDraft = serde_json::from_str(r#"{"mobile": 12345.5}"#).unwrap();

        assert_eq!(negative.mobile.unwrap().to_text(), "-1234567890");
        assert_eq!(fractional.mobile.unwrap().to_text(), "12345.5");
    }

    #[test]
    fn integral_floats_read_as_integer_digits() {
        let trailing_zero: UserDraft =
            serde_json::from_str(r#"{"mobile": 1234567890.0}"#).unwrap();
        let exponent: UserDraft = serde_json::from_str(r#"{"mobile": 1e10}"#).unwrap();
        let huge: UserDraft = serde_json::from_str(r#"{"mobile": 1e25}"#).unwrap();

        assert_eq!(trailing_zero.mobile.unwrap().to_text(), "1234567890");
        assert_eq!(exponent.mobile.unwrap().to_text(), "10000000000");
        let huge_text = huge.mobile.unwrap().to_text();
        assert!(!huge_text.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn draft_ignores_unknown_fields_and_defaults_missing_ones() {
        let draft: UserDraft = serde_json::from_str(
            r#"{"_id": "abc", "user": "ab", "createdAt": "2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(draft.user.as_deref(), Some("ab"));
        assert_eq!(draft.interest, None);
        assert_eq!(draft.age, None);
        assert_eq!(draft.mobile, None);
        assert_eq!(draft.email, None);
    }

    #[test]
    fn draft_rejects_wrong_json_types() {
        let result = serde_json::from_str::<UserDraft>(r#"{"age": "thirty"}"#);
        assert!(result.is_err());
        assert_eq!(MobileInput::from(42_u64).to_text(), "42");
    }
}
