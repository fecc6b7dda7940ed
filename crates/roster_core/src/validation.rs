//! User validation rule set.
//!
//! # Responsibility
//! - Normalize a candidate `UserDraft` and check every field rule.
//! - Report all failing fields at once, keyed by field.
//!
//! # Invariants
//! - Every rule runs regardless of earlier failures.
//! - `ValidUser` can only be constructed by `validate_user`, so storage never
//!   sees an unchecked record.
//! - The email pattern is a deliberately loose `local@domain.tld` check and
//!   must stay byte-for-byte stable: client and server accept the same set.

use crate::model::user::{MobileInput, UserDraft};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const USERNAME_TOO_SHORT: &str = "Username must be at least 2 characters long";
pub const INTEREST_REQUIRED: &str = "At least one interest must be provided";
pub const AGE_REQUIRED: &str = "Age is required";
pub const AGE_TOO_LOW: &str = "Age must be at least 1";
pub const AGE_TOO_HIGH: &str = "Age must be less than 120";
pub const MOBILE_REQUIRED: &str = "Mobile number is required";
pub const MOBILE_INVALID: &str = "Mobile number must be between 10 and 15 digits";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";

pub const USERNAME_MIN_CHARS: usize = 2;
pub const AGE_MIN: i64 = 1;
pub const AGE_MAX: i64 = 120;

// `\w` is spelled out as ASCII so non-Latin letters are rejected.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$",
    )
    .expect("valid email regex")
});
static MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10,15}$").expect("valid mobile regex"));

/// Validated user field, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    User,
    Interest,
    Age,
    Mobile,
    Email,
}

impl UserField {
    pub const ALL: [UserField; 5] = [
        UserField::User,
        UserField::Interest,
        UserField::Age,
        UserField::Mobile,
        UserField::Email,
    ];

    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Interest => "interest",
            Self::Age => "age",
            Self::Mobile => "mobile",
            Self::Email => "email",
        }
    }
}

/// Field-to-message mapping. Any entry rejects the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<UserField, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: UserField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: UserField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Message of the first failing field in display order.
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {message}", field.as_str())?;
            first = false;
        }
        Ok(())
    }
}

impl Error for FieldErrors {}

/// User attributes that passed every rule, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUser {
    user: String,
    interest: Vec<String>,
    age: i64,
    mobile: String,
    email: String,
}

impl ValidUser {
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn interest(&self) -> &[String] {
        &self.interest
    }

    pub fn age(&self) -> i64 {
        self.age
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    /// Lower-cased email; the uniqueness key.
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Runs every field rule against `draft`.
///
/// Returns the normalized record when all rules pass, otherwise the complete
/// set of failing fields.
pub fn validate_user(draft: &UserDraft) -> Result<ValidUser, FieldErrors> {
    let mut errors = FieldErrors::default();

    let user = collect(&mut errors, UserField::User, check_user(draft.user.as_deref()));
    let interest = collect(
        &mut errors,
        UserField::Interest,
        check_interest(draft.interest.as_deref()),
    );
    let age = collect(&mut errors, UserField::Age, check_age(draft.age));
    let mobile = collect(
        &mut errors,
        UserField::Mobile,
        check_mobile(draft.mobile.as_ref()),
    );
    let email = collect(&mut errors, UserField::Email, check_email(draft.email.as_deref()));

    match (user, interest, age, mobile, email) {
        (Some(user), Some(interest), Some(age), Some(mobile), Some(email)) => Ok(ValidUser {
            user,
            interest,
            age,
            mobile,
            email,
        }),
        _ => Err(errors),
    }
}

/// Returns whether `value` matches the simplified email pattern.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Returns whether `value` is 10 to 15 ASCII digits.
pub fn is_valid_mobile(value: &str) -> bool {
    MOBILE_RE.is_match(value)
}

/// Trims interests and drops the empty ones, keeping order.
pub fn normalize_interests(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn collect<T>(
    errors: &mut FieldErrors,
    field: UserField,
    result: Result<T, &'static str>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.insert(field, message);
            None
        }
    }
}

fn check_user(value: Option<&str>) -> Result<String, &'static str> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(USERNAME_REQUIRED);
    }
    if trimmed.chars().count() < USERNAME_MIN_CHARS {
        return Err(USERNAME_TOO_SHORT);
    }
    Ok(trimmed.to_string())
}

fn check_interest(value: Option<&[String]>) -> Result<Vec<String>, &'static str> {
    let interests = normalize_interests(value.unwrap_or_default());
    if interests.is_empty() {
        return Err(INTEREST_REQUIRED);
    }
    Ok(interests)
}

fn check_age(value: Option<i64>) -> Result<i64, &'static str> {
    match value {
        None => Err(AGE_REQUIRED),
        Some(age) if age < AGE_MIN => Err(AGE_TOO_LOW),
        Some(age) if age > AGE_MAX => Err(AGE_TOO_HIGH),
        Some(age) => Ok(age),
    }
}

fn check_mobile(value: Option<&MobileInput>) -> Result<String, &'static str> {
    let text = value.map(MobileInput::to_text).unwrap_or_default();
    if text.is_empty() {
        return Err(MOBILE_REQUIRED);
    }
    if !is_valid_mobile(&text) {
        return Err(MOBILE_INVALID);
    }
    Ok(text)
}

fn check_email(value: Option<&str>) -> Result<String, &'static str> {
    let normalized = value.map(str::trim).unwrap_or_default().to_lowercase();
    if normalized.is_empty() {
        return Err(EMAIL_REQUIRED);
    }
    if !is_valid_email(&normalized) {
        return Err(EMAIL_INVALID);
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> UserDraft {
        UserDraft {
            user: Some("ab".to_string()),
            interest: Some(vec!["x".to_string()]),
            age: Some(30),
            mobile: Some(MobileInput::from("1234567890")),
            email: Some("a@b.com".to_string()),
        }
    }

    #[test]
    fn valid_draft_passes_and_is_normalized() {
        let mut draft = valid_draft();
        draft.user = Some("  ab  ".to_string());
        draft.interest = Some(vec![" x ".to_string(), String::new(), "  ".to_string()]);
        draft.email = Some(" A@B.Com ".to_string());

        let valid = validate_user(&draft).unwrap();
        assert_eq!(valid.user(), "ab");
        assert_eq!(valid.interest(), ["x".to_string()]);
        assert_eq!(valid.age(), 30);
        assert_eq!(valid.mobile(), "1234567890");
        assert_eq!(valid.email(), "a@b.com");
    }

    #[test]
    fn empty_draft_reports_every_field() {
        let errors = validate_user(&UserDraft::default()).unwrap_err();

        assert_eq!(errors.len(), UserField::ALL.len());
        assert_eq!(errors.get(UserField::User), Some(USERNAME_REQUIRED));
        assert_eq!(errors.get(UserField::Interest), Some(INTEREST_REQUIRED));
        assert_eq!(errors.get(UserField::Age), Some(AGE_REQUIRED));
        assert_eq!(errors.get(UserField::Mobile), Some(MOBILE_REQUIRED));
        assert_eq!(errors.get(UserField::Email), Some(EMAIL_REQUIRED));
        assert_eq!(errors.first_message(), Some(USERNAME_REQUIRED));
    }

    #[test]
    fn username_length_boundary() {
        let mut draft = valid_draft();
        draft.user = Some("a".to_string());
        let errors = validate_user(&draft).unwrap_err();
        assert_eq!(errors.get(UserField::User), Some(USERNAME_TOO_SHORT));
        assert_eq!(errors.len(), 1);

        draft.user = Some("ab".to_string());
        assert!(validate_user(&draft).is_ok());
    }

    #[test]
    fn username_counts_characters_not_bytes() {
        let mut draft = valid_draft();
        draft.user = Some("é".to_string());
        assert!(validate_user(&draft).is_err());

        draft.user = Some("éé".to_string());
        assert!(validate_user(&draft).is_ok());
    }

    #[test]
    fn interests_of_only_blank_entries_fail() {
        let mut draft = valid_draft();
        draft.interest = Some(vec![String::new(), " ".to_string()]);
        let errors = validate_user(&draft).unwrap_err();
        assert_eq!(errors.get(UserField::Interest), Some(INTEREST_REQUIRED));

        draft.interest = Some(Vec::new());
        assert!(validate_user(&draft).is_err());
    }

    #[test]
    fn age_boundaries() {
        for (age, expected) in [
            (0, Some(AGE_TOO_LOW)),
            (-5, Some(AGE_TOO_LOW)),
            (1, None),
            (120, None),
            (121, Some(AGE_TOO_HIGH)),
        ] {
            let mut draft = valid_draft();
            draft.age = Some(age);
            let outcome = validate_user(&draft).err();
            assert_eq!(
                outcome.as_ref().and_then(|errors| errors.get(UserField::Age)),
                expected,
                "age {age}"
            );
        }
    }

    #[test]
    fn mobile_digit_length_boundaries() {
        for (mobile, ok) in [
            ("123456789", false),
            ("1234567890", true),
            ("123456789012345", true),
            ("1234567890123456", false),
            ("12345abcde", false),
            ("+1234567890", false),
        ] {
            assert_eq!(is_valid_mobile(mobile), ok, "mobile {mobile}");
        }
    }

    #[test]
    fn mobile_number_input_is_checked_by_textual_length() {
        let mut draft = valid_draft();
        draft.mobile = Some(MobileInput::from(123_456_789_u64));
        let errors = validate_user(&draft).unwrap_err();
        assert_eq!(errors.get(UserField::Mobile), Some(MOBILE_INVALID));

        draft.mobile = Some(MobileInput::from(1_234_567_890_u64));
        assert_eq!(validate_user(&draft).unwrap().mobile(), "1234567890");
    }

    #[test]
    fn email_pattern_samples() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@mail-host.example.org"));
        assert!(is_valid_email("user_1@b.io"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a@b.info"));
        assert!(!is_valid_email("a..b@c.com"));
        assert!(!is_valid_email("a+tag@b.com"));
        assert!(!is_valid_email("ü@b.com"));
    }

    #[test]
    fn field_errors_serialize_as_wire_keyed_map() {
        let mut errors = FieldErrors::default();
        errors.insert(UserField::Email, EMAIL_INVALID);
        errors.insert(UserField::Age, AGE_TOO_HIGH);

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["email"], EMAIL_INVALID);
        assert_eq!(json["age"], AGE_TOO_HIGH);
        assert_eq!(errors.first_message(), Some(AGE_TOO_HIGH));
        assert_eq!(
            errors.to_string(),
            format!("age: {AGE_TOO_HIGH}; email: {EMAIL_INVALID}")
        );
    }
}
