//! Structured-field validation for submitted payloads.
//!
//! A rule applies to exactly one field of the payload's nested `Candidate`
//! object: either an enumerated set of acceptable values, or a named format.
//! Validation fails fast — the first violated rule is returned and the caller
//! propagates it straight to the response boundary.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ApiError;

/// Digit-grouping check only, unanchored: `2024-13-40` passes, `2024-1-15`
/// does not. Calendar validity is not this layer's concern.
static DATE_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("static pattern"));

/// A named format a field value must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
  /// Calendar date, `YYYY-MM-DD` digit grouping.
  Date,
}

/// What counts as acceptable for one field.
#[derive(Debug, Clone, Copy)]
pub enum ValidationRule {
  /// The value must be a member of this set.
  OneOf(&'static [&'static str]),
  /// The value must match the named format.
  Format(FieldFormat),
}

/// Validate one field of the payload's nested `Candidate` object.
///
/// Non-string values fail their rule rather than panicking or passing: a
/// numeric gender is not a permitted value, a numeric date is not a valid
/// date.
pub fn verify_field(
  payload: &Value,
  field: &str,
  rule: ValidationRule,
) -> Result<(), ApiError> {
  let value = payload
    .get("Candidate")
    .and_then(|c| c.get(field))
    .ok_or(ApiError::MissingField)?;

  match rule {
    ValidationRule::OneOf(allowed) => {
      let s = value.as_str().unwrap_or_default();
      if !allowed.contains(&s) {
        return Err(ApiError::DisallowedValue);
      }
    }
    ValidationRule::Format(FieldFormat::Date) => {
      let s = value.as_str().unwrap_or_default();
      if !DATE_PATTERN.is_match(s) {
        return Err(ApiError::InvalidFormat);
      }
    }
  }
  Ok(())
}
