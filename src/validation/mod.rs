//! Localized struct validation.
//!
//! Rules are declared with `validator`'s derive. The [`ValidationEngine`]
//! runs them and turns every failure into a sentence in the configured
//! [`Locale`], naming fields by their declared display names:
//!
//! ```rust,ignore
//! #[derive(Deserialize, Validate)]
//! struct SignUp {
//!     #[validate(custom(function = "apikit::validation::validate_phone"))]
//!     phone: String,
//! }
//!
//! impl Describe for SignUp {
//!     fn fields() -> &'static [FieldMeta] {
//!         const FIELDS: &[FieldMeta] = &[FieldMeta::new("phone").label("手机号码")];
//!         FIELDS
//!     }
//! }
//!
//! let engine = ValidationEngine::builder(Locale::Zh).build();
//! let err = engine.check_struct(&SignUp { phone: "12345".into() }).unwrap_err();
//! assert_eq!(err.to_string(), "手机号码必须是一个有效的手机号码");
//! ```

mod engine;
mod field_names;
mod locale;
mod translator;

pub use engine::{ValidationCell, ValidationEngine, ValidationEngineBuilder};
pub use field_names::{Describe, FieldMeta, FieldNames, NameSource};
pub use locale::Locale;
pub use translator::Translator;

use axum::http::StatusCode;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;
use validator::ValidationError;

use crate::error::ApiError;

/// Code reported by [`validate_phone`].
pub const PHONE_RULE: &str = "phone";

/// Mainland China mobile number.
static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^1[3-9][0-9]{9}$").unwrap());

/// Custom `validator` function for mobile phone numbers.
///
/// # Errors
///
/// Returns a [`PHONE_RULE`] error if `value` is not an 11-digit number
/// starting with `13`–`19`.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(PHONE_RULE))
    }
}

/// A custom rule code with its message templates.
///
/// The check itself is a `#[validate(custom(...))]` function returning
/// `ValidationError::new(code)`; registering the rule teaches the engine how
/// to phrase its failures.
#[derive(Debug, Clone)]
pub struct CustomRule {
    code: Cow<'static, str>,
    messages: HashMap<Locale, Cow<'static, str>>,
}

impl CustomRule {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code: code.into(),
            messages: HashMap::new(),
        }
    }

    /// Sets the template used in `locale`. `{field}` is the display name.
    pub fn message(mut self, locale: Locale, template: impl Into<Cow<'static, str>>) -> Self {
        self.messages.insert(locale, template.into());
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Template for `locale`, falling back to any other configured one.
    fn template(&self, locale: Locale) -> Option<&Cow<'static, str>> {
        self.messages.get(&locale).or_else(|| {
            [Locale::En, Locale::Zh]
                .iter()
                .find_map(|other| self.messages.get(other))
        })
    }

    pub(crate) fn phone() -> Self {
        Self::new(PHONE_RULE)
            .message(Locale::Zh, "{field}必须是一个有效的手机号码")
            .message(Locale::En, "{field} must be a valid phone number")
    }
}

/// Failure of [`ValidationEngine::check_struct`] or [`ValidationEngine::check_value`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The input is not something the engine can validate.
    #[error("invalid input: expected a struct")]
    InvalidInput,

    /// Translated field failures joined with `;`.
    #[error("{0}")]
    Fields(String),
}

impl From<CheckError> for ApiError {
    fn from(err: CheckError) -> Self {
        ApiError::from_status(StatusCode::BAD_REQUEST, err.to_string())
    }
}
