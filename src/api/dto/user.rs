//! DTOs for the user registration endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{Describe, FieldMeta};

/// Request to register a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 2, max = 32))]
    pub name: String,

    #[serde(default)]
    #[validate(email)]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_phone"))]
    pub phone: String,

    /// Optional age in years.
    #[validate(range(min = 1, max = 150))]
    pub age: Option<u8>,
}

impl Describe for CreateUserRequest {
    fn fields() -> &'static [FieldMeta] {
        const FIELDS: &[FieldMeta] = &[
            FieldMeta::new("name").label("姓名").wire("name"),
            FieldMeta::new("email").label("邮箱地址").wire("email"),
            FieldMeta::new("phone").label("手机号码").wire("phone"),
            FieldMeta::new("age").label("年龄").wire("age,omitempty"),
        ];
        FIELDS
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

