//! Request data transfer objects.
//!
//! Required text fields default to empty so a missing key produces the same
//! "field is required" message as a blank one, rather than a JSON error.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize};
use validator::{Validate, ValidationError};

/// JSON body that is deserialized and then validated.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

fn valid_date(value: &str) -> Result<(), ValidationError> {
    match inkwell_domain::parse_date(value) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("date");
            err.message = Some("The date of birth is not a valid date.".into());
            Err(err)
        }
    }
}

fn positive_ids(ids: &[i64]) -> Result<(), ValidationError> {
    if ids.iter().all(|id| *id > 0) {
        Ok(())
    } else {
        let mut err = ValidationError::new("ids");
        err.message = Some("The selected category is invalid.".into());
        Err(err)
    }
}

/// Date of birth after validation. Callers only use this on validated input.
pub fn birth_date(value: &str) -> Option<NaiveDate> {
    inkwell_domain::parse_date(value)
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The name field is required and may not exceed 100 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: String,
    #[serde(default)]
    #[validate(must_match(other = "password", message = "The password confirmation does not match."))]
    pub password_confirmation: String,
    #[serde(default, alias = "mobileNumber")]
    #[validate(length(min = 1, message = "The mobile number field is required."))]
    pub mobile_number: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The address field is required and may not exceed 100 characters."))]
    pub address: String,
    #[serde(default, alias = "dateOfBirth")]
    #[validate(custom(function = "valid_date"))]
    pub date_of_birth: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "The current password field is required."))]
    pub current_password: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "The new password must be at least 8 characters."))]
    pub new_password: String,
    #[serde(default)]
    #[validate(must_match(other = "new_password", message = "The new password confirmation does not match."))]
    pub new_password_confirmation: String,
}

/// Body of `assign-role` and `remove-role`.
#[derive(Debug, Deserialize, Validate)]
pub struct RoleAssignmentRequest {
    #[validate(range(min = 1, message = "The selected user id is invalid."))]
    pub user_id: i64,
    #[serde(default)]
    #[validate(length(min = 1, message = "The role field is required."))]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckPermissionRequest {
    #[validate(range(min = 1, message = "The selected user id is invalid."))]
    pub user_id: i64,
    #[serde(default)]
    #[validate(length(min = 1, message = "The permission field is required."))]
    pub permission: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The name field is required and may not exceed 100 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    #[serde(default, alias = "mobileNumber")]
    #[validate(length(min = 1, message = "The mobile number field is required."))]
    pub mobile_number: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The address field is required and may not exceed 100 characters."))]
    pub address: String,
    #[serde(default, alias = "dateOfBirth")]
    #[validate(custom(function = "valid_date"))]
    pub date_of_birth: String,
    /// Falls back to the configured import password when absent.
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The name field is required and may not exceed 100 characters."))]
    pub name: String,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: Option<String>,
    #[serde(default, alias = "mobileNumber")]
    #[validate(length(min = 1, message = "The mobile number field is required."))]
    pub mobile_number: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The address field is required and may not exceed 100 characters."))]
    pub address: String,
    #[serde(default, alias = "dateOfBirth")]
    #[validate(custom(function = "valid_date"))]
    pub date_of_birth: String,
}

/// Body of post create and update.
#[derive(Debug, Deserialize, Validate)]
pub struct PostRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The title field is required and may not exceed 255 characters."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The body field is required."))]
    pub body: String,
    /// New owner. Only honoured on update.
    #[validate(range(min = 1, message = "The selected user id is invalid."))]
    pub user_id: Option<i64>,
    #[validate(custom(function = "positive_ids"))]
    pub category_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryIdsRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "The category ids field is required."),
        custom(function = "positive_ids")
    )]
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The name field is required and may not exceed 100 characters."))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(json: serde_json::Value) -> RegisterRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_register_accepts_camel_case_aliases() {
        let request = register(serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "correct horse",
            "password_confirmation": "correct horse",
            "mobileNumber": "0771234567",
            "address": "1 Loop Rd",
            "dateOfBirth": "1990-01-15",
        }));
        assert!(request.validate().is_ok());
        assert_eq!(request.mobile_number, "0771234567");
    }

    #[test]
    fn test_register_reports_each_bad_field() {
        let request = register(serde_json::json!({
            "email": "not-an-email",
            "password": "short",
            "password_confirmation": "other",
            "date_of_birth": "yesterday",
        }));
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["name", "email", "password", "password_confirmation", "mobile_number", "address", "date_of_birth"] {
            assert!(fields.keys().any(|k| k.to_string() == field), "missing {field}");
        }
    }

    #[test]
    fn test_validation_errors_become_field_map() {
        let request = CategoryRequest { name: String::new() };
        let err: ApiError = request.validate().unwrap_err().into();
        match err {
            ApiError::Validation(fields) => assert_eq!(
                fields["name"],
                vec!["The name field is required and may not exceed 100 characters.".to_string()]
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_category_ids_must_be_positive() {
        let request = CategoryIdsRequest { category_ids: vec![1, 0] };
        assert!(request.validate().is_err());
        let empty = CategoryIdsRequest { category_ids: vec![] };
        assert!(empty.validate().is_err());
    }
}
