use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use validator::{Validate, ValidationError, ValidationErrors};

pub const PASSWORD_SPECIAL_CHARACTERS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

pub static PERSON_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-zÁÉÍÓÚáéíóúÑñÜü\s'-]{1,30}$").expect("person name regex is valid"));
pub static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{4,16}$").expect("username regex is valid"));
pub static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid"));

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// At least one uppercase letter, one special character and one lowercase letter or digit.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(c));
    let has_lower_or_digit = password.chars().any(|c| c.is_ascii_lowercase() || c.is_ascii_digit());

    if has_upper && has_special && has_lower_or_digit {
        Ok(())
    } else {
        Err(error(
            "password_strength",
            "Password must be at least 8 characters long, contain at least 1 uppercase letter, 1 special character and 1 lowercase letter or digit.",
        ))
    }
}

fn validate_registration_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(error("required", "Password is required."));
    }
    validate_password_strength(password)?;
    let length = password.chars().count();
    if !(8..=16).contains(&length) {
        return Err(error("length", "Password must be between 8 and 16 characters."));
    }
    Ok(())
}

fn validate_first_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "First name is required."));
    }
    if !PERSON_NAME_REGEX.is_match(value) {
        return Err(error(
            "format",
            "First name can contain only letters, spaces, hyphens or apostrophes (max 30 characters).",
        ));
    }
    Ok(())
}

fn validate_last_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "Last name is required."));
    }
    if !PERSON_NAME_REGEX.is_match(value) {
        return Err(error(
            "format",
            "Last name can contain only letters, spaces, hyphens or apostrophes (max 30 characters).",
        ));
    }
    Ok(())
}

fn validate_user_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "Username is required."));
    }
    if !USERNAME_REGEX.is_match(value) {
        return Err(error("format", "Username must be 4-16 characters, only letters, numbers and underscore."));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "Email is required."));
    }
    if !EMAIL_REGEX.is_match(value) || value.chars().count() > 30 {
        return Err(error("format", "Please enter a valid email (max. 30 characters)."));
    }
    Ok(())
}

fn validate_confirmation(form: &RegisterForm) -> Result<(), ValidationError> {
    if form.confirm_password.is_empty() {
        return Err(error("required", "Confirm password is required."));
    }
    if form.password != form.confirm_password {
        return Err(error("must_match", "Password and Confirm Password do not match."));
    }
    Ok(())
}

#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(length(min = 4, max = 30, message = "Email must be between 4 and 30 characters."))]
    pub credential: String,
    #[validate(length(min = 8, max = 16, message = "Password must be between 8 and 16 characters."))]
    pub password: String,
}

impl LoginForm {
    pub fn new(credential: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            password: password.into(),
        }
    }

    pub fn to_request(&self) -> LoginRequest {
        LoginRequest {
            email: self.credential.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, Validate)]
#[validate(schema(function = "validate_confirmation", skip_on_field_errors = false))]
pub struct RegisterForm {
    #[validate(custom(function = "validate_first_name"))]
    pub first_name: String,
    #[validate(custom(function = "validate_last_name"))]
    pub last_name: String,
    #[validate(custom(function = "validate_user_name"))]
    pub user_name: String,
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(custom(function = "validate_registration_password"))]
    pub password: String,
    pub confirm_password: String,
    #[validate(required(message = "Date of birth is required."))]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 30, message = "Location must be max 30 characters."))]
    pub location: Option<String>,
    pub role: Option<String>,
}

impl RegisterForm {
    pub fn to_payload(&self) -> RegistrationPayload {
        let non_blank = |value: &Option<String>| value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

        RegistrationPayload {
            name: format!("{} {}", self.first_name.trim(), self.last_name.trim()),
            user_name: self.user_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            birth_date: self.date_of_birth.map(|d| d.format("%m/%d/%Y").to_string()).unwrap_or_default(),
            location: non_blank(&self.location),
            role: non_blank(&self.role),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPayload {
    pub name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    /// MM/DD/YYYY
    pub birth_date: String,
    pub location: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageResponse {
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
}

/// Per-field messages for inline display; the first error of each field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        for (field, field_errors) in errors.field_errors() {
            if let Some(first) = field_errors.first() {
                let message = first.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| first.code.to_string());
                // Schema-level errors only come from the password confirmation check.
                let field = if field == "__all__" { "confirm_password".to_string() } else { field.to_string() };
                fields.entry(field).or_insert(message);
            }
        }
        Self(fields)
    }
}
