use crate::models::auth::{EMAIL_REGEX, USERNAME_REGEX, validate_password_strength};
use crate::models::ids::{PoiId, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "username")]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "nullable_ids")]
    pub favorites: Vec<PoiId>,
    #[serde(default, deserialize_with = "nullable_ids")]
    pub visited: Vec<PoiId>,
}

impl Profile {
    /// The stored location, ignoring blank strings.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("Explorer")
    }

    /// Applies the fields of a successful partial update the server did not echo back.
    pub fn patch(&mut self, update: &ProfileUpdate) {
        if let Some(location) = &update.location {
            self.location = Some(location.clone());
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(user_name) = &update.user_name {
            self.user_name = user_name.clone();
        }
    }
}

fn nullable_ids<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Vec<PoiId>, D::Error> {
    Ok(Option::<Vec<PoiId>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `PUT /api/myProfile`. Only the set fields are sent.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ProfileUpdate {
    pub fn location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_name.is_none() && self.email.is_none() && self.password.is_none() && self.location.is_none()
    }
}

/// Edit-user form. Blank fields mean "leave unchanged".
#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct ProfileUpdateForm {
    #[validate(regex(path = *USERNAME_REGEX, message = "Username must be 4-16 characters, only letters, numbers and underscore."))]
    pub user_name: Option<String>,
    #[validate(length(max = 30, message = "Please enter a valid email (max. 30 characters)."))]
    #[validate(regex(path = *EMAIL_REGEX, message = "Please enter a valid email (max. 30 characters)."))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 16, message = "Password must be between 8 and 16 characters."))]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: Option<String>,
    #[validate(length(max = 30, message = "Location must be max 30 characters."))]
    pub location: Option<String>,
}

impl ProfileUpdateForm {
    /// Drops blank and unchanged fields so validation only sees what the user edited.
    pub fn normalized(&self, current: &Profile) -> Self {
        let changed = |value: &Option<String>, existing: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty() && *v != existing)
                .map(str::to_string)
        };

        Self {
            user_name: changed(&self.user_name, &current.user_name),
            email: changed(&self.email, &current.email),
            password: self.password.clone().filter(|p| !p.is_empty()),
            location: changed(&self.location, current.location().unwrap_or_default()),
        }
    }

    pub fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            user_name: self.user_name,
            email: self.email,
            password: self.password,
            location: self.location,
        }
    }
}
