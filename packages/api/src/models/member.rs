//! Member payloads: login, signup and profile lookups.

use serde::{Deserialize, Serialize};
use store::Identity;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_NAME_LEN: usize = 2;

/// Email and password sent to `POST /members/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err("Password is required".to_string());
        }
        Ok(())
    }
}

/// Successful login body: `{token, id, email, name}`.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl LoginResponse {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.name.clone(), self.email.clone())
    }
}

/// Sign-up form, including the confirmation field that never leaves the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
}

/// Body of `POST /members/signup`.
#[derive(Debug, Serialize)]
pub(crate) struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

impl SignupForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match".to_string());
        }
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(format!("Name must be at least {MIN_NAME_LEN} characters"));
        }
        Ok(())
    }

    pub(crate) fn request(&self) -> SignupRequest<'_> {
        SignupRequest {
            email: self.email.trim(),
            password: &self.password,
            name: self.name.trim(),
        }
    }
}

/// `GET /members/{id}` body.
#[derive(Clone, Debug, Deserialize)]
pub struct MemberProfile {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    pub name: String,
}

fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("Invalid email address".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("a@b.com", "secret1").validate().is_ok());
        assert!(Credentials::new("", "secret1").validate().is_err());
        assert!(Credentials::new("not-an-email", "x").validate().is_err());
        assert!(Credentials::new("a@b.com", "").validate().is_err());
    }

    #[test]
    fn test_signup_rules() {
        let ok = SignupForm::new("a@b.com", "longenough", "longenough", "Kim");
        assert!(ok.validate().is_ok());

        let short = SignupForm::new("a@b.com", "short", "short", "Kim");
        assert!(short.validate().unwrap_err().contains("at least 8"));

        let mismatch = SignupForm::new("a@b.com", "longenough", "different1", "Kim");
        assert_eq!(mismatch.validate().unwrap_err(), "Passwords do not match");

        let tiny_name = SignupForm::new("a@b.com", "longenough", "longenough", "K");
        assert!(tiny_name.validate().is_err());
    }

    #[test]
    fn test_signup_request_omits_confirmation() {
        let form = SignupForm::new(" a@b.com ", "longenough", "longenough", " Kim ");
        let value = serde_json::to_value(form.request()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"email": "a@b.com", "password": "longenough", "name": "Kim"})
        );
    }

    #[test]
    fn test_login_response_identity() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"token":"jwt","id":12,"email":"a@b.com","name":"Alice"}"#,
        )
        .unwrap();
        assert_eq!(response.identity(), Identity::new(12, "Alice", "a@b.com"));
    }
}
