use email_address::EmailAddress;
use serde::Deserialize;

use super::AuthError;

/// Email/password sign-in request.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    /// Returns the trimmed email once the form is usable.
    pub fn validate(&self) -> Result<&str, AuthError> {
        let email = validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(email)
    }
}

/// Account creation request. `display_name` is applied after the account exists.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<&str, AuthError> {
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        validate_email(&self.email)
    }

    /// The display name to set, if one was given.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

fn validate_email(raw: &str) -> Result<&str, AuthError> {
    let email = raw.trim();
    if email.is_empty() || !EmailAddress::is_valid(email) {
        return Err(AuthError::InvalidEmail);
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_form(password: &str, confirm: &str) -> SignUpForm {
        SignUpForm {
            email: " jane@example.com ".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            display_name: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_password_mismatch_rejected_before_anything_else() {
        let mut form = make_form("secret1", "secret2");
        form.email = "not-an-email".to_string();
        assert_eq!(form.validate().unwrap_err(), AuthError::PasswordMismatch);
        assert_eq!(AuthError::PasswordMismatch.to_string(), "Passwords do not match");
    }

    #[test]
    fn test_valid_form_returns_trimmed_email() {
        let form = make_form("secret1", "secret1");
        assert_eq!(form.validate().unwrap(), "jane@example.com");
        assert_eq!(form.display_name(), None);
    }

    #[test]
    fn test_invalid_email() {
        let mut form = make_form("secret1", "secret1");
        form.email = "jane@".to_string();
        assert_eq!(form.validate().unwrap_err(), AuthError::InvalidEmail);
    }

    #[test]
    fn test_sign_in_form() {
        let form = SignInForm {
            email: "a@b.co".to_string(),
            password: String::new(),
        };
        assert_eq!(form.validate().unwrap_err(), AuthError::InvalidCredentials);
    }
}
