use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Usernames nobody may register.
pub const RESERVED_USERNAMES: [&str; 3] = ["admin", "test", "owlist"];
pub const MIN_USERNAME_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Username must be at least {} characters", MIN_USERNAME_LEN)]
    UsernameTooShort,
    #[error("Username '{0}' is not available")]
    UsernameTaken(String),
    #[error("You must accept the terms and conditions")]
    TermsNotAccepted,
    #[error("This reset link is invalid or has expired")]
    MissingResetToken,
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(trimmed)
    }
}

fn email(value: &str) -> Result<&str, FormError> {
    let value = required(value, "Email")?;
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        });
    if valid {
        Ok(value)
    } else {
        Err(FormError::InvalidEmail(value.to_string()))
    }
}

/// Availability rule applied while the user types a username.
pub fn check_username(username: &str) -> Result<(), FormError> {
    let username = username.trim();
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(FormError::UsernameTooShort);
    }
    let lower = username.to_lowercase();
    if RESERVED_USERNAMES.contains(&lower.as_str()) {
        return Err(FormError::UsernameTaken(username.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: Option<String>,
    pub return_to: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormError> {
        email(&self.email)?;
        required(&self.password, "Password")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    /// Checkbox: present when ticked.
    #[serde(default)]
    pub accept_terms: Option<String>,
    pub return_to: Option<String>,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FormError> {
        let username = required(&self.username, "Username")?;
        check_username(username)?;
        email(&self.email)?;
        required(&self.password, "Password")?;
        required(&self.confirm_password, "Password confirmation")?;
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        if self.accept_terms.is_none() {
            return Err(FormError::TermsNotAccepted);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
    pub return_to: Option<String>,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<(), FormError> {
        email(&self.email).map(|_| ())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<(), FormError> {
        if self.token.trim().is_empty() {
            return Err(FormError::MissingResetToken);
        }
        required(&self.password, "Password")?;
        required(&self.confirm_password, "Password confirmation")?;
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn level(&self) -> u8 {
        match self {
            PasswordStrength::Weak => 1,
            PasswordStrength::Medium => 2,
            PasswordStrength::Strong => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Medium => "Medium",
            PasswordStrength::Strong => "Strong",
        }
    }
}

/// One point each for length ≥ 8, length ≥ 12, lowercase, uppercase, digit and symbol.
/// `None` for an empty password.
pub fn password_strength(password: &str) -> Option<PasswordStrength> {
    if password.is_empty() {
        return None;
    }
    let len = password.chars().count();
    let checks = [
        len >= 8,
        len >= 12,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let score = checks.iter().filter(|c| **c).count();
    Some(match score {
        0..=2 => PasswordStrength::Weak,
        3..=4 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupForm {
        SignupForm {
            username: "owlet".to_string(),
            email: "owlet@example.com".to_string(),
            password: "Sup3r-secret".to_string(),
            confirm_password: "Sup3r-secret".to_string(),
            accept_terms: Some("on".to_string()),
            return_to: None,
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert_eq!(signup().validate(), Ok(()));
    }

    #[test]
    fn signup_rejects_mismatched_passwords() {
        let form = SignupForm {
            confirm_password: "different".to_string(),
            ..signup()
        };
        assert_eq!(form.validate(), Err(FormError::PasswordMismatch));
        assert_eq!(FormError::PasswordMismatch.to_string(), "Passwords do not match");
    }

    #[test]
    fn signup_requires_terms_and_fields() {
        let form = SignupForm {
            accept_terms: None,
            ..signup()
        };
        assert_eq!(form.validate(), Err(FormError::TermsNotAccepted));
        let form = SignupForm {
            email: "  ".to_string(),
            ..signup()
        };
        assert_eq!(form.validate(), Err(FormError::Missing("Email")));
        let form = SignupForm {
            email: "not-an-email".to_string(),
            ..signup()
        };
        assert!(matches!(form.validate(), Err(FormError::InvalidEmail(_))));
    }

    #[test]
    fn reserved_and_short_usernames_are_unavailable() {
        assert_eq!(check_username("ow"), Err(FormError::UsernameTooShort));
        assert_eq!(
            check_username("Admin"),
            Err(FormError::UsernameTaken("Admin".to_string()))
        );
        assert_eq!(
            check_username("OWLIST").unwrap_err().to_string(),
            "Username 'OWLIST' is not available"
        );
        assert_eq!(check_username("owl"), Ok(()));
    }

    #[test]
    fn login_needs_email_and_password() {
        let form = LoginForm {
            email: "owl@example.com".to_string(),
            ..LoginForm::default()
        };
        assert_eq!(form.validate(), Err(FormError::Missing("Password")));
        let form = LoginForm {
            email: "owl@example.com".to_string(),
            password: "x".to_string(),
            ..LoginForm::default()
        };
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn reset_password_requires_token_and_matching_passwords() {
        let form = ResetPasswordForm {
            token: String::new(),
            password: "a".to_string(),
            confirm_password: "a".to_string(),
        };
        assert_eq!(form.validate(), Err(FormError::MissingResetToken));
        let form = ResetPasswordForm {
            token: "tok".to_string(),
            password: "a".to_string(),
            confirm_password: "b".to_string(),
        };
        assert_eq!(form.validate(), Err(FormError::PasswordMismatch));
    }

    #[test]
    fn password_strength_scores() {
        assert_eq!(password_strength(""), None);
        assert_eq!(password_strength("abc"), Some(PasswordStrength::Weak));
        assert_eq!(password_strength("abcdefgh"), Some(PasswordStrength::Weak));
        assert_eq!(password_strength("abcdefgH1"), Some(PasswordStrength::Medium));
        assert_eq!(password_strength("abcdefgH1!xy"), Some(PasswordStrength::Strong));
    }
}
