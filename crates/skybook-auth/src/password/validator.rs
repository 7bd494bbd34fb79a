//! Password policy enforcement for new passwords.

use skybook_core::config::auth::PasswordPolicyConfig;
use skybook_core::error::AppError;
use zxcvbn::Score;

/// Common passwords rejected by substring match, case-insensitively.
const BUILTIN_BLOCKLIST: &[&str] = &[
    "password", "12345678", "qwerty", "admin", "letmein", "welcome", "abc123", "111111",
    "football", "iloveyou", "sunshine",
];

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    min_score: Option<Score>,
    blocklist: Vec<String>,
}

impl PasswordPolicy {
    /// Creates a new policy from configuration.
    pub fn new(config: &PasswordPolicyConfig) -> Self {
        let mut blocklist: Vec<String> = BUILTIN_BLOCKLIST.iter().map(|s| s.to_string()).collect();
        blocklist.extend(
            config
                .blocklist
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        );
        blocklist.sort();
        blocklist.dedup();

        Self {
            min_length: config.min_length,
            min_score: required_score(config.min_strength_score),
            blocklist,
        }
    }

    /// Validates a password against all configured policies.
    ///
    /// Returns `Ok(())` if the password meets all requirements,
    /// or a policy violation describing the first failure found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::policy_violation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if password.chars().any(char::is_whitespace) {
            return Err(AppError::policy_violation(
                "Password must not contain whitespace",
            ));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::policy_violation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AppError::policy_violation(
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::policy_violation(
                "Password must contain at least one digit",
            ));
        }

        if !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(AppError::policy_violation(
                "Password must contain at least one special character",
            ));
        }

        let lowered = password.to_lowercase();
        if self.blocklist.iter().any(|entry| lowered.contains(entry.as_str())) {
            return Err(AppError::policy_violation(
                "Password contains a commonly used password",
            ));
        }

        if let Some(min_score) = self.min_score {
            let estimate = zxcvbn::zxcvbn(password, &[]);
            if estimate.score() < min_score {
                return Err(AppError::policy_violation(
                    "Password is too weak. Please use a stronger password with more entropy.",
                ));
            }
        }

        Ok(())
    }
}

fn required_score(configured: u8) -> Option<Score> {
    match configured {
        0 => None,
        1 => Some(Score::One),
        2 => Some(Score::Two),
        3 => Some(Score::Three),
        _ => Some(Score::Four),
    }
}
