// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password rules for dashboard accounts.

use thiserror::Error;

/// Password policy errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    #[error(
        "Password must mix at least {required} character classes (uppercase, lowercase, digit, symbol); found {found}"
    )]
    InsufficientComplexity { required: usize, found: usize },

    /// The password equals, or is built around, an identifying field.
    #[error("Password must not contain the account's {field}")]
    ContainsAccountDetail { field: &'static str },

    #[error("Password and confirmation do not match")]
    ConfirmationMismatch,
}

/// Password policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum password length, in characters.
    pub min_length: usize,
    /// Minimum number of character classes required (out of 4).
    pub min_complexity: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 12,
            min_complexity: 3,
        }
    }
}

impl PasswordPolicy {
    /// Validates a new account password.
    ///
    /// The password may not contain the account email, the part of the
    /// email before `@` or the full name, compared case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns the first rule the password breaks.
    pub fn validate(
        &self,
        password: &str,
        confirmation: &str,
        email: &str,
        full_name: &str,
    ) -> Result<(), PasswordPolicyError> {
        if password != confirmation {
            return Err(PasswordPolicyError::ConfirmationMismatch);
        }

        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        let found: usize = character_classes(password);
        if found < self.min_complexity {
            return Err(PasswordPolicyError::InsufficientComplexity {
                required: self.min_complexity,
                found,
            });
        }

        let lowered: String = password.to_lowercase();
        let email: String = email.trim().to_lowercase();
        let mailbox: &str = email.split('@').next().unwrap_or_default();
        let forbidden: [(&'static str, String); 3] = [
            ("email", email.clone()),
            ("email", mailbox.to_string()),
            ("full name", full_name.trim().to_lowercase()),
        ];

        for (field, value) in forbidden {
            if !value.is_empty() && lowered.contains(&value) {
                return Err(PasswordPolicyError::ContainsAccountDetail { field });
            }
        }

        Ok(())
    }
}

/// Counts the classes present among uppercase, lowercase, digit and symbol.
pub(crate) fn character_classes(password: &str) -> usize {
    let checks: [fn(&char) -> bool; 4] = [
        char::is_ascii_uppercase,
        char::is_ascii_lowercase,
        char::is_ascii_digit,
        |c: &char| !c.is_alphanumeric() && !c.is_whitespace(),
    ];

    checks
        .iter()
        .filter(|check| password.chars().any(|c| check(&c)))
        .count()
}
