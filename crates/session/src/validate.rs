// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checks run before anything is sent to the backend.

use crate::error::ClientError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MFA_CODE_LEN: usize = 6;

fn invalid(message: &str) -> ClientError {
    ClientError::Validation(message.to_owned())
}

pub fn credentials(username: &str, password: &str) -> Result<(), ClientError> {
    if username.trim().is_empty() {
        return Err(invalid("username is required"));
    }
    if password.is_empty() {
        return Err(invalid("password is required"));
    }
    Ok(())
}

pub fn password(password: &str) -> Result<(), ClientError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// A new password plus its confirmation.
pub fn new_password(password_value: &str, confirmation: &str) -> Result<(), ClientError> {
    password(password_value)?;
    if password_value != confirmation {
        return Err(invalid("passwords do not match"));
    }
    Ok(())
}

pub fn email(email: &str) -> Result<(), ClientError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(invalid("a valid email address is required")),
    }
}

pub fn reset_token(token: &str) -> Result<(), ClientError> {
    if token.trim().is_empty() {
        return Err(invalid("reset token is required"));
    }
    Ok(())
}

pub fn mfa_code(code: &str) -> Result<(), ClientError> {
    if code.len() != MFA_CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::Validation(format!(
            "verification code must be {MFA_CODE_LEN} digits"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
