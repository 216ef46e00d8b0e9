//! Input checks for account linking.
//!
//! Run before anything is persisted; a failure leaves the identity
//! untouched.

use super::profile::LinkedAccount;
use crate::error::{IdentityError, Result};

pub const MAX_DISPLAY_NAME_CHARS: usize = 50;
pub const MAX_USERNAME_CHARS: usize = 15;
pub const MAX_ACCOUNT_ID_CHARS: usize = 64;
pub const MAX_URL_LEN: usize = 2048;

/// Characters rejected in any free-text field (HTML-significant).
const FORBIDDEN_CHARS: &[char] = &['<', '>', '"', '\'', '&'];

fn check_free_text(field: &'static str, value: &str) -> Result<()> {
    if value.chars().any(|c| FORBIDDEN_CHARS.contains(&c)) {
        return Err(IdentityError::validation(field, "contains invalid characters"));
    }
    if value.chars().any(char::is_control) {
        return Err(IdentityError::validation(field, "contains control characters"));
    }
    Ok(())
}

pub fn display_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(IdentityError::validation("displayName", "must not be empty"));
    }
    if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(IdentityError::validation(
            "displayName",
            format!("must be {} characters or less", MAX_DISPLAY_NAME_CHARS),
        ));
    }
    check_free_text("displayName", name)?;
    Ok(name.to_string())
}

/// Absolute http(s) URL or a site-relative path.
pub fn profile_image_url(raw: &str) -> Result<String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(IdentityError::validation("profileImageUrl", "must not be empty"));
    }
    if url.len() > MAX_URL_LEN {
        return Err(IdentityError::validation("profileImageUrl", "is too long"));
    }
    let allowed_scheme = url.starts_with("https://")
        || url.starts_with("http://")
        || (url.starts_with('/') && !url.starts_with("//"));
    if !allowed_scheme {
        return Err(IdentityError::validation(
            "profileImageUrl",
            "must be an http(s) URL or a site-relative path",
        ));
    }
    if url.chars().any(char::is_whitespace) {
        return Err(IdentityError::validation("profileImageUrl", "must not contain whitespace"));
    }
    check_free_text("profileImageUrl", url)?;
    Ok(url.to_string())
}

/// Social handle: leading `@` stripped, then 1-15 of `[A-Za-z0-9_]`.
pub fn username(raw: &str) -> Result<String> {
    let handle = raw.trim();
    let handle = handle.strip_prefix('@').unwrap_or(handle);
    if handle.is_empty() || handle.len() > MAX_USERNAME_CHARS {
        return Err(IdentityError::validation(
            "username",
            format!("must be 1-{} characters", MAX_USERNAME_CHARS),
        ));
    }
    if !handle.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(IdentityError::validation(
            "username",
            "may only contain letters, digits and underscores",
        ));
    }
    Ok(handle.to_string())
}

pub fn account_id(raw: &str) -> Result<String> {
    let id = raw.trim();
    if id.is_empty() || id.len() > MAX_ACCOUNT_ID_CHARS {
        return Err(IdentityError::validation(
            "accountId",
            format!("must be 1-{} characters", MAX_ACCOUNT_ID_CHARS),
        ));
    }
    if !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
        return Err(IdentityError::validation("accountId", "contains invalid characters"));
    }
    Ok(id.to_string())
}

/// Validate and normalize every link argument. Blank optional values are
/// treated as absent.
pub fn linked_account(
    display: &str,
    image_url: &str,
    handle: Option<&str>,
    id: Option<&str>,
) -> Result<LinkedAccount> {
    fn present(value: Option<&str>) -> Option<&str> {
        value.filter(|s| !s.trim().is_empty())
    }

    Ok(LinkedAccount {
        display_name: display_name(display)?,
        profile_image_url: profile_image_url(image_url)?,
        username: present(handle).map(username).transpose()?,
        account_id: present(id).map(account_id).transpose()?,
    })
}
