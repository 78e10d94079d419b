//! Validation helpers shared by the admission flow.

/// Validate email address format.
///
/// Shape check only:
/// - exactly one `@` with non-empty local and domain parts
/// - domain contains at least one dot and no empty labels
/// - total length between 3 and 255 characters
/// - characters restricted to alphanumerics plus `.`, `-`, `+`, `_`
///
/// # Examples
///
/// ```
/// use rifa_core::utils::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    let local_ok = local
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'));
    let domain_ok = domain
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-'));
    if !local_ok || !domain_ok {
        return false;
    }

    // No empty labels ("user@example..com", "user@.com")
    domain.split('.').all(|label| !label.is_empty())
}

/// Returns `true` if the string has visible content.
#[must_use]
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}
