use axum::http::{header, HeaderMap};

/// Best-effort client address: first hop of X-Forwarded-For when present.
/// Stored as session metadata only, never used for authorization.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers.get("x-forwarded-for")?.to_str().ok()?;
    forwarded
        .split(',')
        .next()
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// Basic email shape check for registration and provisioning.
pub fn validate_email_format(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Err("Email cannot be empty");
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err("Invalid email format");
    }

    Ok(())
}
