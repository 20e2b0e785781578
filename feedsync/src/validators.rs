use std::sync::LazyLock;

use email_address::EmailAddress;
use regex::Regex;
use url::Url;

/// Usernames are lowercase alphanumerics plus `_` and `.` (strict mode).
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_.]*$").expect("username pattern is valid"));

/// Returns `true` if the provided string is a syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    EmailAddress::is_valid(value)
}

/// Returns `true` if the provided string parses as a URL with a scheme.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Returns `true` if the (already lowercased) username matches the strict
/// charset.
pub fn is_valid_username(value: &str) -> bool {
    USERNAME_RE.is_match(value)
}
