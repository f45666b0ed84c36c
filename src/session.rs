//! Keys of the values kept in the visitor's session.

/// Id of the logged-in user.
pub const USER_ID: &str = "user_id";
pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
/// Where to send the visitor once the login flow finishes.
pub const RETURN_URL: &str = "return_url";
