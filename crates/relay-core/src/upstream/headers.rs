//! Fixed header set sent with every upstream call.
//!
//! Only the `token` value varies between requests. The form content type is
//! sent even though every call is a GET; the upstream expects it.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::error::{RelayError, Result};
use crate::token::Token;

/// Header carrying the resolved per-client token
pub const TOKEN_HEADER: &str = "token";
/// Header identifying the client type
pub const ORIGIN_TYPE_HEADER: &str = "origintype";
/// Header identifying the user type
pub const USER_TYPE_HEADER: &str = "usertype";

pub const ORIGIN_TYPE: &str = "web";
pub const USER_TYPE: &str = "2";

const ACCEPT_JSON: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Build the outbound header set for a resolved token
pub fn build_headers(identifier: &str, token: &Token) -> Result<HeaderMap> {
    let mut token_value =
        HeaderValue::from_str(token.expose()).map_err(|_| RelayError::CredentialUnreadable {
            identifier: identifier.to_string(),
            reason: "token contains characters not allowed in a header".to_string(),
        })?;
    token_value.set_sensitive(true);

    let mut headers = HeaderMap::with_capacity(5);
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
    headers.insert(ORIGIN_TYPE_HEADER, HeaderValue::from_static(ORIGIN_TYPE));
    headers.insert(TOKEN_HEADER, token_value);
    headers.insert(USER_TYPE_HEADER, HeaderValue::from_static(USER_TYPE));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));

    Ok(headers)
}
