use http_body_util::Full;
use hyper::{
    body::Bytes,
    header::{HeaderValue, WWW_AUTHENTICATE},
    Response, StatusCode,
};
use tracing::debug;

use crate::base64;

const BASIC_SCHEME: &[u8] = b"Basic";

/// Compares the first `len` bytes of two byte strings, ignoring ASCII case.
///
/// Bytes past the end of either slice read as NUL and comparison stops after
/// the first NUL, the same way `strncasecmp` treats C strings. Returns the
/// difference of the first mismatching lowercased pair, so zero means the
/// prefixes match.
pub fn ascii_casecmp_prefix(left: &[u8], right: &[u8], len: usize) -> i32 {
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0).to_ascii_lowercase();
        let r = right.get(i).copied().unwrap_or(0).to_ascii_lowercase();
        let diff = i32::from(l) - i32::from(r);
        if diff != 0 || l == 0 {
            return diff;
        }
    }
    0
}

/// The single username/password pair accepted by Basic-Auth guarded routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("user", "password")
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Checks an `Authorization` header value. Anything other than a `Basic`
    /// header carrying exactly these credentials is rejected.
    pub fn verify(&self, authorization: Option<&HeaderValue>) -> bool {
        let Some(authorization) = authorization else {
            debug!("basic auth rejected: no authorization header");
            return false;
        };
        let authorization = authorization.as_bytes();
        if ascii_casecmp_prefix(authorization, BASIC_SCHEME, BASIC_SCHEME.len()) != 0 {
            debug!("basic auth rejected: scheme is not Basic");
            return false;
        }

        let Some((username, password)) = decode_basic_payload(authorization) else {
            debug!("basic auth rejected: payload has no separator");
            return false;
        };

        let accepted =
            username == self.username.as_bytes() && password == self.password.as_bytes();
        if !accepted {
            debug!("basic auth rejected: credentials do not match");
        }
        accepted
    }
}

/// Decodes the payload following the first space of a Basic `Authorization`
/// value and splits it at the first colon. Without a space the whole value is
/// treated as the payload.
fn decode_basic_payload(authorization: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let payload = match authorization.iter().position(|&b| b == b' ') {
        Some(space) => &authorization[space + 1..],
        None => authorization,
    };
    let mut decoded = base64::decode(payload);
    let colon = decoded.iter().position(|&b| b == b':')?;
    let password = decoded.split_off(colon + 1);
    decoded.truncate(colon);
    Some((decoded, password))
}

/// Builds the `401` response that asks the client to authenticate.
pub(crate) fn challenge(realm: &str) -> Result<Response<Full<Bytes>>, hyper::http::Error> {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(WWW_AUTHENTICATE, format!("Basic realm=\"{realm}\""))
        .body(Full::new(Bytes::new()))
}
