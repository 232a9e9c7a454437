//! Share link token generation and URLs.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Random bytes per token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Generates a URL-safe bearer token with 256 bits of entropy.
///
/// Uses the thread-local CSPRNG, which is seeded from the operating system.
/// The result is 43 characters of unpadded URL-safe base64.
pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Public URL under which a token can be opened.
pub fn share_url(base_url: &str, token: &str) -> String {
    format!("{}/{token}", base_url.trim_end_matches('/'))
}
