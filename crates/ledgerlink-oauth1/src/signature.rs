//! Signature construction per RFC 5849 §3.4.
//!
//! Everything here is pure so the exact byte-level behavior can be pinned by
//! tests against the worked example in the protocol spec.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;

use ledgerlink_config::SignatureMethod;
use ledgerlink_core::ApiError;

type HmacSha1 = Hmac<Sha1>;

/// RFC 5849 §3.6: every byte outside the unreserved set is escaped.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// `METHOD&enc(base-url)&enc(normalized-params)`.
///
/// `params` is the union of the request's query parameters and the `oauth_*`
/// protocol parameters (minus the signature itself). Normalization encodes
/// each pair first and sorts by encoded name, then encoded value.
pub fn signature_base_string(method: &str, base_url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_url),
        percent_encode(&normalized)
    )
}

/// `enc(consumer-secret)&enc(token-secret)`; the token part is empty on the
/// first leg of the handshake.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    )
}

/// Produce the `oauth_signature` value for the requested method.
pub fn sign(
    method: SignatureMethod,
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, ApiError> {
    let key = signing_key(consumer_secret, token_secret);
    match method {
        SignatureMethod::HmacSha1 => hmac_sha1(&key, base_string),
        // PLAINTEXT transmits the key itself (§3.4.4); only sane over TLS.
        SignatureMethod::Plaintext => Ok(key),
    }
}

fn hmac_sha1(key: &str, base_string: &str) -> Result<String, ApiError> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| ApiError::config(&format!("HMAC key error: {e}")))?;
    mac.update(base_string.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
