use base64::{
    alphabet,
    engine::{general_purpose, DecodePaddingMode, GeneralPurpose},
    Engine as _,
};
use serde_json::Value;

/// URL-safe base64 that accepts payloads with or without `=` padding
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    general_purpose::NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Extract the `exp` claim (epoch seconds) from a JWT
///
/// Returns `None` when the token does not have exactly three segments, the
/// payload is not base64url UTF-8 JSON object text, or `exp` is missing or
/// not an integer. No signature verification is done here; the server is
/// the authority on signatures.
pub fn expiry(token: &str) -> Option<i64> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let bytes = URL_SAFE_LENIENT.decode(parts[1]).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let payload: Value = serde_json::from_str(&text).ok()?;

    payload.as_object()?.get("exp")?.as_i64()
}

/// Whether `token` is usable at `now_secs`
///
/// `exp == 0` counts as missing.
pub fn is_valid_at(token: &str, now_secs: i64) -> bool {
    match expiry(token) {
        Some(0) | None => false,
        Some(exp) => exp >= now_secs,
    }
}

/// Build an unsigned token around a JSON payload (diagnostics and tests)
pub fn encode_unsigned(payload: &Value) -> String {
    let header = URL_SAFE_LENIENT.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE_LENIENT.encode(payload.to_string().as_bytes());
    format!("{}.{}.sig", header, body)
}
