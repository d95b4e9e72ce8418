use crate::error::DataError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// Encode parameters as a stable `k=v&k=v` query string, preserving the
/// given order. Encoding order affects the signature bytes, so callers must
/// pass parameters in the order they will be sent.
pub fn encode_query(params: &[(&str, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Compute the HMAC-SHA256 signature of the encoded parameter set, keyed by
/// `secret`, as a lowercase hexadecimal string.
pub fn sign_query(secret: &str, params: &[(&str, String)]) -> Result<String, DataError> {
    let encoded = encode_query(params);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| DataError::InvalidArgument(format!("invalid signing secret: {e}")))?;
    mac.update(encoded.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Encode the parameter set and append its signature as the final
/// `signature` field, ready to be sent as the raw request query.
pub fn signed_query(secret: &str, params: &[(&str, String)]) -> Result<String, DataError> {
    let signature = sign_query(secret, params)?;
    Ok(format!("{}&signature={}", encode_query(params), signature))
}
