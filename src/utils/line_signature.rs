use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the `x-line-signature` value for a raw webhook body.
pub fn sign(body: &[u8], channel_secret: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return String::new();
    };
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

pub fn verify_signature(body: &[u8], signature: &str, channel_secret: &str) -> bool {
    let signature = signature.trim();
    if signature.is_empty() || channel_secret.is_empty() {
        return false;
    }
    let expected = sign(body, channel_secret);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
