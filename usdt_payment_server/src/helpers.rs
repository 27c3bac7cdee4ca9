use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Hex-encoded HMAC-SHA512 of `data`, the way OxaPay signs its callbacks.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> Option<String> {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(data);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a hex-encoded HMAC-SHA512 signature over `data` in constant time.
pub fn verify_hmac(secret: &str, data: &[u8], signature: &str) -> bool {
    let Ok(signature) = hex::decode(signature.trim()) else {
        debug!("🔐️ HMAC signature is not valid hex");
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(data);
    mac.verify_slice(&signature).is_ok()
}
