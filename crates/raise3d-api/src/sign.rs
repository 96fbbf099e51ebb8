//! Login signature generation
//!
//! The printer authenticates `GET /v1/login` with a signature derived from
//! the access password and a millisecond timestamp:
//! `md5_hex(sha1_hex("password=<password>&timestamp=<timestamp>"))`.

use md5::Md5;
use sha1::{Digest, Sha1};

/// Compute the login signature for a password and millisecond timestamp
pub fn generate_sign(password: &str, timestamp_ms: i64) -> String {
    let sha1_hex = format!(
        "{:x}",
        Sha1::digest(format!("password={password}&timestamp={timestamp_ms}"))
    );
    format!("{:x}", Md5::digest(sha1_hex))
}

/// Compute a signature for the current time, returning it with the timestamp
pub fn sign_now(password: &str) -> (String, i64) {
    let timestamp_ms = chrono::Utc::now().timestamp_millis();
    (generate_sign(password, timestamp_ms), timestamp_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_is_md5_shaped() {
        let sign = generate_sign("password", 1700000000000);
        assert_eq!(sign.len(), 32);
        assert!(sign.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_is_deterministic() {
        assert_eq!(
            generate_sign("secret", 1700000000000),
            generate_sign("secret", 1700000000000)
        );
    }

    #[test]
    fn test_sign_depends_on_password_and_timestamp() {
        let base = generate_sign("secret", 1700000000000);
        assert_ne!(base, generate_sign("other", 1700000000000));
        assert_ne!(base, generate_sign("secret", 1700000000001));
    }

    #[test]
    fn test_sign_now_uses_millisecond_timestamps() {
        let (sign, timestamp_ms) = sign_now("secret");
        assert_eq!(sign, generate_sign("secret", timestamp_ms));
        // Milliseconds since epoch, not seconds
        assert!(timestamp_ms > 1_000_000_000_000);
    }
}
