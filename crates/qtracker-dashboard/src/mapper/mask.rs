//! User identifier masking.

use sha2::{Digest, Sha256};

/// Label shown when no identifier is known.
pub const ANONYMOUS_USER: &str = "Quantum User";

/// Replace a user identifier with a short stable token.
///
/// The token is `user_` followed by the first six hex characters of the
/// SHA-256 digest of `user_id`.
pub fn mask_user_id(user_id: &str) -> String {
    if user_id.is_empty() {
        return ANONYMOUS_USER.to_string();
    }

    let digest = Sha256::digest(user_id.as_bytes());
    let hex: String = digest.iter().take(3).map(|b| format!("{b:02x}")).collect();
    format!("user_{hex}")
}
