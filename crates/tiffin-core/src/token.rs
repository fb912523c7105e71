//! # Public Table Tokens
//!
//! Each physical table gets a permanent opaque token, printed once on a QR
//! code. Guests place orders with the token alone; no login, no session.
//!
//! The token is a pure function of (restaurant id, table number):
//! `sha256("{restaurant_id}:{table_no}")`, first 32 hex characters. Because
//! it is deterministic, a wiped or missing token column can be re-derived
//! from the row itself, and re-seeding an environment keeps printed QR codes
//! valid.
//!
//! Tokens are identity, not secrets with rotation: "regenerating" one
//! recomputes the same canonical value, and nothing expires.

use sha2::{Digest, Sha256};

/// Length of the public token in hex characters (128 bits of the digest).
pub const TOKEN_LEN: usize = 32;

/// Derives the permanent public token for a table.
///
/// ## Example
/// ```rust
/// use tiffin_core::token::table_token;
///
/// let t = table_token("rest-1", "T1");
/// assert_eq!(t.len(), 32);
/// assert_eq!(t, table_token("rest-1", "T1")); // stable
/// ```
pub fn table_token(restaurant_id: &str, table_no: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(restaurant_id.as_bytes());
    hasher.update(b":");
    hasher.update(table_no.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..TOKEN_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_deterministic() {
        assert_eq!(table_token("r1", "T1"), table_token("r1", "T1"));
    }

    #[test]
    fn test_token_length_and_charset() {
        let t = table_token("r1", "T1");
        assert_eq!(t.len(), TOKEN_LEN);
        assert!(t.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_distinct_inputs_distinct_tokens() {
        assert_ne!(table_token("r1", "T1"), table_token("r1", "T2"));
        assert_ne!(table_token("r1", "T1"), table_token("r2", "T1"));
    }

    #[test]
    fn test_separator_prevents_boundary_collision() {
        // ("ab", "c") and ("a", "bc") hash different preimages.
        assert_ne!(table_token("ab", "c"), table_token("a", "bc"));
    }
}
