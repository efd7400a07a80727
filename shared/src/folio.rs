//! Folio generation
//!
//! A folio is the human-readable public code of a pedido, printed on the
//! ticket and used for tracking lookups. Format: `CK-<year>-<4 chars>`.
//! Uniqueness is enforced by the storage layer; callers retry on collision.

use rand::Rng;

const FOLIO_PREFIX: &str = "CK";
const FOLIO_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const FOLIO_RANDOM_LEN: usize = 4;

/// Generate a new folio: `CK-<current year>-<4 random uppercase alnum>`.
///
/// 36^4 = ~1.68M combinations per year. Collisions are rare but possible;
/// the insert path retries with a fresh folio on a unique violation.
pub fn generate_folio() -> String {
    let year = chrono::Utc::now().format("%Y");
    let mut rng = rand::thread_rng();
    let random_part: String = (0..FOLIO_RANDOM_LEN)
        .map(|_| FOLIO_CHARSET[rng.gen_range(0..FOLIO_CHARSET.len())] as char)
        .collect();
    format!("{}-{}-{}", FOLIO_PREFIX, year, random_part)
}

/// Check whether a string has the folio shape `CK-YYYY-XXXX`.
pub fn is_valid_folio(folio: &str) -> bool {
    let parts: Vec<&str> = folio.split('-').collect();
    if parts.len() != 3 {
        return false;
    }
    parts[0] == FOLIO_PREFIX
        && parts[1].len() == 4
        && parts[1].bytes().all(|b| b.is_ascii_digit())
        && parts[2].len() == FOLIO_RANDOM_LEN
        && parts[2]
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
