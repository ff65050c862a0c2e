//! Team invite codes: six characters drawn from `A-Z` and `0-9`.

use rand::Rng;

use crate::CoreError;

pub const INVITE_CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[must_use]
pub fn generate_invite_code() -> String {
    let mut rng = rand::rng();
    (0..INVITE_CODE_LEN)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Trims and uppercases user input, then checks length and alphabet.
///
/// # Errors
///
/// Returns [`CoreError::InvalidInviteCode`] if the normalized code is not
/// exactly [`INVITE_CODE_LEN`] alphanumeric characters.
pub fn normalize_invite_code(raw: &str) -> Result<String, CoreError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == INVITE_CODE_LEN && code.bytes().all(|b| ALPHABET.contains(&b)) {
        Ok(code)
    } else {
        Err(CoreError::InvalidInviteCode(raw.to_string()))
    }
}
