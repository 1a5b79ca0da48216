use rand::Rng;

/// Alphabet for reference codes: uppercase letters and digits, minus the
/// ambiguous 0/O and 1/I pairs.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const PREFIX: &str = "SKY-";
const CODE_LEN: usize = 6;

/// Generate a human-presentable booking reference, e.g. `SKY-4H7WQ2`.
///
/// Uniqueness is enforced at insert time by the booking store; callers retry
/// with a fresh code on collision.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let code: String = (0..CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}{}", PREFIX, code)
}

/// Structural check used by reconciliation: prefix plus six characters from
/// the reference alphabet.
pub fn is_valid(reference: &str) -> bool {
    match reference.strip_prefix(PREFIX) {
        Some(code) => {
            code.len() == CODE_LEN && code.bytes().all(|b| ALPHABET.contains(&b))
        }
        None => false,
    }
}
