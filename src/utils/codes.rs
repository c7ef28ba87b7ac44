use rand::Rng;

/// Alphabet for referral and access codes.
pub const UPPER_ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Alphabet for email verification codes.
pub const DIGITS: &[u8] = b"0123456789";

pub const CODE_LENGTH: usize = 6;

/// Uniform random code over `alphabet`, with replacement. Uniqueness is the
/// caller's problem: check the registry for a live collision before treating
/// a generated code as assigned.
pub fn generate(length: usize, alphabet: &[u8]) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

pub fn referral_code() -> String {
    generate(CODE_LENGTH, UPPER_ALNUM)
}

pub fn verification_code() -> String {
    generate(CODE_LENGTH, DIGITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_has_requested_length() {
        for len in [1, 6, 12, 32] {
            assert_eq!(generate(len, UPPER_ALNUM).len(), len);
        }
    }

    #[test]
    fn generated_code_stays_in_alphabet() {
        for _ in 0..100 {
            let code = generate(CODE_LENGTH, UPPER_ALNUM);
            assert!(code
                .bytes()
                .all(|b| UPPER_ALNUM.contains(&b)), "bad char in {}", code);
        }
    }

    #[test]
    fn verification_code_is_all_digits() {
        for _ in 0..100 {
            let code = verification_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn zero_length_yields_empty_code() {
        assert_eq!(generate(0, UPPER_ALNUM), "");
    }
}
