use crate::error::{AppError, AppResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

const MAX_DRAWS_PER_CODE: usize = 64;

const FULL_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
// no 0/O/1/I, codes are read aloud at the salon counter
const UNAMBIGUOUS_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Character set a discount code is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeAlphabet {
    Full,
    Unambiguous,
}

impl CodeAlphabet {
    pub fn chars(&self) -> &'static [u8] {
        match self {
            CodeAlphabet::Full => FULL_ALPHABET,
            CodeAlphabet::Unambiguous => UNAMBIGUOUS_ALPHABET,
        }
    }
}

impl std::str::FromStr for CodeAlphabet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(CodeAlphabet::Full),
            "unambiguous" => Ok(CodeAlphabet::Unambiguous),
            other => Err(format!("unknown code alphabet: {other}")),
        }
    }
}

/// Random uppercase alphanumeric code. Uniqueness is enforced by the
/// `discount_codes.code` unique index, not here.
pub fn generate_code(length: usize, alphabet: CodeAlphabet) -> String {
    let chars = alphabet.chars();
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| chars[rng.gen_range(0..chars.len())] as char)
        .collect()
}

/// A batch of `count` codes with no duplicates inside the batch itself.
///
/// Fails instead of spinning when the alphabet cannot produce `count`
/// distinct codes of `length`, or when draws keep repeating.
pub fn generate_code_batch(
    count: usize,
    length: usize,
    alphabet: CodeAlphabet,
) -> AppResult<Vec<String>> {
    if length == 0 {
        return Err(AppError::ConfigError(
            "Code length must be at least 1".to_string(),
        ));
    }
    let space = u32::try_from(length)
        .ok()
        .and_then(|len| alphabet.chars().len().checked_pow(len))
        .unwrap_or(usize::MAX);
    if count > space {
        return Err(AppError::ConfigError(format!(
            "Cannot draw {count} distinct codes of length {length}, only {space} exist"
        )));
    }

    let max_draws = count.saturating_mul(MAX_DRAWS_PER_CODE).max(MAX_DRAWS_PER_CODE);
    let mut seen = std::collections::HashSet::with_capacity(count);
    let mut codes = Vec::with_capacity(count);
    for _ in 0..max_draws {
        if codes.len() == count {
            break;
        }
        let code = generate_code(length, alphabet);
        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }
    if codes.len() < count {
        return Err(AppError::InternalError(format!(
            "Gave up after {max_draws} draws with {} of {count} distinct codes",
            codes.len()
        )));
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_length_and_charset() {
        let code = generate_code(8, CodeAlphabet::Full);
        assert_eq!(code.len(), 8);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_unambiguous_alphabet_skips_lookalikes() {
        for _ in 0..200 {
            let code = generate_code(12, CodeAlphabet::Unambiguous);
            assert!(!code.contains(['0', 'O', '1', 'I']), "got {code}");
        }
    }

    #[test]
    fn test_batch_has_no_duplicates() {
        // tiny code space to force collisions inside the batch
        let codes = generate_code_batch(20, 2, CodeAlphabet::Unambiguous).unwrap();
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), 20);
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn test_batch_can_use_the_whole_code_space() {
        let codes = generate_code_batch(32, 1, CodeAlphabet::Unambiguous).unwrap();
        let mut sorted = codes.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 32);
    }

    #[test]
    fn test_batch_larger_than_code_space_fails_fast() {
        let err = generate_code_batch(40, 1, CodeAlphabet::Unambiguous).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)), "got {err:?}");
        assert!(generate_code_batch(37, 1, CodeAlphabet::Full).is_err());
    }

    #[test]
    fn test_zero_length_codes_are_rejected() {
        let err = generate_code_batch(2, 0, CodeAlphabet::Full).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)), "got {err:?}");
    }

    #[test]
    fn test_long_codes_do_not_overflow_the_space_check() {
        let codes = generate_code_batch(3, 32, CodeAlphabet::Full).unwrap();
        assert!(codes.iter().all(|c| c.len() == 32));
    }

    #[test]
    fn test_alphabet_from_str() {
        assert_eq!("full".parse::<CodeAlphabet>(), Ok(CodeAlphabet::Full));
        assert_eq!(
            "Unambiguous".parse::<CodeAlphabet>(),
            Ok(CodeAlphabet::Unambiguous)
        );
        assert!("hex".parse::<CodeAlphabet>().is_err());
    }
}
