//! Random credential generation.
//!
//! Characters are drawn by rejection sampling over a secure random byte
//! stream: bytes falling outside the largest multiple of the pool size
//! below 256 are discarded and redrawn, so the distribution over the pool
//! stays uniform regardless of its size.

use crate::error::{CryptoError, CryptoResult};

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>?";

/// Options controlling [`generate_password`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
    /// Characters struck from the pool (ambiguous glyphs, site blocklists).
    pub exclude: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 20,
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
            exclude: String::new(),
        }
    }
}

/// Generates a password uniformly over the requested character pool.
///
/// Fails with [`CryptoError::Config`] when the pool comes out empty or the
/// requested length is zero.
pub fn generate_password(options: &GeneratorOptions) -> CryptoResult<String> {
    if options.length == 0 {
        return Err(CryptoError::Config("password length must be >= 1".into()));
    }

    let pool = build_pool(options)?;
    // Largest multiple of the pool size that fits in a byte; anything at
    // or above it would bias the modulo.
    let limit = 256 - (256 % pool.len());

    let mut out = String::with_capacity(options.length);
    let mut buf = [0u8; 64];

    'fill: loop {
        getrandom::fill(&mut buf).map_err(|e| CryptoError::Rng(e.to_string()))?;
        for &byte in &buf {
            if (byte as usize) < limit {
                out.push(pool[byte as usize % pool.len()]);
                if out.len() == options.length {
                    break 'fill;
                }
            }
        }
    }

    Ok(out)
}

fn build_pool(options: &GeneratorOptions) -> CryptoResult<Vec<char>> {
    let mut pool = Vec::new();
    if options.uppercase {
        pool.extend(UPPERCASE.chars());
    }
    if options.lowercase {
        pool.extend(LOWERCASE.chars());
    }
    if options.digits {
        pool.extend(DIGITS.chars());
    }
    if options.symbols {
        pool.extend(SYMBOLS.chars());
    }
    pool.retain(|c| !options.exclude.contains(*c));

    if pool.is_empty() {
        return Err(CryptoError::Config("character pool is empty".into()));
    }
    Ok(pool)
}

/// Coarse strength heuristic: length × log2(detected class cardinality).
///
/// A signal for strength meters, not a measurement of the actual
/// randomness source.
pub fn estimate_entropy(password: &str) -> f64 {
    let mut pool = 0usize;
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        pool += UPPERCASE.len();
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        pool += LOWERCASE.len();
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        pool += DIGITS.len();
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        pool += SYMBOLS.len();
    }

    if pool == 0 {
        return 0.0;
    }
    password.chars().count() as f64 * (pool as f64).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_class_twenty_char_password() {
        let password = generate_password(&GeneratorOptions::default()).unwrap();
        assert_eq!(password.len(), 20);
        let allowed = format!("{UPPERCASE}{LOWERCASE}{DIGITS}{SYMBOLS}");
        assert!(password.chars().all(|c| allowed.contains(c)));
    }

    #[test]
    fn digits_only_pool_respected() {
        let options = GeneratorOptions {
            uppercase: false,
            lowercase: false,
            symbols: false,
            length: 32,
            ..GeneratorOptions::default()
        };
        let password = generate_password(&options).unwrap();
        assert_eq!(password.len(), 32);
        assert!(password.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn excluded_characters_never_appear() {
        let options = GeneratorOptions {
            exclude: "lI1O0o".into(),
            length: 200,
            ..GeneratorOptions::default()
        };
        let password = generate_password(&options).unwrap();
        assert!(!password.chars().any(|c| "lI1O0o".contains(c)));
    }

    #[test]
    fn empty_pool_is_config_error() {
        let options = GeneratorOptions {
            uppercase: false,
            lowercase: false,
            digits: false,
            symbols: false,
            ..GeneratorOptions::default()
        };
        assert!(matches!(
            generate_password(&options),
            Err(CryptoError::Config(_))
        ));
    }

    #[test]
    fn excluding_entire_pool_is_config_error() {
        let options = GeneratorOptions {
            uppercase: false,
            lowercase: false,
            symbols: false,
            exclude: DIGITS.into(),
            ..GeneratorOptions::default()
        };
        assert!(generate_password(&options).is_err());
    }

    #[test]
    fn zero_length_rejected() {
        let options = GeneratorOptions {
            length: 0,
            ..GeneratorOptions::default()
        };
        assert!(generate_password(&options).is_err());
    }

    #[test]
    fn successive_passwords_differ() {
        let options = GeneratorOptions::default();
        let a = generate_password(&options).unwrap();
        let b = generate_password(&options).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn entropy_scales_with_length_and_classes() {
        let lower_only = estimate_entropy("aaaaaaaa");
        let mixed = estimate_entropy("aA1!aA1!");
        assert!(mixed > lower_only);

        let short = estimate_entropy("aA1!");
        assert!(mixed > short);
    }

    #[test]
    fn entropy_of_empty_password_is_zero() {
        assert_eq!(estimate_entropy(""), 0.0);
    }

    #[test]
    fn entropy_matches_formula_for_lowercase() {
        // 10 chars over a 26-char class
        let bits = estimate_entropy("abcdefghij");
        assert!((bits - 10.0 * 26f64.log2()).abs() < 1e-9);
    }
}
