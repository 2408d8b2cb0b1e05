//! Password hashing with PBKDF2-HMAC-SHA256.
//!
//! Stored format:
//!
//! ```text
//! pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>
//! ```
//!
//! The iteration count travels with the hash, so raising the default only
//! affects newly created accounts.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Default PBKDF2 iteration count.
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 100_000;

/// Lowest iteration count accepted from configuration.
pub const MIN_PASSWORD_ITERATIONS: u32 = 10_000;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_BYTES: usize = 16;
const HASH_BYTES: usize = 32;

/// Salted, deliberately slow one-way password hashing.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::with_iterations(DEFAULT_PASSWORD_ITERATIONS)
    }

    /// Use a specific iteration count (clamped to at least 1).
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a password under a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_BYTES];
        OsRng.fill_bytes(&mut salt);

        let hash = derive(password, &salt, self.iterations);
        format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            hex::encode(salt),
            hex::encode(hash)
        )
    }

    /// Check a password against a stored hash.
    ///
    /// Unparseable stored hashes never match.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Some((iterations, salt, expected)) = parse(stored) else {
            warn!("Stored password hash has an unrecognised format");
            return false;
        };

        let actual = derive(password, &salt, iterations);
        actual[..].ct_eq(&expected[..]).into()
    }
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_BYTES] {
    let mut out = [0u8; HASH_BYTES];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

fn parse(stored: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return None;
    };

    if scheme != SCHEME {
        return None;
    }

    let iterations = iterations.parse::<u32>().ok().filter(|&n| n > 0)?;
    let salt = hex::decode(salt).ok()?;
    let hash = hex::decode(hash).ok()?;
    if hash.len() != HASH_BYTES {
        return None;
    }

    Some((iterations, salt, hash))
}
