use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::distributions::{Alphanumeric, DistString};
use sha2::Sha256;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LENGTH: usize = 22;
const UNUSABLE_PREFIX: char = '!';
const UNUSABLE_SUFFIX_LENGTH: usize = 40;

/// Encodes and checks passwords in the `pbkdf2_sha256$<iterations>$<salt>$<hash>`
/// format.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn encode(&self, password: &str) -> String {
        let salt = Alphanumeric.sample_string(&mut rand::thread_rng(), SALT_LENGTH);
        self.encode_with_salt(password, &salt)
    }

    fn encode_with_salt(&self, password: &str, salt: &str) -> String {
        let digest = derive(password, salt, self.iterations);
        format!("{ALGORITHM}${}${salt}${}", self.iterations, STANDARD.encode(digest))
    }

    /// Marker stored for accounts that cannot log in with a password.
    pub fn unusable() -> String {
        let suffix =
            Alphanumeric.sample_string(&mut rand::thread_rng(), UNUSABLE_SUFFIX_LENGTH);
        format!("{UNUSABLE_PREFIX}{suffix}")
    }

    pub fn is_usable(encoded: &str) -> bool {
        !encoded.starts_with(UNUSABLE_PREFIX)
    }

    /// Checks a password against an encoded hash. Malformed or unusable hashes
    /// never match.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        if !Self::is_usable(encoded) {
            return false;
        }
        let mut parts = encoded.splitn(4, '$');
        let (Some(algorithm), Some(iterations), Some(salt), Some(expected)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        if algorithm != ALGORITHM {
            return false;
        }
        let Ok(iterations) = iterations.parse::<u32>() else {
            return false;
        };
        let Ok(expected) = STANDARD.decode(expected) else {
            return false;
        };
        if iterations == 0 {
            return false;
        }

        constant_time_eq(&derive(password, salt, iterations), &expected)
    }

    /// Whether the hash was produced with different parameters than the
    /// current ones.
    pub fn must_update(&self, encoded: &str) -> bool {
        let mut parts = encoded.splitn(3, '$');
        match (parts.next(), parts.next()) {
            (Some(ALGORITHM), Some(iterations)) => iterations != self.iterations.to_string(),
            _ => true,
        }
    }
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; 32] {
    let mut out = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut out);
    out
}

pub(crate) fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_hash() {
        let hasher = PasswordHasher::new(1);
        assert_eq!(
            hasher.encode_with_salt("password", "salt"),
            "pbkdf2_sha256$1$salt$Eg+2z/z4syxD5yJSVsT4N6hlSMkszDVICAWYfLcL4Xs="
        );
    }

    #[test]
    fn encoded_password_verifies() {
        let hasher = PasswordHasher::new(2);
        let encoded = hasher.encode("correct horse");
        assert!(encoded.starts_with("pbkdf2_sha256$2$"));
        assert!(hasher.verify("correct horse", &encoded));
        assert!(!hasher.verify("wrong horse", &encoded));
    }

    #[test]
    fn hashes_from_other_iteration_counts_still_verify() {
        let old = PasswordHasher::new(3).encode("pizza-night-42");
        let current = PasswordHasher::new(5);
        assert!(current.verify("pizza-night-42", &old));
        assert!(current.must_update(&old));
    }

    #[test]
    fn unusable_and_malformed_hashes_never_match() {
        let hasher = PasswordHasher::new(1);
        let unusable = PasswordHasher::unusable();
        assert!(!PasswordHasher::is_usable(&unusable));
        assert!(!hasher.verify("", &unusable));
        assert!(!hasher.verify("password", "md5$1$salt$abc"));
        assert!(!hasher.verify("password", "pbkdf2_sha256$x$salt$abc"));
    }
}
