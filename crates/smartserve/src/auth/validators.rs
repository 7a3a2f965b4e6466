use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::ordering::validation::ValidationError;

const MINIMUM_LENGTH: usize = 8;
const COMMON_PASSWORDS: &str = include_str!("common_passwords.txt");

/// The account fields a new password is compared against.
#[derive(Debug, Clone, Copy)]
pub struct UserAttributes<'a> {
    pub employee_id: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

impl<'a> UserAttributes<'a> {
    fn named(&self) -> [(&'static str, &'a str); 3] {
        [
            ("Employee ID", self.employee_id),
            ("first name", self.first_name),
            ("last name", self.last_name),
        ]
    }
}

/// Lower-cased passwords rejected as too common, one per line in the source
/// text.
#[derive(Clone, PartialEq)]
pub struct CommonPasswords(Arc<HashSet<String>>);

impl CommonPasswords {
    /// The short list compiled into the binary.
    pub fn bundled() -> Self {
        static BUNDLED: OnceLock<CommonPasswords> = OnceLock::new();
        BUNDLED.get_or_init(|| Self::parse(COMMON_PASSWORDS)).clone()
    }

    /// Reads a replacement list, such as a full upstream common-password file.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn parse(raw: &str) -> Self {
        let list = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self(Arc::new(list))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, password: &str) -> bool {
        self.0.contains(password.to_lowercase().trim())
    }
}

impl Default for CommonPasswords {
    fn default() -> Self {
        Self::bundled()
    }
}

impl fmt::Debug for CommonPasswords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommonPasswords({} entries)", self.len())
    }
}

/// Runs every password rule and reports all failures together under the
/// `password` field.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    max_similarity: f64,
    common: CommonPasswords,
}

impl PasswordPolicy {
    pub fn new(max_similarity: f64) -> Self {
        Self {
            max_similarity,
            common: CommonPasswords::bundled(),
        }
    }

    pub fn with_common_passwords(mut self, common: CommonPasswords) -> Self {
        self.common = common;
        self
    }

    pub fn validate(
        &self,
        password: &str,
        user: Option<UserAttributes<'_>>,
    ) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        if let Some(user) = user {
            if let Some(attribute) = self.too_similar(password, user) {
                errors.add(
                    "password",
                    format!("The password is too similar to the {attribute}."),
                );
            }
        }
        if password.chars().count() < MINIMUM_LENGTH {
            errors.add(
                "password",
                format!(
                    "This password is too short. It must contain at least {MINIMUM_LENGTH} characters."
                ),
            );
        }
        if self.common.contains(password) {
            errors.add("password", "This password is too common.");
        }
        if !password.is_empty() && password.chars().all(|ch| ch.is_numeric()) {
            errors.add("password", "This password is entirely numeric.");
        }
        errors.into_result()
    }

    fn too_similar(&self, password: &str, user: UserAttributes<'_>) -> Option<&'static str> {
        let password = password.to_lowercase();
        for (verbose_name, value) in user.named() {
            if value.is_empty() {
                continue;
            }
            let value = value.to_lowercase();
            let parts = value
                .split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                .chain(std::iter::once(value.as_str()));
            for part in parts {
                if exceeds_length_ratio(&password, self.max_similarity, part) {
                    continue;
                }
                if quick_ratio(&password, part) >= self.max_similarity {
                    return Some(verbose_name);
                }
            }
        }
        None
    }
}

/// A password much longer than the attribute cannot be similar to it.
fn exceeds_length_ratio(password: &str, max_similarity: f64, value: &str) -> bool {
    let password_length = password.chars().count();
    let value_length = value.chars().count();
    let length_bound = max_similarity / 2.0 * password_length as f64;
    password_length >= 10 * value_length && (value_length as f64) < length_bound
}

/// Upper bound on sequence similarity: twice the shared character count over
/// the combined length.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    let mut available: HashMap<char, usize> = HashMap::new();
    for ch in b.chars() {
        *available.entry(ch).or_default() += 1;
    }
    let mut matches = 0usize;
    for ch in a.chars() {
        if let Some(count) = available.get_mut(&ch) {
            if *count > 0 {
                *count -= 1;
                matches += 1;
            }
        }
    }
    2.0 * matches as f64 / total as f64
}
