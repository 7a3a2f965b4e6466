use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha512};
use tracing::{debug, info, warn};

use super::password::{constant_time_eq, PasswordHasher};
use super::validators::{PasswordPolicy, UserAttributes};
use super::AuthError;
use crate::config::AppConfig;
use crate::ordering::{AuthToken, CatalogStore, NewUser, OrderingService, User, UserId};

const TOKEN_BYTES: usize = 32;
/// Leading characters of a token stored in clear for lookup.
pub const TOKEN_KEY_LENGTH: usize = 15;
const HEADER_PREFIX: &str = "token";

/// A freshly issued token. The clear text is only ever available here.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub expiry: DateTime<Utc>,
    pub token: String,
    pub user: User,
}

/// Result of a successful token check.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub digest: String,
}

/// Token lifetime settings.
#[derive(Debug, Clone, Copy)]
pub struct TokenPolicy {
    pub ttl: Duration,
    pub min_refresh_interval: Duration,
}

impl TokenPolicy {
    pub fn from_seconds(ttl: f64, min_refresh_interval: f64) -> Self {
        Self {
            ttl: Duration::milliseconds((ttl * 1000.0) as i64),
            min_refresh_interval: Duration::milliseconds((min_refresh_interval * 1000.0) as i64),
        }
    }
}

/// Issues, checks and revokes API tokens, and owns password handling for
/// staff accounts.
pub struct Authenticator<S> {
    ordering: Arc<OrderingService<S>>,
    secret_key: String,
    tokens: TokenPolicy,
    hasher: PasswordHasher,
    passwords: PasswordPolicy,
}

impl<S> Authenticator<S>
where
    S: CatalogStore + 'static,
{
    pub fn new(ordering: Arc<OrderingService<S>>, config: &AppConfig) -> Self {
        Self {
            ordering,
            secret_key: config.secret_key.clone(),
            tokens: TokenPolicy::from_seconds(
                config.auth.token_ttl_secs,
                config.auth.min_refresh_interval_secs,
            ),
            hasher: PasswordHasher::new(config.auth.hash_iterations),
            passwords: PasswordPolicy::new(config.password_similarity)
                .with_common_passwords(config.auth.common_passwords.clone()),
        }
    }

    pub fn ordering(&self) -> &Arc<OrderingService<S>> {
        &self.ordering
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AuthError> {
        now.checked_add_signed(self.tokens.ttl)
            .ok_or(AuthError::ExpiryOutOfRange { now })
    }

    fn digest(&self, token: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(self.secret_key.as_bytes());
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Validates the password against the account's attributes, hashes it and
    /// creates the account. Without a password the account cannot log in.
    pub fn register(&self, new: NewUser, now: DateTime<Utc>) -> Result<User, AuthError> {
        let password = self.prepare_password(&new)?;
        Ok(self.ordering.create_user(new, password, now)?)
    }

    pub fn register_superuser(&self, new: NewUser, now: DateTime<Utc>) -> Result<User, AuthError> {
        let password = self.prepare_password(&new)?;
        Ok(self.ordering.create_superuser(new, password, now)?)
    }

    fn prepare_password(&self, new: &NewUser) -> Result<String, AuthError> {
        let Some(password) = new.password.as_deref() else {
            return Ok(PasswordHasher::unusable());
        };
        self.passwords.validate(
            password,
            Some(UserAttributes {
                employee_id: new.employee_id.as_deref().unwrap_or_default(),
                first_name: &new.first_name,
                last_name: &new.last_name,
            }),
        )?;
        Ok(self.hasher.encode(password))
    }

    pub fn change_password(&self, user: UserId, password: &str) -> Result<(), AuthError> {
        let account = self.ordering.read(|catalog| catalog.user(user).cloned())?;
        self.passwords.validate(
            password,
            Some(UserAttributes {
                employee_id: &account.employee_id,
                first_name: &account.first_name,
                last_name: &account.last_name,
            }),
        )?;
        self.ordering.set_password(user, self.hasher.encode(password))?;
        Ok(())
    }

    /// Checks credentials and issues a new token. Inactive accounts are
    /// treated as unknown.
    pub fn login(
        &self,
        employee_id: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let account = self
            .ordering
            .read(|catalog| catalog.user_by_employee_id(employee_id).cloned());
        let Some(account) = account else {
            warn!("login rejected for unknown employee id");
            return Err(AuthError::InvalidCredentials);
        };
        if !self.hasher.verify(password, &account.password) || !account.is_active {
            warn!(user = %account.id, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        if self.hasher.must_update(&account.password) {
            let upgraded = self.hasher.encode(password);
            self.ordering.set_password(account.id, upgraded)?;
        }
        self.ordering.transact(|catalog| catalog.record_login(account.id, now))?;
        let issued = self.issue(account.id, now)?;
        info!(user = %issued.user.id, "login succeeded");
        Ok(issued)
    }

    pub fn issue(&self, user: UserId, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        let expiry = self.expiry_from(now)?;
        let record = AuthToken {
            digest: self.digest(&token),
            token_key: token[..TOKEN_KEY_LENGTH].to_string(),
            user,
            created: now,
            expiry,
        };

        let user = self.ordering.transact(|catalog| {
            catalog.store_token(record)?;
            catalog.user(user).cloned()
        })?;
        Ok(IssuedToken {
            expiry,
            token,
            user,
        })
    }

    /// Resolves an `Authorization` header value to the token's user, sliding
    /// the expiry forward when it has moved far enough.
    pub fn authenticate(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Authenticated, AuthError> {
        let token = parse_header(header)?;
        let digest = self.digest(token);
        let key = token.get(..TOKEN_KEY_LENGTH).unwrap_or(token);

        let found = self.ordering.read(|catalog| {
            catalog
                .tokens_by_key(key)
                .into_iter()
                .find(|candidate| constant_time_eq(candidate.digest.as_bytes(), digest.as_bytes()))
                .cloned()
        });
        let Some(record) = found else {
            return Err(AuthError::InvalidToken);
        };

        if record.expiry <= now {
            self.ordering.transact(|catalog| {
                Ok(catalog.purge_expired_tokens(now))
            })?;
            debug!(user = %record.user, "expired token purged");
            return Err(AuthError::InvalidToken);
        }

        let user = self
            .ordering
            .read(|catalog| catalog.user(record.user).cloned())
            .map_err(|_| AuthError::InactiveUser)?;
        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        let refreshed = self.expiry_from(now)?;
        if refreshed - record.expiry > self.tokens.min_refresh_interval {
            self.ordering.transact(|catalog| {
                Ok(catalog.set_token_expiry(&record.digest, refreshed))
            })?;
        }

        Ok(Authenticated {
            user,
            digest: record.digest,
        })
    }

    /// Revokes the presented token.
    pub fn logout(&self, session: &Authenticated) -> Result<(), AuthError> {
        self.ordering
            .transact(|catalog| Ok(catalog.remove_token(&session.digest)))?;
        info!(user = %session.user.id, "token revoked");
        Ok(())
    }

    /// Revokes every token of the user, returning how many were removed.
    pub fn logout_all(&self, user: UserId) -> Result<usize, AuthError> {
        let removed = self
            .ordering
            .transact(|catalog| Ok(catalog.remove_user_tokens(user)))?;
        info!(%user, removed, "all tokens revoked");
        Ok(removed)
    }
}

fn parse_header(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.map(str::trim).unwrap_or_default();
    let mut parts = header.split_whitespace();
    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case(HEADER_PREFIX) => {}
        _ => return Err(AuthError::NotAuthenticated),
    }
    let Some(token) = parts.next() else {
        return Err(AuthError::MalformedHeader(
            "Invalid token header. No credentials provided.",
        ));
    };
    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader(
            "Invalid token header. Token string should not contain spaces.",
        ));
    }
    Ok(token)
}
