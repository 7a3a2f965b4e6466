use chrono::{DateTime, Utc};

use super::Catalog;
use crate::ordering::domain::{AuthToken, UserId};
use crate::ordering::error::OrderingError;

impl Catalog {
    pub fn store_token(&mut self, token: AuthToken) -> Result<(), OrderingError> {
        self.user(token.user)?;
        self.auth_tokens.insert(token.digest.clone(), token);
        Ok(())
    }

    /// Tokens sharing the lookup key; the caller compares digests.
    pub fn tokens_by_key(&self, token_key: &str) -> Vec<&AuthToken> {
        self.auth_tokens
            .values()
            .filter(|token| token.token_key == token_key)
            .collect()
    }

    pub fn user_tokens(&self, user: UserId) -> Vec<&AuthToken> {
        self.auth_tokens
            .values()
            .filter(|token| token.user == user)
            .collect()
    }

    /// Returns `false` when no token has the digest.
    pub fn set_token_expiry(&mut self, digest: &str, expiry: DateTime<Utc>) -> bool {
        match self.auth_tokens.get_mut(digest) {
            Some(token) => {
                token.expiry = expiry;
                true
            }
            None => false,
        }
    }

    pub fn remove_token(&mut self, digest: &str) -> Option<AuthToken> {
        self.auth_tokens.remove(digest)
    }

    /// Removes every token of the user, returning how many there were.
    pub fn remove_user_tokens(&mut self, user: UserId) -> usize {
        let before = self.auth_tokens.len();
        self.auth_tokens.retain(|_, token| token.user != user);
        before - self.auth_tokens.len()
    }

    pub fn purge_expired_tokens(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.auth_tokens.len();
        self.auth_tokens.retain(|_, token| token.expiry > now);
        before - self.auth_tokens.len()
    }
}
