//! Bearer token decoding and expiry checks.
//!
//! The client does NOT verify token signatures. The remote API issued the
//! token and is the only party holding the key; it re-verifies every token it
//! receives. Locally the payload is only read to learn the expiry instant and
//! the identity claims. Do not add verification here unless the API starts
//! publishing a key for clients.

use super::models::TokenClaims;
use crate::errors::{ClientError, ClientResult};
use chrono::{DateTime, Utc};
use jsonwebtoken::dangerous::insecure_decode;
use std::fmt;
use std::sync::Arc;

/// Source of "now" for expiry checks
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Decodes token payloads and checks their expiry against a clock
#[derive(Clone)]
pub struct TokenValidator {
    clock: Clock,
}

impl Default for TokenValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenValidator").finish_non_exhaustive()
    }
}

impl TokenValidator {
    /// Create a validator that reads the system clock
    pub fn new() -> Self {
        Self {
            clock: Arc::new(Utc::now),
        }
    }

    /// Create a validator with a custom clock
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Current time according to this validator's clock
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Decode the payload of a token without verifying its signature
    ///
    /// # Errors
    ///
    /// * `ClientError::SessionExpired` - The token is not a well-formed JWT
    pub fn decode(&self, token: &str) -> ClientResult<TokenClaims> {
        let data = insecure_decode::<TokenClaims>(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode bearer token");
            ClientError::SessionExpired
        })?;

        Ok(data.claims)
    }

    /// Check that a token decodes and its expiry is strictly in the future
    pub fn is_valid(&self, token: &str) -> bool {
        match self.decode(token) {
            Ok(claims) => self.is_unexpired(&claims),
            Err(_) => false,
        }
    }

    /// Check the `exp` claim against the clock; a missing `exp` counts as expired
    pub fn is_unexpired(&self, claims: &TokenClaims) -> bool {
        claims
            .exp
            .is_some_and(|exp| exp > self.now().timestamp())
    }
}
