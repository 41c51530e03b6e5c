//! Session-scoped API credential.
//!
//! The credential is an explicit value carried by
//! [`crate::config::GenerationConfig`]; the library never reads it from the
//! environment or any other global. A [`CredentialStore`] is only the place a
//! calling surface (the CLI, a server session) keeps the key between runs.

use crate::error::FlashcardError;
use std::fmt;
use std::sync::RwLock;

/// An opaque, non-empty API key.
///
/// `Debug` and `Display` never print the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Accept a user-entered key, trimming surrounding whitespace.
    ///
    /// Returns [`FlashcardError::InvalidCredential`] when nothing is left.
    pub fn new(key: impl AsRef<str>) -> Result<Self, FlashcardError> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            return Err(FlashcardError::InvalidCredential);
        }
        Ok(Self(key.to_string()))
    }

    /// The raw key, for building the request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// Get/set storage for the one credential of the active session.
pub trait CredentialStore: Send + Sync {
    /// The stored credential, if any.
    fn get(&self) -> Option<Credential>;

    /// Replace the stored credential.
    fn set(&self, credential: Credential);

    /// Forget the stored credential.
    fn clear(&self);
}

/// In-memory store living as long as the session that owns it.
#[derive(Debug, Default)]
pub struct SessionCredentials {
    slot: RwLock<Option<Credential>>,
}

impl SessionCredentials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for SessionCredentials {
    fn get(&self) -> Option<Credential> {
        match self.slot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, credential: Credential) {
        match self.slot.write() {
            Ok(mut guard) => *guard = Some(credential),
            Err(poisoned) => *poisoned.into_inner() = Some(credential),
        }
    }

    fn clear(&self) {
        match self.slot.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}
