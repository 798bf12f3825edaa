//! # Credential Store
//!
//! Users are configured with a plaintext password that is hashed once at
//! load time; only the hash is kept. A presented HTTP Basic credential is
//! hashed the same way and looked up by digest.
//!
//! ## Hash construction
//!
//! `SHA-256(name ":" password)`, i.e. the digest of exactly the bytes an
//! HTTP Basic client base64-encodes. The plaintext never outlives
//! configuration loading.

use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::error::ModelError;
use crate::identity::{is_reserved, Identity};

/// SHA-256 digest of a `name:password` pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialHash([u8; 32]);

impl CredentialHash {
    /// Hash a user name and password.
    pub fn compute(name: &str, password: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(b":");
        hasher.update(password.as_bytes());
        Self(hasher.finalize().into())
    }
}

// Digests are redacted so a stray `{:?}` cannot feed an offline guessing attack.
impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash([REDACTED])")
    }
}

/// A credential presented with a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    name: String,
    password: String,
}

impl Credential {
    /// Build a credential from its parts.
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }

    /// Parse the value of an `Authorization` header using the Basic scheme.
    ///
    /// Returns `None` for other schemes, malformed base64, non-UTF-8
    /// payloads, or payloads without a `:` separator.
    pub fn from_authorization(header: &str) -> Option<Self> {
        let (scheme, payload) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = BASE64_STANDARD.decode(payload.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (name, password) = decoded.split_once(':')?;
        Some(Self::new(name, password))
    }

    /// The claimed user name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hash of the presented pair.
    pub fn hash(&self) -> CredentialHash {
        CredentialHash::compute(&self.name, &self.password)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Users known to the gateway, indexed by credential hash.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    by_hash: HashMap<CredentialHash, String>,
}

impl CredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user from a plaintext password.
    ///
    /// # Errors
    ///
    /// Rejects reserved pseudo-principal names and duplicate names.
    pub fn add_user(&mut self, name: &str, password: &str) -> Result<(), ModelError> {
        if is_reserved(name) {
            return Err(ModelError::ReservedUserName(name.to_string()));
        }
        if self.contains_user(name) {
            return Err(ModelError::DuplicateUser(name.to_string()));
        }
        self.by_hash
            .insert(CredentialHash::compute(name, password), name.to_string());
        Ok(())
    }

    /// Whether a user with this name is registered.
    pub fn contains_user(&self, name: &str) -> bool {
        self.by_hash.values().any(|n| n == name)
    }

    /// Resolve a presented credential to an identity.
    ///
    /// Absent or unrecognized credentials yield [`Identity::Anonymous`];
    /// whether that is acceptable is an authorization decision.
    pub fn authenticate(&self, credential: Option<&Credential>) -> Identity {
        let Some(credential) = credential else {
            return Identity::Anonymous;
        };
        match self.by_hash.get(&credential.hash()) {
            Some(name) => Identity::User(name.clone()),
            None => {
                tracing::debug!(user = credential.name(), "credential did not match any user");
                Identity::Anonymous
            }
        }
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    /// Whether no users are registered.
    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}
