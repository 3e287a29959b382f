// crates/api-hub-core/src/core/api_key.rs
// ============================================================================
// Module: API Hub API Keys
// Description: Scoped API key issuance, hashing, and verification.
// Purpose: Issue secrets once and keep only their SHA-256 digests.
// Dependencies: rand, serde, subtle, thiserror
// ============================================================================

//! ## Overview
//! An API key grants per-project `read` or `read_write` access. The full
//! secret (`ak_` followed by 26 lowercase alphanumerics) is returned exactly
//! once by [`issue_api_key`]; only its display prefix and SHA-256 hex digest
//! are kept. Revocation is one-way.
//!
//! Security posture: presented secrets are untrusted input and are compared
//! against stored digests in constant time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::core::hashing::sha256_hex;
use crate::core::identifiers::ApiKeyId;
use crate::core::identifiers::ProjectId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix carried by every issued secret.
pub const KEY_PREFIX: &str = "ak_";

/// Number of random characters after the prefix.
const SECRET_RANDOM_LEN: usize = 26;

/// Number of random characters shown in the display prefix.
const DISPLAY_PREFIX_LEN: usize = 8;

/// Alphabet for random secret characters.
const SECRET_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// API key issuance and verification errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key name is empty or whitespace.
    #[error("api key name must be non-empty")]
    EmptyName,
    /// Key has been revoked.
    #[error("api key is revoked")]
    Revoked,
    /// Presented secret does not match the stored digest.
    #[error("api key secret does not match")]
    SecretMismatch,
}

// ============================================================================
// SECTION: Permissions
// ============================================================================

/// Access level granted on one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// No access; never persisted.
    None,
    /// Read-only access.
    Read,
    /// Read and write access.
    ReadWrite,
}

impl Access {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Read => "read",
            Self::ReadWrite => "read_write",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access grant for one project, keyed by stable project id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectPermission {
    /// Project the grant applies to.
    pub project_id: ProjectId,
    /// Granted access.
    pub access: Access,
}

/// Drops `none` grants and keeps the last grant per project, ordered by project id.
#[must_use]
pub fn normalize_permissions(permissions: Vec<ProjectPermission>) -> Vec<ProjectPermission> {
    let mut by_project = BTreeMap::new();
    for permission in permissions {
        by_project.insert(permission.project_id, permission.access);
    }
    by_project
        .into_iter()
        .filter(|(_, access)| *access != Access::None)
        .map(|(project_id, access)| ProjectPermission { project_id, access })
        .collect()
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Stored API key metadata. Never holds the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    /// Key identifier.
    pub id: ApiKeyId,
    /// Display name.
    pub name: String,
    /// Display prefix (`ak_` plus the first 8 random characters).
    pub key_prefix: String,
    /// Lowercase hex SHA-256 of the full secret.
    pub key_hash: String,
    /// Per-project grants; never contains `none`.
    pub permissions: Vec<ProjectPermission>,
    /// Optional creator label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last successful use, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<Timestamp>,
    /// Revocation time; set once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<Timestamp>,
}

impl ApiKey {
    /// Returns true when the key has been revoked.
    #[must_use]
    pub const fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns the access granted on a project.
    #[must_use]
    pub fn access_for(&self, project_id: &ProjectId) -> Access {
        self.permissions
            .iter()
            .find(|permission| &permission.project_id == project_id)
            .map_or(Access::None, |permission| permission.access)
    }
}

/// Request to issue a new API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRequest {
    /// Display name.
    pub name: String,
    /// Requested grants; `none` entries are dropped.
    #[serde(default)]
    pub permissions: Vec<ProjectPermission>,
    /// Optional creator label.
    #[serde(default)]
    pub created_by: Option<String>,
}

/// Newly issued key together with its one-time secret.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct IssuedApiKey {
    /// Stored metadata.
    pub key: ApiKey,
    /// Full secret; shown once and never stored.
    pub secret: String,
}

impl fmt::Debug for IssuedApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedApiKey")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// SECTION: Issuance
// ============================================================================

/// Issues a new API key.
///
/// # Errors
///
/// Returns [`KeyError::EmptyName`] when the name is blank.
pub fn issue_api_key(request: ApiKeyRequest, now: Timestamp) -> Result<IssuedApiKey, KeyError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(KeyError::EmptyName);
    }
    let random = random_secret_body();
    let secret = format!("{KEY_PREFIX}{random}");
    let key = ApiKey {
        id: ApiKeyId::generate(),
        name: name.to_string(),
        key_prefix: format!("{KEY_PREFIX}{}", &random[.. DISPLAY_PREFIX_LEN]),
        key_hash: sha256_hex(secret.as_bytes()),
        permissions: normalize_permissions(request.permissions),
        created_by: request.created_by,
        created_at: now,
        last_used_at: None,
        revoked_at: None,
    };
    Ok(IssuedApiKey { key, secret })
}

/// Verifies a presented secret against a stored key.
///
/// # Errors
///
/// Returns [`KeyError::Revoked`] for revoked keys and
/// [`KeyError::SecretMismatch`] when the digest differs.
pub fn verify_secret(key: &ApiKey, presented: &str) -> Result<(), KeyError> {
    if key.is_revoked() {
        return Err(KeyError::Revoked);
    }
    let digest = sha256_hex(presented.as_bytes());
    if bool::from(digest.as_bytes().ct_eq(key.key_hash.as_bytes())) {
        Ok(())
    } else {
        Err(KeyError::SecretMismatch)
    }
}

/// Returns the random part of a new secret.
fn random_secret_body() -> String {
    let mut rng = rand::thread_rng();
    (0 .. SECRET_RANDOM_LEN)
        .map(|_| char::from(SECRET_ALPHABET[rng.gen_range(0 .. SECRET_ALPHABET.len())]))
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use super::Access;
    use super::ApiKeyRequest;
    use super::KeyError;
    use super::ProjectPermission;
    use super::issue_api_key;
    use super::normalize_permissions;
    use super::verify_secret;
    use crate::core::hashing::sha256_hex;
    use crate::core::identifiers::ProjectId;
    use crate::core::time::Timestamp;

    fn grant(project: &str, access: Access) -> ProjectPermission {
        ProjectPermission { project_id: ProjectId::new(project), access }
    }

    #[test]
    fn issued_secret_has_expected_shape() {
        let request =
            ApiKeyRequest { name: "ci".to_string(), permissions: Vec::new(), created_by: None };
        let issued = issue_api_key(request, Timestamp::now()).unwrap();
        assert!(issued.secret.starts_with("ak_"));
        assert_eq!(issued.secret.len(), 29);
        let random = &issued.secret[3 ..];
        assert!(random.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit()));
        assert_eq!(issued.key.key_prefix, issued.secret[.. 11]);
        assert_eq!(issued.key.key_hash, sha256_hex(issued.secret.as_bytes()));
        assert!(!format!("{issued:?}").contains(&issued.secret));
    }

    #[test]
    fn none_permissions_are_dropped_and_last_grant_wins() {
        let normalized = normalize_permissions(vec![
            grant("b", Access::Read),
            grant("a", Access::None),
            grant("b", Access::ReadWrite),
            grant("c", Access::Read),
            grant("c", Access::None),
        ]);
        assert_eq!(normalized, vec![grant("b", Access::ReadWrite)]);
    }

    #[test]
    fn blank_name_is_rejected() {
        let request =
            ApiKeyRequest { name: "  ".to_string(), permissions: Vec::new(), created_by: None };
        assert_eq!(issue_api_key(request, Timestamp::now()).unwrap_err(), KeyError::EmptyName);
    }

    #[test]
    fn verify_secret_checks_hash_and_revocation() {
        let request = ApiKeyRequest {
            name: "deploy".to_string(),
            permissions: vec![grant("p1", Access::Read)],
            created_by: Some("ops".to_string()),
        };
        let issued = issue_api_key(request, Timestamp::now()).unwrap();
        assert_eq!(verify_secret(&issued.key, &issued.secret), Ok(()));
        assert_eq!(verify_secret(&issued.key, "ak_wrong"), Err(KeyError::SecretMismatch));
        assert_eq!(issued.key.access_for(&ProjectId::new("p1")), Access::Read);
        assert_eq!(issued.key.access_for(&ProjectId::new("p2")), Access::None);

        let mut revoked = issued.key.clone();
        revoked.revoked_at = Some(Timestamp::now());
        assert_eq!(verify_secret(&revoked, &issued.secret), Err(KeyError::Revoked));
    }
}
