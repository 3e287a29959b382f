// crates/api-hub-core/src/core/mod.rs
// ============================================================================
// Module: API Hub Core Types
// Description: Canonical API Hub records and value types.
// Purpose: Provide stable, serializable types for projects, tasks, and keys.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Core types define the records tracked by API Hub. They are the canonical
//! source of truth for every derived surface (HTTP, CLI, exports).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod api_key;
pub mod contract;
pub mod hashing;
pub mod identifiers;
pub mod mock;
pub mod model;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api_key::Access;
pub use api_key::ApiKey;
pub use api_key::ApiKeyRequest;
pub use api_key::IssuedApiKey;
pub use api_key::KEY_PREFIX;
pub use api_key::KeyError;
pub use api_key::ProjectPermission;
pub use api_key::issue_api_key;
pub use api_key::normalize_permissions;
pub use api_key::verify_secret;
pub use contract::Contract;
pub use contract::OpaqueJsonError;
pub use contract::ParameterDef;
pub use contract::ResponseDef;
pub use contract::parse_opaque_json;
pub use hashing::sha256_hex;
pub use identifiers::ApiKeyId;
pub use identifiers::MockResponseId;
pub use identifiers::ProjectId;
pub use identifiers::TaskId;
pub use mock::DEFAULT_SCENARIO;
pub use mock::MockError;
pub use mock::MockResponse;
pub use mock::MockUpsert;
pub use mock::scenario_template;
pub use model::ApiType;
pub use model::ParseEnumError;
pub use model::Priority;
pub use model::Project;
pub use model::Task;
pub use model::TaskStatus;
pub use time::Timestamp;
