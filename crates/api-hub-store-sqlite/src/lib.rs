// crates/api-hub-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Hub Store
// Description: Durable HubStore backend using SQLite.
// Purpose: Persist projects, tasks, mock responses, and API keys on disk.
// Dependencies: api-hub-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`HubStore`](api_hub_core::HubStore)
//! implementation. Tables are created on first open and guarded by a schema
//! version row; foreign keys cascade task deletion to mock responses.
//! Security posture: database contents are untrusted and decoded fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SCHEMA_VERSION;
pub use store::SqliteHubStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
