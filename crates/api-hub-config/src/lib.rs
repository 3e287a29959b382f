// crates/api-hub-config/src/lib.rs
// ============================================================================
// Module: API Hub Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for api-hub.toml semantics.
// Dependencies: api-hub-core, api-hub-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `api-hub-config` defines the configuration model shared by the HTTP server
//! and the CLI. Loading is strict and fail-closed: unknown keys, oversized
//! files, non-UTF-8 content, and inconsistent settings are rejected before any
//! store is opened.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
