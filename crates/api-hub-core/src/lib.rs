// crates/api-hub-core/src/lib.rs
// ============================================================================
// Module: API Hub Core Library
// Description: Public API surface for the API Hub core.
// Purpose: Expose domain types, store interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! API Hub core models API development work: projects, tasks moving through a
//! Kanban workflow, free-form request/response contracts, named mock
//! scenarios, and scoped API keys. It is backend-agnostic and integrates with
//! storage through the [`HubStore`] interface.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::HubStore;
pub use interfaces::NewProject;
pub use interfaces::NewTask;
pub use interfaces::StoreError;
pub use interfaces::TaskFields;
pub use interfaces::TaskFilter;
pub use interfaces::TaskPatch;
pub use interfaces::blank_to_none;
pub use runtime::Board;
pub use runtime::BoardError;
pub use runtime::CacheGeneration;
pub use runtime::CacheKey;
pub use runtime::CachePolicy;
pub use runtime::CachedValue;
pub use runtime::Collection;
pub use runtime::HubService;
pub use runtime::KeyAuthorization;
pub use runtime::InMemoryHubStore;
pub use runtime::MockResolution;
pub use runtime::MoveOutcome;
pub use runtime::MoveState;
pub use runtime::MoveTicket;
pub use runtime::QueryCache;
pub use runtime::ResolveError;
pub use runtime::ServiceError;
pub use runtime::SharedHubStore;
pub use runtime::resolve_mock;
pub use runtime::resolve_mock_with_default;
