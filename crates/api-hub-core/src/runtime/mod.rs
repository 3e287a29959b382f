// crates/api-hub-core/src/runtime/mod.rs
// ============================================================================
// Module: API Hub Runtime
// Description: Stores, caching, data access, board moves, and mock resolution.
// Purpose: Provide the behavior layered over the core types and interfaces.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime components implement the data-access layer ([`HubService`] with
//! its [`QueryCache`]), the in-memory store, the Kanban [`Board`] move state
//! machine, and the stateless mock resolver.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod board;
pub mod cache;
pub mod resolver;
pub mod service;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use board::Board;
pub use board::BoardError;
pub use board::MoveOutcome;
pub use board::MoveState;
pub use board::MoveTicket;
pub use cache::CacheGeneration;
pub use cache::CacheKey;
pub use cache::CachePolicy;
pub use cache::CachedValue;
pub use cache::Collection;
pub use cache::QueryCache;
pub use resolver::MockResolution;
pub use resolver::ResolveError;
pub use resolver::resolve_mock;
pub use resolver::resolve_mock_with_default;
pub use service::HubService;
pub use service::KeyAuthorization;
pub use service::ServiceError;
pub use store::InMemoryHubStore;
pub use store::SharedHubStore;
