// crates/api-hub-cli/src/lib.rs
// ============================================================================
// Module: API Hub CLI Library
// Description: Shared helpers for the API Hub command-line interface.
// Purpose: Provide the message catalog to the CLI binary and its tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library houses shared CLI utilities, currently the message catalog.
//! The binary entry point (`src/main.rs`) routes every user-facing string
//! through [`t!`] so wording stays consistent across commands.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and translation helpers.
pub mod i18n;

#[cfg(test)]
mod tests;
