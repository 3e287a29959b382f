// crates/api-hub-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI Message Catalog Tests
// Description: Unit tests for catalog integrity and placeholder substitution.
// Purpose: Ensure CLI wording stays consistent and lookups never panic.
// Dependencies: api-hub-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies catalog keys are unique, placeholders are substituted, and unknown
//! keys fall back to the key itself.

use std::collections::BTreeSet;

use crate::i18n::CATALOG_ITEMS;
use crate::i18n::MessageArg;
use crate::i18n::translate;

#[test]
fn catalog_keys_are_unique() {
    let keys: BTreeSet<&str> = CATALOG_ITEMS.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys.len(), CATALOG_ITEMS.len(), "duplicate catalog key");
}

#[test]
fn translate_substitutes_placeholders() {
    let output = translate(
        "task.move.ok",
        vec![
            MessageArg::new("task", "t-1"),
            MessageArg::new("from", "planning"),
            MessageArg::new("to", "done"),
        ],
    );
    assert_eq!(output, "Moved task t-1: planning -> done.");
}

#[test]
fn translate_without_args_returns_template() {
    assert_eq!(translate("config.validate.ok", Vec::new()), "Config valid.");
}

#[test]
fn unknown_keys_fall_back_to_the_key() {
    assert_eq!(translate("missing.key", vec![MessageArg::new("x", "y")]), "missing.key");
}

#[test]
fn macro_formats_display_values() {
    let output = crate::t!(
        "input.read_too_large",
        kind = "contract",
        path = "c.json",
        size = 10_u64,
        limit = 4_usize
    );
    assert_eq!(output, "Refusing to read contract at c.json because it is 10 bytes (limit 4).");
}
