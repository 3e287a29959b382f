// crates/api-hub-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Provides the message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings so wording stays consistent.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The API Hub CLI keeps user-facing strings in a small catalog. All runtime
//! output should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself to avoid panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
pub(crate) const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "api-hub {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to render JSON output: {error}"),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.not_utf8", "{kind} at {path} must be UTF-8."),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("serve.config.load_failed", "Failed to load config: {error}"),
    ("serve.init_failed", "Failed to initialize server: {error}"),
    ("serve.listening", "API Hub listening on {bind}"),
    ("serve.failed", "Server failed: {error}"),
    (
        "store.memory_ephemeral",
        "Note: store.type=memory. Changes made by this command are discarded on exit.",
    ),
    ("store.open_failed", "Failed to open store: {error}"),
    ("service.failed", "Request failed: {error}"),
    ("task.delete.ok", "Deleted task {task}."),
    ("task.move.ok", "Moved task {task}: {from} -> {to}."),
    ("task.move.unchanged", "Task {task} is already in {status}."),
    ("task.move.failed", "Move failed and was rolled back: {error}"),
    ("task.board.column", "{status} ({count})"),
    ("task.board.entry", "  {id}  {priority}  {title}"),
    ("contract.set.ok", "Stored contract for task {task}."),
    ("contract.clear.ok", "Cleared contract for task {task}."),
    ("contract.malformed", "Contract at {path} was not stored: {error}"),
    ("mock.body_malformed", "Mock body at {path} was not stored: {error}"),
    ("mock.resolve.missing_task", "Task ID required."),
    (
        "mock.resolve.not_found",
        "Mock response not found for task {task} scenario {scenario} (available: {available}).",
    ),
    ("mock.resolve.none_available", "none"),
    ("mock.resolve.internal", "Mock lookup failed: {error}"),
    ("key.grant.invalid", "Invalid grant {grant}; expected PROJECT_ID=none|read|read_write."),
    ("key.create.secret_notice", "Store this secret now; it cannot be shown again."),
    ("export.render_failed", "Failed to render export: {error}"),
    ("export.write_failed", "Failed to write export to {path}: {error}"),
    ("export.written", "Wrote {path}"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static catalog used by the CLI.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
