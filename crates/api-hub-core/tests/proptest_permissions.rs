// crates/api-hub-core/tests/proptest_permissions.rs
// ============================================================================
// Module: API Key Permission Property Tests
// Description: Property checks for permission normalization and key issuance.
// ============================================================================
//! ## Overview
//! Normalized permissions never carry `none`, name each project at most once,
//! and keep the last grant requested per project.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use api_hub_core::Access;
use api_hub_core::ApiKeyRequest;
use api_hub_core::ProjectId;
use api_hub_core::ProjectPermission;
use api_hub_core::Timestamp;
use api_hub_core::issue_api_key;
use api_hub_core::normalize_permissions;
use api_hub_core::verify_secret;
use proptest::prelude::*;

fn access_strategy() -> impl Strategy<Value = Access> {
    prop_oneof![Just(Access::None), Just(Access::Read), Just(Access::ReadWrite)]
}

fn permissions_strategy() -> impl Strategy<Value = Vec<ProjectPermission>> {
    prop::collection::vec(
        ("[a-e]", access_strategy()).prop_map(|(project, access)| ProjectPermission {
            project_id: ProjectId::new(project),
            access,
        }),
        0 .. 12,
    )
}

proptest! {
    #[test]
    fn normalized_permissions_drop_none_and_keep_last(permissions in permissions_strategy()) {
        let mut expected = BTreeMap::new();
        for permission in &permissions {
            expected.insert(permission.project_id.clone(), permission.access);
        }
        expected.retain(|_, access| *access != Access::None);

        let normalized = normalize_permissions(permissions);
        let projects: BTreeSet<_> = normalized.iter().map(|p| p.project_id.clone()).collect();
        prop_assert_eq!(projects.len(), normalized.len());
        prop_assert!(normalized.iter().all(|p| p.access != Access::None));
        let actual: BTreeMap<_, _> =
            normalized.into_iter().map(|p| (p.project_id, p.access)).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn issued_keys_verify_only_their_own_secret(name in "[a-z]{1,12}") {
        let request = ApiKeyRequest { name, permissions: Vec::new(), created_by: None };
        let first = issue_api_key(request.clone(), Timestamp::now()).unwrap();
        let second = issue_api_key(request, Timestamp::now()).unwrap();
        prop_assert!(verify_secret(&first.key, &first.secret).is_ok());
        prop_assert!(verify_secret(&first.key, &second.secret).is_err());
        prop_assert_ne!(first.key.key_hash, second.key.key_hash);
    }
}
