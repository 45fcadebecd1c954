// Copyright (c) 2025 - Cowboy AI, Inc.
//! Naming properties: names depend only on their inputs

use proptest::prelude::*;
use rim_infrastructure::domain::ResourceType;
use rim_infrastructure::naming;

fn resource_type() -> impl Strategy<Value = ResourceType> {
    prop_oneof![
        Just(ResourceType::Vpc),
        Just(ResourceType::Subnet),
        Just(ResourceType::SecurityGroup),
        Just(ResourceType::Bucket),
        Just(ResourceType::Alarm),
        Just(ResourceType::BackupPlan),
    ]
}

proptest! {
    #[test]
    fn prop_logical_ids_are_alphanumeric_and_stable(
        prefix in "[a-z]{1,12}",
        logical in "[a-z0-9_-]{1,20}",
        kind in resource_type(),
    ) {
        let first = naming::logical_id(&prefix, kind, &logical);
        let second = naming::logical_id(&prefix, kind, &logical);

        prop_assert_eq!(&first, &second);
        prop_assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        prop_assert!(first.starts_with(&naming::pascal_case(&prefix)));
    }

    #[test]
    fn prop_physical_names_are_kebab_case(
        prefix in "[A-Za-z]{1,12}",
        logical in "[A-Za-z0-9_ ]{0,20}",
        kind in resource_type(),
    ) {
        let name = naming::resource_name(&prefix, kind, &logical);

        prop_assert!(name.ends_with(kind.kind()));
        prop_assert!(name.starts_with(&prefix.to_ascii_lowercase()));
        prop_assert!(!name.contains("--"));
        prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn prop_asset_ids_depend_only_on_path(path in "[a-z/_]{1,30}") {
        let id = naming::asset_id(&path);

        prop_assert_eq!(&id, &naming::asset_id(&path));
        prop_assert!(id.starts_with("asset."));
        prop_assert_eq!(id.len(), "asset.".len() + 32);
    }
}
