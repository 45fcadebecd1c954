// Copyright (c) 2025 - Cowboy AI, Inc.
//! Naming Policy
//!
//! Every name in the deployment plan is derived here from
//! `(prefix, resource kind, logical name)`. All functions are pure and
//! deterministic, so re-rendering the graph yields identical names.
//!
//! - Physical names: `<prefix>-<logical>-<kind>` in lowercase kebab case
//! - Logical ids: `<Prefix><Logical><Kind><HASH>` where `HASH` is the first
//!   eight hex digits of a name-based UUID over the construct path
//! - Stack names: `<Owner>Rim<Unit>Stack`

use uuid::Uuid;

use crate::domain::ResourceType;

/// Capitalize the first character and lowercase the rest
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Join alphanumeric segments of `text` in PascalCase
pub fn pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn kebab_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Physical (provider-visible) name of a resource
///
/// # Examples
///
/// ```rust
/// use rim_infrastructure::domain::ResourceType;
/// use rim_infrastructure::naming::resource_name;
///
/// assert_eq!(resource_name("alice", ResourceType::Role, "webapp"), "alice-webapp-role");
/// assert_eq!(resource_name("Alice", ResourceType::BackupVault, "backup"), "alice-backup-vault");
/// ```
pub fn resource_name(prefix: &str, kind: ResourceType, logical: &str) -> String {
    let mut parts = vec![kebab_case(prefix)];
    let logical = kebab_case(logical);
    if !logical.is_empty() {
        parts.push(logical);
    }
    parts.push(kind.kind().to_string());
    parts.retain(|part| !part.is_empty());
    parts.join("-")
}

/// Eight uppercase hex digits identifying a construct path
pub fn path_hash(path: &str) -> String {
    let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, path.as_bytes());
    digest.simple().to_string()[..8].to_ascii_uppercase()
}

/// Identifier of a directory asset: `asset.` followed by 32 hex digits
pub fn asset_id(path: &str) -> String {
    let digest = Uuid::new_v5(&Uuid::NAMESPACE_URL, path.as_bytes());
    format!("asset.{}", digest.simple())
}

/// Template logical id of a resource
pub fn logical_id(prefix: &str, kind: ResourceType, logical: &str) -> String {
    let path = format!("{}/{}/{}", prefix, kind.kind(), logical);
    format!(
        "{}{}{}{}",
        pascal_case(prefix),
        pascal_case(logical),
        pascal_case(kind.kind()),
        path_hash(&path)
    )
}

/// Stack name for a unit, e.g. `AliceRimVpcStack`
pub fn stack_name(owner: &str, unit_suffix: &str) -> String {
    format!("{}Rim{}", capitalize(owner), unit_suffix)
}

/// DNS name of a public endpoint, e.g. `alice.elb.aws.example.com`
pub fn service_domain(owner: &str, service: &str, zone: &str) -> String {
    format!(
        "{}.{}.aws.{}",
        owner.to_lowercase(),
        service,
        zone.trim_end_matches('.')
    )
}

/// Export name under which a producer stack publishes one attribute
pub fn export_name(stack: &str, logical_id: &str, attribute: Option<&str>) -> String {
    match attribute {
        Some(attribute) => format!(
            "{}:ExportsOutputFnGetAtt{}{}",
            stack,
            logical_id,
            pascal_case(attribute)
        ),
        None => format!("{}:ExportsOutputRef{}", stack, logical_id),
    }
}

/// Output key matching an export name inside the producer template
pub fn output_key(logical_id: &str, attribute: Option<&str>) -> String {
    match attribute {
        Some(attribute) => format!(
            "ExportsOutputFnGetAtt{}{}",
            logical_id,
            pascal_case(attribute)
        ),
        None => format!("ExportsOutputRef{}", logical_id),
    }
}
