// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Builder
//!
//! A [`Stack`] is one deployment unit under construction. Unit constructors
//! declare resources into it, consume handles published by earlier units,
//! and resolve handle attributes into template values. A value that lives
//! in another stack resolves to `Fn::ImportValue`; the graph adds the
//! matching export to the producer when the stack is committed.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{intrinsic, Export, Output, Parameter, Resource, Template};
use crate::domain::handles::Handle;
use crate::domain::invariants::{self, ValidationError};
use crate::domain::{HandleKind, ResourceType, UnitKind};
use crate::errors::InfrastructureResult;
use crate::naming;

/// Target account and region of a stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Environment {
    pub account: String,
    pub region: String,
}

impl Environment {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }

    /// `aws://<account>/<region>`
    pub fn uri(&self) -> String {
        format!("aws://{}/{}", self.account, self.region)
    }
}

/// A provider-side value published by one stack
///
/// Either the resource's primary reference (`Ref`) or one of its
/// attributes (`Fn::GetAtt`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExportedValue {
    pub stack: String,
    pub logical_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl ExportedValue {
    pub fn export_name(&self) -> String {
        naming::export_name(&self.stack, &self.logical_id, self.attribute.as_deref())
    }

    pub fn output_key(&self) -> String {
        naming::output_key(&self.logical_id, self.attribute.as_deref())
    }

    /// The value as written inside its own stack
    pub fn local_value(&self) -> Value {
        match &self.attribute {
            Some(attribute) => intrinsic::get_att(&self.logical_id, attribute),
            None => intrinsic::reference(&self.logical_id),
        }
    }
}

/// Reference to a resource declared in a stack
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    stack: String,
    logical_id: String,
}

impl ResourceRef {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `{"Ref": id}` for use inside the declaring stack
    pub fn ref_value(&self) -> Value {
        intrinsic::reference(&self.logical_id)
    }

    /// `{"Fn::GetAtt": [id, attribute]}` for use inside the declaring stack
    pub fn get_att(&self, attribute: &str) -> Value {
        intrinsic::get_att(&self.logical_id, attribute)
    }

    /// Publishable form of the primary reference
    pub fn exported(&self) -> ExportedValue {
        ExportedValue {
            stack: self.stack.clone(),
            logical_id: self.logical_id.clone(),
            attribute: None,
        }
    }

    /// Publishable form of an attribute
    pub fn exported_attribute(&self, attribute: &str) -> ExportedValue {
        ExportedValue {
            stack: self.stack.clone(),
            logical_id: self.logical_id.clone(),
            attribute: Some(attribute.to_string()),
        }
    }
}

/// One deployment unit under construction
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    unit: UnitKind,
    prefix: String,
    environment: Environment,
    template: Template,
    consumed: BTreeMap<HandleKind, String>,
    consumed_values: BTreeSet<ExportedValue>,
    imports: BTreeSet<ExportedValue>,
    dependencies: BTreeSet<String>,
    assets: BTreeMap<String, PathBuf>,
    warnings: Vec<String>,
}

impl Stack {
    pub(crate) fn new(
        name: String,
        unit: UnitKind,
        prefix: String,
        environment: Environment,
    ) -> Self {
        let description = Some(format!("{} for {}", unit, prefix));
        Self {
            name,
            unit,
            prefix,
            environment,
            template: Template::new(description),
            consumed: BTreeMap::new(),
            consumed_values: BTreeSet::new(),
            imports: BTreeSet::new(),
            dependencies: BTreeSet::new(),
            assets: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> UnitKind {
        self.unit
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Handles consumed by this unit and the stacks that produced them
    pub fn consumed(&self) -> &BTreeMap<HandleKind, String> {
        &self.consumed
    }

    /// Values published by the consumed handles
    pub fn consumed_values(&self) -> &BTreeSet<ExportedValue> {
        &self.consumed_values
    }

    pub fn imports(&self) -> &BTreeSet<ExportedValue> {
        &self.imports
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Directory assets referenced by this stack, keyed by asset id
    pub fn assets(&self) -> &BTreeMap<String, PathBuf> {
        &self.assets
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Physical name for a resource of this stack
    pub fn physical_name(&self, kind: ResourceType, logical: &str) -> String {
        naming::resource_name(&self.prefix, kind, logical)
    }

    /// Declare a resource with the given properties
    pub fn declare(
        &mut self,
        kind: ResourceType,
        logical: &str,
        properties: Map<String, Value>,
    ) -> InfrastructureResult<ResourceRef> {
        self.declare_resource(logical, Resource::new(kind, properties))
    }

    /// Declare a fully built resource
    pub fn declare_resource(
        &mut self,
        logical: &str,
        resource: Resource,
    ) -> InfrastructureResult<ResourceRef> {
        let logical_id = naming::logical_id(&self.prefix, resource.kind, logical);
        invariants::validate_logical_id(&logical_id)?;

        if self.template.resources.contains_key(&logical_id) {
            return Err(ValidationError::DuplicateLogicalId {
                stack: self.name.clone(),
                logical_id,
            }
            .into());
        }

        debug!(
            stack = %self.name,
            logical_id = %logical_id,
            resource_type = resource.resource_type,
            "Declared resource"
        );
        self.template.resources.insert(logical_id.clone(), resource);

        Ok(ResourceRef {
            stack: self.name.clone(),
            logical_id,
        })
    }

    /// Record that this unit consumes `handle`
    ///
    /// # Invariant
    /// - This unit must be a declared consumer of the handle's kind
    pub fn consume<H: Handle>(&mut self, handle: &H) -> InfrastructureResult<()> {
        invariants::validate_consumer(handle.kind(), self.unit)?;
        self.consumed
            .insert(handle.kind(), handle.producer().to_string());
        self.consumed_values
            .extend(handle.values().into_iter().cloned());
        Ok(())
    }

    /// Resolve a published value for use in this stack's template
    pub fn resolve(&mut self, value: &ExportedValue) -> Value {
        if value.stack == self.name {
            return value.local_value();
        }

        self.imports.insert(value.clone());
        self.dependencies.insert(value.stack.clone());
        intrinsic::import_value(&value.export_name())
    }

    /// Declare a string parameter and return a reference to it
    ///
    /// Declaring the same key twice keeps the first declaration.
    pub fn add_parameter(&mut self, key: &str, description: &str, default: Option<&str>) -> Value {
        self.template
            .parameters
            .entry(key.to_string())
            .or_insert_with(|| Parameter {
                parameter_type: "String",
                description: description.to_string(),
                default: default.map(str::to_string),
            });
        intrinsic::reference(key)
    }

    /// Add a plain output
    pub fn add_output(&mut self, key: &str, value: Value, description: Option<&str>) {
        self.template.outputs.insert(
            key.to_string(),
            Output {
                description: description.map(str::to_string),
                value,
                export: None,
            },
        );
    }

    /// Publish `value` under its export name (producer side of an import)
    pub(crate) fn add_export(&mut self, value: &ExportedValue) {
        self.template.outputs.insert(
            value.output_key(),
            Output {
                description: None,
                value: value.local_value(),
                export: Some(Export {
                    name: value.export_name(),
                }),
            },
        );
    }

    /// Reference a directory asset; its content is not read
    pub fn add_asset(&mut self, path: &Path) -> String {
        let id = naming::asset_id(&path.to_string_lossy());
        self.assets.insert(id.clone(), path.to_path_buf());
        id
    }

    /// Record a finding that should be reviewed before deployment
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(stack = %self.name, "{}", message);
        self.warnings.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::properties;
    use serde_json::json;

    fn stack(unit: UnitKind, name: &str) -> Stack {
        Stack::new(
            name.to_string(),
            unit,
            "alice".to_string(),
            Environment::new("123456789012", "eu-central-1"),
        )
    }

    #[test]
    fn test_declare_and_duplicate() {
        let mut network = stack(UnitKind::Network, "AliceRimVpcStack");
        let vpc = network
            .declare(ResourceType::Vpc, "main", properties(json!({ "CidrBlock": "10.0.0.0/16" })))
            .unwrap();
        assert!(vpc.logical_id().starts_with("AliceMainVpc"));

        let duplicate = network.declare(ResourceType::Vpc, "main", Map::new());
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_resolve_local_and_imported() {
        let mut network = stack(UnitKind::Network, "AliceRimVpcStack");
        let vpc = network.declare(ResourceType::Vpc, "main", Map::new()).unwrap();

        let local = network.resolve(&vpc.exported());
        assert_eq!(local, json!({ "Ref": vpc.logical_id() }));
        assert!(network.imports().is_empty());

        let mut compute = stack(UnitKind::Compute, "AliceRimElbAppStack");
        let imported = compute.resolve(&vpc.exported());
        assert_eq!(
            imported,
            json!({ "Fn::ImportValue": format!("AliceRimVpcStack:ExportsOutputRef{}", vpc.logical_id()) })
        );
        assert!(compute.dependencies().contains("AliceRimVpcStack"));
    }

    #[test]
    fn test_add_export() {
        let mut compute = stack(UnitKind::Compute, "AliceRimElbAppStack");
        let alb = compute
            .declare(ResourceType::LoadBalancer, "web", Map::new())
            .unwrap();
        let exported = alb.exported_attribute("LoadBalancerFullName");
        compute.add_export(&exported);

        let output = &compute.template().outputs[&exported.output_key()];
        assert_eq!(output.value, alb.get_att("LoadBalancerFullName"));
        assert_eq!(output.export.as_ref().unwrap().name, exported.export_name());
    }

    #[test]
    fn test_add_asset_is_stable() {
        let mut compute = stack(UnitKind::Compute, "AliceRimElbAppStack");
        let first = compute.add_asset(Path::new("files/s3"));
        let second = compute.add_asset(Path::new("files/s3"));
        assert_eq!(first, second);
        assert_eq!(compute.assets().len(), 1);
    }

    #[test]
    fn test_environment_uri() {
        assert_eq!(
            Environment::new("123456789012", "us-east-1").uri(),
            "aws://123456789012/us-east-1"
        );
    }
}
