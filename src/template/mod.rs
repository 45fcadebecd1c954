// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Template Model
//!
//! A minimal, strongly ordered model of a CloudFormation template:
//! resources keyed by logical id, outputs with optional exports, and the
//! intrinsic functions the stacks need. All maps are `BTreeMap`s so the
//! serialized form is identical across renders.

pub mod intrinsic;
pub mod stack;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::domain::ResourceType;

pub use stack::{Environment, ExportedValue, ResourceRef, Stack};

/// Template format version understood by the deployment engine
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// What happens to a resource when it leaves the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemovalPolicy {
    Delete,
}

/// One declared provider resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: &'static str,

    #[serde(skip)]
    pub kind: ResourceType,

    #[serde(rename = "Properties", skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,

    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(rename = "DeletionPolicy", skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<RemovalPolicy>,

    #[serde(rename = "UpdateReplacePolicy", skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<RemovalPolicy>,
}

impl Resource {
    pub fn new(kind: ResourceType, properties: Map<String, Value>) -> Self {
        Self {
            resource_type: kind.cfn_type(),
            kind,
            properties,
            depends_on: Vec::new(),
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    /// Set both deletion and replacement policy
    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self.update_replace_policy = Some(policy);
        self
    }

    pub fn depends_on(mut self, logical_id: impl Into<String>) -> Self {
        let logical_id = logical_id.into();
        if !self.depends_on.contains(&logical_id) {
            self.depends_on.push(logical_id);
            self.depends_on.sort();
        }
        self
    }
}

/// Export block of an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    #[serde(rename = "Name")]
    pub name: String,
}

/// A string input supplied when the template is deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub parameter_type: &'static str,

    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Default", skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// One template output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Output {
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Value")]
    pub value: Value,

    #[serde(rename = "Export", skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

/// A complete template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: &'static str,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Parameters", skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,

    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, Resource>,

    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Template {
    pub fn new(description: Option<String>) -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION,
            description,
            parameters: BTreeMap::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Resources of the given type, in logical id order
    pub fn resources_of(&self, kind: ResourceType) -> impl Iterator<Item = (&String, &Resource)> {
        self.resources
            .iter()
            .filter(move |(_, resource)| resource.kind == kind)
    }

    pub fn count_of(&self, kind: ResourceType) -> usize {
        self.resources_of(kind).count()
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Convert a `json!` object literal into a property map
///
/// Non-object values produce an empty map.
pub fn properties(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
