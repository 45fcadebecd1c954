// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloud Assembly Rendering
//!
//! The render pass turns a committed [`DeploymentGraph`] into the
//! deployment-plan artifact: a manifest describing every stack (its
//! environment, template file, stack-level dependencies, assets and
//! warnings) plus one CloudFormation template per stack.
//!
//! Tags are applied here, uniformly, in the shape each resource type
//! accepts. Everything is ordered, so rendering the same graph twice gives
//! byte-identical output.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::domain::TagFormat;
use crate::errors::InfrastructureResult;
use crate::graph::DeploymentGraph;
use crate::template::{Resource, Stack, Template};

/// Manifest schema version
pub const MANIFEST_VERSION: &str = "21.0.0";

pub const MANIFEST_FILE: &str = "manifest.json";

const STACK_ARTIFACT: &str = "aws:cloudformation:stack";
const WARNING_METADATA: &str = "aws:cdk:warning";

/// Template properties of a stack artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactProperties {
    pub template_file: String,
}

/// Directory asset uploaded by the deployment engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetEntry {
    pub id: String,
    pub path: String,
    pub packaging: &'static str,
}

/// One metadata record attached to a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    #[serde(rename = "type")]
    pub entry_type: &'static str,
    pub data: String,
}

/// Manifest entry of one stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackArtifact {
    #[serde(rename = "type")]
    pub artifact_type: &'static str,
    pub environment: String,
    pub properties: ArtifactProperties,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetEntry>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Vec<MetadataEntry>>,
}

impl StackArtifact {
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.metadata
            .values()
            .flatten()
            .filter(|entry| entry.entry_type == WARNING_METADATA)
            .map(|entry| entry.data.as_str())
    }
}

/// Assembly manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub version: &'static str,
    pub artifacts: BTreeMap<String, StackArtifact>,
}

/// Rendered deployment plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudAssembly {
    pub manifest: Manifest,
    /// Templates keyed by file name
    pub templates: BTreeMap<String, Template>,
}

impl CloudAssembly {
    /// Render all stacks of `graph`
    pub fn from_graph(graph: &DeploymentGraph) -> InfrastructureResult<Self> {
        let mut artifacts = BTreeMap::new();
        let mut templates = BTreeMap::new();

        for stack in graph.stacks() {
            let template_file = template_file(stack.name());
            let mut template = stack.template().clone();
            for resource in template.resources.values_mut() {
                apply_tags(resource, graph.tags());
            }

            debug!(
                stack = %stack.name(),
                template = %template_file,
                "Rendered template"
            );
            artifacts.insert(stack.name().to_string(), artifact(stack, &template_file));
            templates.insert(template_file, template);
        }

        info!(stacks = artifacts.len(), "Rendered cloud assembly");
        Ok(Self {
            manifest: Manifest {
                version: MANIFEST_VERSION,
                artifacts,
            },
            templates,
        })
    }

    pub fn template(&self, stack_name: &str) -> Option<&Template> {
        self.templates.get(&template_file(stack_name))
    }

    pub fn artifact(&self, stack_name: &str) -> Option<&StackArtifact> {
        self.manifest.artifacts.get(stack_name)
    }

    /// The whole assembly as one pretty-printed JSON document
    pub fn to_json_string(&self) -> InfrastructureResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the manifest and every template into `dir`
    ///
    /// `dir` is replaced as a whole. Documents are serialized and written
    /// into a sibling staging directory first, which is then renamed into
    /// place. A failure at any step leaves `dir` as it was.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> InfrastructureResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        if dir.exists() && !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} exists and is not a directory", dir.display()),
            )
            .into());
        }

        let mut documents = vec![(
            MANIFEST_FILE.to_string(),
            serde_json::to_string_pretty(&self.manifest)?,
        )];
        for (file, template) in &self.templates {
            documents.push((file.clone(), serde_json::to_string_pretty(template)?));
        }

        let dir = absolute_dir(dir)?;
        let staging = sibling(&dir, "staging")?;
        let previous = sibling(&dir, "previous")?;
        remove_if_present(&staging)?;
        remove_if_present(&previous)?;

        let result = stage(&staging, &documents)
            .and_then(|()| swap_into_place(&staging, &dir, &previous));
        if let Err(err) = result {
            if let Err(cleanup) = remove_if_present(&staging) {
                warn!(path = %staging.display(), error = %cleanup, "Failed to remove staging directory");
            }
            return Err(err.into());
        }

        info!(path = %dir.display(), files = documents.len(), "Wrote cloud assembly");
        Ok(documents
            .into_iter()
            .map(|(file, _)| dir.join(file))
            .collect())
    }
}

/// `dir` with a final component, so siblings can be named after it
fn absolute_dir(dir: &Path) -> io::Result<PathBuf> {
    if dir.file_name().is_some() {
        return Ok(dir.to_path_buf());
    }
    dir.canonicalize()
}

/// `.<name>.<suffix>` next to `dir`
fn sibling(dir: &Path, suffix: &str) -> io::Result<PathBuf> {
    let name = dir.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no directory name", dir.display()),
        )
    })?;
    Ok(dir.with_file_name(format!(".{}.{}", name.to_string_lossy(), suffix)))
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn stage(staging: &Path, documents: &[(String, String)]) -> io::Result<()> {
    fs::create_dir_all(staging)?;
    for (file, contents) in documents {
        let path = staging.join(file);
        fs::write(&path, contents)?;
        debug!(path = %path.display(), "Staged assembly file");
    }
    Ok(())
}

/// Move `staging` to `dir`, parking any existing `dir` at `previous` until
/// the rename succeeds
fn swap_into_place(staging: &Path, dir: &Path, previous: &Path) -> io::Result<()> {
    let replacing = dir.exists();
    if replacing {
        fs::rename(dir, previous)?;
    }

    if let Err(err) = fs::rename(staging, dir) {
        if replacing {
            fs::rename(previous, dir)?;
        }
        return Err(err);
    }

    if replacing {
        if let Err(err) = fs::remove_dir_all(previous) {
            warn!(path = %previous.display(), error = %err, "Failed to remove previous assembly");
        }
    }
    Ok(())
}

pub fn template_file(stack_name: &str) -> String {
    format!("{}.template.json", stack_name)
}

fn artifact(stack: &Stack, template_file: &str) -> StackArtifact {
    let mut metadata = BTreeMap::new();
    if !stack.warnings().is_empty() {
        metadata.insert(
            format!("/{}", stack.name()),
            stack
                .warnings()
                .iter()
                .map(|warning| MetadataEntry {
                    entry_type: WARNING_METADATA,
                    data: warning.clone(),
                })
                .collect(),
        );
    }

    StackArtifact {
        artifact_type: STACK_ARTIFACT,
        environment: stack.environment().uri(),
        properties: ArtifactProperties {
            template_file: template_file.to_string(),
        },
        dependencies: stack.dependencies().iter().cloned().collect(),
        assets: stack
            .assets()
            .iter()
            .map(|(id, path)| AssetEntry {
                id: id.clone(),
                path: path.to_string_lossy().into_owned(),
                packaging: "zip",
            })
            .collect(),
        metadata,
    }
}

/// Merge `tags` into the resource in its native tag shape
///
/// Tags already on the resource keep their values. Entries end up sorted
/// by key.
pub fn apply_tags(resource: &mut Resource, tags: &BTreeMap<String, String>) {
    if tags.is_empty() {
        return;
    }

    match resource.kind.tag_format() {
        TagFormat::None => {}
        TagFormat::KeyValueList => {
            let merged = merge_list(resource.properties.get("Tags"), tags);
            let list = merged
                .into_iter()
                .map(|(key, value)| json!({ "Key": key, "Value": value }))
                .collect();
            resource.properties.insert("Tags".to_string(), Value::Array(list));
        }
        TagFormat::AutoScaling => {
            let merged = merge_list(resource.properties.get("Tags"), tags);
            let list = merged
                .into_iter()
                .map(|(key, value)| json!({ "Key": key, "PropagateAtLaunch": true, "Value": value }))
                .collect();
            resource.properties.insert("Tags".to_string(), Value::Array(list));
        }
        TagFormat::Map(property) => {
            let mut map = match resource.properties.get(property) {
                Some(Value::Object(existing)) => existing.clone(),
                _ => Map::new(),
            };
            for (key, value) in tags {
                map.entry(key.clone()).or_insert_with(|| json!(value));
            }
            resource
                .properties
                .insert(property.to_string(), Value::Object(map));
        }
    }
}

fn merge_list(existing: Option<&Value>, tags: &BTreeMap<String, String>) -> BTreeMap<String, Value> {
    let mut merged: BTreeMap<String, Value> = tags
        .iter()
        .map(|(key, value)| (key.clone(), json!(value)))
        .collect();

    if let Some(Value::Array(entries)) = existing {
        for entry in entries {
            if let (Some(Value::String(key)), Some(value)) = (entry.get("Key"), entry.get("Value")) {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceType;
    use crate::template::properties;
    use pretty_assertions::assert_eq;

    fn tags() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("Project".to_string(), "rim".to_string()),
            ("Creator".to_string(), "alice".to_string()),
        ])
    }

    #[test]
    fn test_key_value_tags_sorted_and_merged() {
        let mut instance = Resource::new(
            ResourceType::Instance,
            properties(json!({ "Tags": [{ "Key": "Name", "Value": "alice-bastion-host" }] })),
        );
        apply_tags(&mut instance, &tags());
        assert_eq!(
            instance.properties["Tags"],
            json!([
                { "Key": "Creator", "Value": "alice" },
                { "Key": "Name", "Value": "alice-bastion-host" },
                { "Key": "Project", "Value": "rim" },
            ])
        );
    }

    #[test]
    fn test_autoscaling_tags_propagate() {
        let mut asg = Resource::new(ResourceType::AutoScalingGroup, Map::new());
        apply_tags(&mut asg, &tags());
        assert_eq!(asg.properties["Tags"][0]["PropagateAtLaunch"], true);
        assert_eq!(asg.properties["Tags"][0]["Key"], "Creator");
    }

    #[test]
    fn test_map_tags() {
        let mut vault = Resource::new(ResourceType::BackupVault, Map::new());
        apply_tags(&mut vault, &tags());
        assert_eq!(
            vault.properties["BackupVaultTags"],
            json!({ "Creator": "alice", "Project": "rim" })
        );
    }

    #[test]
    fn test_untaggable_resource_untouched() {
        let mut alarm = Resource::new(ResourceType::Alarm, Map::new());
        apply_tags(&mut alarm, &tags());
        assert!(alarm.properties.is_empty());
    }

    #[test]
    fn test_template_file_name() {
        assert_eq!(template_file("AliceRimVpcStack"), "AliceRimVpcStack.template.json");
    }
}
