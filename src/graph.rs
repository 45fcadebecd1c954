// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Graph
//!
//! The graph owns every committed stack. A unit is constructed in two
//! steps: [`DeploymentGraph::begin`] hands out an empty [`Stack`] for the
//! next unit, the unit constructor fills it, and
//! [`DeploymentGraph::commit`] checks the unit's dependencies and wires
//! the cross-stack exports.
//!
//! # Invariants checked at commit
//!
//! - Units arrive in the fixed order, each at most once
//! - Every consumed handle was produced by an earlier stack of this graph,
//!   and by the unit kind that produces that handle kind
//! - Every imported value is published by a handle the unit consumed
//!
//! A violation aborts construction; nothing is rendered.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::assembly::CloudAssembly;
use crate::domain::invariants::{self, ValidationError};
use crate::domain::UnitKind;
use crate::errors::InfrastructureResult;
use crate::naming;
use crate::template::{Environment, Stack};

/// The six-unit deployment under construction
#[derive(Debug, Clone)]
pub struct DeploymentGraph {
    owner: String,
    tags: BTreeMap<String, String>,
    stacks: Vec<Stack>,
}

impl DeploymentGraph {
    pub fn new(owner: impl Into<String>, tags: BTreeMap<String, String>) -> Self {
        Self {
            owner: owner.into(),
            tags,
            stacks: Vec::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Committed stacks in construction order
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn stack(&self, unit: UnitKind) -> Option<&Stack> {
        self.stacks.iter().find(|stack| stack.unit() == unit)
    }

    /// Units committed so far
    pub fn units(&self) -> Vec<UnitKind> {
        self.stacks.iter().map(Stack::unit).collect()
    }

    /// Start constructing `unit` in `environment`
    pub fn begin(&self, unit: UnitKind, environment: Environment) -> InfrastructureResult<Stack> {
        invariants::validate_unit_order(&self.units(), unit)?;

        let name = naming::stack_name(&self.owner, unit.stack_suffix());
        debug!(unit = %unit, stack = %name, "Beginning unit");
        Ok(Stack::new(name, unit, self.owner.clone(), environment))
    }

    /// Check `stack`'s dependencies and add it to the graph
    pub fn commit(&mut self, stack: Stack) -> InfrastructureResult<()> {
        let unit = stack.unit();
        invariants::validate_unit_order(&self.units(), unit)?;

        for (handle, producer) in stack.consumed() {
            let producer_unit = self
                .stacks
                .iter()
                .find(|committed| committed.name() == producer)
                .map(Stack::unit);
            invariants::validate_producer(*handle, producer, producer_unit, unit)?;
        }

        for import in stack.imports() {
            if !stack.consumed_values().contains(import) {
                return Err(ValidationError::UnconsumedImport {
                    consumer: unit,
                    export: import.export_name(),
                }
                .into());
            }
        }

        for import in stack.imports() {
            if let Some(producer) = self
                .stacks
                .iter_mut()
                .find(|committed| committed.name() == import.stack)
            {
                producer.add_export(import);
            }
        }

        info!(
            unit = %unit,
            stack = %stack.name(),
            resources = stack.template().resources.len(),
            imports = stack.imports().len(),
            "Committed unit"
        );
        self.stacks.push(stack);
        Ok(())
    }

    /// Render every committed stack into one cloud assembly
    pub fn render(&self) -> InfrastructureResult<CloudAssembly> {
        CloudAssembly::from_graph(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngressPolicy;
    use crate::domain::handles::{BucketHandle, NetworkHandle};
    use crate::domain::{Ipv4Cidr, ResourceType};
    use crate::stacks::network;
    use crate::errors::InfrastructureError;
    use serde_json::Map;

    fn env() -> Environment {
        Environment::new("123456789012", "eu-central-1")
    }

    fn network_unit(graph: &mut DeploymentGraph) -> NetworkHandle {
        let mut stack = graph.begin(UnitKind::Network, env()).unwrap();
        let vpc = stack.declare(ResourceType::Vpc, "main", Map::new()).unwrap();
        let handle = NetworkHandle {
            producer: stack.name().to_string(),
            vpc_id: vpc.exported(),
            cidr: Ipv4Cidr::new("10.0.0.0/16").unwrap(),
            public_subnets: vec![],
            isolated_subnets: vec![],
        };
        graph.commit(stack).unwrap();
        handle
    }

    #[test]
    fn test_commit_wires_exports() {
        let mut graph = DeploymentGraph::new("alice", BTreeMap::new());
        let network = network_unit(&mut graph);

        let mut compute = graph.begin(UnitKind::Compute, env()).unwrap();
        compute.consume(&network).unwrap();
        compute.resolve(&network.vpc_id);
        graph.commit(compute).unwrap();

        let producer = graph.stack(UnitKind::Network).unwrap();
        assert!(producer
            .template()
            .outputs
            .contains_key(&network.vpc_id.output_key()));
        assert_eq!(graph.units(), vec![UnitKind::Network, UnitKind::Compute]);
    }

    #[test]
    fn test_out_of_order_begin() {
        let mut graph = DeploymentGraph::new("alice", BTreeMap::new());
        network_unit(&mut graph);
        let backup = graph.begin(UnitKind::Backup, env()).unwrap();
        graph.commit(backup).unwrap();

        let result = graph.begin(UnitKind::Monitoring, env());
        assert!(matches!(
            result,
            Err(InfrastructureError::Validation(ValidationError::OutOfOrder { .. }))
        ));
    }

    #[test]
    fn test_duplicate_unit() {
        let mut graph = DeploymentGraph::new("alice", BTreeMap::new());
        network_unit(&mut graph);
        assert!(matches!(
            graph.begin(UnitKind::Network, env()),
            Err(InfrastructureError::Validation(ValidationError::DuplicateUnit(UnitKind::Network)))
        ));
    }

    #[test]
    fn test_import_without_consuming() {
        let mut graph = DeploymentGraph::new("alice", BTreeMap::new());
        let network = network_unit(&mut graph);

        let mut compute = graph.begin(UnitKind::Compute, env()).unwrap();
        compute.resolve(&network.vpc_id);
        assert!(matches!(
            graph.commit(compute),
            Err(InfrastructureError::Validation(ValidationError::UnconsumedImport { .. }))
        ));
    }

    #[test]
    fn test_import_outside_consumed_handle() {
        // Arrange
        let mut graph = DeploymentGraph::new("alice", BTreeMap::new());
        let mut stack = graph.begin(UnitKind::Network, env()).unwrap();
        let net = network::build(&mut stack, &IngressPolicy::default()).unwrap();
        graph.commit(stack).unwrap();

        // Act: same producer stack, but the bastion group is not compute's to use
        let mut compute = graph.begin(UnitKind::Compute, env()).unwrap();
        compute.consume(&net.network).unwrap();
        compute.resolve(&net.bastion.group_id);
        let result = graph.commit(compute);

        // Assert
        assert!(matches!(
            result,
            Err(InfrastructureError::Validation(ValidationError::UnconsumedImport {
                consumer: UnitKind::Compute,
                ..
            }))
        ));
        assert!(graph
            .stack(UnitKind::Network)
            .unwrap()
            .template()
            .outputs
            .is_empty());
    }

    #[test]
    fn test_import_of_sibling_handle_value() {
        let mut graph = DeploymentGraph::new("alice", BTreeMap::new());
        let network = network_unit(&mut graph);

        let mut compute = graph.begin(UnitKind::Compute, env()).unwrap();
        compute.consume(&network).unwrap();
        let bucket = compute.declare(ResourceType::Bucket, "content", Map::new()).unwrap();
        let alb = compute.declare(ResourceType::LoadBalancer, "webapp", Map::new()).unwrap();
        compute.resolve(&network.vpc_id);
        graph.commit(compute).unwrap();

        let bucket = BucketHandle {
            producer: "AliceRimElbAppStack".to_string(),
            name: bucket.exported(),
            arn: bucket.exported_attribute("Arn"),
            versioned: true,
            auto_delete_objects: false,
        };
        let mut backup = graph.begin(UnitKind::Backup, env()).unwrap();
        backup.consume(&bucket).unwrap();
        backup.resolve(&bucket.arn);
        backup.resolve(&alb.exported());

        assert!(matches!(
            graph.commit(backup),
            Err(InfrastructureError::Validation(ValidationError::UnconsumedImport { .. }))
        ));
    }

    #[test]
    fn test_handle_from_foreign_graph() {
        let mut other = DeploymentGraph::new("bob", BTreeMap::new());
        let foreign = network_unit(&mut other);

        let mut graph = DeploymentGraph::new("alice", BTreeMap::new());
        network_unit(&mut graph);
        let mut compute = graph.begin(UnitKind::Compute, env()).unwrap();
        compute.consume(&foreign).unwrap();

        assert!(matches!(
            graph.commit(compute),
            Err(InfrastructureError::Validation(ValidationError::DependencyOrder { .. }))
        ));
    }
}
