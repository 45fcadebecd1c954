// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Entry Point
//!
//! Builds the six units in their fixed order, threading each unit's
//! handles into the constructors that depend on them.

use tracing::info;

use crate::config::DeploymentConfig;
use crate::domain::UnitKind;
use crate::errors::InfrastructureResult;
use crate::graph::DeploymentGraph;
use crate::stacks::compute::ComputeInputs;
use crate::stacks::edge::{EdgeInputs, EDGE_REGION};
use crate::stacks::{backup, bastion, compute, edge, monitoring, network};
use crate::template::Environment;

/// Construct the complete deployment graph for `config`
///
/// Configuration is checked before any unit is started: a missing input
/// aborts with nothing declared.
pub fn build_deployment(config: &DeploymentConfig) -> InfrastructureResult<DeploymentGraph> {
    config.validate()?;

    let home = Environment::new(&config.account, &config.region);
    let edge_env = Environment::new(&config.account, EDGE_REGION);
    let mut graph = DeploymentGraph::new(&config.owner, config.tags.clone());

    info!(owner = %config.owner, environment = %home.uri(), "Building deployment graph");

    let mut stack = graph.begin(UnitKind::Network, home.clone())?;
    let net = network::build(&mut stack, &config.ingress)?;
    graph.commit(stack)?;

    let mut stack = graph.begin(UnitKind::Compute, home.clone())?;
    let primary_assets = config.primary_assets();
    let app = compute::build(
        &mut stack,
        &net.network,
        &net.web,
        &net.load_balancer,
        ComputeInputs {
            webapp_token: &config.webapp_token,
            hosted_zone_name: &config.hosted_zone_name,
            hosted_zone_id: config.hosted_zone_id.as_deref(),
            ami: &config.ami,
            assets: &primary_assets,
            providers: config.providers(),
        },
    )?;
    graph.commit(stack)?;

    let mut stack = graph.begin(UnitKind::Bastion, home.clone())?;
    let host = bastion::build(
        &mut stack,
        &net.network,
        &net.bastion,
        &config.ami,
        config.key_name.as_deref(),
    )?;
    graph.commit(stack)?;

    let mut stack = graph.begin(UnitKind::Edge, edge_env)?;
    let fallback_assets = config.fallback_assets();
    edge::build(
        &mut stack,
        EdgeInputs {
            webapp_token: &config.webapp_token,
            hosted_zone_name: &config.hosted_zone_name,
            hosted_zone_id: config.hosted_zone_id.as_deref(),
            assets: &fallback_assets,
            providers: config.providers(),
        },
    )?;
    graph.commit(stack)?;

    let mut stack = graph.begin(UnitKind::Monitoring, home.clone())?;
    monitoring::build(
        &mut stack,
        &app.load_balancer,
        &app.auto_scaling_group,
        &config.email,
    )?;
    graph.commit(stack)?;

    let mut stack = graph.begin(UnitKind::Backup, home)?;
    backup::build(&mut stack, &host, &app.bucket)?;
    graph.commit(stack)?;

    info!(units = graph.stacks().len(), "Deployment graph complete");
    Ok(graph)
}
