// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for rim-infrastructure
//!
//! Deterministic configuration and pre-built graphs shared by the
//! integration tests. Nothing here reads the process environment.
//!
//! # Design Principles
//! - All inputs are fixed constants
//! - Fixtures are the only place that assembles a configuration
//! - Tests inspect rendered JSON, the same artifact the engine receives

#![allow(dead_code)]

use serde_json::Value;
use std::path::Path;

use rim_infrastructure::config;
use rim_infrastructure::naming;
use rim_infrastructure::domain::UnitKind;
use rim_infrastructure::stacks::compute::{self, ComputeInputs, ComputeUnit};
use rim_infrastructure::stacks::monitoring::{self, MonitoringUnit};
use rim_infrastructure::stacks::network::{self, NetworkUnit};
use rim_infrastructure::stacks::CustomResourceProviders;
use rim_infrastructure::template::Environment;
use rim_infrastructure::{
    build_deployment, CloudAssembly, DeploymentConfig, DeploymentGraph, IngressPolicy,
};

pub const OWNER: &str = "alice";
pub const ZONE: &str = "example.com";
pub const TOKEN: &str = "s3cret-token";
pub const EMAIL: &str = "ops@example.com";
pub const ACCOUNT: &str = "123456789012";
pub const REGION: &str = "eu-central-1";

/// Every input the deployment reads, with fixed values
pub fn inputs() -> Vec<(&'static str, &'static str)> {
    vec![
        (config::OWNER, OWNER),
        (config::HOSTED_ZONE_NAME, ZONE),
        (config::WEBAPP_TOKEN, TOKEN),
        (config::EMAIL, EMAIL),
        (config::ACCOUNT, ACCOUNT),
        (config::REGION, REGION),
        (config::CREATOR, "alice"),
        (config::PROJECT, "rim"),
    ]
}

/// Configuration with `missing` absent
pub fn config_without(missing: &str) -> DeploymentConfig {
    let pairs: Vec<(&str, &str)> = inputs()
        .into_iter()
        .filter(|(name, _)| *name != missing)
        .collect();
    DeploymentConfig::from_lookup(move |name| {
        pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    })
    .expect("fixture configuration must parse")
}

pub fn config() -> DeploymentConfig {
    config_without("")
}

/// Configuration admitting traffic only from a documentation range
pub fn restricted_config() -> DeploymentConfig {
    let office = "203.0.113.0/24".parse().expect("valid CIDR");
    DeploymentConfig {
        ingress: IngressPolicy {
            web_ssh: office,
            web_http: office,
            load_balancer_https: office,
            bastion_ssh: office,
        },
        ..config()
    }
}

pub fn graph() -> DeploymentGraph {
    build_deployment(&config()).expect("fixture graph must build")
}

pub fn assembly() -> CloudAssembly {
    graph().render().expect("fixture graph must render")
}

pub fn environment() -> Environment {
    Environment::new(ACCOUNT, REGION)
}

pub fn stack_name(unit: UnitKind) -> String {
    naming::stack_name(OWNER, unit.stack_suffix())
}

/// Rendered template of `unit` as JSON
pub fn template(assembly: &CloudAssembly, unit: UnitKind) -> Value {
    let template = assembly
        .template(&stack_name(unit))
        .expect("unit must be rendered");
    serde_json::to_value(template).expect("template must serialize")
}

/// Resources of a CloudFormation type, in logical id order
pub fn resources_of<'a>(template: &'a Value, cfn_type: &str) -> Vec<&'a Value> {
    template["Resources"]
        .as_object()
        .map(|resources| {
            resources
                .values()
                .filter(|resource| resource["Type"] == cfn_type)
                .collect()
        })
        .unwrap_or_default()
}

/// The single resource of a CloudFormation type
pub fn only_resource<'a>(template: &'a Value, cfn_type: &str) -> &'a Value {
    let found = resources_of(template, cfn_type);
    assert_eq!(found.len(), 1, "expected exactly one {}", cfn_type);
    found[0]
}

/// Every `Fn::ImportValue` name anywhere inside `value`
pub fn imported_names(value: &Value) -> Vec<String> {
    let mut names = Vec::new();
    collect_imports(value, &mut names);
    names
}

fn collect_imports(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(name)) = map.get("Fn::ImportValue") {
                names.push(name.clone());
            }
            for nested in map.values() {
                collect_imports(nested, names);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_imports(item, names);
            }
        }
        _ => {}
    }
}

/// Network, compute and monitoring units built by hand
pub fn monitoring_path() -> (DeploymentGraph, NetworkUnit, ComputeUnit, MonitoringUnit) {
    let mut graph = DeploymentGraph::new(OWNER, Default::default());

    let mut stack = graph
        .begin(UnitKind::Network, environment())
        .expect("network first");
    let net = network::build(&mut stack, &IngressPolicy::default()).expect("network builds");
    graph.commit(stack).expect("network commits");

    let mut stack = graph
        .begin(UnitKind::Compute, environment())
        .expect("compute second");
    let app = compute::build(
        &mut stack,
        &net.network,
        &net.web,
        &net.load_balancer,
        compute_inputs(),
    )
    .expect("compute builds");
    graph.commit(stack).expect("compute commits");

    let mut stack = graph
        .begin(UnitKind::Monitoring, environment())
        .expect("monitoring after compute");
    let observed = monitoring::build(&mut stack, &app.load_balancer, &app.auto_scaling_group, EMAIL)
        .expect("monitoring builds");
    graph.commit(stack).expect("monitoring commits");

    (graph, net, app, observed)
}

pub fn compute_inputs() -> ComputeInputs<'static> {
    ComputeInputs {
        webapp_token: TOKEN,
        hosted_zone_name: ZONE,
        hosted_zone_id: None,
        ami: config::DEFAULT_AMI,
        assets: Path::new("files/s3"),
        providers: CustomResourceProviders::default(),
    }
}
