// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed deployment graph for the rim web stack
//!
//! The deployment is a fixed DAG of six units (network, compute, bastion,
//! edge, monitoring, backup). Each unit constructor declares its resources
//! into a [`template::Stack`], consumes typed handles produced by earlier
//! units, and returns the handles its dependents need. The
//! [`graph::DeploymentGraph`] checks the dependency order, wires
//! cross-stack exports and renders a [`assembly::CloudAssembly`] of
//! CloudFormation templates.
//!
//! ```rust,no_run
//! use rim_infrastructure::{build_deployment, DeploymentConfig};
//!
//! let config = DeploymentConfig::from_env()?;
//! let graph = build_deployment(&config)?;
//! let assembly = graph.render()?;
//! assembly.write_to("cdk.out")?;
//! # Ok::<(), rim_infrastructure::InfrastructureError>(())
//! ```

pub mod assembly;
pub mod config;
pub mod deployment;
pub mod domain;
pub mod errors;
pub mod graph;
pub mod naming;
pub mod stacks;
pub mod template;

// Re-export commonly used types
pub use assembly::CloudAssembly;
pub use config::{ConfigError, DeploymentConfig, IngressPolicy};
pub use deployment::build_deployment;
pub use errors::{InfrastructureError, InfrastructureResult};
pub use graph::DeploymentGraph;
