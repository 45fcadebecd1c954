// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Units and Handle Kinds
//!
//! The deployment graph is a fixed DAG of six units. This module encodes
//! the order of the units and, for every kind of handle, which unit
//! produces it and which units may consume it.
//!
//! ```text
//! Network ──┬──> Compute ──┬──> Monitoring
//!           │              └──┐
//!           └──> Bastion ─────┴──> Backup
//! Edge (independent)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One deployment unit, in fixed dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Network,
    Compute,
    Bastion,
    Edge,
    Monitoring,
    Backup,
}

impl UnitKind {
    /// All units in construction order
    pub const ORDER: [UnitKind; 6] = [
        UnitKind::Network,
        UnitKind::Compute,
        UnitKind::Bastion,
        UnitKind::Edge,
        UnitKind::Monitoring,
        UnitKind::Backup,
    ];

    /// Position in the construction order
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Network => 0,
            Self::Compute => 1,
            Self::Bastion => 2,
            Self::Edge => 3,
            Self::Monitoring => 4,
            Self::Backup => 5,
        }
    }

    /// Suffix of the stack name after `<Owner>Rim`
    pub fn stack_suffix(&self) -> &'static str {
        match self {
            Self::Network => "VpcStack",
            Self::Compute => "ElbAppStack",
            Self::Bastion => "BastionStack",
            Self::Edge => "CloudFrontStack",
            Self::Monitoring => "MonitoringStack",
            Self::Backup => "BackupStack",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "NetworkStack",
            Self::Compute => "ComputeStack",
            Self::Bastion => "BastionStack",
            Self::Edge => "EdgeStack",
            Self::Monitoring => "MonitoringStack",
            Self::Backup => "BackupStack",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of handle passed between units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    Network,
    WebSecurityGroup,
    LoadBalancerSecurityGroup,
    BastionSecurityGroup,
    LoadBalancer,
    AutoScalingGroup,
    Bucket,
    Host,
}

impl HandleKind {
    /// The unit that creates handles of this kind
    pub fn producer(&self) -> UnitKind {
        match self {
            Self::Network
            | Self::WebSecurityGroup
            | Self::LoadBalancerSecurityGroup
            | Self::BastionSecurityGroup => UnitKind::Network,
            Self::LoadBalancer | Self::AutoScalingGroup | Self::Bucket => UnitKind::Compute,
            Self::Host => UnitKind::Bastion,
        }
    }

    /// The units allowed to consume handles of this kind
    pub fn consumers(&self) -> &'static [UnitKind] {
        match self {
            Self::Network => &[UnitKind::Compute, UnitKind::Bastion],
            Self::WebSecurityGroup | Self::LoadBalancerSecurityGroup => &[UnitKind::Compute],
            Self::BastionSecurityGroup => &[UnitKind::Bastion],
            Self::LoadBalancer | Self::AutoScalingGroup => &[UnitKind::Monitoring],
            Self::Bucket | Self::Host => &[UnitKind::Backup],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network handle",
            Self::WebSecurityGroup => "web security group handle",
            Self::LoadBalancerSecurityGroup => "load balancer security group handle",
            Self::BastionSecurityGroup => "bastion security group handle",
            Self::LoadBalancer => "load balancer handle",
            Self::AutoScalingGroup => "autoscaling group handle",
            Self::Bucket => "bucket handle",
            Self::Host => "host handle",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
