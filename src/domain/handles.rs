// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed Handles
//!
//! A handle is what one unit publishes for its dependents: a small
//! immutable struct of exported values plus descriptive attributes. Unit
//! constructors return handles and take them as explicit arguments, so the
//! dependency graph is visible in the function signatures.

use serde::Serialize;

use super::listener::Listener;
use super::network::{IngressRule, Ipv4Cidr};
use super::unit::HandleKind;
use crate::template::ExportedValue;

/// Common surface of every handle
pub trait Handle {
    /// What kind of handle this is
    fn kind(&self) -> HandleKind;

    /// Name of the stack that produced it
    fn producer(&self) -> &str;

    /// Every provider-side value the handle publishes
    fn values(&self) -> Vec<&ExportedValue>;
}

/// VPC and its subnet partitions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkHandle {
    pub producer: String,
    pub vpc_id: ExportedValue,
    pub cidr: Ipv4Cidr,
    pub public_subnets: Vec<ExportedValue>,
    pub isolated_subnets: Vec<ExportedValue>,
}

impl Handle for NetworkHandle {
    fn kind(&self) -> HandleKind {
        HandleKind::Network
    }

    fn producer(&self) -> &str {
        &self.producer
    }

    fn values(&self) -> Vec<&ExportedValue> {
        let mut values = vec![&self.vpc_id];
        values.extend(&self.public_subnets);
        values.extend(&self.isolated_subnets);
        values
    }
}

/// A security group ready for attachment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityGroupHandle {
    pub kind: HandleKind,
    pub producer: String,
    pub group_id: ExportedValue,
    pub ingress: Vec<IngressRule>,
}

impl Handle for SecurityGroupHandle {
    fn kind(&self) -> HandleKind {
        self.kind
    }

    fn producer(&self) -> &str {
        &self.producer
    }

    fn values(&self) -> Vec<&ExportedValue> {
        vec![&self.group_id]
    }
}

/// Application load balancer with its HTTPS listener
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadBalancerHandle {
    pub producer: String,
    pub arn: ExportedValue,
    pub full_name: ExportedValue,
    pub dns_name: ExportedValue,
    pub certificate: ExportedValue,
    pub listener: Listener,
}

impl Handle for LoadBalancerHandle {
    fn kind(&self) -> HandleKind {
        HandleKind::LoadBalancer
    }

    fn producer(&self) -> &str {
        &self.producer
    }

    fn values(&self) -> Vec<&ExportedValue> {
        vec![&self.arn, &self.full_name, &self.dns_name, &self.certificate]
    }
}

/// Autoscaling group and its scaling configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoScalingGroupHandle {
    pub producer: String,
    pub name: ExportedValue,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub target_cpu_percent: f64,
}

impl Handle for AutoScalingGroupHandle {
    fn kind(&self) -> HandleKind {
        HandleKind::AutoScalingGroup
    }

    fn producer(&self) -> &str {
        &self.producer
    }

    fn values(&self) -> Vec<&ExportedValue> {
        vec![&self.name]
    }
}

/// Object store bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketHandle {
    pub producer: String,
    pub name: ExportedValue,
    pub arn: ExportedValue,
    pub versioned: bool,
    pub auto_delete_objects: bool,
}

impl Handle for BucketHandle {
    fn kind(&self) -> HandleKind {
        HandleKind::Bucket
    }

    fn producer(&self) -> &str {
        &self.producer
    }

    fn values(&self) -> Vec<&ExportedValue> {
        vec![&self.name, &self.arn]
    }
}

/// Administrative host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostHandle {
    pub producer: String,
    pub instance_id: ExportedValue,
    pub elastic_ip: ExportedValue,
}

impl Handle for HostHandle {
    fn kind(&self) -> HandleKind {
        HandleKind::Host
    }

    fn producer(&self) -> &str {
        &self.producer
    }

    fn values(&self) -> Vec<&ExportedValue> {
        vec![&self.instance_id, &self.elastic_ip]
    }
}
