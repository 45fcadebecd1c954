// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Domain Models
//!
//! Value objects and rules of the deployment graph, independent of how the
//! graph is rendered.
//!
//! # Graph structure
//!
//! - [`UnitKind`] - The six deployment units in fixed order
//! - [`HandleKind`] - What units publish for each other, with producer and
//!   consumer sets
//! - [`handles`] - Typed handle structs threaded between unit constructors
//!
//! # Value objects with invariants
//!
//! - [`Ipv4Cidr`] - CIDR blocks with subnet carving
//! - [`Port`] / [`IngressRule`] - Security group ingress
//! - [`Listener`] - Header-gated load balancer routing
//! - [`FirewallPolicy`] - Ordered web ACL rules
//! - [`Alarm`] / [`Dashboard`] - Observability
//! - [`BackupRule`] - Backup schedules and retention
//! - [`ResourceType`] - Provider resource taxonomy

pub mod backup;
pub mod firewall;
pub mod handles;
pub mod invariants;
pub mod listener;
pub mod monitoring;
pub mod network;
pub mod resource_type;
pub mod unit;

pub use backup::{BackupRule, Lifecycle, Schedule};
pub use firewall::{FirewallPolicy, FirewallRule, RuleAction, RuleStatement};
pub use handles::{
    AutoScalingGroupHandle, BucketHandle, Handle, HostHandle, LoadBalancerHandle, NetworkHandle,
    SecurityGroupHandle,
};
pub use invariants::{ValidationError, ValidationResult};
pub use listener::{HttpRequest, Listener, ListenerAction, ListenerRule, RuleCondition};
pub use monitoring::{Alarm, ComparisonOperator, Dashboard, Metric, Statistic, Widget};
pub use network::{IngressRule, Ipv4Cidr, NetworkError, Port, SubnetKind};
pub use resource_type::{ResourceType, TagFormat};
pub use unit::{HandleKind, UnitKind};
