// Copyright (c) 2025 - Cowboy AI, Inc.
//! Web Application Firewall Policy
//!
//! Rules are evaluated by ascending priority. The edge policy has three:
//! a per-source-address rate limit that blocks with 403, and two AWS
//! managed rule groups evaluated without overriding their own actions.

use serde::Serialize;
use serde_json::{json, Value};

use super::invariants::{self, ValidationError};

/// Requests allowed from one source address per evaluation window
pub const RATE_LIMIT: u32 = 100;

/// Status code returned by the rate rule's block action
pub const BLOCK_STATUS: u16 = 403;

/// Countries the distribution serves
pub const GEO_ALLOW_LIST: [&str; 4] = ["PL", "DE", "NL", "LU"];

/// Which requests a rule inspects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleStatement {
    /// Count requests per source IP over the evaluation window
    RateBased { limit: u32 },
    /// Delegate to a vendor-managed rule group
    ManagedRuleGroup { vendor: String, name: String },
}

impl RuleStatement {
    pub fn managed(name: &str) -> Self {
        Self::ManagedRuleGroup {
            vendor: "AWS".to_string(),
            name: name.to_string(),
        }
    }

    fn to_property(&self) -> Value {
        match self {
            Self::RateBased { limit } => json!({
                "RateBasedStatement": {
                    "AggregateKeyType": "IP",
                    "Limit": limit,
                },
            }),
            Self::ManagedRuleGroup { vendor, name } => json!({
                "ManagedRuleGroupStatement": {
                    "Name": name,
                    "VendorName": vendor,
                },
            }),
        }
    }
}

/// What a matching rule does
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Block with a custom status code
    Block { response_code: u16 },
    /// Managed groups keep their own actions
    NoOverride,
}

impl RuleAction {
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Block { .. })
    }
}

/// One firewall rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirewallRule {
    pub name: String,
    pub priority: u32,
    pub statement: RuleStatement,
    pub action: RuleAction,
}

impl FirewallRule {
    /// Rule entry in CloudFormation shape
    pub fn to_property(&self) -> Value {
        let mut rule = json!({
            "Name": self.name,
            "Priority": self.priority,
            "Statement": self.statement.to_property(),
            "VisibilityConfig": visibility_config(&self.name),
        });

        match &self.action {
            RuleAction::Block { response_code } => {
                rule["Action"] = json!({
                    "Block": { "CustomResponse": { "ResponseCode": response_code } },
                });
            }
            RuleAction::NoOverride => {
                rule["OverrideAction"] = json!({ "None": {} });
            }
        }

        rule
    }
}

/// CloudWatch visibility settings shared by the ACL and its rules
pub fn visibility_config(metric_name: &str) -> Value {
    json!({
        "CloudWatchMetricsEnabled": true,
        "MetricName": metric_name,
        "SampledRequestsEnabled": true,
    })
}

/// Ordered firewall policy with default allow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirewallPolicy {
    rules: Vec<FirewallRule>,
}

impl FirewallPolicy {
    /// Create a policy; priorities must be strictly increasing
    pub fn new(rules: Vec<FirewallRule>) -> Result<Self, ValidationError> {
        let priorities: Vec<u32> = rules.iter().map(|rule| rule.priority).collect();
        invariants::validate_priorities(&priorities)?;
        Ok(Self { rules })
    }

    /// Rate limit, bot control, common threats; names derive from `name_of`
    pub fn edge(name_of: impl Fn(&str) -> String) -> Result<Self, ValidationError> {
        Self::new(vec![
            FirewallRule {
                name: name_of("rate-rule"),
                priority: 0,
                statement: RuleStatement::RateBased { limit: RATE_LIMIT },
                action: RuleAction::Block {
                    response_code: BLOCK_STATUS,
                },
            },
            FirewallRule {
                name: name_of("bot-rule"),
                priority: 1,
                statement: RuleStatement::managed("AWSManagedRulesBotControlRuleSet"),
                action: RuleAction::NoOverride,
            },
            FirewallRule {
                name: name_of("aws-common-rule"),
                priority: 2,
                statement: RuleStatement::managed("AWSManagedRulesCommonRuleSet"),
                action: RuleAction::NoOverride,
            },
        ])
    }

    pub fn rules(&self) -> &[FirewallRule] {
        &self.rules
    }

    pub fn to_property(&self) -> Value {
        Value::Array(self.rules.iter().map(FirewallRule::to_property).collect())
    }
}
