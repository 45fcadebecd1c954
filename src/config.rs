// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Configuration
//!
//! Named inputs supplied through the process environment, with a few
//! context-style overrides (`Creator`, `Project`, `EC2KeyName`) that the
//! command line passes as `--context Key=Value`.
//!
//! Values are opaque strings. Only presence is checked here; format
//! validation belongs to the provider. The one exception is ingress CIDRs,
//! which are parsed because the network unit reasons about them.

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{Ipv4Cidr, NetworkError};
use crate::stacks::CustomResourceProviders;

pub const OWNER: &str = "OWNER";
pub const HOSTED_ZONE_NAME: &str = "RIM_HOSTED_ZONE_NAME";
pub const WEBAPP_TOKEN: &str = "WEBAPP_TOKEN";
pub const EMAIL: &str = "EMAIL";
pub const ACCOUNT: &str = "CDK_DEFAULT_ACCOUNT";
pub const REGION: &str = "CDK_DEFAULT_REGION";
pub const KEY_NAME: &str = "RIM_EC2_KEY_NAME";
pub const HOSTED_ZONE_ID: &str = "RIM_HOSTED_ZONE_ID";
pub const AMI: &str = "RIM_AMI";
pub const CREATOR: &str = "RIM_CREATOR";
pub const PROJECT: &str = "RIM_PROJECT";
pub const SSH_INGRESS_CIDR: &str = "RIM_SSH_INGRESS_CIDR";
pub const HTTP_INGRESS_CIDR: &str = "RIM_HTTP_INGRESS_CIDR";
pub const HTTPS_INGRESS_CIDR: &str = "RIM_HTTPS_INGRESS_CIDR";
pub const BASTION_INGRESS_CIDR: &str = "RIM_BASTION_INGRESS_CIDR";
pub const ASSET_DIR: &str = "RIM_ASSET_DIR";
pub const DEPLOYMENT_PROVIDER_ARN: &str = "RIM_DEPLOYMENT_PROVIDER_ARN";
pub const AUTO_DELETE_PROVIDER_ARN: &str = "RIM_AUTO_DELETE_PROVIDER_ARN";

/// Ubuntu 22.04 image resolved at deploy time from the public parameter store
pub const DEFAULT_AMI: &str =
    "{{resolve:ssm:/aws/service/canonical/ubuntu/server/22.04/stable/current/amd64/hvm/ebs-gp2/ami-id}}";

/// Directory holding the `s3` and `s3_alt` content trees
pub const DEFAULT_ASSET_DIR: &str = "files";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required input {0}")]
    Missing(&'static str),

    #[error("Invalid CIDR in {input}: {source}")]
    InvalidCidr {
        input: &'static str,
        #[source]
        source: NetworkError,
    },

    #[error("Unknown context key {0} (expected Creator, Project or EC2KeyName)")]
    UnknownContext(String),

    #[error("Context entry {0:?} is not of the form Key=Value")]
    MalformedContext(String),
}

/// Sources allowed to reach each security group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressPolicy {
    pub web_ssh: Ipv4Cidr,
    pub web_http: Ipv4Cidr,
    pub load_balancer_https: Ipv4Cidr,
    pub bastion_ssh: Ipv4Cidr,
}

impl Default for IngressPolicy {
    fn default() -> Self {
        Self {
            web_ssh: Ipv4Cidr::ANYWHERE,
            web_http: Ipv4Cidr::ANYWHERE,
            load_balancer_https: Ipv4Cidr::ANYWHERE,
            bastion_ssh: Ipv4Cidr::ANYWHERE,
        }
    }
}

/// All inputs of one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    /// Naming prefix
    pub owner: String,
    pub hosted_zone_name: String,
    /// Shared secret between the edge and the load balancer
    pub webapp_token: String,
    /// Alarm notification address
    pub email: String,
    pub account: String,
    pub region: String,
    pub key_name: Option<String>,
    pub hosted_zone_id: Option<String>,
    pub ami: String,
    /// Applied to every taggable resource
    pub tags: BTreeMap<String, String>,
    pub ingress: IngressPolicy,
    pub asset_dir: PathBuf,
    /// Handler behind the bucket deployment resources
    pub deployment_provider_arn: Option<String>,
    /// Handler behind the bucket cleanup resources
    pub auto_delete_provider_arn: Option<String>,
}

impl DeploymentConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup; empty values count
    /// as absent
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let cidr = |name: &'static str| -> Result<Ipv4Cidr, ConfigError> {
            match get(name) {
                Some(value) => Ipv4Cidr::new(value.trim())
                    .map_err(|source| ConfigError::InvalidCidr { input: name, source }),
                None => Ok(Ipv4Cidr::ANYWHERE),
            }
        };

        let mut tags = BTreeMap::new();
        if let Some(creator) = get(CREATOR) {
            tags.insert("Creator".to_string(), creator);
        }
        if let Some(project) = get(PROJECT) {
            tags.insert("Project".to_string(), project);
        }

        Ok(Self {
            owner: get(OWNER).unwrap_or_default(),
            hosted_zone_name: get(HOSTED_ZONE_NAME).unwrap_or_default(),
            webapp_token: get(WEBAPP_TOKEN).unwrap_or_default(),
            email: get(EMAIL).unwrap_or_default(),
            account: get(ACCOUNT).unwrap_or_default(),
            region: get(REGION).unwrap_or_default(),
            key_name: get(KEY_NAME),
            hosted_zone_id: get(HOSTED_ZONE_ID),
            ami: get(AMI).unwrap_or_else(|| DEFAULT_AMI.to_string()),
            tags,
            ingress: IngressPolicy {
                web_ssh: cidr(SSH_INGRESS_CIDR)?,
                web_http: cidr(HTTP_INGRESS_CIDR)?,
                load_balancer_https: cidr(HTTPS_INGRESS_CIDR)?,
                bastion_ssh: cidr(BASTION_INGRESS_CIDR)?,
            },
            asset_dir: PathBuf::from(get(ASSET_DIR).unwrap_or_else(|| DEFAULT_ASSET_DIR.to_string())),
            deployment_provider_arn: get(DEPLOYMENT_PROVIDER_ARN),
            auto_delete_provider_arn: get(AUTO_DELETE_PROVIDER_ARN),
        })
    }

    /// Apply one `Key=Value` context override
    pub fn with_context(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "Creator" | "Project" => {
                self.tags.insert(key.to_string(), value.to_string());
            }
            "EC2KeyName" => self.key_name = Some(value.to_string()),
            other => return Err(ConfigError::UnknownContext(other.to_string())),
        }
        Ok(())
    }

    /// Parse and apply a raw `Key=Value` entry
    pub fn apply_context_entry(&mut self, entry: &str) -> Result<(), ConfigError> {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedContext(entry.to_string()))?;
        self.with_context(key.trim(), value.trim())
    }

    /// Check that every required input is present
    ///
    /// Reports the first missing input in declaration order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (OWNER, &self.owner),
            (HOSTED_ZONE_NAME, &self.hosted_zone_name),
            (WEBAPP_TOKEN, &self.webapp_token),
            (EMAIL, &self.email),
            (ACCOUNT, &self.account),
            (REGION, &self.region),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        Ok(())
    }

    /// Custom resource handlers known up front
    pub fn providers(&self) -> CustomResourceProviders<'_> {
        CustomResourceProviders {
            bucket_deployment: self.deployment_provider_arn.as_deref(),
            auto_delete_objects: self.auto_delete_provider_arn.as_deref(),
        }
    }

    /// Content tree uploaded to the compute bucket
    pub fn primary_assets(&self) -> PathBuf {
        self.asset_dir.join("s3")
    }

    /// Content tree uploaded to the fallback edge bucket
    pub fn fallback_assets(&self) -> PathBuf {
        self.asset_dir.join("s3_alt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    const COMPLETE: &[(&str, &str)] = &[
        (OWNER, "alice"),
        (HOSTED_ZONE_NAME, "example.com"),
        (WEBAPP_TOKEN, "s3cret"),
        (EMAIL, "ops@example.com"),
        (ACCOUNT, "123456789012"),
        (REGION, "eu-central-1"),
        (CREATOR, "alice"),
    ];

    #[test]
    fn test_complete_config() {
        let config = DeploymentConfig::from_lookup(lookup(COMPLETE)).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.ami, DEFAULT_AMI);
        assert_eq!(config.tags.get("Creator").map(String::as_str), Some("alice"));
        assert!(!config.tags.contains_key("Project"));
        assert_eq!(config.ingress, IngressPolicy::default());
        assert_eq!(config.primary_assets(), PathBuf::from("files/s3"));
    }

    #[test]
    fn test_empty_value_is_missing() {
        let config =
            DeploymentConfig::from_lookup(lookup(&[(OWNER, "alice"), (HOSTED_ZONE_NAME, "  ")]))
                .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing(HOSTED_ZONE_NAME))
        ));
    }

    #[test]
    fn test_invalid_cidr() {
        let result = DeploymentConfig::from_lookup(lookup(&[(SSH_INGRESS_CIDR, "10.0.0.1/8")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidCidr {
                input: SSH_INGRESS_CIDR,
                ..
            })
        ));
    }

    #[test]
    fn test_context_overrides() {
        let mut config = DeploymentConfig::from_lookup(lookup(COMPLETE)).unwrap();
        config.apply_context_entry("Project=rim").unwrap();
        config.apply_context_entry("EC2KeyName = admin").unwrap();
        assert_eq!(config.tags.get("Project").map(String::as_str), Some("rim"));
        assert_eq!(config.key_name.as_deref(), Some("admin"));

        assert!(matches!(
            config.apply_context_entry("Region=us-east-1"),
            Err(ConfigError::UnknownContext(_))
        ));
        assert!(matches!(
            config.apply_context_entry("Project"),
            Err(ConfigError::MalformedContext(_))
        ));
    }
}
