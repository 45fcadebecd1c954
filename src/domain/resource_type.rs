// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloud Resource Type Domain Model
//!
//! Defines the taxonomy of provider resources the deployment graph can
//! declare. Each type knows its CloudFormation type name, the short kind
//! used by the naming policy, and the shape in which it accepts tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider resource type taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    // Network
    Vpc,
    Subnet,
    RouteTable,
    Route,
    SubnetRouteTableAssociation,
    InternetGateway,
    VpcGatewayAttachment,
    SecurityGroup,

    // Compute
    Instance,
    ElasticIp,
    LaunchTemplate,
    AutoScalingGroup,
    ScalingPolicy,

    // Load balancing
    LoadBalancer,
    TargetGroup,
    Listener,
    ListenerRule,

    // Identity
    Role,
    InstanceProfile,
    Policy,

    // Storage
    Bucket,
    BucketPolicy,
    BucketDeployment,
    AutoDeleteObjects,

    // DNS / TLS
    RecordSet,
    Certificate,

    // Edge
    Distribution,
    OriginAccessIdentity,
    WebAcl,

    // Monitoring
    Dashboard,
    Alarm,
    Topic,
    Subscription,

    // Backup
    BackupVault,
    BackupPlan,
    BackupSelection,
}

/// How a resource type accepts tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFormat {
    /// Not taggable through its template properties
    None,
    /// `Tags: [{Key, Value}]`
    KeyValueList,
    /// `Tags: [{Key, Value, PropagateAtLaunch}]`
    AutoScaling,
    /// A `{key: value}` map under the named property
    Map(&'static str),
}

impl ResourceType {
    /// CloudFormation resource type name
    pub fn cfn_type(&self) -> &'static str {
        match self {
            Self::Vpc => "AWS::EC2::VPC",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::RouteTable => "AWS::EC2::RouteTable",
            Self::Route => "AWS::EC2::Route",
            Self::SubnetRouteTableAssociation => "AWS::EC2::SubnetRouteTableAssociation",
            Self::InternetGateway => "AWS::EC2::InternetGateway",
            Self::VpcGatewayAttachment => "AWS::EC2::VPCGatewayAttachment",
            Self::SecurityGroup => "AWS::EC2::SecurityGroup",
            Self::Instance => "AWS::EC2::Instance",
            Self::ElasticIp => "AWS::EC2::EIP",
            Self::LaunchTemplate => "AWS::EC2::LaunchTemplate",
            Self::AutoScalingGroup => "AWS::AutoScaling::AutoScalingGroup",
            Self::ScalingPolicy => "AWS::AutoScaling::ScalingPolicy",
            Self::LoadBalancer => "AWS::ElasticLoadBalancingV2::LoadBalancer",
            Self::TargetGroup => "AWS::ElasticLoadBalancingV2::TargetGroup",
            Self::Listener => "AWS::ElasticLoadBalancingV2::Listener",
            Self::ListenerRule => "AWS::ElasticLoadBalancingV2::ListenerRule",
            Self::Role => "AWS::IAM::Role",
            Self::InstanceProfile => "AWS::IAM::InstanceProfile",
            Self::Policy => "AWS::IAM::Policy",
            Self::Bucket => "AWS::S3::Bucket",
            Self::BucketPolicy => "AWS::S3::BucketPolicy",
            Self::BucketDeployment => "Custom::CDKBucketDeployment",
            Self::AutoDeleteObjects => "Custom::S3AutoDeleteObjects",
            Self::RecordSet => "AWS::Route53::RecordSet",
            Self::Certificate => "AWS::CertificateManager::Certificate",
            Self::Distribution => "AWS::CloudFront::Distribution",
            Self::OriginAccessIdentity => "AWS::CloudFront::CloudFrontOriginAccessIdentity",
            Self::WebAcl => "AWS::WAFv2::WebACL",
            Self::Dashboard => "AWS::CloudWatch::Dashboard",
            Self::Alarm => "AWS::CloudWatch::Alarm",
            Self::Topic => "AWS::SNS::Topic",
            Self::Subscription => "AWS::SNS::Subscription",
            Self::BackupVault => "AWS::Backup::BackupVault",
            Self::BackupPlan => "AWS::Backup::BackupPlan",
            Self::BackupSelection => "AWS::Backup::BackupSelection",
        }
    }

    /// Short kind used by the naming policy
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vpc => "vpc",
            Self::Subnet => "subnet",
            Self::RouteTable => "rtb",
            Self::Route => "route",
            Self::SubnetRouteTableAssociation => "rtbassoc",
            Self::InternetGateway => "igw",
            Self::VpcGatewayAttachment => "igwattach",
            Self::SecurityGroup => "sg",
            Self::Instance => "instance",
            Self::ElasticIp => "eip",
            Self::LaunchTemplate => "lt",
            Self::AutoScalingGroup => "asg",
            Self::ScalingPolicy => "scaling",
            Self::LoadBalancer => "alb",
            Self::TargetGroup => "tg",
            Self::Listener => "listener",
            Self::ListenerRule => "rule",
            Self::Role => "role",
            Self::InstanceProfile => "profile",
            Self::Policy => "policy",
            Self::Bucket => "bucket",
            Self::BucketPolicy => "bucketpolicy",
            Self::BucketDeployment => "deployment",
            Self::AutoDeleteObjects => "autodelete",
            Self::RecordSet => "dns",
            Self::Certificate => "cert",
            Self::Distribution => "distribution",
            Self::OriginAccessIdentity => "oai",
            Self::WebAcl => "waf",
            Self::Dashboard => "dashboard",
            Self::Alarm => "alarm",
            Self::Topic => "topic",
            Self::Subscription => "subscription",
            Self::BackupVault => "vault",
            Self::BackupPlan => "plan",
            Self::BackupSelection => "selection",
        }
    }

    /// Tag shape accepted by this resource type
    pub fn tag_format(&self) -> TagFormat {
        match self {
            Self::Vpc
            | Self::Subnet
            | Self::RouteTable
            | Self::InternetGateway
            | Self::SecurityGroup
            | Self::Instance
            | Self::ElasticIp
            | Self::LoadBalancer
            | Self::TargetGroup
            | Self::Role
            | Self::Bucket
            | Self::Certificate
            | Self::Distribution
            | Self::WebAcl
            | Self::Topic => TagFormat::KeyValueList,

            Self::AutoScalingGroup => TagFormat::AutoScaling,

            Self::BackupVault => TagFormat::Map("BackupVaultTags"),
            Self::BackupPlan => TagFormat::Map("BackupPlanTags"),

            Self::Route
            | Self::SubnetRouteTableAssociation
            | Self::VpcGatewayAttachment
            | Self::LaunchTemplate
            | Self::ScalingPolicy
            | Self::Listener
            | Self::ListenerRule
            | Self::InstanceProfile
            | Self::Policy
            | Self::BucketPolicy
            | Self::BucketDeployment
            | Self::AutoDeleteObjects
            | Self::RecordSet
            | Self::OriginAccessIdentity
            | Self::Dashboard
            | Self::Alarm
            | Self::Subscription
            | Self::BackupSelection => TagFormat::None,
        }
    }

    pub fn is_taggable(&self) -> bool {
        self.tag_format() != TagFormat::None
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cfn_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cfn_type_names() {
        assert_eq!(ResourceType::Vpc.cfn_type(), "AWS::EC2::VPC");
        assert_eq!(ResourceType::WebAcl.cfn_type(), "AWS::WAFv2::WebACL");
        assert_eq!(
            ResourceType::ListenerRule.cfn_type(),
            "AWS::ElasticLoadBalancingV2::ListenerRule"
        );
    }

    #[test]
    fn test_tag_formats() {
        assert_eq!(ResourceType::Bucket.tag_format(), TagFormat::KeyValueList);
        assert_eq!(ResourceType::AutoScalingGroup.tag_format(), TagFormat::AutoScaling);
        assert_eq!(
            ResourceType::BackupVault.tag_format(),
            TagFormat::Map("BackupVaultTags")
        );
        assert!(!ResourceType::Alarm.is_taggable());
    }

    #[test]
    fn test_kinds_are_lowercase_alphanumeric() {
        for ty in [
            ResourceType::Vpc,
            ResourceType::SubnetRouteTableAssociation,
            ResourceType::BackupSelection,
        ] {
            assert!(ty.kind().chars().all(|c| c.is_ascii_lowercase()));
        }
    }
}
