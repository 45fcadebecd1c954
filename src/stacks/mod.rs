// Copyright (c) 2025 - Cowboy AI, Inc.
//! Unit Constructors
//!
//! One module per deployment unit. Each `build` function takes the empty
//! [`Stack`] handed out by the graph plus the handles it depends on,
//! declares the unit's resources, and returns the handles it produces.
//! The helpers below cover resources several units declare the same way.

pub mod backup;
pub mod bastion;
pub mod compute;
pub mod edge;
pub mod monitoring;
pub mod network;

use serde_json::{json, Value};
use std::path::Path;

use crate::domain::ResourceType;
use crate::errors::InfrastructureResult;
use crate::template::{
    intrinsic, properties, ExportedValue, RemovalPolicy, Resource, ResourceRef, Stack,
};

/// Instance size of every host in the deployment
pub const INSTANCE_TYPE: &str = "t3a.nano";

/// Hosted zone of every CloudFront distribution
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

pub(crate) const POLICY_VERSION: &str = "2012-10-17";

/// Role assumable by `service`, with AWS managed policies attached
pub(crate) fn service_role(
    stack: &mut Stack,
    logical: &str,
    service: &str,
    managed_policies: &[&str],
    named: bool,
) -> InfrastructureResult<ResourceRef> {
    let mut props = properties(json!({
        "AssumeRolePolicyDocument": {
            "Statement": [{
                "Action": "sts:AssumeRole",
                "Effect": "Allow",
                "Principal": { "Service": service },
            }],
            "Version": POLICY_VERSION,
        },
        "ManagedPolicyArns": managed_policies
            .iter()
            .map(|name| intrinsic::managed_policy_arn(name))
            .collect::<Vec<_>>(),
    }));
    if named {
        props.insert(
            "RoleName".to_string(),
            json!(stack.physical_name(ResourceType::Role, logical)),
        );
    }

    stack.declare(ResourceType::Role, logical, props)
}

/// Instance profile wrapping `role`
pub(crate) fn instance_profile(
    stack: &mut Stack,
    logical: &str,
    role: &ResourceRef,
) -> InfrastructureResult<ResourceRef> {
    stack.declare(
        ResourceType::InstanceProfile,
        logical,
        properties(json!({ "Roles": [role.ref_value()] })),
    )
}

/// Template parameter carrying the bucket deployment handler ARN
pub const DEPLOYMENT_PROVIDER_PARAMETER: &str = "BucketDeploymentProviderArn";

/// Template parameter carrying the object cleanup handler ARN
pub const AUTO_DELETE_PROVIDER_PARAMETER: &str = "AutoDeleteObjectsProviderArn";

/// Handler functions behind the custom resources
///
/// Each handler is a template parameter. A known ARN becomes the
/// parameter's default, otherwise it must be supplied at deploy time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomResourceProviders<'a> {
    pub bucket_deployment: Option<&'a str>,
    pub auto_delete_objects: Option<&'a str>,
}

/// Versioned, S3-encrypted bucket emptied and deleted with its stack
///
/// The cleanup resource depends on the bucket, so it is deleted first and
/// its handler removes every object version before the bucket goes.
pub(crate) fn content_bucket(
    stack: &mut Stack,
    logical: &str,
    providers: CustomResourceProviders<'_>,
) -> InfrastructureResult<ResourceRef> {
    let bucket = Resource::new(
        ResourceType::Bucket,
        properties(json!({
            "BucketEncryption": {
                "ServerSideEncryptionConfiguration": [{
                    "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" },
                }],
            },
            "Tags": [{ "Key": "aws-cdk:auto-delete-objects", "Value": "true" }],
            "VersioningConfiguration": { "Status": "Enabled" },
        })),
    )
    .with_removal_policy(RemovalPolicy::Delete);
    let bucket = stack.declare_resource(logical, bucket)?;

    let service_token = stack.add_parameter(
        AUTO_DELETE_PROVIDER_PARAMETER,
        "ARN of the function that empties buckets before deletion",
        providers.auto_delete_objects,
    );
    let cleanup = Resource::new(
        ResourceType::AutoDeleteObjects,
        properties(json!({
            "BucketName": bucket.ref_value(),
            "ServiceToken": service_token,
        })),
    )
    .depends_on(bucket.logical_id());
    stack.declare_resource(logical, cleanup)?;

    Ok(bucket)
}

/// Upload the directory at `source` into `bucket`
pub(crate) fn bucket_deployment(
    stack: &mut Stack,
    logical: &str,
    bucket: &ResourceRef,
    source: &Path,
    providers: CustomResourceProviders<'_>,
) -> InfrastructureResult<ResourceRef> {
    let asset = stack.add_asset(source);
    let service_token = stack.add_parameter(
        DEPLOYMENT_PROVIDER_PARAMETER,
        "ARN of the function that copies assets into buckets",
        providers.bucket_deployment,
    );
    stack.declare(
        ResourceType::BucketDeployment,
        logical,
        properties(json!({
            "DestinationBucketName": bucket.ref_value(),
            "Prune": true,
            "ServiceToken": service_token,
            "SourceAssets": [asset],
        })),
    )
}

/// DNS-validated certificate for `domain`
pub(crate) fn dns_certificate(
    stack: &mut Stack,
    logical: &str,
    domain: &str,
    hosted_zone_id: Option<&str>,
) -> InfrastructureResult<ResourceRef> {
    let mut props = properties(json!({
        "DomainName": domain,
        "ValidationMethod": "DNS",
    }));
    if let Some(zone_id) = hosted_zone_id {
        props.insert(
            "DomainValidationOptions".to_string(),
            json!([{ "DomainName": domain, "HostedZoneId": zone_id }]),
        );
    }

    stack.declare(ResourceType::Certificate, logical, props)
}

/// `A` alias record in the named hosted zone
pub(crate) fn alias_record(
    stack: &mut Stack,
    logical: &str,
    zone_name: &str,
    record_name: &str,
    dns_name: Value,
    hosted_zone_id: Value,
) -> InfrastructureResult<ResourceRef> {
    stack.declare(
        ResourceType::RecordSet,
        logical,
        properties(json!({
            "AliasTarget": {
                "DNSName": dns_name,
                "HostedZoneId": hosted_zone_id,
            },
            "HostedZoneName": format!("{}.", zone_name.trim_end_matches('.')),
            "Name": format!("{}.", record_name),
            "Type": "A",
        })),
    )
}

/// Base64 user data running `script` at first boot
pub(crate) fn user_data(parts: Vec<Value>) -> Value {
    intrinsic::base64(intrinsic::join("", parts))
}

/// Published values as seen from inside `stack`
pub(crate) fn resolve_all(stack: &mut Stack, values: &[ExportedValue]) -> Vec<Value> {
    values.iter().map(|value| stack.resolve(value)).collect()
}
