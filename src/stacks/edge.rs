// Copyright (c) 2025 - Cowboy AI, Inc.
//! Edge unit
//!
//! CloudFront distribution in front of the load balancer, protected by a
//! web ACL. The load balancer is reached by its DNS name with the shared
//! token header; a static fallback bucket answers when the origin fails.
//! Consumes no handles and always deploys to `us-east-1`.

use serde_json::json;
use std::path::Path;
use tracing::info;

use super::{
    alias_record, bucket_deployment, content_bucket, dns_certificate, CustomResourceProviders,
    CLOUDFRONT_HOSTED_ZONE_ID, POLICY_VERSION,
};
use crate::domain::firewall::{self, GEO_ALLOW_LIST};
use crate::domain::listener::TOKEN_HEADER;
use crate::domain::{FirewallPolicy, ResourceType};
use crate::errors::InfrastructureResult;
use crate::naming;
use crate::template::{intrinsic, properties, Stack};

/// Region every CloudFront certificate and web ACL must live in
pub const EDGE_REGION: &str = "us-east-1";

/// Origin statuses that fail over to the fallback bucket
pub const FAILOVER_STATUS_CODES: [u16; 4] = [500, 502, 503, 504];

/// Managed `CachingOptimized` cache policy
const CACHING_OPTIMIZED: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";

const PRIMARY_ORIGIN: &str = "primary";
const FALLBACK_ORIGIN: &str = "fallback";
const ORIGIN_GROUP: &str = "failover";

#[derive(Debug, Clone, Copy)]
pub struct EdgeInputs<'a> {
    pub webapp_token: &'a str,
    pub hosted_zone_name: &'a str,
    pub hosted_zone_id: Option<&'a str>,
    pub assets: &'a Path,
    pub providers: CustomResourceProviders<'a>,
}

pub fn build(stack: &mut Stack, inputs: EdgeInputs<'_>) -> InfrastructureResult<FirewallPolicy> {
    let app_domain = naming::service_domain(stack.prefix(), "app", inputs.hosted_zone_name);
    let origin_domain = naming::service_domain(stack.prefix(), "elb", inputs.hosted_zone_name);

    let certificate = dns_certificate(stack, "cloudfront", &app_domain, inputs.hosted_zone_id)?;

    let identity_id =
        naming::logical_id(stack.prefix(), ResourceType::OriginAccessIdentity, "edge");
    let identity = stack.declare(
        ResourceType::OriginAccessIdentity,
        "edge",
        properties(json!({
            "CloudFrontOriginAccessIdentityConfig": {
                "Comment": format!("Identity for {}", identity_id),
            },
        })),
    )?;

    let bucket = content_bucket(stack, "fallback", inputs.providers)?;
    bucket_deployment(stack, "fallback", &bucket, inputs.assets, inputs.providers)?;
    stack.declare(
        ResourceType::BucketPolicy,
        "fallback",
        properties(json!({
            "Bucket": bucket.ref_value(),
            "PolicyDocument": {
                "Statement": [{
                    "Action": "s3:GetObject",
                    "Effect": "Allow",
                    "Principal": { "CanonicalUser": identity.get_att("S3CanonicalUserId") },
                    "Resource": intrinsic::join("", vec![bucket.get_att("Arn"), json!("/*")]),
                }],
                "Version": POLICY_VERSION,
            },
        })),
    )?;

    let acl_name = format!("{}-acl", stack.physical_name(ResourceType::WebAcl, ""));
    let policy = FirewallPolicy::edge(|rule| format!("{}-{}", acl_name, rule))?;
    let acl = stack.declare(
        ResourceType::WebAcl,
        "acl",
        properties(json!({
            "DefaultAction": { "Allow": {} },
            "Name": acl_name,
            "Rules": policy.to_property(),
            "Scope": "CLOUDFRONT",
            "VisibilityConfig": firewall::visibility_config(&acl_name),
        })),
    )?;

    let distribution = stack.declare(
        ResourceType::Distribution,
        "edge",
        properties(json!({
            "DistributionConfig": {
                "Aliases": [app_domain],
                "CustomErrorResponses": [
                    { "ErrorCode": 404, "ResponseCode": 404, "ResponsePagePath": "/error404.html" },
                    { "ErrorCode": 403, "ResponseCode": 403, "ResponsePagePath": "/error403.html" },
                ],
                "DefaultCacheBehavior": {
                    "CachePolicyId": CACHING_OPTIMIZED,
                    "Compress": true,
                    "TargetOriginId": ORIGIN_GROUP,
                    "ViewerProtocolPolicy": "allow-all",
                },
                "DefaultRootObject": "index.html",
                "Enabled": true,
                "HttpVersion": "http2",
                "IPV6Enabled": true,
                "OriginGroups": {
                    "Items": [{
                        "FailoverCriteria": {
                            "StatusCodes": {
                                "Items": FAILOVER_STATUS_CODES,
                                "Quantity": FAILOVER_STATUS_CODES.len(),
                            },
                        },
                        "Id": ORIGIN_GROUP,
                        "Members": {
                            "Items": [
                                { "OriginId": PRIMARY_ORIGIN },
                                { "OriginId": FALLBACK_ORIGIN },
                            ],
                            "Quantity": 2,
                        },
                    }],
                    "Quantity": 1,
                },
                "Origins": [
                    {
                        "CustomOriginConfig": {
                            "OriginProtocolPolicy": "https-only",
                            "OriginSSLProtocols": ["TLSv1.2"],
                        },
                        "DomainName": origin_domain,
                        "Id": PRIMARY_ORIGIN,
                        "OriginCustomHeaders": [{
                            "HeaderName": TOKEN_HEADER,
                            "HeaderValue": inputs.webapp_token,
                        }],
                    },
                    {
                        "DomainName": bucket.get_att("RegionalDomainName"),
                        "Id": FALLBACK_ORIGIN,
                        "S3OriginConfig": {
                            "OriginAccessIdentity": intrinsic::join("", vec![
                                json!("origin-access-identity/cloudfront/"),
                                identity.ref_value(),
                            ]),
                        },
                    },
                ],
                "PriceClass": "PriceClass_100",
                "Restrictions": {
                    "GeoRestriction": {
                        "Locations": GEO_ALLOW_LIST,
                        "RestrictionType": "whitelist",
                    },
                },
                "ViewerCertificate": {
                    "AcmCertificateArn": certificate.ref_value(),
                    "MinimumProtocolVersion": "TLSv1.2_2021",
                    "SslSupportMethod": "sni-only",
                },
                "WebACLId": acl.get_att("Arn"),
            },
        })),
    )?;

    alias_record(
        stack,
        "cloudfront",
        inputs.hosted_zone_name,
        &app_domain,
        distribution.get_att("DomainName"),
        json!(CLOUDFRONT_HOSTED_ZONE_ID),
    )?;

    info!(
        stack = %stack.name(),
        domain = %app_domain,
        rules = policy.rules().len(),
        "Declared edge distribution"
    );

    Ok(policy)
}
