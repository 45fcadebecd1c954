// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute unit
//!
//! Autoscaled web tier behind an internet-facing application load
//! balancer. The HTTPS listener only forwards requests carrying the shared
//! token, so the tier is reachable through the edge distribution alone.

use serde_json::json;
use std::path::Path;
use tracing::info;

use super::{
    alias_record, bucket_deployment, content_bucket, dns_certificate, instance_profile,
    resolve_all, service_role, user_data, CustomResourceProviders, INSTANCE_TYPE,
};
use crate::domain::handles::{
    AutoScalingGroupHandle, BucketHandle, LoadBalancerHandle, NetworkHandle, SecurityGroupHandle,
};
use crate::domain::{invariants, Listener, Port, ResourceType};
use crate::errors::InfrastructureResult;
use crate::naming;
use crate::template::{intrinsic, properties, Resource, Stack};

pub const MIN_CAPACITY: u32 = 1;
pub const MAX_CAPACITY: u32 = 4;
pub const TARGET_CPU_PERCENT: f64 = 30.0;
pub const INSTANCE_WARMUP_SECONDS: u32 = 240;
pub const ROOT_VOLUME_GIB: u32 = 8;
pub const ROOT_VOLUME_IOPS: u32 = 3000;

/// Inputs of the compute unit besides its handles
#[derive(Debug, Clone, Copy)]
pub struct ComputeInputs<'a> {
    pub webapp_token: &'a str,
    pub hosted_zone_name: &'a str,
    pub hosted_zone_id: Option<&'a str>,
    pub ami: &'a str,
    pub assets: &'a Path,
    pub providers: CustomResourceProviders<'a>,
}

/// Handles produced by the compute unit
#[derive(Debug, Clone)]
pub struct ComputeUnit {
    pub load_balancer: LoadBalancerHandle,
    pub auto_scaling_group: AutoScalingGroupHandle,
    pub bucket: BucketHandle,
}

pub fn build(
    stack: &mut Stack,
    network: &NetworkHandle,
    web: &SecurityGroupHandle,
    load_balancer_group: &SecurityGroupHandle,
    inputs: ComputeInputs<'_>,
) -> InfrastructureResult<ComputeUnit> {
    stack.consume(network)?;
    stack.consume(web)?;
    stack.consume(load_balancer_group)?;
    invariants::validate_capacity(MIN_CAPACITY, MAX_CAPACITY)?;

    let vpc_id = stack.resolve(&network.vpc_id);
    let public_subnets = resolve_all(stack, &network.public_subnets);
    let web_group = stack.resolve(&web.group_id);
    let load_balancer_group = stack.resolve(&load_balancer_group.group_id);

    let role = service_role(
        stack,
        "webapp",
        "ec2.amazonaws.com",
        &[
            "AmazonS3ReadOnlyAccess",
            "AmazonSSMManagedInstanceCore",
            "AmazonSSMPatchAssociation",
        ],
        false,
    )?;
    let profile = instance_profile(stack, "webapp", &role)?;

    let bucket = content_bucket(stack, "content", inputs.providers)?;
    bucket_deployment(stack, "content", &bucket, inputs.assets, inputs.providers)?;

    let boot = user_data(vec![
        json!("#!/bin/bash\napt-get update\napt-get -y install apache2 awscli\naws s3 sync s3://"),
        bucket.ref_value(),
        json!("/ /var/www/html/\nsystemctl restart apache2\nsystemctl enable apache2"),
    ]);

    let launch_template = Resource::new(
        ResourceType::LaunchTemplate,
        properties(json!({
            "LaunchTemplateData": {
                "BlockDeviceMappings": [{
                    "DeviceName": "/dev/sda1",
                    "Ebs": {
                        "Iops": ROOT_VOLUME_IOPS,
                        "VolumeSize": ROOT_VOLUME_GIB,
                        "VolumeType": "gp3",
                    },
                }],
                "IamInstanceProfile": { "Arn": profile.get_att("Arn") },
                "ImageId": inputs.ami,
                "InstanceType": INSTANCE_TYPE,
                "SecurityGroupIds": [web_group],
                "UserData": boot,
            },
            "LaunchTemplateName": stack.physical_name(ResourceType::LaunchTemplate, "webapp"),
        })),
    )
    .depends_on(role.logical_id());
    let launch_template = stack.declare_resource("webapp", launch_template)?;

    let target_group = stack.declare(
        ResourceType::TargetGroup,
        "webapp",
        properties(json!({
            "HealthCheckEnabled": true,
            "HealthCheckIntervalSeconds": 10,
            "HealthCheckTimeoutSeconds": 5,
            "HealthyThresholdCount": 2,
            "Matcher": { "HttpCode": "200" },
            "Port": Port::HTTP.value(),
            "Protocol": "HTTP",
            "TargetGroupAttributes": [{ "Key": "stickiness.enabled", "Value": "false" }],
            "TargetType": "instance",
            "UnhealthyThresholdCount": 2,
            "VpcId": vpc_id,
        })),
    )?;

    let group = stack.declare(
        ResourceType::AutoScalingGroup,
        "webapp",
        properties(json!({
            "LaunchTemplate": {
                "LaunchTemplateId": launch_template.ref_value(),
                "Version": launch_template.get_att("LatestVersionNumber"),
            },
            "MaxSize": MAX_CAPACITY.to_string(),
            "MetricsCollection": [{
                "Granularity": "1Minute",
                "Metrics": ["GroupInServiceInstances"],
            }],
            "MinSize": MIN_CAPACITY.to_string(),
            "TargetGroupARNs": [target_group.ref_value()],
            "VPCZoneIdentifier": public_subnets.clone(),
        })),
    )?;

    stack.declare(
        ResourceType::ScalingPolicy,
        "cpu",
        properties(json!({
            "AutoScalingGroupName": group.ref_value(),
            "EstimatedInstanceWarmup": INSTANCE_WARMUP_SECONDS,
            "PolicyType": "TargetTrackingScaling",
            "TargetTrackingConfiguration": {
                "PredefinedMetricSpecification": {
                    "PredefinedMetricType": "ASGAverageCPUUtilization",
                },
                "TargetValue": TARGET_CPU_PERCENT,
            },
        })),
    )?;

    let alb = stack.declare(
        ResourceType::LoadBalancer,
        "webapp",
        properties(json!({
            "LoadBalancerAttributes": [{ "Key": "deletion_protection.enabled", "Value": "false" }],
            "Scheme": "internet-facing",
            "SecurityGroups": [load_balancer_group],
            "Subnets": public_subnets,
            "Type": "application",
        })),
    )?;

    let domain = naming::service_domain(stack.prefix(), "elb", inputs.hosted_zone_name);
    let certificate = dns_certificate(stack, "elb", &domain, inputs.hosted_zone_id)?;

    let listener = Listener::header_gated(target_group.logical_id(), inputs.webapp_token)?;
    let https = stack.declare(
        ResourceType::Listener,
        "https",
        properties(json!({
            "Certificates": [{ "CertificateArn": certificate.ref_value() }],
            "DefaultActions": [listener.default_action().to_property()],
            "LoadBalancerArn": alb.ref_value(),
            "Port": listener.port.value(),
            "Protocol": "HTTPS",
        })),
    )?;
    for rule in listener.rules() {
        stack.declare(
            ResourceType::ListenerRule,
            &format!("https{}", rule.priority),
            properties(json!({
                "Actions": [rule.action.to_property()],
                "Conditions": rule
                    .conditions
                    .iter()
                    .map(|condition| condition.to_property())
                    .collect::<Vec<_>>(),
                "ListenerArn": https.ref_value(),
                "Priority": rule.priority,
            })),
        )?;
    }

    alias_record(
        stack,
        "elb",
        inputs.hosted_zone_name,
        &domain,
        intrinsic::join("", vec![json!("dualstack."), alb.get_att("DNSName")]),
        alb.get_att("CanonicalHostedZoneID"),
    )?;

    info!(
        stack = %stack.name(),
        domain = %domain,
        min = MIN_CAPACITY,
        max = MAX_CAPACITY,
        "Declared compute tier"
    );

    let producer = stack.name().to_string();
    Ok(ComputeUnit {
        load_balancer: LoadBalancerHandle {
            producer: producer.clone(),
            arn: alb.exported(),
            full_name: alb.exported_attribute("LoadBalancerFullName"),
            dns_name: alb.exported_attribute("DNSName"),
            certificate: certificate.exported(),
            listener,
        },
        auto_scaling_group: AutoScalingGroupHandle {
            producer: producer.clone(),
            name: group.exported(),
            min_capacity: MIN_CAPACITY,
            max_capacity: MAX_CAPACITY,
            target_cpu_percent: TARGET_CPU_PERCENT,
        },
        bucket: BucketHandle {
            producer,
            name: bucket.exported(),
            arn: bucket.exported_attribute("Arn"),
            versioned: true,
            auto_delete_objects: true,
        },
    })
}
