// Copyright (c) 2025 - Cowboy AI, Inc.
//! Bastion unit: one administrative host with a fixed public address

use serde_json::json;
use tracing::info;

use super::{instance_profile, service_role, user_data, INSTANCE_TYPE};
use crate::domain::handles::{HostHandle, NetworkHandle, SecurityGroupHandle};
use crate::domain::{ResourceType, ValidationError};
use crate::errors::InfrastructureResult;
use crate::naming;
use crate::template::{properties, Resource, Stack};

const BOOT_SCRIPT: &str = "#!/bin/bash\n\
apt-get update\n\
apt-get -y install net-tools awscli\n\
echo bastion > /etc/hostname\n\
sysctl kernel.hostname=bastion";

pub fn build(
    stack: &mut Stack,
    network: &NetworkHandle,
    bastion: &SecurityGroupHandle,
    ami: &str,
    key_name: Option<&str>,
) -> InfrastructureResult<HostHandle> {
    stack.consume(network)?;
    stack.consume(bastion)?;

    let first_public = network.public_subnets.first().ok_or_else(|| {
        ValidationError::BusinessRule("Bastion host needs a public subnet".to_string())
    })?;
    let subnet = stack.resolve(first_public);
    let group = stack.resolve(&bastion.group_id);

    let role = service_role(
        stack,
        "bastion",
        "ec2.amazonaws.com",
        &[
            "AmazonSSMManagedInstanceCore",
            "AmazonSSMPatchAssociation",
            "AmazonS3FullAccess",
        ],
        true,
    )?;
    let profile = instance_profile(stack, "bastion", &role)?;

    let mut host = properties(json!({
        "IamInstanceProfile": profile.ref_value(),
        "ImageId": ami,
        "InstanceType": INSTANCE_TYPE,
        "SecurityGroupIds": [group],
        "SubnetId": subnet,
        "Tags": [{ "Key": "Name", "Value": stack.physical_name(ResourceType::Instance, "bastion-host") }],
        "UserData": user_data(vec![json!(BOOT_SCRIPT)]),
    }));
    if let Some(key_name) = key_name {
        host.insert("KeyName".to_string(), json!(key_name));
    }
    let instance = stack.declare_resource(
        "bastion",
        Resource::new(ResourceType::Instance, host).depends_on(role.logical_id()),
    )?;

    let address = stack.declare(
        ResourceType::ElasticIp,
        "bastion",
        properties(json!({ "InstanceId": instance.ref_value() })),
    )?;

    let output = format!("{}OutputBastionEip", naming::pascal_case(stack.prefix()));
    stack.add_output(
        &output,
        address.ref_value(),
        Some("Public address of the bastion host"),
    );

    info!(stack = %stack.name(), key_pair = key_name.is_some(), "Declared bastion host");

    Ok(HostHandle {
        producer: stack.name().to_string(),
        instance_id: instance.exported(),
        elastic_ip: address.exported(),
    })
}
