// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network unit: VPC, subnets and security groups

use serde_json::json;
use tracing::info;

use crate::config::IngressPolicy;
use crate::domain::handles::{NetworkHandle, SecurityGroupHandle};
use crate::domain::{HandleKind, IngressRule, Ipv4Cidr, Port, ResourceType, SubnetKind};
use crate::errors::InfrastructureResult;
use crate::template::{intrinsic, properties, Resource, ResourceRef, Stack};

pub const VPC_CIDR: &str = "10.0.0.0/16";
pub const AVAILABILITY_ZONES: usize = 2;
pub const SUBNET_MASK: u8 = 24;

/// Handles produced by the network unit
#[derive(Debug, Clone)]
pub struct NetworkUnit {
    pub network: NetworkHandle,
    pub web: SecurityGroupHandle,
    pub load_balancer: SecurityGroupHandle,
    pub bastion: SecurityGroupHandle,
}

pub fn build(stack: &mut Stack, ingress: &IngressPolicy) -> InfrastructureResult<NetworkUnit> {
    let cidr = Ipv4Cidr::new(VPC_CIDR)?;

    let vpc = stack.declare(
        ResourceType::Vpc,
        "main",
        properties(json!({
            "CidrBlock": cidr.to_string(),
            "EnableDnsHostnames": true,
            "EnableDnsSupport": true,
            "InstanceTenancy": "default",
            "Tags": [{ "Key": "Name", "Value": stack.physical_name(ResourceType::Vpc, "main") }],
        })),
    )?;

    let gateway = stack.declare(
        ResourceType::InternetGateway,
        "main",
        properties(json!({
            "Tags": [{ "Key": "Name", "Value": stack.physical_name(ResourceType::InternetGateway, "main") }],
        })),
    )?;
    let attachment = stack.declare(
        ResourceType::VpcGatewayAttachment,
        "main",
        properties(json!({
            "InternetGatewayId": gateway.ref_value(),
            "VpcId": vpc.ref_value(),
        })),
    )?;

    // Public blocks first, then isolated, one per zone each
    let mut public_subnets = Vec::new();
    let mut isolated_subnets = Vec::new();
    let mut block_index = 0;
    for kind in [SubnetKind::Public, SubnetKind::Isolated] {
        for zone in 0..AVAILABILITY_ZONES {
            let block = cidr.subnet(SUBNET_MASK, block_index)?;
            block_index += 1;

            let subnet = subnet(stack, &vpc, &gateway, &attachment, kind, zone, block)?;
            match kind {
                SubnetKind::Public => public_subnets.push(subnet.exported()),
                SubnetKind::Isolated => isolated_subnets.push(subnet.exported()),
            }
        }
    }

    let web = security_group(
        stack,
        &vpc,
        "webapp",
        HandleKind::WebSecurityGroup,
        vec![
            IngressRule::tcp(ingress.web_ssh, Port::SSH, "SSH access"),
            IngressRule::tcp(ingress.web_http, Port::HTTP, "HTTP access"),
        ],
    )?;
    let load_balancer = security_group(
        stack,
        &vpc,
        "alb",
        HandleKind::LoadBalancerSecurityGroup,
        vec![IngressRule::tcp(ingress.load_balancer_https, Port::HTTPS, "HTTPS access")],
    )?;
    let bastion = security_group(
        stack,
        &vpc,
        "bastion",
        HandleKind::BastionSecurityGroup,
        vec![IngressRule::tcp(ingress.bastion_ssh, Port::SSH, "SSH access")],
    )?;

    info!(
        stack = %stack.name(),
        vpc = %cidr,
        public_subnets = public_subnets.len(),
        isolated_subnets = isolated_subnets.len(),
        "Declared network"
    );

    Ok(NetworkUnit {
        network: NetworkHandle {
            producer: stack.name().to_string(),
            vpc_id: vpc.exported(),
            cidr,
            public_subnets,
            isolated_subnets,
        },
        web,
        load_balancer,
        bastion,
    })
}

fn subnet(
    stack: &mut Stack,
    vpc: &ResourceRef,
    gateway: &ResourceRef,
    attachment: &ResourceRef,
    kind: SubnetKind,
    zone: usize,
    block: Ipv4Cidr,
) -> InfrastructureResult<ResourceRef> {
    let logical = format!("{}{}", kind.as_str().to_lowercase(), zone + 1);

    let subnet = stack.declare(
        ResourceType::Subnet,
        &logical,
        properties(json!({
            "AvailabilityZone": intrinsic::availability_zone(zone),
            "CidrBlock": block.to_string(),
            "MapPublicIpOnLaunch": kind == SubnetKind::Public,
            "Tags": [
                { "Key": "Name", "Value": stack.physical_name(ResourceType::Subnet, &logical) },
                { "Key": "aws-cdk:subnet-type", "Value": kind.as_str() },
            ],
            "VpcId": vpc.ref_value(),
        })),
    )?;

    let table = stack.declare(
        ResourceType::RouteTable,
        &logical,
        properties(json!({
            "Tags": [{ "Key": "Name", "Value": stack.physical_name(ResourceType::RouteTable, &logical) }],
            "VpcId": vpc.ref_value(),
        })),
    )?;
    stack.declare(
        ResourceType::SubnetRouteTableAssociation,
        &logical,
        properties(json!({
            "RouteTableId": table.ref_value(),
            "SubnetId": subnet.ref_value(),
        })),
    )?;

    if kind == SubnetKind::Public {
        let route = Resource::new(
            ResourceType::Route,
            properties(json!({
                "DestinationCidrBlock": Ipv4Cidr::ANYWHERE.to_string(),
                "GatewayId": gateway.ref_value(),
                "RouteTableId": table.ref_value(),
            })),
        )
        .depends_on(attachment.logical_id());
        stack.declare_resource(&logical, route)?;
    }

    Ok(subnet)
}

fn security_group(
    stack: &mut Stack,
    vpc: &ResourceRef,
    logical: &str,
    kind: HandleKind,
    ingress: Vec<IngressRule>,
) -> InfrastructureResult<SecurityGroupHandle> {
    let name = stack.physical_name(ResourceType::SecurityGroup, logical);

    let group = stack.declare(
        ResourceType::SecurityGroup,
        logical,
        properties(json!({
            "GroupDescription": format!("{}/{}", stack.name(), name),
            "SecurityGroupEgress": [{
                "CidrIp": Ipv4Cidr::ANYWHERE.to_string(),
                "Description": "Allow all outbound traffic by default",
                "IpProtocol": "-1",
            }],
            "SecurityGroupIngress": ingress.iter().map(IngressRule::to_property).collect::<Vec<_>>(),
            "VpcId": vpc.ref_value(),
        })),
    )?;

    for rule in ingress.iter().filter(|rule| rule.is_open_to_world()) {
        stack.warn(format!(
            "Security group {} admits {} on port {} from {}",
            name, rule.description, rule.port, rule.peer
        ));
    }

    Ok(SecurityGroupHandle {
        kind,
        producer: stack.name().to_string(),
        group_id: group.exported_attribute("GroupId"),
        ingress,
    })
}

