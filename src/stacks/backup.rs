// Copyright (c) 2025 - Cowboy AI, Inc.
//! Backup unit
//!
//! One vault with two plans: a daily host snapshot and continuous backup of
//! the content bucket. The restore role carries an `iam:PassRole` grant on
//! every role, which is recorded as a warning on the stack.

use serde_json::{json, Value};
use tracing::info;

use super::{service_role, POLICY_VERSION};
use crate::domain::handles::{BucketHandle, HostHandle};
use crate::domain::{BackupRule, ResourceType};
use crate::errors::InfrastructureResult;
use crate::template::{intrinsic, properties, RemovalPolicy, Resource, ResourceRef, Stack};

const BACKUP_SERVICE: &str = "backup.amazonaws.com";

/// Rules of the two backup plans
#[derive(Debug, Clone)]
pub struct BackupUnit {
    pub host_rule: BackupRule,
    pub bucket_rule: BackupRule,
}

pub fn build(
    stack: &mut Stack,
    host: &HostHandle,
    bucket: &BucketHandle,
) -> InfrastructureResult<BackupUnit> {
    stack.consume(host)?;
    stack.consume(bucket)?;

    let instance_id = stack.resolve(&host.instance_id);
    let bucket_arn = stack.resolve(&bucket.arn);

    let vault = stack.declare_resource(
        "backup",
        Resource::new(
            ResourceType::BackupVault,
            properties(json!({
                "BackupVaultName": stack.physical_name(ResourceType::BackupVault, "backup"),
            })),
        )
        .with_removal_policy(RemovalPolicy::Delete),
    )?;

    let backup_role = service_role(
        stack,
        "backup",
        BACKUP_SERVICE,
        &[
            "service-role/AWSBackupServiceRolePolicyForBackup",
            "AWSBackupServiceRolePolicyForS3Backup",
        ],
        true,
    )?;
    let restore_role = service_role(
        stack,
        "restore",
        BACKUP_SERVICE,
        &[
            "service-role/AWSBackupServiceRolePolicyForRestores",
            "AWSBackupServiceRolePolicyForS3Restore",
        ],
        true,
    )?;

    let pass_role = stack.physical_name(ResourceType::Policy, "iam-passrole");
    stack.declare(
        ResourceType::Policy,
        "iam-passrole",
        properties(json!({
            "PolicyDocument": {
                "Statement": [{
                    "Action": "iam:PassRole",
                    "Effect": "Allow",
                    "Resource": "*",
                }],
                "Version": POLICY_VERSION,
            },
            "PolicyName": pass_role,
            "Roles": [restore_role.ref_value()],
        })),
    )?;
    stack.warn(format!(
        "Policy {} grants iam:PassRole on every role in the account to the restore role",
        pass_role
    ));

    let host_rule = BackupRule::daily_host(rule_name(stack, "backup"))?;
    let host_arn = intrinsic::arn(
        "ec2",
        intrinsic::join("", vec![json!("instance/"), instance_id]),
    );
    plan_with_selection(stack, "backup", &vault, &backup_role, &host_rule, host_arn)?;

    let bucket_rule = BackupRule::continuous_bucket(rule_name(stack, "s3-backup"))?;
    plan_with_selection(stack, "s3-backup", &vault, &backup_role, &bucket_rule, bucket_arn)?;

    info!(
        stack = %stack.name(),
        schedule = %host_rule.schedule.expression().unwrap_or_default(),
        "Declared backup plans"
    );

    Ok(BackupUnit {
        host_rule,
        bucket_rule,
    })
}

/// First rule of the plan `logical`, e.g. `alice-backup-plan-rule01`
fn rule_name(stack: &Stack, plan: &str) -> String {
    format!("{}-rule01", stack.physical_name(ResourceType::BackupPlan, plan))
}

fn plan_with_selection(
    stack: &mut Stack,
    logical: &str,
    vault: &ResourceRef,
    role: &ResourceRef,
    rule: &BackupRule,
    resource: Value,
) -> InfrastructureResult<()> {
    let plan = stack.declare(
        ResourceType::BackupPlan,
        logical,
        properties(json!({
            "BackupPlan": {
                "BackupPlanName": stack.physical_name(ResourceType::BackupPlan, logical),
                "BackupPlanRule": [rule.to_property(vault.get_att("BackupVaultName"))],
            },
        })),
    )?;

    stack.declare(
        ResourceType::BackupSelection,
        logical,
        properties(json!({
            "BackupPlanId": plan.get_att("BackupPlanId"),
            "BackupSelection": {
                "IamRoleArn": role.get_att("Arn"),
                "Resources": [resource],
                "SelectionName": stack.physical_name(ResourceType::BackupSelection, logical),
            },
        })),
    )?;

    Ok(())
}
