// Copyright (c) 2025 - Cowboy AI, Inc.
//! Intrinsic function builders

use serde_json::{json, Value};

pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn import_value(export_name: &str) -> Value {
    json!({ "Fn::ImportValue": export_name })
}

pub fn join(separator: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [separator, parts] })
}

pub fn base64(value: Value) -> Value {
    json!({ "Fn::Base64": value })
}

/// `Fn::Select` over the availability zones of the stack region
pub fn availability_zone(index: usize) -> Value {
    json!({ "Fn::Select": [index, { "Fn::GetAZs": "" }] })
}

pub fn pseudo(name: &str) -> Value {
    json!({ "Ref": format!("AWS::{}", name) })
}

/// Partition-aware ARN of a resource, e.g. an EC2 instance
pub fn arn(service: &str, resource: Value) -> Value {
    join(
        "",
        vec![
            json!("arn:"),
            pseudo("Partition"),
            json!(format!(":{}:", service)),
            pseudo("Region"),
            json!(":"),
            pseudo("AccountId"),
            json!(":"),
            resource,
        ],
    )
}

/// ARN of an AWS managed IAM policy
pub fn managed_policy_arn(name: &str) -> Value {
    join(
        "",
        vec![
            json!("arn:"),
            pseudo("Partition"),
            json!(format!(":iam::aws:policy/{}", name)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_and_get_att() {
        assert_eq!(reference("Vpc"), json!({ "Ref": "Vpc" }));
        assert_eq!(
            get_att("Alb", "DNSName"),
            json!({ "Fn::GetAtt": ["Alb", "DNSName"] })
        );
    }

    #[test]
    fn test_managed_policy_arn() {
        let value = managed_policy_arn("AmazonS3ReadOnlyAccess");
        let parts = &value["Fn::Join"][1];
        assert_eq!(parts[2], ":iam::aws:policy/AmazonS3ReadOnlyAccess");
    }

    #[test]
    fn test_availability_zone() {
        assert_eq!(availability_zone(1)["Fn::Select"][0], 1);
    }
}
