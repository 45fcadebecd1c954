// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloud assembly output tests
//!
//! Writes the rendered graph to a temporary directory and reads it back.

mod fixtures;

use fixtures::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;

use rim_infrastructure::assembly::{template_file, MANIFEST_FILE, MANIFEST_VERSION};
use rim_infrastructure::domain::UnitKind;

#[test]
fn test_write_creates_manifest_and_templates() {
    // Arrange
    let dir = tempfile::tempdir().expect("temp dir");
    let assembly = assembly();

    // Act
    let written = assembly.write_to(dir.path()).expect("writes");

    // Assert
    assert_eq!(written.len(), 7);
    assert!(dir.path().join(MANIFEST_FILE).is_file());
    for unit in UnitKind::ORDER {
        let file = dir.path().join(template_file(&stack_name(unit)));
        assert!(file.is_file(), "{} missing", file.display());
    }
}

#[test]
fn test_written_manifest_lists_every_stack() {
    let dir = tempfile::tempdir().expect("temp dir");
    assembly().write_to(dir.path()).expect("writes");

    let manifest: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(MANIFEST_FILE)).expect("reads"))
            .expect("valid JSON");

    assert_eq!(manifest["version"], MANIFEST_VERSION);
    let artifacts = manifest["artifacts"].as_object().expect("artifacts");
    assert_eq!(artifacts.len(), 6);
    for artifact in artifacts.values() {
        assert_eq!(artifact["type"], "aws:cloudformation:stack");
        assert!(artifact["properties"]["templateFile"]
            .as_str()
            .expect("template file")
            .ends_with(".template.json"));
    }
}

#[test]
fn test_written_templates_match_rendered() {
    let dir = tempfile::tempdir().expect("temp dir");
    let assembly = assembly();
    assembly.write_to(dir.path()).expect("writes");

    for unit in UnitKind::ORDER {
        let on_disk: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join(template_file(&stack_name(unit)))).expect("reads"),
        )
        .expect("valid JSON");

        assert_eq!(on_disk, template(&assembly, unit));
        assert_eq!(on_disk["AWSTemplateFormatVersion"], "2010-09-09");
    }
}

#[test]
fn test_second_write_is_identical() {
    let first = tempfile::tempdir().expect("temp dir");
    let second = tempfile::tempdir().expect("temp dir");

    assembly().write_to(first.path()).expect("writes");
    assembly().write_to(second.path()).expect("writes");

    for name in fs::read_dir(first.path()).expect("lists").map(|entry| {
        entry.expect("entry").file_name()
    }) {
        let a = fs::read(first.path().join(&name)).expect("reads");
        let b = fs::read(second.path().join(&name)).expect("reads");
        assert!(a == b, "{:?} differs between writes", name);
    }
}

#[test]
fn test_tags_reach_taggable_resources_only() {
    let assembly = assembly();
    let template = template(&assembly, UnitKind::Network);

    let vpc = only_resource(&template, "AWS::EC2::VPC");
    let tags = vpc["Properties"]["Tags"].as_array().expect("tags");
    assert!(tags.iter().any(|tag| tag["Key"] == "Creator" && tag["Value"] == "alice"));

    for association in resources_of(&template, "AWS::EC2::SubnetRouteTableAssociation") {
        assert!(association["Properties"].get("Tags").is_none());
    }
}

#[test]
fn test_blocked_template_path_in_old_output_is_replaced() {
    // Arrange: a stale file and a directory squatting on a template path
    let root = tempfile::tempdir().expect("temp dir");
    let out = root.path().join("cdk.out");
    let blocked = out.join(template_file(&stack_name(UnitKind::Network)));
    fs::create_dir_all(&blocked).expect("creates blocker");
    fs::write(out.join("stale.json"), "{}").expect("writes stale file");

    // Act
    let written = assembly().write_to(&out).expect("writes");

    // Assert
    assert!(blocked.is_file());
    assert!(!out.join("stale.json").exists());
    assert_eq!(fs::read_dir(&out).expect("lists").count(), written.len());
    let leftovers: Vec<_> = fs::read_dir(root.path())
        .expect("lists")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("cdk.out")]);
}

#[test]
fn test_failed_write_leaves_nothing_behind() {
    // Arrange: the output path is taken by a regular file
    let root = tempfile::tempdir().expect("temp dir");
    let out = root.path().join("cdk.out");
    fs::write(&out, "keep").expect("writes file");

    // Act
    let result = assembly().write_to(&out);

    // Assert
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&out).expect("reads"), "keep");
    assert_eq!(fs::read_dir(root.path()).expect("lists").count(), 1);
    assert!(!root.path().join(MANIFEST_FILE).exists());
}
