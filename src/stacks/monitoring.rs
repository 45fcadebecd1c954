// Copyright (c) 2025 - Cowboy AI, Inc.
//! Monitoring unit: dashboard, alarms and their notification topic

use serde_json::{json, Value};
use tracing::info;

use crate::domain::handles::{AutoScalingGroupHandle, LoadBalancerHandle};
use crate::domain::monitoring::color;
use crate::domain::{Alarm, ComparisonOperator, Dashboard, Metric, ResourceType, Statistic, Widget};
use crate::errors::InfrastructureResult;
use crate::template::{properties, Stack};

pub const CPU_ALARM_THRESHOLD: f64 = 70.0;
pub const IN_SERVICE_ALARM_THRESHOLD: f64 = 0.0;

const ALB_NAMESPACE: &str = "AWS/ApplicationELB";

/// Dashboard and alarms declared by the monitoring unit
#[derive(Debug, Clone)]
pub struct MonitoringUnit {
    pub dashboard: Dashboard,
    pub alarms: Vec<Alarm>,
}

fn alb_metric(name: &str, load_balancer: &Value, label: &str) -> Metric {
    Metric::new(ALB_NAMESPACE, name, Statistic::Sum)
        .dimension("LoadBalancer", load_balancer.clone())
        .label(label)
}

pub fn build(
    stack: &mut Stack,
    load_balancer: &LoadBalancerHandle,
    auto_scaling_group: &AutoScalingGroupHandle,
    email: &str,
) -> InfrastructureResult<MonitoringUnit> {
    stack.consume(load_balancer)?;
    stack.consume(auto_scaling_group)?;

    let alb = stack.resolve(&load_balancer.full_name);
    let group = stack.resolve(&auto_scaling_group.name);

    let cpu = Metric::new("AWS/EC2", "CPUUtilization", Statistic::Average)
        .dimension("AutoScalingGroupName", group.clone())
        .color(color::BLUE);
    let in_service = Metric::new("AWS/AutoScaling", "GroupInServiceInstances", Statistic::Average)
        .dimension("AutoScalingGroupName", group)
        .label("In Service Instances")
        .color(color::BLUE);

    let mut dashboard = Dashboard::new();
    dashboard.add_row(vec![Widget::text("# ALB Metrics", 24)]);
    dashboard.add_row(vec![
        Widget::graph(
            "ALB Request Count",
            vec![alb_metric("RequestCount", &alb, "ALB Request Count")],
            6,
        ),
        Widget::single_value(
            "ALB Active connections",
            vec![alb_metric("ActiveConnectionCount", &alb, "Active connections").color(color::PURPLE)],
            6,
            6,
        ),
        Widget::graph(
            "ALB Fixed Responses",
            vec![alb_metric("HTTP_Fixed_Response_Count", &alb, "Fixed Responses").color(color::RED)],
            12,
        ),
    ]);
    dashboard.add_row(vec![
        Widget::graph(
            "ALB HTTP Codes",
            vec![
                alb_metric("HTTPCode_Target_2XX_Count", &alb, "2xx OK").color(color::GREEN),
                alb_metric("HTTPCode_Target_4XX_Count", &alb, "4xx User error").color(color::AMBER),
                alb_metric("HTTPCode_Target_5XX_Count", &alb, "5xx Server error").color(color::RED),
            ],
            18,
        ),
        Widget::graph(
            "ALB Target errors",
            vec![alb_metric("TargetConnectionErrorCount", &alb, "Target Errors").color(color::RED)],
            6,
        ),
    ]);
    dashboard.add_row(vec![Widget::text("# ASG Metrics", 24)]);
    dashboard.add_row(vec![
        Widget::graph("ASG EC2 CPU Average", vec![cpu.clone()], 18),
        Widget::single_value("ASG In Service Instances", vec![in_service.clone()], 6, 6),
    ]);

    stack.declare(
        ResourceType::Dashboard,
        "cdn",
        properties(json!({
            "DashboardBody": dashboard.to_body()?,
            "DashboardName": stack.physical_name(ResourceType::Dashboard, "cdn"),
        })),
    )?;

    let topic_name = stack.physical_name(ResourceType::Topic, "cdn");
    let topic = stack.declare(
        ResourceType::Topic,
        "cdn",
        properties(json!({
            "DisplayName": topic_name,
            "TopicName": topic_name,
        })),
    )?;
    stack.declare(
        ResourceType::Subscription,
        "cdn",
        properties(json!({
            "Endpoint": email,
            "Protocol": "email",
            "TopicArn": topic.ref_value(),
        })),
    )?;

    let alarms = vec![
        Alarm {
            name: stack.physical_name(ResourceType::Alarm, "asg_ec2_cpu_avg"),
            metric: cpu,
            comparison: ComparisonOperator::GreaterThanThreshold,
            threshold: CPU_ALARM_THRESHOLD,
            evaluation_periods: 1,
        },
        Alarm {
            name: stack.physical_name(ResourceType::Alarm, "asg_in_service_instances"),
            metric: in_service,
            comparison: ComparisonOperator::LessThanOrEqualToThreshold,
            threshold: IN_SERVICE_ALARM_THRESHOLD,
            evaluation_periods: 1,
        },
    ];
    for (logical, alarm) in ["cpu", "in_service"].iter().zip(&alarms) {
        stack.declare(
            ResourceType::Alarm,
            logical,
            alarm.to_properties(vec![topic.ref_value()]),
        )?;
    }

    info!(
        stack = %stack.name(),
        widgets = dashboard.widgets().len(),
        alarms = alarms.len(),
        "Declared monitoring"
    );

    Ok(MonitoringUnit { dashboard, alarms })
}
