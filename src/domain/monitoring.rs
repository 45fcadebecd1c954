// Copyright (c) 2025 - Cowboy AI, Inc.
//! Metrics, Alarms and Dashboard Layout
//!
//! Alarms are observational only: they publish to a topic and carry no
//! remediation. [`Alarm::breaches`] evaluates a single datapoint against the
//! alarm's operator and threshold, which is all one evaluation period needs.
//!
//! Dashboards are laid out on a 24-column grid. Each call to
//! [`Dashboard::add_row`] starts at the left edge below everything placed so
//! far; widgets that do not fit on the current line wrap to the next one.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::template::intrinsic;

/// Width of the dashboard grid
pub const GRID_WIDTH: u32 = 24;

/// Default metric period in seconds
pub const DEFAULT_PERIOD: u32 = 300;

/// How datapoints within a period are aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Statistic {
    Average,
    Sum,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "Average",
            Self::Sum => "Sum",
        }
    }
}

/// A metric series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<(String, Value)>,
    pub statistic: Statistic,
    pub period: u32,
    pub label: Option<String>,
    pub color: Option<String>,
}

impl Metric {
    pub fn new(namespace: &str, metric_name: &str, statistic: Statistic) -> Self {
        Self {
            namespace: namespace.to_string(),
            metric_name: metric_name.to_string(),
            dimensions: Vec::new(),
            statistic,
            period: DEFAULT_PERIOD,
            label: None,
            color: None,
        }
    }

    pub fn dimension(mut self, name: &str, value: Value) -> Self {
        self.dimensions.push((name.to_string(), value));
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    /// Row of the `metrics` array inside a dashboard widget
    fn to_widget_row(&self) -> Value {
        let mut row = vec![json!(self.namespace), json!(self.metric_name)];
        for (name, value) in &self.dimensions {
            row.push(json!(name));
            row.push(value.clone());
        }

        let mut options = Map::new();
        if let Some(label) = &self.label {
            options.insert("label".to_string(), json!(label));
        }
        if let Some(color) = &self.color {
            options.insert("color".to_string(), json!(color));
        }
        options.insert("stat".to_string(), json!(self.statistic.as_str()));
        options.insert("period".to_string(), json!(self.period));
        row.push(Value::Object(options));

        Value::Array(row)
    }
}

/// Named colors of the dashboard palette
pub mod color {
    pub const BLUE: &str = "#1f77b4";
    pub const GREEN: &str = "#2ca02c";
    pub const RED: &str = "#d62728";
    pub const PURPLE: &str = "#9467bd";
    pub const AMBER: &str = "#ffbf00";
}

/// Comparison between a datapoint and the alarm threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonOperator {
    GreaterThanThreshold,
    LessThanOrEqualToThreshold,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThanThreshold => "GreaterThanThreshold",
            Self::LessThanOrEqualToThreshold => "LessThanOrEqualToThreshold",
        }
    }

    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThanThreshold => value > threshold,
            Self::LessThanOrEqualToThreshold => value <= threshold,
        }
    }
}

/// A threshold alarm on one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alarm {
    pub name: String,
    pub metric: Metric,
    pub comparison: ComparisonOperator,
    pub threshold: f64,
    pub evaluation_periods: u32,
}

impl Alarm {
    /// Whether one datapoint puts the alarm in ALARM state
    pub fn breaches(&self, value: f64) -> bool {
        self.comparison.compare(value, self.threshold)
    }

    /// Resource properties, publishing to `actions`
    pub fn to_properties(&self, actions: Vec<Value>) -> Map<String, Value> {
        let dimensions: Vec<Value> = self
            .metric
            .dimensions
            .iter()
            .map(|(name, value)| json!({ "Name": name, "Value": value }))
            .collect();

        crate::template::properties(json!({
            "AlarmActions": actions,
            "AlarmName": self.name,
            "ComparisonOperator": self.comparison.as_str(),
            "Dimensions": dimensions,
            "EvaluationPeriods": self.evaluation_periods,
            "MetricName": self.metric.metric_name,
            "Namespace": self.metric.namespace,
            "Period": self.metric.period,
            "Statistic": self.metric.statistic.as_str(),
            "Threshold": self.threshold,
        }))
    }
}

/// Visual form of a metric widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricView {
    TimeSeries,
    SingleValue,
}

/// One dashboard widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Widget {
    Text {
        markdown: String,
        width: u32,
        height: u32,
    },
    Metrics {
        title: String,
        view: MetricView,
        metrics: Vec<Metric>,
        width: u32,
        height: u32,
    },
}

impl Widget {
    pub fn text(markdown: &str, width: u32) -> Self {
        Self::Text {
            markdown: markdown.to_string(),
            width,
            height: 2,
        }
    }

    pub fn graph(title: &str, metrics: Vec<Metric>, width: u32) -> Self {
        Self::Metrics {
            title: title.to_string(),
            view: MetricView::TimeSeries,
            metrics,
            width,
            height: 6,
        }
    }

    pub fn single_value(title: &str, metrics: Vec<Metric>, width: u32, height: u32) -> Self {
        Self::Metrics {
            title: title.to_string(),
            view: MetricView::SingleValue,
            metrics,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Self::Text { width, .. } | Self::Metrics { width, .. } => (*width).min(GRID_WIDTH),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Text { height, .. } | Self::Metrics { height, .. } => *height,
        }
    }

    fn to_body(&self, x: u32, y: u32, region: &Value) -> Value {
        match self {
            Self::Text { markdown, .. } => json!({
                "type": "text",
                "width": self.width(),
                "height": self.height(),
                "x": x,
                "y": y,
                "properties": { "markdown": markdown },
            }),
            Self::Metrics {
                title,
                view,
                metrics,
                ..
            } => {
                let mut properties = json!({
                    "view": match view {
                        MetricView::TimeSeries => "timeSeries",
                        MetricView::SingleValue => "singleValue",
                    },
                    "title": title,
                    "region": region,
                    "metrics": metrics.iter().map(Metric::to_widget_row).collect::<Vec<_>>(),
                });
                if *view == MetricView::TimeSeries {
                    properties["legend"] = json!({ "position": "right" });
                    properties["yAxis"] = json!({});
                }
                json!({
                    "type": "metric",
                    "width": self.width(),
                    "height": self.height(),
                    "x": x,
                    "y": y,
                    "properties": properties,
                })
            }
        }
    }
}

/// A widget at its grid position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedWidget {
    pub x: u32,
    pub y: u32,
    pub widget: Widget,
}

/// Dashboard laid out row by row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    widgets: Vec<PlacedWidget>,
    next_y: u32,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `widgets` left to right below everything placed so far
    pub fn add_row(&mut self, widgets: Vec<Widget>) {
        let mut x = 0;
        let mut line_height = 0;

        for widget in widgets {
            if x + widget.width() > GRID_WIDTH {
                self.next_y += line_height;
                x = 0;
                line_height = 0;
            }

            line_height = line_height.max(widget.height());
            let width = widget.width();
            self.widgets.push(PlacedWidget {
                x,
                y: self.next_y,
                widget,
            });
            x += width;
        }

        self.next_y += line_height;
    }

    pub fn widgets(&self) -> &[PlacedWidget] {
        &self.widgets
    }

    /// Dashboard body; intrinsic values inside widgets are spliced in with
    /// `Fn::Join` because the body must be a single string
    pub fn to_body(&self) -> Result<Value, serde_json::Error> {
        let region = intrinsic::pseudo("Region");
        let body = json!({
            "start": "start",
            "end": "end",
            "periodOverride": "auto",
            "widgets": self
                .widgets
                .iter()
                .map(|placed| placed.widget.to_body(placed.x, placed.y, &region))
                .collect::<Vec<_>>(),
        });

        tokenize(body)
    }
}

const TOKEN_OPEN: &str = "${Token[";
const TOKEN_CLOSE: &str = "]}";

/// Serialize `value` to a string, lifting embedded intrinsic objects into an
/// `Fn::Join` around the string
fn tokenize(value: Value) -> Result<Value, serde_json::Error> {
    let mut tokens = Vec::new();
    let replaced = replace_intrinsics(value, &mut tokens);
    let text = serde_json::to_string(&replaced)?;

    if tokens.is_empty() {
        return Ok(Value::String(text));
    }

    let mut parts = Vec::new();
    let mut rest = text.as_str();
    while let Some(start) = rest.find(TOKEN_OPEN) {
        let after_open = &rest[start + TOKEN_OPEN.len()..];
        let Some(end) = after_open.find(TOKEN_CLOSE) else {
            break;
        };
        let Some(token) = after_open[..end]
            .parse::<usize>()
            .ok()
            .and_then(|index| tokens.get(index))
        else {
            break;
        };

        // Each token was serialized as a JSON string, drop its quotes
        let literal = rest[..start].strip_suffix('"').unwrap_or(&rest[..start]);
        if !literal.is_empty() {
            parts.push(json!(literal));
        }
        parts.push(token.clone());

        let tail = &after_open[end + TOKEN_CLOSE.len()..];
        rest = tail.strip_prefix('"').unwrap_or(tail);
    }
    if !rest.is_empty() {
        parts.push(json!(rest));
    }

    Ok(intrinsic::join("", parts))
}

fn is_intrinsic(map: &Map<String, Value>) -> bool {
    map.len() == 1
        && map
            .keys()
            .next()
            .map(|key| key == "Ref" || key.starts_with("Fn::"))
            .unwrap_or(false)
}

fn replace_intrinsics(value: Value, tokens: &mut Vec<Value>) -> Value {
    match value {
        Value::Object(map) if is_intrinsic(&map) => {
            tokens.push(Value::Object(map));
            Value::String(format!("{}{}{}", TOKEN_OPEN, tokens.len() - 1, TOKEN_CLOSE))
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, replace_intrinsics(value, tokens)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| replace_intrinsics(item, tokens))
                .collect(),
        ),
        other => other,
    }
}
