// Copyright (c) 2025 - Cowboy AI, Inc.
//! Load Balancer Listener Routing
//!
//! The HTTPS listener in front of the web tier is a header-gated allow-list:
//! one rule forwards requests carrying the shared token in
//! [`TOKEN_HEADER`] to the target group, everything else falls through to a
//! fixed 403 default action.
//!
//! [`Listener::route`] evaluates a request the way the load balancer does:
//! rules in ascending priority, first full match wins, otherwise the default
//! action. Header names compare case-insensitively; header values must match
//! exactly.

use serde::Serialize;
use serde_json::{json, Value};

use super::invariants;
use super::network::Port;
use crate::template::intrinsic;

/// Header the edge layer uses to authenticate to the load balancer
pub const TOKEN_HEADER: &str = "X-Custom-Header";

/// Priority of the single header-match rule
pub const TOKEN_RULE_PRIORITY: u32 = 10;

/// Body of the default 403 response
pub const FORBIDDEN_BODY: &str = "<html><h1>403 Forbidden</h1></html>";

/// What the listener does with a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListenerAction {
    /// Send to the target group with this logical id
    Forward { target_group: String },
    /// Answer directly from the load balancer
    FixedResponse {
        status_code: u16,
        content_type: String,
        message_body: String,
    },
}

impl ListenerAction {
    /// The 403 answer for requests without the token
    pub fn forbidden() -> Self {
        Self::FixedResponse {
            status_code: 403,
            content_type: "text/html".to_string(),
            message_body: FORBIDDEN_BODY.to_string(),
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward { .. })
    }

    /// Action entry in CloudFormation shape
    pub fn to_property(&self) -> Value {
        match self {
            Self::Forward { target_group } => json!({
                "TargetGroupArn": intrinsic::reference(target_group),
                "Type": "forward",
            }),
            Self::FixedResponse {
                status_code,
                content_type,
                message_body,
            } => json!({
                "FixedResponseConfig": {
                    "ContentType": content_type,
                    "MessageBody": message_body,
                    "StatusCode": status_code.to_string(),
                },
                "Type": "fixed-response",
            }),
        }
    }
}

/// Condition of a listener rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum RuleCondition {
    /// The named header carries one of the listed values
    HttpHeader { name: String, values: Vec<String> },
}

impl RuleCondition {
    pub fn matches(&self, request: &HttpRequest) -> bool {
        match self {
            Self::HttpHeader { name, values } => request
                .header_values(name)
                .any(|value| values.iter().any(|allowed| allowed == value)),
        }
    }

    pub fn to_property(&self) -> Value {
        match self {
            Self::HttpHeader { name, values } => json!({
                "Field": "http-header",
                "HttpHeaderConfig": {
                    "HttpHeaderName": name,
                    "Values": values,
                },
            }),
        }
    }
}

/// A prioritized routing rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerRule {
    pub priority: u32,
    pub conditions: Vec<RuleCondition>,
    pub action: ListenerAction,
}

impl ListenerRule {
    /// A rule matches when every condition matches
    pub fn matches(&self, request: &HttpRequest) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(request))
    }
}

/// Listener with ordered rules and a default action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listener {
    pub port: Port,
    rules: Vec<ListenerRule>,
    default_action: ListenerAction,
}

impl Listener {
    /// Create a listener; rules must have strictly increasing priorities
    pub fn new(
        port: Port,
        rules: Vec<ListenerRule>,
        default_action: ListenerAction,
    ) -> Result<Self, invariants::ValidationError> {
        let priorities: Vec<u32> = rules.iter().map(|rule| rule.priority).collect();
        invariants::validate_priorities(&priorities)?;

        Ok(Self {
            port,
            rules,
            default_action,
        })
    }

    /// HTTPS listener that forwards only requests carrying `token`
    pub fn header_gated(
        target_group: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, invariants::ValidationError> {
        let rule = ListenerRule {
            priority: TOKEN_RULE_PRIORITY,
            conditions: vec![RuleCondition::HttpHeader {
                name: TOKEN_HEADER.to_string(),
                values: vec![token.into()],
            }],
            action: ListenerAction::Forward {
                target_group: target_group.into(),
            },
        };

        Self::new(Port::HTTPS, vec![rule], ListenerAction::forbidden())
    }

    pub fn rules(&self) -> &[ListenerRule] {
        &self.rules
    }

    pub fn default_action(&self) -> &ListenerAction {
        &self.default_action
    }

    /// Decide what happens to a request
    pub fn route(&self, request: &HttpRequest) -> &ListenerAction {
        self.rules
            .iter()
            .find(|rule| rule.matches(request))
            .map(|rule| &rule.action)
            .unwrap_or(&self.default_action)
    }
}

/// The parts of an HTTP request the listener looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// All values of a header, name compared case-insensitively
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener() -> Listener {
        Listener::header_gated("WebTg", "s3cret").unwrap()
    }

    #[test]
    fn test_single_rule_and_default() {
        let listener = listener();
        assert_eq!(listener.rules().len(), 1);
        assert_eq!(listener.rules()[0].priority, TOKEN_RULE_PRIORITY);
        assert_eq!(listener.default_action(), &ListenerAction::forbidden());
        assert_eq!(listener.port, Port::HTTPS);
    }

    #[test]
    fn test_token_routes_to_target() {
        let request = HttpRequest::new().with_header(TOKEN_HEADER, "s3cret");
        assert_eq!(
            listener().route(&request),
            &ListenerAction::Forward {
                target_group: "WebTg".to_string()
            }
        );
    }

    #[test]
    fn test_header_name_is_case_insensitive() {
        let request = HttpRequest::new().with_header("x-custom-header", "s3cret");
        assert!(listener().route(&request).is_forward());
    }

    #[test]
    fn test_missing_or_wrong_token_is_forbidden() {
        let listener = listener();
        for request in [
            HttpRequest::new(),
            HttpRequest::new().with_header(TOKEN_HEADER, ""),
            HttpRequest::new().with_header(TOKEN_HEADER, "S3CRET"),
            HttpRequest::new().with_header(TOKEN_HEADER, "s3cret "),
            HttpRequest::new().with_header("X-Other-Header", "s3cret"),
        ] {
            assert_eq!(listener.route(&request), &ListenerAction::forbidden());
        }
    }

    #[test]
    fn test_unordered_priorities_rejected() {
        let rule = |priority| ListenerRule {
            priority,
            conditions: vec![],
            action: ListenerAction::forbidden(),
        };
        assert!(Listener::new(Port::HTTPS, vec![rule(20), rule(10)], ListenerAction::forbidden()).is_err());
    }

    #[test]
    fn test_action_properties() {
        let forbidden = ListenerAction::forbidden().to_property();
        assert_eq!(forbidden["Type"], "fixed-response");
        assert_eq!(forbidden["FixedResponseConfig"]["StatusCode"], "403");
        assert_eq!(forbidden["FixedResponseConfig"]["MessageBody"], FORBIDDEN_BODY);

        let forward = ListenerAction::Forward {
            target_group: "WebTg".to_string(),
        }
        .to_property();
        assert_eq!(forward["TargetGroupArn"]["Ref"], "WebTg");
    }
}
