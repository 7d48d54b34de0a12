//! Workflow node types and configurations.
//!
//! Nodes are the building blocks of a workflow graph. Each node has:
//! - A unique ID, stable for the node's lifetime
//! - A kind-specific configuration (tagged union, one variant per kind)
//! - A position on the canvas
//! - Execution state (status, last output, last error)
//!
//! The node kind is carried by the configuration's discriminant and is
//! immutable after creation: replacing a node's config with a config of a
//! different kind is rejected by the graph (see `WorkflowGraph`).

use crate::binding::Binding;
use flowboard_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// A node's position on the editor canvas.
///
/// Positions come from user drags or from the external layout engine and are
/// accepted without validation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The kind of a workflow node.
///
/// The string forms are the wire tags used by the persistence backend
/// (camelCase). `apiAction` additionally accepts the legacy untyped
/// `action` tag on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Start,
    ApiAction,
    EmailAction,
    DatabaseAction,
    ScriptAction,
    WebhookAction,
    GoogleCalendarAction,
    GoogleDocsAction,
    Condition,
    Constant,
    Branch,
    Join,
    Merge,
    Template,
    End,
}

impl NodeKind {
    /// Returns the wire tag for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ApiAction => "apiAction",
            Self::EmailAction => "emailAction",
            Self::DatabaseAction => "databaseAction",
            Self::ScriptAction => "scriptAction",
            Self::WebhookAction => "webhookAction",
            Self::GoogleCalendarAction => "googleCalendarAction",
            Self::GoogleDocsAction => "googleDocsAction",
            Self::Condition => "condition",
            Self::Constant => "constant",
            Self::Branch => "branch",
            Self::Join => "join",
            Self::Merge => "merge",
            Self::Template => "template",
            Self::End => "end",
        }
    }

    /// Returns the default label shown for a freshly added node.
    #[must_use]
    pub const fn default_label(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::ApiAction => "API Action",
            Self::EmailAction => "Email Action",
            Self::DatabaseAction => "Database Action",
            Self::ScriptAction => "Script Action",
            Self::WebhookAction => "Webhook Action",
            Self::GoogleCalendarAction => "Google Calendar",
            Self::GoogleDocsAction => "Google Docs",
            Self::Condition => "Condition",
            Self::Constant => "Constant",
            Self::Branch => "Branch",
            Self::Join => "Join",
            Self::Merge => "Merge",
            Self::Template => "Template",
            Self::End => "End",
        }
    }

    /// Returns true if nodes of this kind produce an output that downstream
    /// bindings may address by path.
    #[must_use]
    pub const fn is_output_producing(&self) -> bool {
        matches!(
            self,
            Self::ApiAction
                | Self::EmailAction
                | Self::DatabaseAction
                | Self::ScriptAction
                | Self::WebhookAction
                | Self::GoogleCalendarAction
                | Self::GoogleDocsAction
        )
    }

    /// Returns the minimum number of ports for kinds that own a port list.
    ///
    /// `None` for kinds with fixed connection points.
    #[must_use]
    pub const fn port_floor(&self) -> Option<usize> {
        match self {
            Self::Branch => Some(1),
            Self::Join | Self::Merge | Self::Template => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a node a port list attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSide {
    /// Ports are outputs (edges leave through them).
    Output,
    /// Ports are inputs (edges arrive through them).
    Input,
}

/// HTTP method for an API action node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Returns true if requests with this method carry a body.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for an API action node.
///
/// `mapped_outputs` declares curated re-exports of the response body:
/// alias -> dot path. Downstream bindings may address these as
/// `_mapped.<alias>` instead of a raw path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiActionConfig {
    pub url: Option<String>,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub request_body: Option<JsonValue>,
    pub mapped_outputs: BTreeMap<String, String>,
}

/// Configuration for an email action node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailActionConfig {
    pub template: Option<String>,
    pub recipients: Vec<String>,
    pub subject: Option<String>,
    pub custom_data: JsonValue,
    pub mapped_outputs: BTreeMap<String, String>,
}

/// Configuration for a database action node (execution not yet wired).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseActionConfig {
    pub query: Option<String>,
    pub mapped_outputs: BTreeMap<String, String>,
}

/// Configuration for a script action node (execution not yet wired).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScriptActionConfig {
    pub script: Option<String>,
    pub mapped_outputs: BTreeMap<String, String>,
}

/// Configuration for a webhook action node (execution not yet wired).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookActionConfig {
    pub url: Option<String>,
    pub mapped_outputs: BTreeMap<String, String>,
}

/// Configuration for a Google Calendar action node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleCalendarActionConfig {
    pub calendar_id: Option<String>,
    pub operation: Option<String>,
    pub mapped_outputs: BTreeMap<String, String>,
}

/// Configuration for a Google Docs action node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleDocsActionConfig {
    pub document_id: Option<String>,
    pub operation: Option<String>,
    pub mapped_outputs: BTreeMap<String, String>,
}

/// Configuration for a condition node.
///
/// Operands are bindings: static literals or references into a connected
/// producer's output. Evaluation itself is pure and local, see the
/// `condition` module.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionConfig {
    pub operator: crate::condition::ConditionOperator,
    pub value_a: Binding,
    pub value_b: Binding,
}

/// Configuration for a constant node.
///
/// A constant exposes `value` under the synthetic path `"value"`.
/// `target_field` labels the binding candidate offered to consumers; an
/// empty target field hides the constant from the binding picker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstantConfig {
    pub value: JsonValue,
    pub target_field: String,
}

/// Configuration for a branch node: an ordered list of output ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BranchConfig {
    pub output_ports: Vec<String>,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            output_ports: vec!["output-1".to_string(), "output-2".to_string()],
        }
    }
}

/// Configuration for a join node: an ordered list of input ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinConfig {
    pub input_ports: Vec<String>,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            input_ports: default_input_ports(),
        }
    }
}

/// Configuration for a merge node: input ports plus the separator used when
/// the backend concatenates the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeConfig {
    pub input_ports: Vec<String>,
    pub separator: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_ports: default_input_ports(),
            separator: String::new(),
        }
    }
}

/// Configuration for a template node: input ports plus the template text the
/// backend interpolates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateConfig {
    pub input_ports: Vec<String>,
    pub template: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            input_ports: default_input_ports(),
            template: String::new(),
        }
    }
}

fn default_input_ports() -> Vec<String> {
    vec!["input-1".to_string(), "input-2".to_string()]
}

/// Configuration for a start node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StartConfig {}

/// Configuration for an end node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EndConfig {}

/// Configuration for a node, varying by kind.
///
/// The serde tag doubles as the node kind on the wire, so a node's `data`
/// blob deserializes straight into the right variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeConfig {
    Start(StartConfig),
    /// `action` is the legacy untyped tag kept for backward compatibility.
    #[serde(alias = "action")]
    ApiAction(ApiActionConfig),
    EmailAction(EmailActionConfig),
    DatabaseAction(DatabaseActionConfig),
    ScriptAction(ScriptActionConfig),
    WebhookAction(WebhookActionConfig),
    GoogleCalendarAction(GoogleCalendarActionConfig),
    GoogleDocsAction(GoogleDocsActionConfig),
    Condition(ConditionConfig),
    Constant(ConstantConfig),
    Branch(BranchConfig),
    Join(JoinConfig),
    Merge(MergeConfig),
    Template(TemplateConfig),
    End(EndConfig),
}

impl NodeConfig {
    /// Returns the kind of this node configuration.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Start(_) => NodeKind::Start,
            Self::ApiAction(_) => NodeKind::ApiAction,
            Self::EmailAction(_) => NodeKind::EmailAction,
            Self::DatabaseAction(_) => NodeKind::DatabaseAction,
            Self::ScriptAction(_) => NodeKind::ScriptAction,
            Self::WebhookAction(_) => NodeKind::WebhookAction,
            Self::GoogleCalendarAction(_) => NodeKind::GoogleCalendarAction,
            Self::GoogleDocsAction(_) => NodeKind::GoogleDocsAction,
            Self::Condition(_) => NodeKind::Condition,
            Self::Constant(_) => NodeKind::Constant,
            Self::Branch(_) => NodeKind::Branch,
            Self::Join(_) => NodeKind::Join,
            Self::Merge(_) => NodeKind::Merge,
            Self::Template(_) => NodeKind::Template,
            Self::End(_) => NodeKind::End,
        }
    }

    /// Creates the default configuration for a kind.
    #[must_use]
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Start => Self::Start(StartConfig::default()),
            NodeKind::ApiAction => Self::ApiAction(ApiActionConfig::default()),
            NodeKind::EmailAction => Self::EmailAction(EmailActionConfig::default()),
            NodeKind::DatabaseAction => Self::DatabaseAction(DatabaseActionConfig::default()),
            NodeKind::ScriptAction => Self::ScriptAction(ScriptActionConfig::default()),
            NodeKind::WebhookAction => Self::WebhookAction(WebhookActionConfig::default()),
            NodeKind::GoogleCalendarAction => {
                Self::GoogleCalendarAction(GoogleCalendarActionConfig::default())
            }
            NodeKind::GoogleDocsAction => Self::GoogleDocsAction(GoogleDocsActionConfig::default()),
            NodeKind::Condition => Self::Condition(ConditionConfig::default()),
            NodeKind::Constant => Self::Constant(ConstantConfig::default()),
            NodeKind::Branch => Self::Branch(BranchConfig::default()),
            NodeKind::Join => Self::Join(JoinConfig::default()),
            NodeKind::Merge => Self::Merge(MergeConfig::default()),
            NodeKind::Template => Self::Template(TemplateConfig::default()),
            NodeKind::End => Self::End(EndConfig::default()),
        }
    }

    /// Returns the curated output re-exports (alias -> path) for kinds that
    /// declare them.
    #[must_use]
    pub fn mapped_outputs(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::ApiAction(c) => Some(&c.mapped_outputs),
            Self::EmailAction(c) => Some(&c.mapped_outputs),
            Self::DatabaseAction(c) => Some(&c.mapped_outputs),
            Self::ScriptAction(c) => Some(&c.mapped_outputs),
            Self::WebhookAction(c) => Some(&c.mapped_outputs),
            Self::GoogleCalendarAction(c) => Some(&c.mapped_outputs),
            Self::GoogleDocsAction(c) => Some(&c.mapped_outputs),
            _ => None,
        }
    }

    /// Returns the growable port list and the side it attaches to, for kinds
    /// that own one.
    #[must_use]
    pub fn ports(&self) -> Option<(&Vec<String>, PortSide)> {
        match self {
            Self::Branch(c) => Some((&c.output_ports, PortSide::Output)),
            Self::Join(c) => Some((&c.input_ports, PortSide::Input)),
            Self::Merge(c) => Some((&c.input_ports, PortSide::Input)),
            Self::Template(c) => Some((&c.input_ports, PortSide::Input)),
            _ => None,
        }
    }

    pub(crate) fn ports_mut(&mut self) -> Option<(&mut Vec<String>, PortSide)> {
        match self {
            Self::Branch(c) => Some((&mut c.output_ports, PortSide::Output)),
            Self::Join(c) => Some((&mut c.input_ports, PortSide::Input)),
            Self::Merge(c) => Some((&mut c.input_ports, PortSide::Input)),
            Self::Template(c) => Some((&mut c.input_ports, PortSide::Input)),
            _ => None,
        }
    }
}

/// Picks the next free port name for a side (`output-3`, `input-4`, ...).
///
/// Names never collide with surviving ports even after removals in the
/// middle of the list.
pub(crate) fn next_port_name(side: PortSide, existing: &[String]) -> String {
    let prefix = match side {
        PortSide::Output => "output",
        PortSide::Input => "input",
    };
    let max = existing
        .iter()
        .filter_map(|name| name.strip_prefix(prefix)?.strip_prefix('-')?.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    format!("{}-{}", prefix, max + 1)
}

/// Execution status of a node during a simulated run.
///
/// `Loading` is entered synchronously when a node is triggered; exactly one
/// of `Success`/`Error` follows once the dispatched work settles. Only the
/// simulator transitions a node's status; an explicit reset returns every
/// node to `Initial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Initial,
    Loading,
    Success,
    Error,
}

impl NodeStatus {
    /// Returns true once a triggered node has settled.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// A workflow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node within the workflow.
    pub id: NodeId,
    /// Human-readable name for this node.
    pub label: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Position on the canvas.
    pub position: Position,
    /// Node configuration (determines kind and behavior).
    pub config: NodeConfig,
    /// Execution status. Runtime state, reset between runs.
    #[serde(default)]
    pub status: NodeStatus,
    /// Output of the most recent execution, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_output: Option<JsonValue>,
    /// Error payload of the most recent failed execution, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<JsonValue>,
}

impl Node {
    /// Creates a node of the given kind with its default configuration.
    #[must_use]
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self {
            id: NodeId::new(),
            label: kind.default_label().to_string(),
            description: None,
            position,
            config: NodeConfig::default_for(kind),
            status: NodeStatus::Initial,
            last_output: None,
            last_error: None,
        }
    }

    /// Creates a node with a specific ID.
    #[must_use]
    pub fn with_id(id: NodeId, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            ..Self::new(kind, position)
        }
    }

    /// Replaces the default configuration.
    #[must_use]
    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Returns the kind of this node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.config.kind()
    }

    // Status transitions are crate-private: only the simulator drives them.

    pub(crate) fn begin_execution(&mut self) {
        self.status = NodeStatus::Loading;
    }

    pub(crate) fn complete_execution(&mut self, output: JsonValue) {
        self.status = NodeStatus::Success;
        self.last_output = Some(output);
        self.last_error = None;
    }

    /// Success without touching outputs, for kinds whose execution is a
    /// placeholder pending real backend wiring.
    pub(crate) fn settle_execution(&mut self) {
        self.status = NodeStatus::Success;
    }

    pub(crate) fn fail_execution(&mut self, error: JsonValue) {
        self.status = NodeStatus::Error;
        self.last_error = Some(error);
    }

    pub(crate) fn reset_execution(&mut self) {
        self.status = NodeStatus::Initial;
        self.last_output = None;
        self.last_error = None;
    }
}
