//! Bindings: how a node's configurable field gets its value.
//!
//! A field is either a static literal or a dynamic reference to an upstream
//! node's output, addressed by dot path. Dynamic bindings serialize to the
//! placeholder strings the execution backend consumes:
//!
//! - `{{{input}}}` — the producer's whole output (also used for the
//!   synthetic `value` path of constant nodes)
//! - `{{{input.<path>}}}` — a sub-field of the output
//! - `{{{_mapped.<alias>}}}` — a curated re-export declared on the producer
//!
//! The placeholder format is fixed external behavior; it is implemented as
//! an explicit formatter/parser pair so it round-trips through save/load.

use crate::graph::WorkflowGraph;
use crate::node::{Node, NodeConfig};
use crate::paths::{self, PathEntry, PathKind};
use flowboard_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Maximum number of raw (non-curated) paths offered per producer.
const MAX_RAW_PATHS: usize = 15;

/// The synthetic path exposed by constant nodes.
pub const CONSTANT_PATH: &str = "value";

/// A field value: a literal, or a path into an upstream node's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Binding {
    /// A literal value supplied directly by the user.
    Static { value: JsonValue },
    /// A reference to `source`'s output at `path`.
    ///
    /// Only meaningful while an edge runs from `source` into the node that
    /// owns this binding.
    Dynamic { source: NodeId, path: String },
}

impl Binding {
    /// Creates a static binding.
    #[must_use]
    pub fn literal(value: impl Into<JsonValue>) -> Self {
        Self::Static { value: value.into() }
    }

    /// Creates a dynamic binding.
    #[must_use]
    pub fn dynamic(source: NodeId, path: impl Into<String>) -> Self {
        Self::Dynamic {
            source,
            path: path.into(),
        }
    }

    /// Returns true for dynamic bindings.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic { .. })
    }

    /// Returns the placeholder expression for a dynamic binding.
    #[must_use]
    pub fn placeholder(&self) -> Option<Placeholder> {
        match self {
            Self::Static { .. } => None,
            Self::Dynamic { path, .. } => Some(Placeholder::from_path(path)),
        }
    }

    /// Resolves the binding's current value against the graph.
    ///
    /// Static bindings yield their literal. Dynamic bindings yield the
    /// constant's configured value for constant sources, or navigate the
    /// source's `last_output`. Returns `None` when the source is missing,
    /// has not produced output, or the path does not resolve.
    #[must_use]
    pub fn resolve(&self, graph: &WorkflowGraph) -> Option<JsonValue> {
        match self {
            Self::Static { value } => Some(value.clone()),
            Self::Dynamic { source, path } => {
                let node = graph.node(*source)?;
                if let NodeConfig::Constant(config) = &node.config {
                    return Some(config.value.clone());
                }
                let output = node.last_output.as_ref()?;
                let effective = match Placeholder::from_path(path) {
                    Placeholder::WholeInput => return Some(output.clone()),
                    Placeholder::Mapped(alias) => {
                        node.config.mapped_outputs()?.get(&alias)?.clone()
                    }
                    Placeholder::InputPath(path) => path,
                };
                paths::lookup_path(output, &effective).cloned()
            }
        }
    }
}

impl Default for Binding {
    fn default() -> Self {
        Self::Static {
            value: JsonValue::Null,
        }
    }
}

/// The `{{{...}}}` wire encoding of a dynamic binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// The producer's whole output.
    WholeInput,
    /// A sub-field of the output.
    InputPath(String),
    /// A curated re-export declared on the producer.
    Mapped(String),
}

impl Placeholder {
    /// Classifies a binding path into its placeholder form.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        if path.is_empty() || path == CONSTANT_PATH {
            Self::WholeInput
        } else if let Some(alias) = path.strip_prefix("_mapped.") {
            Self::Mapped(alias.to_string())
        } else {
            Self::InputPath(path.to_string())
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WholeInput => write!(f, "{{{{{{input}}}}}}"),
            Self::InputPath(path) => write!(f, "{{{{{{input.{path}}}}}}}"),
            Self::Mapped(alias) => write!(f, "{{{{{{_mapped.{alias}}}}}}}"),
        }
    }
}

/// Error parsing a placeholder expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlaceholderError {
    pub input: String,
}

impl fmt::Display for ParsePlaceholderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a placeholder expression: {}", self.input)
    }
}

impl std::error::Error for ParsePlaceholderError {}

impl FromStr for Placeholder {
    type Err = ParsePlaceholderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParsePlaceholderError {
            input: s.to_string(),
        };
        let inner = s
            .strip_prefix("{{{")
            .and_then(|rest| rest.strip_suffix("}}}"))
            .ok_or_else(error)?;

        if inner == "input" {
            Ok(Self::WholeInput)
        } else if let Some(path) = inner.strip_prefix("input.") {
            if path.is_empty() {
                Err(error())
            } else {
                Ok(Self::InputPath(path.to_string()))
            }
        } else if let Some(alias) = inner.strip_prefix("_mapped.") {
            if alias.is_empty() {
                Err(error())
            } else {
                Ok(Self::Mapped(alias.to_string()))
            }
        } else {
            Err(error())
        }
    }
}

/// A producer a field may bind to, discovered from incoming edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingCandidate {
    /// The producing node.
    pub source: NodeId,
    /// Label shown in the picker: the constant's target field, or the
    /// producer's own label.
    pub label: String,
    /// True when the producer is an action whose live output is sampled.
    pub is_action_output: bool,
}

/// Computes the producers a node's fields may bind to.
///
/// Only connected producers are offered: a constant with a non-empty
/// `target_field`, or any output-producing action kind. Other upstream
/// kinds (start, branch, ...) carry no addressable output and are skipped.
#[must_use]
pub fn available_inputs(graph: &WorkflowGraph, node_id: NodeId) -> Vec<BindingCandidate> {
    let mut candidates = Vec::new();
    for edge in graph.incoming_edges(node_id) {
        let Some(source) = graph.node(edge.source) else {
            continue;
        };
        match &source.config {
            NodeConfig::Constant(config) if !config.target_field.is_empty() => {
                candidates.push(BindingCandidate {
                    source: source.id,
                    label: config.target_field.clone(),
                    is_action_output: false,
                });
            }
            _ if source.kind().is_output_producing() => {
                candidates.push(BindingCandidate {
                    source: source.id,
                    label: source.label.clone(),
                    is_action_output: true,
                });
            }
            _ => {}
        }
    }
    candidates
}

/// Lists the paths selectable on a producer, most useful first.
///
/// Curated `_mapped.*` aliases lead; raw paths follow, sampled from the
/// producer's last output, filtered to scalars, capped at 15. Constants
/// expose the single synthetic `value` path.
#[must_use]
pub fn selectable_paths(source: &Node) -> Vec<PathEntry> {
    if let NodeConfig::Constant(config) = &source.config {
        return vec![PathEntry {
            path: CONSTANT_PATH.to_string(),
            kind: PathKind::Constant,
            preview: paths::preview_value(&config.value),
        }];
    }

    let mut entries = Vec::new();
    if let Some(mapped) = source.config.mapped_outputs() {
        for (alias, target) in mapped {
            entries.push(PathEntry {
                path: format!("_mapped.{alias}"),
                kind: PathKind::Mapped,
                preview: target.clone(),
            });
        }
    }
    if let Some(output) = &source.last_output {
        entries.extend(
            paths::extract_paths(output, "", paths::DEFAULT_MAX_DEPTH)
                .into_iter()
                .filter(|e| e.kind.is_scalar())
                .take(MAX_RAW_PATHS),
        );
    }
    entries
}

/// Whether a field takes its value literally or from a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingMode {
    #[default]
    Static,
    Dynamic,
}

/// Editor-side state of one configurable field's binding.
///
/// Tracks the static/dynamic toggle, the chosen producer and path, and the
/// one-shot auto-selection that removes a redundant click in the common
/// single-producer case. Auto-selection arms on a static -> dynamic toggle
/// and fires at most once per arming; it never overrides a choice the user
/// already made.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BindingField {
    mode: BindingMode,
    source: Option<NodeId>,
    path: Option<String>,
    auto_armed: bool,
}

impl BindingField {
    /// Creates a field in static mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current mode.
    #[must_use]
    pub const fn mode(&self) -> BindingMode {
        self.mode
    }

    /// Returns the chosen producer, if any.
    #[must_use]
    pub const fn source(&self) -> Option<NodeId> {
        self.source
    }

    /// Returns the chosen path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Toggles between static and dynamic mode.
    ///
    /// Entering dynamic mode (re-)arms auto-selection; leaving it discards
    /// the dynamic selection.
    pub fn set_dynamic(&mut self, dynamic: bool) {
        match (self.mode, dynamic) {
            (BindingMode::Static, true) => {
                self.mode = BindingMode::Dynamic;
                self.auto_armed = true;
            }
            (BindingMode::Dynamic, false) => {
                self.mode = BindingMode::Static;
                self.source = None;
                self.path = None;
                self.auto_armed = false;
            }
            _ => {}
        }
    }

    /// Applies the auto-selection rule against the current candidates.
    ///
    /// Fires only while armed, only when nothing is selected yet, and only
    /// for exactly one candidate. Candidates appearing later do not
    /// invalidate an earlier auto-selection.
    pub fn refresh(&mut self, candidates: &[BindingCandidate]) {
        if self.mode != BindingMode::Dynamic || !self.auto_armed || self.source.is_some() {
            return;
        }
        if let [only] = candidates {
            self.source = Some(only.source);
            self.auto_armed = false;
        }
    }

    /// Selects a producer explicitly. Switching producers clears the chosen
    /// path: a path valid on one producer is not assumed valid on another.
    pub fn select_source(&mut self, source: NodeId) {
        if self.source != Some(source) {
            self.source = Some(source);
            self.path = None;
        }
        self.auto_armed = false;
    }

    /// Selects a path on the chosen producer.
    pub fn select_path(&mut self, path: impl Into<String>) {
        if self.source.is_some() {
            self.path = Some(path.into());
        }
    }

    /// Returns the binding this field currently denotes, if complete.
    #[must_use]
    pub fn binding(&self) -> Option<Binding> {
        match self.mode {
            BindingMode::Static => None,
            BindingMode::Dynamic => {
                let source = self.source?;
                Some(Binding::dynamic(
                    source,
                    self.path.clone().unwrap_or_default(),
                ))
            }
        }
    }
}
