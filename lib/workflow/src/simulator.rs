//! Client-side execution simulator.
//!
//! The simulator is the single dispatch point for node execution: it owns
//! the status state machine and is the only component that transitions a
//! node's status. Nodes stay pure data; there are no callbacks embedded in
//! node state.
//!
//! `trigger` marks the node as loading synchronously, performs the
//! kind-specific work (possibly suspending at a backend call), then applies
//! the outcome. The graph stays mutable in between: a node deleted while
//! its call is in flight is silently skipped at apply time. There is no
//! cancellation; a reset only clears settled state.
//!
//! External services are reached through the `HttpBackend`/`EmailBackend`
//! port traits so the simulator is testable without a network.

use crate::binding::Binding;
use crate::condition;
use crate::graph::WorkflowGraph;
use crate::node::{HttpMethod, NodeConfig, NodeKind};
use async_trait::async_trait;
use flowboard_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Delay used for kinds whose execution is a placeholder.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// An arbitrary HTTP call configured on an API action node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpActionRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    /// Attached for POST/PUT/PATCH only.
    pub body: Option<JsonValue>,
}

/// The payload delivered to the email-send endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSendRequest {
    pub template: Option<String>,
    pub recipients: Vec<String>,
    pub subject: Option<String>,
    pub data: JsonValue,
}

/// A failure reported by a backend port.
///
/// `payload` carries the response body when the remote side answered with
/// one; it becomes the node's `last_error` verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendError {
    pub message: String,
    pub payload: Option<JsonValue>,
}

impl BackendError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BackendError {}

/// Port for the HTTP action backend.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Executes the request and returns the parsed response body.
    async fn execute(&self, request: HttpActionRequest) -> Result<JsonValue, BackendError>;
}

/// Port for the email service.
#[async_trait]
pub trait EmailBackend: Send + Sync {
    /// Triggers a templated send and returns the service's response.
    async fn send(&self, request: EmailSendRequest) -> Result<JsonValue, BackendError>;
}

/// Why a triggered node ended in the `Error` status.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// The node's configuration lacks a URL; no network attempt was made.
    MissingUrl { node_id: NodeId },
    /// The kind is an acknowledged stub; no network attempt was made.
    NotImplemented { kind: NodeKind },
    /// The backend call failed.
    Backend(BackendError),
}

impl ExecutionError {
    /// The value recorded into the node's `last_error`: the remote payload
    /// when one exists, otherwise the message.
    #[must_use]
    pub fn to_error_value(&self) -> JsonValue {
        match self {
            Self::Backend(BackendError {
                payload: Some(payload),
                ..
            }) => payload.clone(),
            other => JsonValue::String(other.to_string()),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingUrl { node_id } => {
                write!(f, "no URL configured on node {node_id}")
            }
            Self::NotImplemented { kind } => {
                write!(f, "{kind} nodes are not yet implemented")
            }
            Self::Backend(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ExecutionError {}

/// What `trigger` decided to do for a node, computed under the graph lock
/// before any asynchronous work.
enum Plan {
    Http(HttpActionRequest),
    Email(EmailSendRequest),
    Immediate(Result<JsonValue, ExecutionError>),
    Settle,
}

/// Drives simulated execution over a shared workflow graph.
#[derive(Clone)]
pub struct Simulator {
    graph: Arc<RwLock<WorkflowGraph>>,
    http: Arc<dyn HttpBackend>,
    email: Arc<dyn EmailBackend>,
    settle_delay: Duration,
}

impl Simulator {
    /// Creates a simulator over a shared graph and backend ports.
    #[must_use]
    pub fn new(
        graph: Arc<RwLock<WorkflowGraph>>,
        http: Arc<dyn HttpBackend>,
        email: Arc<dyn EmailBackend>,
    ) -> Self {
        Self {
            graph,
            http,
            email,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Overrides the placeholder settle delay.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Returns the shared graph handle.
    #[must_use]
    pub fn graph(&self) -> Arc<RwLock<WorkflowGraph>> {
        Arc::clone(&self.graph)
    }

    /// Executes one node's configured behavior.
    ///
    /// Unknown ids are ignored. Failures land in the node's `last_error`;
    /// this method itself never fails and never panics the caller.
    pub async fn trigger(&self, node_id: NodeId) {
        let plan = {
            let mut graph = self.graph.write().await;
            let Some(node) = graph.node_mut(node_id) else {
                tracing::debug!(node_id = %node_id, "trigger for unknown node ignored");
                return;
            };
            node.begin_execution();
            build_plan(&graph, node_id)
        };

        let outcome = match plan {
            Plan::Http(request) => {
                tracing::info!(
                    node_id = %node_id,
                    method = %request.method,
                    url = %request.url,
                    "dispatching API action"
                );
                self.http
                    .execute(request)
                    .await
                    .map_err(ExecutionError::Backend)
            }
            Plan::Email(request) => {
                tracing::info!(
                    node_id = %node_id,
                    recipients = request.recipients.len(),
                    "dispatching email action"
                );
                self.email
                    .send(request)
                    .await
                    .map_err(ExecutionError::Backend)
            }
            Plan::Immediate(result) => result,
            Plan::Settle => {
                tokio::time::sleep(self.settle_delay).await;
                let mut graph = self.graph.write().await;
                if let Some(node) = graph.node_mut(node_id) {
                    node.settle_execution();
                }
                return;
            }
        };

        let mut graph = self.graph.write().await;
        let Some(node) = graph.node_mut(node_id) else {
            tracing::debug!(node_id = %node_id, "node deleted mid-flight; dropping result");
            return;
        };
        match outcome {
            Ok(output) => {
                tracing::info!(node_id = %node_id, "node succeeded");
                node.complete_execution(output);
            }
            Err(error) => {
                tracing::warn!(node_id = %node_id, error = %error, "node failed");
                node.fail_execution(error.to_error_value());
            }
        }
    }

    /// Triggers several nodes concurrently.
    ///
    /// Calls proceed independently; no ordering guarantee exists between
    /// their completions.
    pub async fn trigger_all(&self, node_ids: impl IntoIterator<Item = NodeId>) {
        futures::future::join_all(node_ids.into_iter().map(|id| self.trigger(id))).await;
    }

    /// Clears execution state on every node.
    ///
    /// This does not interrupt in-flight triggers; their results apply when
    /// they settle.
    pub async fn reset(&self) {
        self.graph.write().await.reset_execution();
        tracing::debug!("execution state reset");
    }
}

fn build_plan(graph: &WorkflowGraph, node_id: NodeId) -> Plan {
    // The node was just checked under the same lock.
    let node = graph.node(node_id).expect("node present under lock");
    match &node.config {
        NodeConfig::ApiAction(config) => {
            let Some(url) = config.url.clone().filter(|u| !u.is_empty()) else {
                return Plan::Immediate(Err(ExecutionError::MissingUrl { node_id }));
            };
            let mut headers = config.headers.clone();
            headers
                .entry("Content-Type".to_string())
                .or_insert_with(|| "application/json".to_string());
            Plan::Http(HttpActionRequest {
                url,
                method: config.method,
                headers,
                body: if config.method.has_body() {
                    config.request_body.clone()
                } else {
                    None
                },
            })
        }
        NodeConfig::EmailAction(config) => Plan::Email(EmailSendRequest {
            template: config.template.clone(),
            recipients: config.recipients.clone(),
            subject: config.subject.clone(),
            data: config.custom_data.clone(),
        }),
        NodeConfig::Condition(config) => {
            let a = config.value_a.resolve(graph);
            let b = config.value_b.resolve(graph);
            let result = condition::evaluate(config.operator, a.as_ref(), b.as_ref());
            Plan::Immediate(Ok(json!({
                "conditionResult": result,
                "lastEvaluation": {
                    "operator": config.operator,
                    "valueA": a,
                    "valueB": b,
                    "result": result,
                },
            })))
        }
        NodeConfig::DatabaseAction(_) | NodeConfig::ScriptAction(_) | NodeConfig::WebhookAction(_) => {
            Plan::Immediate(Err(ExecutionError::NotImplemented { kind: node.kind() }))
        }
        _ => Plan::Settle,
    }
}

/// Resolves a binding against the shared graph, for editor surfaces that
/// preview operand values outside a trigger.
pub async fn resolve_binding(
    graph: &Arc<RwLock<WorkflowGraph>>,
    binding: &Binding,
) -> Option<JsonValue> {
    binding.resolve(&*graph.read().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionOperator;
    use crate::edge::ConnectRequest;
    use crate::node::{
        ApiActionConfig, ConditionConfig, ConstantConfig, EmailActionConfig, NodeStatus, Position,
    };
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// HTTP double that records requests and answers from a canned body,
    /// optionally gated on a notification to model an in-flight call.
    struct FakeHttp {
        requests: Mutex<Vec<HttpActionRequest>>,
        response: Result<JsonValue, BackendError>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeHttp {
        fn replying(response: JsonValue) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Ok(response),
                gate: None,
            })
        }

        fn failing(error: BackendError) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Err(error),
                gate: None,
            })
        }

        fn gated(response: JsonValue, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Ok(response),
                gate: Some(gate),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpBackend for FakeHttp {
        async fn execute(&self, request: HttpActionRequest) -> Result<JsonValue, BackendError> {
            self.requests.lock().unwrap().push(request);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.response.clone()
        }
    }

    struct FakeEmail {
        sent: Mutex<Vec<EmailSendRequest>>,
    }

    impl FakeEmail {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl EmailBackend for FakeEmail {
        async fn send(&self, request: EmailSendRequest) -> Result<JsonValue, BackendError> {
            self.sent.lock().unwrap().push(request);
            Ok(json!({"queued": true}))
        }
    }

    fn simulator(
        graph: WorkflowGraph,
        http: Arc<FakeHttp>,
        email: Arc<FakeEmail>,
    ) -> Simulator {
        Simulator::new(Arc::new(RwLock::new(graph)), http, email)
            .with_settle_delay(Duration::from_millis(1))
    }

    fn api_action(graph: &mut WorkflowGraph, url: Option<&str>, method: HttpMethod) -> NodeId {
        let id = graph.add_node(NodeKind::ApiAction, Position::default());
        graph
            .update_node_config(
                id,
                NodeConfig::ApiAction(ApiActionConfig {
                    url: url.map(str::to_string),
                    method,
                    ..ApiActionConfig::default()
                }),
            )
            .expect("same kind");
        id
    }

    async fn status_of(sim: &Simulator, id: NodeId) -> NodeStatus {
        sim.graph().read().await.node(id).expect("node").status
    }

    #[tokio::test]
    async fn api_action_runs_initial_loading_success() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let mut graph = WorkflowGraph::new();
        let start = graph.add_node(NodeKind::Start, Position::default());
        let action = api_action(&mut graph, Some("/echo"), HttpMethod::Get);
        let end = graph.add_node(NodeKind::End, Position::default());
        graph.connect(ConnectRequest::new(start, action));
        graph.connect(ConnectRequest::new(action, end));

        let gate = Arc::new(Notify::new());
        let http = FakeHttp::gated(json!({"echo": "hello"}), Arc::clone(&gate));
        let sim = simulator(graph, Arc::clone(&http), FakeEmail::new());

        assert_eq!(status_of(&sim, action).await, NodeStatus::Initial);

        let running = tokio::spawn({
            let sim = sim.clone();
            async move { sim.trigger(action).await }
        });

        // Let the task reach the in-flight await, then observe loading.
        tokio::task::yield_now().await;
        assert_eq!(status_of(&sim, action).await, NodeStatus::Loading);

        gate.notify_one();
        running.await.expect("task completes");

        let graph = sim.graph();
        let graph = graph.read().await;
        let node = graph.node(action).expect("node");
        assert_eq!(node.status, NodeStatus::Success);
        assert_eq!(node.last_output, Some(json!({"echo": "hello"})));
    }

    #[tokio::test]
    async fn api_action_attaches_json_content_type_and_body() {
        let mut graph = WorkflowGraph::new();
        let id = graph.add_node(NodeKind::ApiAction, Position::default());
        graph
            .update_node_config(
                id,
                NodeConfig::ApiAction(ApiActionConfig {
                    url: Some("/submit".to_string()),
                    method: HttpMethod::Post,
                    headers: [("X-Token".to_string(), "abc".to_string())].into(),
                    request_body: Some(json!({"n": 1})),
                    ..ApiActionConfig::default()
                }),
            )
            .expect("same kind");

        let http = FakeHttp::replying(json!({}));
        let sim = simulator(graph, Arc::clone(&http), FakeEmail::new());
        sim.trigger(id).await;

        let requests = http.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.headers.get("Content-Type").map(String::as_str),
            Some("application/json"));
        assert_eq!(request.headers.get("X-Token").map(String::as_str), Some("abc"));
        assert_eq!(request.body, Some(json!({"n": 1})));
    }

    #[tokio::test]
    async fn get_requests_carry_no_body() {
        let mut graph = WorkflowGraph::new();
        let id = api_action(&mut graph, Some("/fetch"), HttpMethod::Get);
        let http = FakeHttp::replying(json!([1, 2]));
        let sim = simulator(graph, Arc::clone(&http), FakeEmail::new());
        sim.trigger(id).await;

        assert_eq!(http.requests.lock().unwrap()[0].body, None);
    }

    #[tokio::test]
    async fn missing_url_fails_without_network() {
        let mut graph = WorkflowGraph::new();
        let id = api_action(&mut graph, None, HttpMethod::Post);
        let http = FakeHttp::replying(json!({}));
        let sim = simulator(graph, Arc::clone(&http), FakeEmail::new());
        sim.trigger(id).await;

        assert_eq!(status_of(&sim, id).await, NodeStatus::Error);
        assert_eq!(http.request_count(), 0);

        let graph = sim.graph();
        let graph = graph.read().await;
        let error = graph.node(id).unwrap().last_error.clone().expect("error");
        assert!(error.as_str().unwrap().contains("no URL"));
    }

    #[tokio::test]
    async fn remote_failure_lands_in_last_error() {
        let mut graph = WorkflowGraph::new();
        let id = api_action(&mut graph, Some("/boom"), HttpMethod::Get);
        let http = FakeHttp::failing(
            BackendError::new("500 Internal Server Error")
                .with_payload(json!({"detail": "exploded"})),
        );
        let sim = simulator(graph, http, FakeEmail::new());
        sim.trigger(id).await;

        let graph = sim.graph();
        let graph = graph.read().await;
        let node = graph.node(id).unwrap();
        assert_eq!(node.status, NodeStatus::Error);
        // The response payload is kept verbatim.
        assert_eq!(node.last_error, Some(json!({"detail": "exploded"})));
    }

    #[tokio::test]
    async fn email_action_delegates_the_payload_contract() {
        let mut graph = WorkflowGraph::new();
        let id = graph.add_node(NodeKind::EmailAction, Position::default());
        graph
            .update_node_config(
                id,
                NodeConfig::EmailAction(EmailActionConfig {
                    template: Some("welcome".to_string()),
                    recipients: vec!["ada@example.com".to_string()],
                    subject: Some("Hi".to_string()),
                    custom_data: json!({"name": "Ada"}),
                    ..EmailActionConfig::default()
                }),
            )
            .expect("same kind");

        let email = FakeEmail::new();
        let sim = simulator(graph, FakeHttp::replying(json!({})), Arc::clone(&email));
        sim.trigger(id).await;

        assert_eq!(status_of(&sim, id).await, NodeStatus::Success);
        let sent = email.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template.as_deref(), Some("welcome"));
        assert_eq!(sent[0].data, json!({"name": "Ada"}));
    }

    #[tokio::test]
    async fn stub_kinds_fail_immediately_and_distinctly() {
        for kind in [
            NodeKind::DatabaseAction,
            NodeKind::ScriptAction,
            NodeKind::WebhookAction,
        ] {
            let mut graph = WorkflowGraph::new();
            let id = graph.add_node(kind, Position::default());
            let http = FakeHttp::replying(json!({}));
            let sim = simulator(graph, Arc::clone(&http), FakeEmail::new());
            sim.trigger(id).await;

            assert_eq!(status_of(&sim, id).await, NodeStatus::Error);
            assert_eq!(http.request_count(), 0, "{kind} must not reach the network");

            let graph = sim.graph();
            let graph = graph.read().await;
            let error = graph.node(id).unwrap().last_error.clone().expect("error");
            assert!(error.as_str().unwrap().contains("not yet implemented"));
        }
    }

    #[tokio::test]
    async fn condition_evaluates_locally_and_always_succeeds() {
        let mut graph = WorkflowGraph::new();
        let constant = graph.add_node(NodeKind::Constant, Position::default());
        graph
            .update_node_config(
                constant,
                NodeConfig::Constant(ConstantConfig {
                    value: json!("5"),
                    target_field: "count".to_string(),
                }),
            )
            .expect("same kind");
        let cond = graph.add_node(NodeKind::Condition, Position::default());
        graph
            .update_node_config(
                cond,
                NodeConfig::Condition(ConditionConfig {
                    operator: ConditionOperator::GreaterThan,
                    value_a: Binding::dynamic(constant, "value"),
                    value_b: Binding::literal(json!("3")),
                }),
            )
            .expect("same kind");
        graph.connect(ConnectRequest::new(constant, cond));

        let http = FakeHttp::replying(json!({}));
        let sim = simulator(graph, Arc::clone(&http), FakeEmail::new());
        sim.trigger(cond).await;

        assert_eq!(http.request_count(), 0);
        let graph = sim.graph();
        let graph = graph.read().await;
        let node = graph.node(cond).unwrap();
        assert_eq!(node.status, NodeStatus::Success);
        let output = node.last_output.as_ref().expect("output");
        assert_eq!(output["conditionResult"], json!(true));
        assert_eq!(output["lastEvaluation"]["valueA"], json!("5"));
    }

    #[tokio::test]
    async fn placeholder_kinds_settle_to_success() {
        let mut graph = WorkflowGraph::new();
        let ids: Vec<_> = [NodeKind::Start, NodeKind::Merge, NodeKind::End]
            .into_iter()
            .map(|kind| graph.add_node(kind, Position::default()))
            .collect();
        let sim = simulator(graph, FakeHttp::replying(json!({})), FakeEmail::new());

        sim.trigger_all(ids.clone()).await;

        let graph = sim.graph();
        let graph = graph.read().await;
        for id in ids {
            let node = graph.node(id).unwrap();
            assert_eq!(node.status, NodeStatus::Success);
            assert!(node.last_output.is_none());
        }
    }

    #[tokio::test]
    async fn trigger_on_unknown_id_is_a_noop() {
        let sim = simulator(
            WorkflowGraph::new(),
            FakeHttp::replying(json!({})),
            FakeEmail::new(),
        );
        // Nothing to assert beyond not panicking.
        sim.trigger(NodeId::new()).await;
    }

    #[tokio::test]
    async fn node_deleted_mid_flight_is_skipped_at_apply() {
        let mut graph = WorkflowGraph::new();
        let id = api_action(&mut graph, Some("/slow"), HttpMethod::Get);

        let gate = Arc::new(Notify::new());
        let http = FakeHttp::gated(json!({"late": true}), Arc::clone(&gate));
        let sim = simulator(graph, http, FakeEmail::new());

        let running = tokio::spawn({
            let sim = sim.clone();
            async move { sim.trigger(id).await }
        });
        tokio::task::yield_now().await;

        // Delete the node while its call is in flight.
        sim.graph().write().await.delete_node(id);
        gate.notify_one();
        running.await.expect("apply tolerates the deletion");

        assert!(sim.graph().read().await.node(id).is_none());
    }

    #[tokio::test]
    async fn reset_returns_every_node_to_initial() {
        let mut graph = WorkflowGraph::new();
        let id = api_action(&mut graph, Some("/once"), HttpMethod::Get);
        let sim = simulator(graph, FakeHttp::replying(json!({"v": 1})), FakeEmail::new());

        sim.trigger(id).await;
        assert_eq!(status_of(&sim, id).await, NodeStatus::Success);

        sim.reset().await;
        let graph = sim.graph();
        let graph = graph.read().await;
        let node = graph.node(id).unwrap();
        assert_eq!(node.status, NodeStatus::Initial);
        assert!(node.last_output.is_none());
    }

    #[tokio::test]
    async fn concurrent_triggers_proceed_independently() {
        let mut graph = WorkflowGraph::new();
        let first = api_action(&mut graph, Some("/a"), HttpMethod::Get);
        let second = api_action(&mut graph, Some("/b"), HttpMethod::Get);
        let http = FakeHttp::replying(json!({"ok": true}));
        let sim = simulator(graph, Arc::clone(&http), FakeEmail::new());

        sim.trigger_all([first, second]).await;

        assert_eq!(http.request_count(), 2);
        assert_eq!(status_of(&sim, first).await, NodeStatus::Success);
        assert_eq!(status_of(&sim, second).await, NodeStatus::Success);
    }
}
