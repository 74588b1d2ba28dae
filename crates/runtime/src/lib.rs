//! Moray runtime: the conversation engine.
//!
//! The [`Engine`] drives a multi-turn conversation with a
//! function-calling model: it sends the history and the full tool
//! registry to the gateway, routes every function call the model emits
//! to its owning backend, feeds the results back, and repeats until the
//! model produces a plain answer. Every gateway call, tool call, and
//! error is recorded in the flow embedded in the returned
//! [`QueryResult`].
//!
//! # Example
//!
//! ```rust,ignore
//! use moray_llm::{General, HttpGateway, Client};
//! use moray_mcp::{BackendLaunch, ToolRegistry, register_all};
//! use moray_runtime::Engine;
//!
//! let registry = Arc::new(ToolRegistry::new());
//! register_all(&registry, servers).await?;
//! let gateway = HttpGateway::api(Client::new(), &key)?;
//! let engine = Engine::new(gateway, registry, General::default());
//! let result = engine.submit_query("what's the weather in Paris?", None, None).await;
//! ```

pub use accumulator::{StreamAccumulator, StreamProtocolError};
pub use flow::{
    ErrorRecord, ErrorSource, FlowRecorder, Interaction, LlmCallRecord, QueryResult,
    ToolCallRecord,
};

use compact_str::CompactString;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::{FunctionCall, Gateway, General, Item, Response, ToolChoice};
use mcp::{DispatchError, ToolRegistry};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

mod accumulator;
mod flow;

/// Upper bound on model turns for one query; an uncooperative model
/// that keeps requesting tools cannot loop forever.
const MAX_TURNS: usize = 16;

/// One frame of a streamed query.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryFrame {
    /// A raw gateway event, forwarded as it arrived.
    Event {
        /// The event.
        event: llm::StreamEvent,
    },

    /// The terminal frame: the cumulative result of the whole query.
    FinalResult {
        /// The query outcome.
        result: QueryResult,
    },
}

/// How a query loop ended.
enum Outcome {
    /// The model produced a plain answer.
    Done,
    /// A gateway-class failure ended the query.
    Failed,
    /// The turn cap was hit before the model finished.
    CapReached,
}

/// Per-query mutable state, fresh for every submitted query.
struct QueryState {
    history: Vec<Item>,
    flow: FlowRecorder,
    tools_used: Vec<CompactString>,
    final_answer: String,
    error: Option<String>,
}

impl QueryState {
    fn new(query: String) -> Self {
        Self {
            history: vec![Item::user(query)],
            flow: FlowRecorder::new(),
            tools_used: Vec::new(),
            final_answer: String::new(),
            error: None,
        }
    }

    /// Fail the query with a gateway-class error.
    fn fail(&mut self, message: String) {
        self.flow.error(ErrorRecord::gateway(message.clone()));
        self.final_answer = message.clone();
        self.error = Some(message);
    }

    fn finish(self) -> QueryResult {
        QueryResult {
            tools_used: self.tools_used,
            flow: self.flow.finish(),
            final_answer: self.final_answer,
            error: self.error,
        }
    }
}

/// The conversation engine.
///
/// Holds the gateway and the shared tool registry by explicit
/// injection; per-query state lives on the stack of each submitted
/// query, so one engine serves any number of concurrent queries.
pub struct Engine<G> {
    gateway: G,
    registry: Arc<ToolRegistry>,
    config: General,
    max_turns: usize,
}

impl<G: Gateway> Engine<G> {
    /// Create an engine from a gateway, a registry, and a chat config.
    pub fn new(gateway: G, registry: Arc<ToolRegistry>, config: General) -> Self {
        Self {
            gateway,
            registry,
            config,
            max_turns: MAX_TURNS,
        }
    }

    /// Override the model-turn cap.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// The shared tool registry.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Build the per-turn config: the model is always shown the
    /// complete current registry, never a per-backend subset.
    async fn turn_config(
        &self,
        tool_choice: &Option<ToolChoice>,
        parallel_tool_calls: Option<bool>,
    ) -> General {
        self.config
            .clone()
            .with_tools(self.registry.schemas().await)
            .with_tool_choice(tool_choice.clone())
            .with_parallel_tool_calls(parallel_tool_calls)
    }

    /// Process a query, driving the model/tool loop to completion.
    ///
    /// Tool-level failures are folded into the conversation so the
    /// model can react to them; only gateway-class failures end the
    /// query early. The result always carries the full flow.
    pub async fn submit_query(
        &self,
        query: impl Into<String>,
        tool_choice: Option<ToolChoice>,
        parallel_tool_calls: Option<bool>,
    ) -> QueryResult {
        let mut state = QueryState::new(query.into());
        let mut outcome = Outcome::CapReached;

        for _ in 0..self.max_turns {
            let cfg = self.turn_config(&tool_choice, parallel_tool_calls).await;
            let response = match self.gateway.complete(&cfg, &state.history).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!("gateway call failed: {e}");
                    state.fail(format!("LLM gateway error: {e}"));
                    outcome = Outcome::Failed;
                    break;
                }
            };
            state.flow.llm_call(llm_record(&cfg, &state.history, &response));

            let calls: Vec<FunctionCall> =
                response.function_calls().into_iter().cloned().collect();
            if !self.advance(&mut state, calls, &response).await {
                outcome = Outcome::Done;
                break;
            }
        }

        if let Outcome::CapReached = outcome {
            self.cap_reached(&mut state);
        }
        state.finish()
    }

    /// Process a query as a frame stream: every raw gateway event is
    /// forwarded as it arrives, and exactly one final frame carrying
    /// the cumulative result ends the stream.
    pub fn submit_query_stream(
        &self,
        query: impl Into<String>,
        tool_choice: Option<ToolChoice>,
        parallel_tool_calls: Option<bool>,
    ) -> impl Stream<Item = QueryFrame> + Send + '_ {
        let query = query.into();
        async_stream::stream! {
            let mut state = QueryState::new(query);
            let mut outcome = Outcome::CapReached;

            'turns: for _ in 0..self.max_turns {
                let cfg = self.turn_config(&tool_choice, parallel_tool_calls).await;
                let input = state.history.clone();
                let mut accumulator = StreamAccumulator::new();

                {
                    let inner = self.gateway.complete_stream(cfg.clone(), &input);
                    futures_util::pin_mut!(inner);
                    while let Some(next) = inner.next().await {
                        let event = match next {
                            Ok(event) => event,
                            Err(e) => {
                                tracing::error!("gateway stream failed: {e}");
                                state.fail(format!("LLM gateway error: {e}"));
                                outcome = Outcome::Failed;
                                break 'turns;
                            }
                        };

                        yield QueryFrame::Event { event: event.clone() };

                        if let Err(e) = accumulator.accept(&event) {
                            tracing::error!("stream protocol violation: {e}");
                            state.fail(format!("LLM gateway error: {e}"));
                            outcome = Outcome::Failed;
                            break 'turns;
                        }
                    }
                }

                // The tool loop is driven by the accumulated calls; the
                // completed response serves history bookkeeping and the
                // final answer text.
                let calls: Vec<FunctionCall> = accumulator
                    .function_calls()
                    .into_iter()
                    .cloned()
                    .collect();
                let response = match accumulator.take_response() {
                    Ok(response) => response,
                    Err(e) => {
                        state.fail(format!("LLM gateway error: {e}"));
                        outcome = Outcome::Failed;
                        break 'turns;
                    }
                };
                state.flow.llm_call(llm_record(&cfg, &input, &response));

                if !self.advance(&mut state, calls, &response).await {
                    outcome = Outcome::Done;
                    break 'turns;
                }
            }

            if let Outcome::CapReached = outcome {
                self.cap_reached(&mut state);
            }
            yield QueryFrame::FinalResult {
                result: state.finish(),
            };
        }
    }

    /// Handle one model turn. Returns `true` when the loop should run
    /// another turn (the turn requested tools), `false` when the query
    /// is done.
    async fn advance(
        &self,
        state: &mut QueryState,
        calls: Vec<FunctionCall>,
        response: &Response,
    ) -> bool {
        if calls.is_empty() {
            state.final_answer = response.output_text();
            return false;
        }

        state
            .history
            .extend(calls.iter().cloned().map(Item::from));
        self.run_tools(state, &calls).await;
        true
    }

    /// Execute the function calls of one turn, in the order the model
    /// emitted them, and append one paired output item per call.
    ///
    /// A per-tool failure never aborts the loop: it becomes the tool's
    /// result payload (so the model sees it next turn) and an error
    /// entry in the flow.
    async fn run_tools(&self, state: &mut QueryState, calls: &[FunctionCall]) {
        for call in calls {
            state.tools_used.push(call.name.clone());

            let arguments = match decode_arguments(&call.arguments) {
                Ok(arguments) => arguments,
                Err(e) => {
                    let reason = format!("invalid tool arguments: {e}");
                    self.tool_failure(state, call, Value::Null, reason);
                    continue;
                }
            };

            match self.registry.dispatch(&call.name, arguments.clone()).await {
                Ok(output) => {
                    state.flow.tool_call(ToolCallRecord {
                        name: call.name.clone(),
                        arguments,
                        result: Value::String(output.clone()),
                    });
                    state
                        .history
                        .push(Item::call_output(call.call_id.clone(), output));
                }
                Err(DispatchError::NotFound(_)) => {
                    // Unknown tool: folded back as the result so the
                    // model can recover; not a failure of the query.
                    let output = format!("tool '{}' is not registered", call.name);
                    tracing::warn!("{output}");
                    state.flow.tool_call(ToolCallRecord {
                        name: call.name.clone(),
                        arguments,
                        result: Value::String(output.clone()),
                    });
                    state
                        .history
                        .push(Item::call_output(call.call_id.clone(), output));
                }
                Err(e @ DispatchError::Failed { .. }) => {
                    self.tool_failure(state, call, arguments, e.to_string());
                }
            }
        }
    }

    /// Fold one failed call into the conversation and the flow.
    fn tool_failure(
        &self,
        state: &mut QueryState,
        call: &FunctionCall,
        arguments: Value,
        reason: String,
    ) {
        tracing::warn!(tool = %call.name, "tool call failed: {reason}");
        let payload = json!({ "error": reason });
        state.flow.tool_call(ToolCallRecord {
            name: call.name.clone(),
            arguments: arguments.clone(),
            result: payload.clone(),
        });
        state.flow.error(ErrorRecord::tool(
            reason.clone(),
            call.name.clone(),
            arguments,
        ));
        state
            .history
            .push(Item::call_output(call.call_id.clone(), payload.to_string()));

        // The first tool error pre-seeds the answer; a later successful
        // turn overwrites it, but the top-level error stays set.
        if state.error.is_none() {
            state.error = Some(reason.clone());
            state.final_answer = format!("Tool call error: {reason}");
        }
    }

    /// Record that the turn cap ended the query.
    fn cap_reached(&self, state: &mut QueryState) {
        let message = format!("maximum model turns reached ({})", self.max_turns);
        tracing::warn!("{message}");
        state.flow.error(ErrorRecord::engine(message.clone()));
        if state.final_answer.is_empty() {
            state.final_answer = message.clone();
        }
        state.error = Some(message);
    }
}

/// Decode a function call's argument payload.
fn decode_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(raw)
}

/// Build the flow record for one gateway round trip.
fn llm_record(cfg: &General, history: &[Item], response: &Response) -> LlmCallRecord {
    LlmCallRecord {
        model: cfg.model.clone(),
        request: json!({
            "input": serde_json::to_value(history).unwrap_or_default(),
            "tools": serde_json::to_value(&cfg.tools).unwrap_or_default(),
            "tool_choice": serde_json::to_value(&cfg.tool_choice).unwrap_or_default(),
            "parallel_tool_calls": cfg.parallel_tool_calls,
        }),
        response: serde_json::to_value(&response.output).unwrap_or_default(),
    }
}
