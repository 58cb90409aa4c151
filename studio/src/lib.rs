//! # Studio
//!
//! LLM content pipeline on a state-in, state-out workflow graph. A research step feeds a
//! long-form or short-form writer; an editor, a post-processor and a quality evaluator
//! follow, and a quality gate sends weak scripts back for a bounded number of revisions.
//!
//! ## Design principles
//!
//! - **Single state type**: every node reads from and writes to one [`ScriptState`] whose
//!   members are all optional; nodes declare the fields they read and write.
//! - **One LLM call per agent**: each [`Agent`] makes one call to the injected
//!   [`LlmClient`] and writes its output field(s).
//! - **Routing outside nodes**: conditional edges decide the next node from the state;
//!   state changes tied to a decision are explicit branch updates.
//! - **Fail at build time**: [`StateGraph`] rejects unknown nodes, duplicate edges and
//!   dangling nodes before any run.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`RetryPolicy`],
//!   [`RunConfig`], [`generate_mermaid`], [`generate_dot`].
//! - [`pipeline`]: [`build_script_graph`], [`content_type_router`], [`QualityGate`].
//! - [`agents`]: the pipeline agents and [`VoiceCalibrator`].
//! - [`llm`]: [`LlmClient`], [`ChatOpenAI`], [`MockLlm`].
//! - [`state`]: [`ScriptState`], [`QualityReport`].
//! - [`extract`]: [`extract_structured`] for JSON hidden in prose.
//! - [`settings`]: [`PipelineSettings`] from the environment.
//! - [`stream`]: [`StreamEvent`] emitted by [`CompiledStateGraph::stream`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use studio::{build_script_graph, MockLlm, PipelineSettings, ScriptState};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockLlm::new(r#"{"style_match_score": 0.95, "feedback": "ok"}"#));
//! let graph = build_script_graph(llm, &PipelineSettings::default())?;
//!
//! let state = ScriptState::new("why we procrastinate", json!({"tone": "playful"}));
//! let done = graph.invoke(state, None).await?;
//! println!("{}", done.processed_script.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod error;
pub mod extract;
pub mod graph;
pub mod llm;
pub mod message;
pub mod pipeline;
pub mod settings;
pub mod state;
pub mod stream;
pub mod traits;

pub use agents::{
    EditorAgent, HookAgent, PostProcessAgent, QualityAgent, ResearchAgent, ScriptWriter,
    ShortFormAgent, VoiceCalibrator, WriterMode,
};
pub use error::{AgentError, LlmError, RunError};
pub use extract::{extract_structured, Extracted};
pub use graph::{
    generate_dot, generate_mermaid, CompilationError, CompiledStateGraph, FnNode, Node,
    RetryPolicy, RunConfig, StateGraph, END, START,
};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm};
pub use message::Message;
pub use pipeline::{build_script_graph, content_type_router, QualityGate};
pub use settings::{LlmSettings, PipelineSettings, QualityPolicy};
pub use state::{QualityReport, ScriptState};
pub use stream::StreamEvent;
pub use traits::Agent;
