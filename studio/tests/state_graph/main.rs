//! StateGraph integration tests: construction errors, invocation, agents as nodes.

mod agent_as_node;
mod common;
mod compile_fail;
mod invoke;

#[path = "../init_logging.rs"]
mod init_logging;
