//! Agents for the currency-exchange service
//!
//! - [`LLMAgent`]: model-driven tool loop
//! - [`FallbackAgent`]: fixed answer used when no model backend is configured
//! - [`AgentRuntime`]: picks one of the two at startup and wraps every run in
//!   the `agent.run` span and the request deadline

pub mod agent;
pub mod builder;
pub mod fallback;
pub mod llm_agent;
pub mod runtime;

pub use agent::{Agent, Invocation};
pub use builder::LLMAgentBuilder;
pub use fallback::FallbackAgent;
pub use llm_agent::{DEFAULT_MAX_TURNS, LLMAgent, SYSTEM_INSTRUCTION};
pub use runtime::AgentRuntime;
