// Interview core: data model, orchestration state machine, and its collaborators.
// The HTTP driver (handlers + session store) owns states between calls.

pub mod evaluator;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod report;
pub mod selection;
pub mod session;
pub mod state;
pub mod verify;

pub use evaluator::LlmEvaluator;
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use report::LlmReportSynthesizer;
pub use session::SessionStore;
