//! Conversation layer and terminal chat surface for docchat

mod memory;
mod prompt;
mod orchestrator;
mod session;
mod settings;
mod logging;
mod ui;

#[cfg(test)]
mod tests;

pub use memory::{ConversationMemory, MemoryConfig};
pub use prompt::{condense_prompt, grounding_prompt};
pub use orchestrator::{Answer, ConversationOrchestrator, OrchestratorConfig};
pub use session::{SessionState, TurnOutcome};
pub use settings::{startup_config, ChatSettings, EmbedderKind};
pub use logging::{init_logging, LogConfig};
pub use ui::{
    clear_screen, display_banner, handle_input_with_history, print_answer, print_help,
    print_history, print_sources, print_turn_error, render_markdown, source_preview,
};

// Re-export core types
pub use docchat_core::{Error, Result};
