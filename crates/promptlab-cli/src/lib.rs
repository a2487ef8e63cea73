//! Terminal interface for promptlab

mod enhancer;
mod sink;
mod ui;


pub use enhancer::{build_enhancement_request, build_run_request, PromptEnhancer};
pub use sink::write_export;
pub use ui::{
    ask_clarifying_questions, clarifying_targets, display_banner, handle_input_with_history,
    print_analysis, print_help, print_optimized, print_stream, read_input_line,
};

// Re-export core types
pub use promptlab_core::{Error, Result};
