//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::LlmPort;
use crate::stores::SessionStore;
use crate::use_cases::ContentGenerator;

/// Main application state.
///
/// Holds the session store and the content generator. Constructed once at
/// startup and passed to HTTP handlers via Axum state; tests build their own
/// instances with isolated stores and mock LLM ports.
pub struct App {
    pub store: SessionStore,
    pub generator: ContentGenerator,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self {
            store: SessionStore::new(),
            generator: ContentGenerator::new(llm),
        }
    }
}
