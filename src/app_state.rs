use std::sync::Arc;

use crate::articles::ArticlePipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ArticlePipeline>,
    /// Whether an API key for the language model was supplied at startup.
    pub language_model_configured: bool,
}

impl AppState {
    pub fn new(pipeline: ArticlePipeline, language_model_configured: bool) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            language_model_configured,
        }
    }
}
