pub mod dtos;
pub mod handlers;
pub mod pipeline;
pub mod prompts;

pub use pipeline::{ArticlePipeline, PipelineError};
