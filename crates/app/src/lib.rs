pub mod collaborators;
pub mod config;
pub mod runtime;

pub use config::AppConfig;
pub use runtime::{PipelineEvent, PipelineRuntime};
