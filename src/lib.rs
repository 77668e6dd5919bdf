pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::gemini::GeminiClient;
pub use config::{cli::LocalStorage, toml_config::AppConfig};
pub use core::assemble::build_document;
pub use core::{engine::GenerationEngine, pipeline::DocumentPipeline};
pub use render::{render, render_html, RenderStyle};
pub use utils::error::{DocGenError, Result};
