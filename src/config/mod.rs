pub mod cli;
#[cfg(feature = "cli")]
mod command_line;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use command_line::{CliConfig, Command, DocumentArgs, GenerateArgs, RenderArgs};
