use crate::config::toml_config::AppConfig;
use crate::domain::model::{DocumentKind, DocumentMeta, MergePolicy, OutputFormat};
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, Validate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// 可接受的輸入檔副檔名
const INPUT_EXTENSIONS: [&str; 3] = ["txt", "md", "docx"];

#[derive(Debug, Clone, Parser)]
#[command(name = "ba-docgen")]
#[command(about = "Turn generative-model answers into structured BA documents")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Output directory (overrides [output] path)")]
    pub output_path: Option<String>,

    #[arg(long, global = true, value_enum, value_delimiter = ',')]
    pub format: Vec<OutputFormat>,

    #[arg(long, global = true, help = "concatenate, first or last")]
    pub merge_policy: Option<MergePolicy>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Structure a saved model response and render it
    Render(RenderArgs),
    /// Build a prompt from input files, call the generator and render the answer
    Generate(GenerateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct DocumentArgs {
    #[arg(long, value_enum)]
    pub kind: DocumentKind,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub time: Option<String>,

    #[arg(long)]
    pub subject: Option<String>,
}

impl DocumentArgs {
    pub fn meta(&self) -> DocumentMeta {
        let mut meta = DocumentMeta::for_kind(self.kind);
        if let Some(title) = &self.title {
            meta.title = title.clone();
        }
        meta.with_date(self.date.clone().unwrap_or_default())
            .with_time(self.time.clone().unwrap_or_default())
            .with_subject(self.subject.clone().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Saved model response (.txt, .md or .docx)
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Meeting transcript (minutes and requirements)
    #[arg(long)]
    pub transcript: Option<PathBuf>,

    /// Business requirements document (test cases)
    #[arg(long)]
    pub brd: Option<PathBuf>,

    #[arg(long)]
    pub concept_note: Option<PathBuf>,

    #[arg(long, help = "Additional context passed to the prompt")]
    pub context: Option<String>,

    #[arg(long, help = "Also save the raw model response as text")]
    pub save_response: bool,
}

impl CliConfig {
    /// 讀取設定檔 (沒有時使用預設值)，再套用命令列覆寫
    pub fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(output_path) = &self.output_path {
            config.output.path = output_path.clone();
        }
        if !self.format.is_empty() {
            config.output.formats = self.format.iter().map(|f| f.to_string()).collect();
        }
        if let Some(merge_policy) = self.merge_policy {
            config.parsing.merge_policy = merge_policy;
        }

        config.validate()?;
        Ok(config)
    }

    fn input_files(&self) -> Vec<String> {
        let paths: Vec<&PathBuf> = match &self.command {
            Command::Render(args) => vec![&args.input],
            Command::Generate(args) => [&args.transcript, &args.brd, &args.concept_note]
                .into_iter()
                .flatten()
                .collect(),
        };
        paths
            .into_iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_file_extensions("input", &self.input_files(), &INPUT_EXTENSIONS)
    }
}
