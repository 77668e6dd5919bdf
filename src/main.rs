use ba_docgen::adapters::docx_text::input_text;
use ba_docgen::app::{build_prompt, document_pipeline, GenerationInputs};
use ba_docgen::config::{Command, GenerateArgs, RenderArgs};
use ba_docgen::core::pipeline::RawSource;
use ba_docgen::utils::error::ErrorSeverity;
use ba_docgen::utils::{logger, validation::Validate};
use ba_docgen::{AppConfig, CliConfig, GeminiClient, GenerationEngine, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // .env 不存在時忽略
    dotenvy::dotenv().ok();

    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting ba-docgen CLI");
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&cli).await {
        Ok(paths) => {
            tracing::info!("✅ Document generation completed successfully!");
            println!("✅ Document generation completed successfully!");
            for path in paths {
                println!("📁 {}", path);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Document generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> Result<Vec<String>> {
    let config = cli.app_config()?;

    match &cli.command {
        Command::Render(args) => render_command(&config, args).await,
        Command::Generate(args) => generate_command(&config, args).await,
    }
}

async fn render_command(config: &AppConfig, args: &RenderArgs) -> Result<Vec<String>> {
    // 轉成絕對路徑，讀檔時不受輸出目錄影響
    let input = std::path::absolute(&args.input)?;
    let source = RawSource::Stored(input.to_string_lossy().into_owned());

    let pipeline = document_pipeline(config, args.document.kind, source, args.document.meta())?;
    GenerationEngine::new(pipeline).run().await
}

async fn read_input(path: &Option<PathBuf>) -> Result<Option<String>> {
    match path {
        Some(path) => {
            let bytes = tokio::fs::read(path).await?;
            Ok(Some(input_text(&path.to_string_lossy(), &bytes)?))
        }
        None => Ok(None),
    }
}

async fn generate_command(config: &AppConfig, args: &GenerateArgs) -> Result<Vec<String>> {
    let inputs = GenerationInputs {
        transcript: read_input(&args.transcript).await?,
        brd: read_input(&args.brd).await?,
        concept_note: read_input(&args.concept_note).await?,
        additional_context: args.context.clone(),
    };
    let prompt = build_prompt(args.document.kind, &inputs)?;

    let client = GeminiClient::from_config(&config.generator)?;
    tracing::info!("Using model {}", config.generator.model);

    let pipeline = document_pipeline(
        config,
        args.document.kind,
        RawSource::Prompt(prompt),
        args.document.meta(),
    )?
    .with_generator(Arc::new(client))
    .with_saved_response(args.save_response);

    GenerationEngine::new(pipeline).run().await
}
