//! Wiring shared by the binaries: prompt selection per document kind and
//! pipeline construction from [`AppConfig`].

use crate::config::cli::LocalStorage;
use crate::config::toml_config::AppConfig;
use crate::core::pipeline::{DocumentPipeline, RawSource};
use crate::core::prompts::{minutes_prompt, requirements_prompt, test_cases_prompt};
use crate::domain::model::{DocumentKind, DocumentMeta};
use crate::utils::error::{DocGenError, Result};

/// 使用者提供的生成輸入，依文件種類使用其中幾項
#[derive(Debug, Clone, Default)]
pub struct GenerationInputs {
    pub transcript: Option<String>,
    pub brd: Option<String>,
    pub concept_note: Option<String>,
    pub additional_context: Option<String>,
}

fn required<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| DocGenError::InputError {
            message: message.to_string(),
        })
}

pub fn build_prompt(kind: DocumentKind, inputs: &GenerationInputs) -> Result<String> {
    match kind {
        DocumentKind::Minutes => minutes_prompt(required(
            &inputs.transcript,
            "A meeting transcript is required to generate minutes.",
        )?),
        DocumentKind::Requirements => requirements_prompt(
            required(
                &inputs.transcript,
                "A meeting transcript is required to generate a BRD.",
            )?,
            inputs.additional_context.as_deref(),
            inputs.concept_note.as_deref(),
        ),
        DocumentKind::TestCases => test_cases_prompt(
            required(&inputs.brd, "Please provide the BRD content.")?,
            inputs.concept_note.as_deref(),
            inputs.additional_context.as_deref(),
        ),
    }
}

pub fn document_pipeline(
    config: &AppConfig,
    kind: DocumentKind,
    source: RawSource,
    meta: DocumentMeta,
) -> Result<DocumentPipeline<LocalStorage>> {
    let storage = LocalStorage::new(&config.output.path);

    Ok(DocumentPipeline::new(storage, kind, source)
        .with_meta(meta)
        .with_formats(config.output_formats()?)
        .with_style(config.style.clone())
        .with_merge_policy(config.parsing.merge_policy)
        .with_output_path(config.output.path.clone()))
}
