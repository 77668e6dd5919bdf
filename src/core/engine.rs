use crate::core::Pipeline;
use crate::domain::model::FieldValue;
use crate::utils::error::Result;

pub struct GenerationEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> GenerationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<Vec<String>> {
        tracing::info!("🚀 Starting document generation");

        // Extract
        tracing::info!("📥 Extracting model response...");
        let raw = self.pipeline.extract().await?;
        tracing::info!("Extracted {} characters", raw.as_str().len());

        // Transform
        tracing::info!("🔄 Structuring response...");
        let document = self.pipeline.transform(raw).await?;
        let records: usize = document
            .sections
            .iter()
            .map(|section| match &section.value {
                FieldValue::Text(_) => 1,
                FieldValue::List(items) => items.len(),
                FieldValue::Table(table) => table.rows.len(),
                FieldValue::TestCases(records) => records.len(),
            })
            .sum();
        tracing::info!(
            "Structured {} sections ({} entries)",
            document.sections.len(),
            records
        );

        // Load
        tracing::info!("💾 Writing documents...");
        let paths = self.pipeline.load(document).await?;
        for path in &paths {
            tracing::info!("✅ Output saved to: {}", path);
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        DocumentKind, DocumentMeta, RawDocument, RenderableDocument, SectionLabel,
    };
    use crate::utils::error::DocGenError;
    use std::sync::Mutex;

    struct RecordingPipeline {
        phases: Mutex<Vec<&'static str>>,
        fail_load: bool,
    }

    impl RecordingPipeline {
        fn new(fail_load: bool) -> Self {
            Self {
                phases: Mutex::new(Vec::new()),
                fail_load,
            }
        }

        fn record(&self, phase: &'static str) {
            self.phases.lock().unwrap().push(phase);
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for RecordingPipeline {
        async fn extract(&self) -> Result<RawDocument> {
            self.record("extract");
            Ok(RawDocument::new("Attendees:\n* Alice"))
        }

        async fn transform(&self, raw: RawDocument) -> Result<RenderableDocument> {
            self.record("transform");
            let mut document = RenderableDocument::new(
                DocumentKind::Minutes,
                DocumentMeta::for_kind(DocumentKind::Minutes),
            );
            document.insert(
                SectionLabel::Attendees,
                FieldValue::Text(raw.as_str().to_string()),
            );
            Ok(document)
        }

        async fn load(&self, _document: RenderableDocument) -> Result<Vec<String>> {
            self.record("load");
            if self.fail_load {
                return Err(DocGenError::RenderError {
                    format: "docx".to_string(),
                    message: "disk full".to_string(),
                });
            }
            Ok(vec!["out/Minutes_of_Meeting.docx".to_string()])
        }
    }

    #[tokio::test]
    async fn test_run_executes_phases_in_order() {
        let engine = GenerationEngine::new(RecordingPipeline::new(false));
        let paths = engine.run().await.unwrap();

        assert_eq!(paths, vec!["out/Minutes_of_Meeting.docx"]);
        assert_eq!(
            *engine.pipeline.phases.lock().unwrap(),
            vec!["extract", "transform", "load"]
        );
    }

    #[tokio::test]
    async fn test_run_propagates_load_error() {
        let engine = GenerationEngine::new(RecordingPipeline::new(true));
        let result = engine.run().await;

        assert!(matches!(result, Err(DocGenError::RenderError { .. })));
    }
}
