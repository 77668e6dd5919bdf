use crate::adapters::docx_text::input_text;
use crate::core::assemble::build_document;
use crate::core::{Pipeline, Storage, TextGenerator};
use crate::domain::model::{
    DocumentKind, DocumentMeta, MergePolicy, OutputFormat, RawDocument, RenderableDocument,
};
use crate::render::{render, RenderStyle};
use crate::utils::error::{DocGenError, Result};
use std::path::Path;
use std::sync::Arc;

/// 原始回應的來源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSource {
    /// storage 中已存在的模型回應檔 (純文字或 .docx)
    Stored(String),
    /// 送給文字生成服務的 prompt
    Prompt(String),
}

pub struct DocumentPipeline<S: Storage> {
    storage: S,
    kind: DocumentKind,
    source: RawSource,
    meta: DocumentMeta,
    formats: Vec<OutputFormat>,
    style: RenderStyle,
    merge_policy: MergePolicy,
    output_path: String,
    generator: Option<Arc<dyn TextGenerator>>,
    save_response: bool,
}

impl<S: Storage> DocumentPipeline<S> {
    pub fn new(storage: S, kind: DocumentKind, source: RawSource) -> Self {
        Self {
            storage,
            kind,
            source,
            meta: DocumentMeta::for_kind(kind),
            formats: vec![OutputFormat::Docx],
            style: RenderStyle::default(),
            merge_policy: MergePolicy::default(),
            output_path: ".".to_string(),
            generator: None,
            save_response: false,
        }
    }

    pub fn with_meta(mut self, meta: DocumentMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_merge_policy(mut self, merge_policy: MergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    /// 只用於回報路徑，實際寫檔位置由 storage 決定
    pub fn with_output_path(mut self, output_path: impl Into<String>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// 生成的原始回應另存為 {file_stem}_response.txt
    pub fn with_saved_response(mut self, save_response: bool) -> Self {
        self.save_response = save_response;
        self
    }

    pub fn response_file_name(&self) -> String {
        format!("{}_response.txt", self.kind.file_stem())
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for DocumentPipeline<S> {
    async fn extract(&self) -> Result<RawDocument> {
        let raw = match &self.source {
            RawSource::Stored(path) => {
                tracing::debug!("Reading model response from: {}", path);
                let bytes = self.storage.read_file(path).await?;
                RawDocument::new(input_text(path, &bytes)?)
            }
            RawSource::Prompt(prompt) => {
                let generator = self.generator.as_ref().ok_or_else(|| {
                    DocGenError::ConfigError {
                        message: "No text generator configured for prompt input".to_string(),
                    }
                })?;
                tracing::debug!("Sending prompt ({} characters) to generator", prompt.len());
                let text = generator.generate(prompt).await?;

                if self.save_response {
                    let file_name = self.response_file_name();
                    self.storage.write_file(&file_name, text.as_bytes()).await?;
                    tracing::info!("📝 Raw response saved to {}", file_name);
                }

                RawDocument::new(text)
            }
        };

        if raw.is_blank() {
            tracing::warn!("⚠️ Model response is empty, every section will use its fallback");
        }

        Ok(raw)
    }

    async fn transform(&self, raw: RawDocument) -> Result<RenderableDocument> {
        Ok(build_document(
            &raw,
            self.kind,
            self.meta.clone(),
            self.merge_policy,
        ))
    }

    async fn load(&self, document: RenderableDocument) -> Result<Vec<String>> {
        let mut paths = Vec::with_capacity(self.formats.len());

        for format in &self.formats {
            let artifact = render(&document, *format, &self.style)?;

            tracing::debug!(
                "Writing {} ({} bytes) to storage",
                artifact.file_name,
                artifact.bytes.len()
            );
            self.storage
                .write_file(&artifact.file_name, &artifact.bytes)
                .await?;

            paths.push(
                Path::new(&self.output_path)
                    .join(&artifact.file_name)
                    .to_string_lossy()
                    .into_owned(),
            );
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FieldValue, SectionLabel};
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }

        async fn file_names(&self) -> Vec<String> {
            let files = self.files.lock().await;
            let mut names: Vec<String> = files.keys().cloned().collect();
            names.sort();
            names
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                DocGenError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockGenerator {
        response: String,
        prompts: Mutex<Vec<String>>,
    }

    impl MockGenerator {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().await.push(prompt.to_string());
            Ok(self.response.clone())
        }
    }

    const RESPONSE: &str = "Attendees:\n* Alice\n* Bob\n\nAction Items:\n* Alice to send report by Friday.";

    #[tokio::test]
    async fn test_extract_from_storage() {
        let storage = MockStorage::new();
        storage.put_file("response.txt", "Attendees:\r\n* Alice").await;

        let pipeline = DocumentPipeline::new(
            storage,
            DocumentKind::Minutes,
            RawSource::Stored("response.txt".to_string()),
        );

        let raw = pipeline.extract().await.unwrap();
        assert_eq!(raw.as_str(), "Attendees:\n* Alice");
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let pipeline = DocumentPipeline::new(
            MockStorage::new(),
            DocumentKind::Minutes,
            RawSource::Stored("missing.txt".to_string()),
        );

        let result = pipeline.extract().await;
        assert!(matches!(result, Err(DocGenError::IoError(_))));
    }

    #[tokio::test]
    async fn test_extract_from_generator() {
        let generator = Arc::new(MockGenerator::new(RESPONSE));
        let pipeline = DocumentPipeline::new(
            MockStorage::new(),
            DocumentKind::Minutes,
            RawSource::Prompt("Summarize the meeting".to_string()),
        )
        .with_generator(generator.clone());

        let raw = pipeline.extract().await.unwrap();
        assert_eq!(raw.as_str(), RESPONSE);
        assert_eq!(
            *generator.prompts.lock().await,
            vec!["Summarize the meeting".to_string()]
        );
    }

    #[tokio::test]
    async fn test_generated_response_can_be_saved() {
        let storage = MockStorage::new();
        let pipeline = DocumentPipeline::new(
            storage.clone(),
            DocumentKind::TestCases,
            RawSource::Prompt("Generate test cases".to_string()),
        )
        .with_generator(Arc::new(MockGenerator::new("Test Cases:\n* Test Case ID: TC001")))
        .with_saved_response(true);

        pipeline.extract().await.unwrap();

        assert_eq!(
            storage.get_file("TestCases_response.txt").await,
            Some(b"Test Cases:\n* Test Case ID: TC001".to_vec())
        );
    }

    #[tokio::test]
    async fn test_prompt_without_generator_is_config_error() {
        let pipeline = DocumentPipeline::new(
            MockStorage::new(),
            DocumentKind::Minutes,
            RawSource::Prompt("hello".to_string()),
        );

        let result = pipeline.extract().await;
        assert!(matches!(result, Err(DocGenError::ConfigError { .. })));
    }

    #[tokio::test]
    async fn test_transform_builds_minutes() {
        let pipeline = DocumentPipeline::new(
            MockStorage::new(),
            DocumentKind::Minutes,
            RawSource::Stored("unused".to_string()),
        )
        .with_meta(DocumentMeta::for_kind(DocumentKind::Minutes).with_date("2025-05-20"));

        let document = pipeline.transform(RawDocument::new(RESPONSE)).await.unwrap();

        assert_eq!(document.meta.date, "2025-05-20");
        assert_eq!(
            document.get(SectionLabel::Attendees),
            Some(&FieldValue::List(vec!["Alice".to_string(), "Bob".to_string()]))
        );
        assert_eq!(
            document.get(SectionLabel::ActionItems),
            Some(&FieldValue::List(vec![
                "Alice to send report by Friday.".to_string()
            ]))
        );
    }

    #[tokio::test]
    async fn test_load_writes_every_format() {
        let storage = MockStorage::new();
        let pipeline = DocumentPipeline::new(
            storage.clone(),
            DocumentKind::Minutes,
            RawSource::Stored("unused".to_string()),
        )
        .with_formats(vec![OutputFormat::Html, OutputFormat::Docx])
        .with_output_path("out");

        let document = pipeline.transform(RawDocument::new(RESPONSE)).await.unwrap();
        let paths = pipeline.load(document).await.unwrap();

        assert_eq!(
            paths,
            vec![
                Path::new("out").join("Minutes_of_Meeting.html").to_string_lossy().into_owned(),
                Path::new("out").join("Minutes_of_Meeting.docx").to_string_lossy().into_owned(),
            ]
        );
        assert_eq!(
            storage.file_names().await,
            vec!["Minutes_of_Meeting.docx", "Minutes_of_Meeting.html"]
        );

        let html = String::from_utf8(storage.get_file("Minutes_of_Meeting.html").await.unwrap())
            .unwrap();
        assert!(html.contains("<li>Alice</li>"));
        assert!(html.contains("End of Meeting"));
    }
}
