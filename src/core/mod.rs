pub mod assemble;
pub mod engine;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
pub mod records;
pub mod splitter;
pub mod tables;

pub use crate::domain::model::{
    DocumentKind, DocumentMeta, FieldValue, MergePolicy, OutputFormat, RawDocument,
    RenderableDocument, SectionLabel,
};
pub use crate::domain::ports::{Pipeline, Storage, TextGenerator};
pub use crate::utils::error::Result;
