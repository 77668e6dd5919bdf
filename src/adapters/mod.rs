// Adapters layer: concrete implementations for external systems (text generator, input files, http proxy)

pub mod docx_text;
pub mod gemini;
#[cfg(feature = "proxy")]
pub mod proxy;
