use crate::core::normalizer::{normalize, normalize_text};
use crate::core::records::parse_records;
use crate::core::splitter::split;
use crate::core::tables::table_field;
use crate::domain::model::{
    DocumentKind, DocumentMeta, FieldShape, FieldValue, MergePolicy, RawDocument,
    RenderableDocument, Section, SectionLabel,
};

/// 原始回應 → 可輸出的文件。純函式，不會失敗
pub fn build_document(
    raw: &RawDocument,
    kind: DocumentKind,
    meta: DocumentMeta,
    policy: MergePolicy,
) -> RenderableDocument {
    let sections = split(raw.as_str(), &kind.vocabulary());
    let mut document = RenderableDocument::new(kind, meta);

    for (label, shape) in kind.layout() {
        let value = match merge_sections(&sections, *label, policy) {
            Some(section) => shape_value(&section, *shape),
            None => placeholder_value(*label, *shape),
        };
        document.insert(*label, value);
    }

    tracing::debug!(
        "Assembled {} document with {} sections",
        kind,
        document.sections.len()
    );

    document
}

/// 依合併策略處理重複出現的標題
pub fn merge_sections(
    sections: &[Section],
    label: SectionLabel,
    policy: MergePolicy,
) -> Option<Section> {
    let matching: Vec<&Section> = sections.iter().filter(|s| s.label == label).collect();

    if matching.len() > 1 {
        tracing::warn!(
            "⚠️ Heading '{}' appears {} times, applying {:?} merge policy",
            label,
            matching.len(),
            policy
        );
    }

    match policy {
        MergePolicy::First => matching.first().map(|s| (*s).clone()),
        MergePolicy::Last => matching.last().map(|s| (*s).clone()),
        MergePolicy::Concatenate if matching.is_empty() => None,
        MergePolicy::Concatenate => {
            let body = matching
                .iter()
                .map(|s| s.body.as_str())
                .filter(|body| !body.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n");
            Some(Section::new(label, body))
        }
    }
}

fn shape_value(section: &Section, shape: FieldShape) -> FieldValue {
    match shape {
        FieldShape::Text => FieldValue::Text(normalize_text(section)),
        FieldShape::List => match table_field(section.label, &section.body) {
            Some(table) => FieldValue::Table(table),
            None => FieldValue::List(normalize(section)),
        },
        FieldShape::Records => FieldValue::TestCases(parse_records(section)),
    }
}

pub(crate) fn placeholder_value(label: SectionLabel, shape: FieldShape) -> FieldValue {
    match shape {
        FieldShape::Text => FieldValue::Text(label.fallback().to_string()),
        FieldShape::List => FieldValue::List(vec![label.fallback().to_string()]),
        FieldShape::Records => FieldValue::TestCases(Vec::new()),
    }
}
