use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 生成式模型回傳的原始文字，除換行外不假設任何結構
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDocument(String);

impl RawDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        // Windows 換行統一成 \n
        if text.contains('\r') {
            Self(text.replace("\r\n", "\n").replace('\r', "\n"))
        } else {
            Self(text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for RawDocument {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for RawDocument {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Overview,
    MeetingSummary,
    Attendees,
    ActionItems,
    DiscussionPoints,
    NextSteps,
    TestScenarios,
    TestCases,
    ProjectObjective,
    Requirements,
    ProjectScope,
    KeyStakeholders,
}

impl SectionLabel {
    pub const ALL: [SectionLabel; 12] = [
        SectionLabel::Overview,
        SectionLabel::MeetingSummary,
        SectionLabel::Attendees,
        SectionLabel::ActionItems,
        SectionLabel::DiscussionPoints,
        SectionLabel::NextSteps,
        SectionLabel::TestScenarios,
        SectionLabel::TestCases,
        SectionLabel::ProjectObjective,
        SectionLabel::Requirements,
        SectionLabel::ProjectScope,
        SectionLabel::KeyStakeholders,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SectionLabel::Overview => "Overview",
            SectionLabel::MeetingSummary => "Meeting Summary",
            SectionLabel::Attendees => "Attendees",
            SectionLabel::ActionItems => "Action Items",
            SectionLabel::DiscussionPoints => "Discussion Points",
            SectionLabel::NextSteps => "Next Steps",
            SectionLabel::TestScenarios => "Test Scenarios",
            SectionLabel::TestCases => "Test Cases",
            SectionLabel::ProjectObjective => "Project Objective",
            SectionLabel::Requirements => "Requirements",
            SectionLabel::ProjectScope => "Project Scope",
            SectionLabel::KeyStakeholders => "Key Stakeholders",
        }
    }

    /// 可辨識的標題寫法，比對時不分大小寫、空白數量不限
    pub fn headings(&self) -> &'static [&'static str] {
        match self {
            SectionLabel::Overview => &["Test Case Overview", "Overview"],
            SectionLabel::MeetingSummary => &["Meeting Summary", "Summary"],
            SectionLabel::Attendees => &["Attendees", "Participants"],
            SectionLabel::ActionItems => &["Action Items"],
            SectionLabel::DiscussionPoints => &["Discussion Points"],
            SectionLabel::NextSteps => &["Next Steps"],
            SectionLabel::TestScenarios => &["Test Scenarios"],
            SectionLabel::TestCases => &["Test Cases"],
            SectionLabel::ProjectObjective => &["Project Objectives", "Project Objective"],
            SectionLabel::Requirements => &["Requirements"],
            SectionLabel::ProjectScope => &["Project Scope", "Scope"],
            SectionLabel::KeyStakeholders => &["Key Stakeholders", "Stakeholders"],
        }
    }

    /// 沒有內容時顯示的固定字串
    pub fn fallback(&self) -> &'static str {
        match self {
            SectionLabel::Overview => "No overview provided.",
            SectionLabel::MeetingSummary => "No summary provided.",
            SectionLabel::Attendees => "No attendees listed.",
            SectionLabel::ActionItems => "No action items listed.",
            SectionLabel::DiscussionPoints => "No discussion points listed.",
            SectionLabel::NextSteps => "No next steps listed.",
            SectionLabel::TestScenarios => "No scenarios listed.",
            SectionLabel::TestCases => "No test cases listed.",
            SectionLabel::ProjectObjective => "No project objective provided.",
            SectionLabel::Requirements => "No requirements listed.",
            SectionLabel::ProjectScope => "No project scope provided.",
            SectionLabel::KeyStakeholders => "No stakeholders listed.",
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub label: SectionLabel,
    pub body: String,
}

impl Section {
    pub fn new(label: SectionLabel, body: impl Into<String>) -> Self {
        Self {
            label,
            body: body.into(),
        }
    }
}

/// 有序的標題字彙表；第一個辨識標題之前的內容歸到 `fallback`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    labels: Vec<SectionLabel>,
    fallback: SectionLabel,
}

impl Vocabulary {
    pub fn new(labels: Vec<SectionLabel>, fallback: SectionLabel) -> Self {
        Self { labels, fallback }
    }

    pub fn minutes() -> Self {
        Self::new(
            vec![
                SectionLabel::MeetingSummary,
                SectionLabel::Attendees,
                SectionLabel::ActionItems,
                SectionLabel::DiscussionPoints,
                SectionLabel::NextSteps,
            ],
            SectionLabel::MeetingSummary,
        )
    }

    pub fn test_cases() -> Self {
        Self::new(
            vec![
                SectionLabel::Overview,
                SectionLabel::TestScenarios,
                SectionLabel::TestCases,
            ],
            SectionLabel::Overview,
        )
    }

    pub fn requirements() -> Self {
        Self::new(
            vec![
                SectionLabel::ProjectObjective,
                SectionLabel::Requirements,
                SectionLabel::ProjectScope,
                SectionLabel::KeyStakeholders,
            ],
            SectionLabel::Overview,
        )
    }

    pub fn labels(&self) -> &[SectionLabel] {
        &self.labels
    }

    pub fn fallback(&self) -> SectionLabel {
        self.fallback
    }
}

pub type ListField = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseRecord {
    pub id: String,
    pub description: String,
    pub precondition: String,
    pub steps: String,
    pub expected_result: String,
    pub note: String,
}

impl TestCaseRecord {
    pub const COLUMNS: [&'static str; 6] = [
        "Test Case ID",
        "Description",
        "Precondition",
        "Steps",
        "Expected Result",
        "Note",
    ];

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
            && self.description.is_empty()
            && self.precondition.is_empty()
            && self.steps.is_empty()
            && self.expected_result.is_empty()
            && self.note.is_empty()
    }

    /// 依 Test Cases 工作表的固定欄位順序
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.id,
            &self.description,
            &self.precondition,
            &self.steps,
            &self.expected_result,
            &self.note,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableField {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    List(ListField),
    Table(TableField),
    TestCases(Vec<TestCaseRecord>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Text,
    List,
    Records,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// 重複標題的內容依文件順序串接
    #[default]
    Concatenate,
    First,
    Last,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concatenate" | "concat" => Ok(MergePolicy::Concatenate),
            "first" | "first-wins" => Ok(MergePolicy::First),
            "last" | "last-wins" => Ok(MergePolicy::Last),
            other => Err(format!("unknown merge policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DocumentKind {
    #[cfg_attr(feature = "cli", value(alias = "mom"))]
    Minutes,
    TestCases,
    #[cfg_attr(feature = "cli", value(alias = "brd"))]
    Requirements,
}

impl DocumentKind {
    pub fn vocabulary(&self) -> Vocabulary {
        match self {
            DocumentKind::Minutes => Vocabulary::minutes(),
            DocumentKind::TestCases => Vocabulary::test_cases(),
            DocumentKind::Requirements => Vocabulary::requirements(),
        }
    }

    /// 每種文件固定的區段順序與形狀
    pub fn layout(&self) -> &'static [(SectionLabel, FieldShape)] {
        match self {
            DocumentKind::Minutes => &[
                (SectionLabel::MeetingSummary, FieldShape::Text),
                (SectionLabel::Attendees, FieldShape::List),
                (SectionLabel::ActionItems, FieldShape::List),
                (SectionLabel::DiscussionPoints, FieldShape::List),
                (SectionLabel::NextSteps, FieldShape::List),
            ],
            DocumentKind::TestCases => &[
                (SectionLabel::Overview, FieldShape::Text),
                (SectionLabel::TestScenarios, FieldShape::List),
                (SectionLabel::TestCases, FieldShape::Records),
            ],
            DocumentKind::Requirements => &[
                (SectionLabel::Overview, FieldShape::Text),
                (SectionLabel::ProjectObjective, FieldShape::Text),
                (SectionLabel::Requirements, FieldShape::List),
                (SectionLabel::ProjectScope, FieldShape::Text),
                (SectionLabel::KeyStakeholders, FieldShape::List),
            ],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Minutes => "Minutes of Meeting",
            DocumentKind::TestCases => "Test Cases Document",
            DocumentKind::Requirements => "Business Requirements Document",
        }
    }

    pub fn footer(&self) -> &'static str {
        match self {
            DocumentKind::Minutes => "End of Meeting",
            DocumentKind::TestCases | DocumentKind::Requirements => "End of Document",
        }
    }

    pub fn section_title(&self, label: SectionLabel) -> &'static str {
        match (self, label) {
            (DocumentKind::TestCases, SectionLabel::Overview) => "Test Case Overview",
            _ => label.title(),
        }
    }

    pub fn file_stem(&self) -> &'static str {
        match self {
            DocumentKind::Minutes => "Minutes_of_Meeting",
            DocumentKind::TestCases => "TestCases",
            DocumentKind::Requirements => "Business_Requirements_Document",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Minutes => "minutes",
            DocumentKind::TestCases => "test-cases",
            DocumentKind::Requirements => "requirements",
        };
        f.write_str(name)
    }
}

/// 呼叫端提供的頁面資訊，原樣輸出，不從原始文字解析
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub title: String,
    pub date: String,
    pub time: String,
    pub subject: String,
}

impl DocumentMeta {
    pub fn for_kind(kind: DocumentKind) -> Self {
        Self {
            title: kind.title().to_string(),
            ..Default::default()
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// 非空白的 (標籤, 值) 組合，依 Date / Time / Subject 順序
    pub fn header_lines(&self) -> Vec<(&'static str, &str)> {
        [
            ("Date", self.date.as_str()),
            ("Time", self.time.as_str()),
            ("Subject", self.subject.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub label: SectionLabel,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderableDocument {
    pub kind: DocumentKind,
    pub meta: DocumentMeta,
    pub sections: Vec<DocumentSection>,
}

impl RenderableDocument {
    pub fn new(kind: DocumentKind, meta: DocumentMeta) -> Self {
        Self {
            kind,
            meta,
            sections: Vec::new(),
        }
    }

    pub fn get(&self, label: SectionLabel) -> Option<&FieldValue> {
        self.sections
            .iter()
            .find(|section| section.label == label)
            .map(|section| &section.value)
    }

    /// 同一標籤只保留一筆，後寫入者覆蓋
    pub fn insert(&mut self, label: SectionLabel, value: FieldValue) {
        match self.sections.iter_mut().find(|section| section.label == label) {
            Some(existing) => existing.value = value,
            None => self.sections.push(DocumentSection { label, value }),
        }
    }

    pub fn title(&self) -> &str {
        if self.meta.title.trim().is_empty() {
            self.kind.title()
        } else {
            &self.meta.title
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Html,
    /// Word 可開啟的 HTML (.doc)
    Doc,
    Docx,
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Doc => "doc",
            OutputFormat::Docx => "docx",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "doc" => Ok(OutputFormat::Doc),
            "docx" | "word" => Ok(OutputFormat::Docx),
            "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unsupported output format: {}", other)),
        }
    }
}

/// 最終輸出的檔案
#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: OutputFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}
