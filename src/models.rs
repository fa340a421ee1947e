use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One located occurrence of a brand or domain inside a response.
/// `start`/`end` count Unicode code points, not bytes or UTF-16 units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub matched_text: String,
}

/// All mentions of one brand within one response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandMentionResult {
    pub brand_name: String,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

/// All mentions of one domain within one response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMentionResult {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub is_brand: bool,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

/// Source cited by an LLM answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    #[serde(default)]
    pub text: String,
}

/// LLM answer to a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub response: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub timestamp: String,
}

/// Per-prompt entry of a visibility report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportItem {
    pub prompt_id: i64,
    #[serde(default)]
    pub prompt_text: String,
    #[serde(default)]
    pub evaluation_id: Option<i64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub answer: Option<Answer>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub brand_mentions: Option<Vec<BrandMentionResult>>,
    #[serde(default)]
    pub domain_mentions: Option<Vec<DomainMentionResult>>,
}

/// What a highlighted run of text refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    BrandHighlight { names: Vec<String> },
    DomainHighlight { names: Vec<String>, is_brand: bool },
}

/// Contiguous run of a response, plain or highlighted.
/// `start`/`end` are UTF-16 code unit offsets into the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "SegmentWire")]
pub struct TextSegment {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub kind: SegmentKind,
}

impl TextSegment {
    pub fn is_highlight(&self) -> bool {
        !matches!(self.kind, SegmentKind::Plain)
    }

    /// Display label: merged names joined by ", "
    pub fn label(&self) -> Option<String> {
        match &self.kind {
            SegmentKind::Plain => None,
            SegmentKind::BrandHighlight { names } | SegmentKind::DomainHighlight { names, .. } => {
                Some(names.join(", "))
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SegmentWire {
    text: String,
    start: usize,
    end: usize,
    is_highlight: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    highlight_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_brand: Option<bool>,
}

impl From<TextSegment> for SegmentWire {
    fn from(segment: TextSegment) -> Self {
        let brand_name = segment.label();
        let (highlight_type, is_brand) = match &segment.kind {
            SegmentKind::Plain => (None, None),
            SegmentKind::BrandHighlight { .. } => (Some("brand"), None),
            SegmentKind::DomainHighlight { is_brand, .. } => (Some("domain"), Some(*is_brand)),
        };
        SegmentWire {
            is_highlight: segment.is_highlight(),
            text: segment.text,
            start: segment.start,
            end: segment.end,
            highlight_type,
            brand_name,
            is_brand,
        }
    }
}

/// Share of answered prompts in which a brand was mentioned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandVisibilityScore {
    pub brand_name: String,
    #[serde(default)]
    pub is_target_brand: bool,
    #[serde(deserialize_with = "deserialize_percentage")]
    pub visibility_percentage: u8,
}

/// Mention occurrences of one domain across a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMentionTotal {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub is_target_brand: bool,
    pub total_mentions: u32,
}

/// Citation count of one domain, as pre-aggregated by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationDomainCount {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub is_target_brand: bool,
    pub citation_count: u32,
}

/// Backend-computed report statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStatistics {
    #[serde(default)]
    pub brand_visibility: Vec<BrandVisibilityScore>,
    #[serde(default)]
    pub domain_mentions: Vec<DomainMentionTotal>,
    #[serde(default)]
    pub citation_domains: Vec<CitationDomainCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub path: String,
    pub count: u32,
}

/// Ranked counts of cited domains and pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationLeaderboard {
    pub domains: Vec<LeaderboardEntry>,
    pub subpaths: Vec<LeaderboardEntry>,
    pub total_citations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Aggregated,
    Precomputed,
}

/// Report-level numbers for the summary panels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub source: SummarySource,
    pub total_items: usize,
    pub answered_items: usize,
    pub brand_visibility: Vec<BrandVisibilityScore>,
    pub domain_mentions: Vec<DomainMentionTotal>,
    pub citations: CitationLeaderboard,
}

/// Stored visibility report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub group_id: Option<i64>,
    pub name: String,
    pub target_brand: String,
    pub competitors: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub cost_credits: i64,
}

/// Report with its items
#[derive(Debug, Clone, Serialize)]
pub struct ReportDetail {
    pub report: Report,
    pub cost_display: String,
    pub items: Vec<ReportItem>,
}

/// Credit balance of a dashboard user
#[derive(Debug, Clone, Serialize)]
pub struct UserBalance {
    pub user_id: i64,
    pub email: String,
    pub credits: i64,
    pub display: String,
}

/// Body of a stateless highlight request
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightRequest {
    pub response: String,
    #[serde(default)]
    pub brand_mentions: Option<Vec<BrandMentionResult>>,
    #[serde(default)]
    pub domain_mentions: Option<Vec<DomainMentionResult>>,
}

/// Body of a stateless summary request
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRequest {
    pub target_brand: String,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub items: Vec<ReportItem>,
    #[serde(default)]
    pub statistics: Option<ReportStatistics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

/// Percentages may arrive as floats; round and clamp into 0..=100.
fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Ok(0);
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}
