// Report summary
// Either aggregates raw report items or adopts the backend's statistics.

use crate::models::{
    CitationLeaderboard, ReportItem, ReportStatistics, ReportSummary, SummarySource,
};

use super::aggregate::{
    answered_count, domain_mention_totals, rank_for_display, visibility_scores, BrandRoster,
};
use super::citations::{citation_leaderboard, RankedCounter};

/// Summary computed from raw items
pub fn summarize_items(items: &[ReportItem], roster: &BrandRoster) -> ReportSummary {
    ReportSummary {
        source: SummarySource::Aggregated,
        total_items: items.len(),
        answered_items: answered_count(items),
        brand_visibility: visibility_scores(items, roster),
        domain_mentions: domain_mention_totals(items),
        citations: citation_leaderboard(items),
    }
}

/// Summary taken from pre-aggregated statistics. Only domain-level
/// citation counts exist there, so `subpaths` stays empty.
pub fn summarize_statistics(
    statistics: &ReportStatistics,
    total_items: usize,
    answered_items: usize,
) -> ReportSummary {
    let mut brand_visibility = statistics.brand_visibility.clone();
    rank_for_display(&mut brand_visibility);

    let mut domain_mentions = statistics.domain_mentions.clone();
    domain_mentions.sort_by(|a, b| b.total_mentions.cmp(&a.total_mentions));

    let mut domains = RankedCounter::default();
    let mut total_citations: u32 = 0;
    for entry in &statistics.citation_domains {
        domains.add(entry.domain.trim(), entry.citation_count);
        total_citations = total_citations.saturating_add(entry.citation_count);
    }

    ReportSummary {
        source: SummarySource::Precomputed,
        total_items,
        answered_items,
        brand_visibility,
        domain_mentions,
        citations: CitationLeaderboard {
            domains: domains.into_ranked(),
            subpaths: Vec::new(),
            total_citations,
        },
    }
}

/// Precomputed statistics win when the backend supplied them.
pub fn summarize(
    items: &[ReportItem],
    roster: &BrandRoster,
    statistics: Option<&ReportStatistics>,
) -> ReportSummary {
    match statistics {
        Some(statistics) => summarize_statistics(statistics, items.len(), answered_count(items)),
        None => summarize_items(items, roster),
    }
}
