// Visibility pipeline
// - offsets: code point offsets to byte / UTF-16 indices
// - merge: brand and domain spans to highlight segments
// - aggregate: per-brand visibility and domain mention totals
// - citations: cited domain and page leaderboard
// - summary: aggregated or precomputed report summary

pub mod aggregate;
pub mod citations;
pub mod merge;
pub mod offsets;
pub mod summary;

pub use aggregate::{
    domain_mention_totals, rank_for_display, visibility_percentage, visibility_scores,
    BrandRoster,
};
pub use citations::{citation_leaderboard, parse_citation, registrable_domain, CitedPage};
pub use merge::build_segments;
pub use offsets::{Boundary, OffsetTable};
pub use summary::{summarize, summarize_items, summarize_statistics};
