// Mention merging
// Turns brand and domain mention spans into a gap-free, non-overlapping
// segmentation of the response text.

use crate::models::{BrandMentionResult, DomainMentionResult, SegmentKind, TextSegment};

use super::offsets::{Boundary, OffsetTable};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Label {
    Brand(Vec<String>),
    Domain { names: Vec<String>, is_brand: bool },
}

impl Label {
    /// Label of two overlapping spans. A brand beats a domain whichever
    /// arrives first; labels of the same kind keep every distinct name.
    fn absorb(self, incoming: Label) -> Label {
        match (self, incoming) {
            (Label::Domain { .. }, brand @ Label::Brand(_)) => brand,
            (brand @ Label::Brand(_), Label::Domain { .. }) => brand,
            (Label::Brand(mut names), Label::Brand(more)) => {
                extend_unique(&mut names, more);
                Label::Brand(names)
            }
            (
                Label::Domain {
                    mut names,
                    is_brand,
                },
                Label::Domain {
                    names: more,
                    is_brand: more_is_brand,
                },
            ) => {
                extend_unique(&mut names, more);
                Label::Domain {
                    names,
                    is_brand: is_brand || more_is_brand,
                }
            }
        }
    }

    fn into_kind(self) -> SegmentKind {
        match self {
            Label::Brand(names) => SegmentKind::BrandHighlight { names },
            Label::Domain { names, is_brand } => SegmentKind::DomainHighlight { names, is_brand },
        }
    }
}

fn extend_unique(names: &mut Vec<String>, more: Vec<String>) {
    for name in more {
        if !names.contains(&name) {
            names.push(name);
        }
    }
}

#[derive(Debug, Clone)]
struct Interval {
    start: Boundary,
    end: Boundary,
    label: Label,
}

/// Split `response` into plain and highlighted segments.
///
/// Offsets are code points and are clamped to the response; spans that end
/// up empty are dropped. Overlapping spans merge into one highlight. The
/// segments always concatenate back to `response`.
pub fn build_segments(
    response: &str,
    brand_mentions: Option<&[BrandMentionResult]>,
    domain_mentions: Option<&[DomainMentionResult]>,
) -> Vec<TextSegment> {
    let brand_mentions = brand_mentions.unwrap_or_default();
    let domain_mentions = domain_mentions.unwrap_or_default();

    if brand_mentions.is_empty() && domain_mentions.is_empty() {
        return vec![TextSegment {
            text: response.to_string(),
            start: 0,
            end: response.encode_utf16().count(),
            kind: SegmentKind::Plain,
        }];
    }

    let table = OffsetTable::new(response);
    let mut intervals = collect_intervals(&table, brand_mentions, domain_mentions);
    // Stable: at equal starts brand spans stay ahead of domain spans.
    intervals.sort_by_key(|interval| interval.start);
    let merged = merge_intervals(intervals);

    emit_segments(response, &table, merged)
}

fn collect_intervals(
    table: &OffsetTable,
    brand_mentions: &[BrandMentionResult],
    domain_mentions: &[DomainMentionResult],
) -> Vec<Interval> {
    let brands = brand_mentions.iter().flat_map(|result| {
        result.mentions.iter().map(move |mention| {
            (
                mention.start,
                mention.end,
                Label::Brand(vec![result.brand_name.clone()]),
            )
        })
    });

    let domains = domain_mentions.iter().flat_map(|result| {
        let display = if result.name.trim().is_empty() {
            result.domain.clone()
        } else {
            result.name.clone()
        };
        result.mentions.iter().map(move |mention| {
            (
                mention.start,
                mention.end,
                Label::Domain {
                    names: vec![display.clone()],
                    is_brand: result.is_brand,
                },
            )
        })
    });

    brands
        .chain(domains)
        .filter_map(|(start, end, label)| {
            let start = table.boundary(start);
            let end = table.boundary(end);
            if start >= end {
                tracing::debug!(
                    start = start.code_point,
                    end = end.code_point,
                    "skipping empty mention span"
                );
                return None;
            }
            Some(Interval { start, end, label })
        })
        .collect()
}

fn merge_intervals(sorted: Vec<Interval>) -> Vec<Interval> {
    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    let mut iter = sorted.into_iter();
    let Some(mut current) = iter.next() else {
        return merged;
    };

    for next in iter {
        if next.start < current.end {
            current.end = current.end.max(next.end);
            current.label = current.label.absorb(next.label);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

fn emit_segments(response: &str, table: &OffsetTable, merged: Vec<Interval>) -> Vec<TextSegment> {
    let mut segments = Vec::with_capacity(merged.len() * 2 + 1);
    let mut cursor = table.boundary(0);

    for interval in merged {
        if cursor < interval.start {
            segments.push(plain(response, cursor, interval.start));
        }
        segments.push(TextSegment {
            text: response[interval.start.byte..interval.end.byte].to_string(),
            start: interval.start.utf16,
            end: interval.end.utf16,
            kind: interval.label.into_kind(),
        });
        cursor = interval.end;
    }

    let end = table.boundary(table.len() as i64);
    if cursor < end {
        segments.push(plain(response, cursor, end));
    }
    segments
}

fn plain(response: &str, start: Boundary, end: Boundary) -> TextSegment {
    TextSegment {
        text: response[start.byte..end.byte].to_string(),
        start: start.utf16,
        end: end.utf16,
        kind: SegmentKind::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mention;

    fn mention(start: i64, end: i64) -> Mention {
        Mention {
            start,
            end,
            matched_text: String::new(),
        }
    }

    fn brand(name: &str, spans: &[(i64, i64)]) -> BrandMentionResult {
        BrandMentionResult {
            brand_name: name.to_string(),
            mentions: spans.iter().map(|&(s, e)| mention(s, e)).collect(),
        }
    }

    fn domain(name: &str, domain: &str, is_brand: bool, spans: &[(i64, i64)]) -> DomainMentionResult {
        DomainMentionResult {
            name: name.to_string(),
            domain: domain.to_string(),
            is_brand,
            mentions: spans.iter().map(|&(s, e)| mention(s, e)).collect(),
        }
    }

    fn joined(segments: &[TextSegment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_no_mentions_single_plain_segment() {
        let segments = build_segments("plain answer", None, Some(&[]));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "plain answer");
        assert_eq!(segments[0].kind, SegmentKind::Plain);
    }

    #[test]
    fn test_astral_offsets() {
        let response = "🎉Nike🎉";
        let brands = [brand("Nike", &[(1, 5)])];
        let segments = build_segments(response, Some(&brands), None);

        assert_eq!(segments.len(), 3);
        let highlight = &segments[1];
        assert_eq!(highlight.text, "Nike");
        assert_eq!((highlight.start, highlight.end), (2, 6));
        assert_eq!(
            highlight.kind,
            SegmentKind::BrandHighlight {
                names: vec!["Nike".to_string()]
            }
        );
        assert_eq!(joined(&segments), response);
    }

    #[test]
    fn test_brand_wins_over_domain() {
        let response = "Acme sells at acme.com today";
        let brands = [brand("Acme", &[(0, 10)])];
        let domains = [domain("Acme", "acme.com", true, &[(5, 15)])];
        let segments = build_segments(response, Some(&brands), Some(&domains));

        assert_eq!(segments[0].text, &response[0..15]);
        assert_eq!(segments[0].label().as_deref(), Some("Acme"));
        assert!(matches!(segments[0].kind, SegmentKind::BrandHighlight { .. }));
        assert_eq!(joined(&segments), response);
    }

    #[test]
    fn test_brand_arriving_later_still_wins() {
        let response = "see shop.example.org for Example";
        let brands = [brand("Example", &[(9, 16)])];
        let domains = [domain("Shop", "shop.example.org", false, &[(4, 20)])];
        let segments = build_segments(response, Some(&brands), Some(&domains));

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].text, "shop.example.org");
        assert_eq!(
            segments[1].kind,
            SegmentKind::BrandHighlight {
                names: vec!["Example".to_string()]
            }
        );
    }

    #[test]
    fn test_non_overlapping_spans() {
        let response = "Nike beats Puma";
        let brands = [brand("Nike", &[(0, 4)]), brand("Puma", &[(11, 15)])];
        let segments = build_segments(response, Some(&brands), None);

        assert_eq!(segments.len(), 3);
        assert!(segments[0].is_highlight());
        assert!(!segments[1].is_highlight());
        assert_eq!(segments[1].text, &response[4..11]);
        assert!(segments[2].is_highlight());
    }

    #[test]
    fn test_same_kind_overlap_joins_names() {
        let response = "Coca-Cola Zero is popular";
        let brands = [
            brand("Coca-Cola", &[(0, 9)]),
            brand("Coca-Cola Zero", &[(0, 14)]),
            brand("Coca-Cola", &[(5, 9)]),
        ];
        let segments = build_segments(response, Some(&brands), None);

        assert_eq!(segments[0].text, "Coca-Cola Zero");
        assert_eq!(
            segments[0].label().as_deref(),
            Some("Coca-Cola, Coca-Cola Zero")
        );
        assert_eq!(joined(&segments), response);
    }

    #[test]
    fn test_domain_overlap_keeps_brand_flag() {
        let response = "www.nike.com";
        let domains = [
            domain("Nike", "nike.com", true, &[(4, 12)]),
            domain("Nike Web", "www.nike.com", false, &[(0, 12)]),
        ];
        let segments = build_segments(response, None, Some(&domains));

        assert_eq!(segments.len(), 1);
        assert_eq!(
            segments[0].kind,
            SegmentKind::DomainHighlight {
                names: vec!["Nike Web".to_string(), "Nike".to_string()],
                is_brand: true,
            }
        );
    }

    #[test]
    fn test_adjacent_spans_stay_separate() {
        let response = "NikeAdidas";
        let brands = [brand("Nike", &[(0, 4)]), brand("Adidas", &[(4, 10)])];
        let segments = build_segments(response, Some(&brands), None);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Nike");
        assert_eq!(segments[1].text, "Adidas");
    }

    #[test]
    fn test_degenerate_spans_are_clamped_or_dropped() {
        let response = "short";
        let brands = [brand("X", &[(2, 2), (4, 1), (-3, 2), (3, 99)])];
        let segments = build_segments(response, Some(&brands), None);

        assert_eq!(joined(&segments), response);
        assert!(segments.iter().all(|s| !s.text.is_empty()));
        let highlights: Vec<&str> = segments
            .iter()
            .filter(|s| s.is_highlight())
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(highlights, vec!["sh", "rt"]);
    }

    #[test]
    fn test_only_empty_spans_leave_plain_text() {
        let response = "nothing here";
        let brands = [brand("X", &[(3, 3)])];
        let segments = build_segments(response, Some(&brands), None);
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].is_highlight());
    }

    #[test]
    fn test_round_trip_on_mixed_input() {
        let response = "¡Hola! 🎉 Zara y Mango: zara.com, mango.com 🚀 fin";
        let brands = [
            brand("Zara", &[(10, 14), (24, 28)]),
            brand("Mango", &[(17, 22), (33, 38)]),
        ];
        let domains = [
            domain("Zara", "zara.com", true, &[(24, 32)]),
            domain("Mango", "mango.com", false, &[(33, 42), (0, 0)]),
        ];
        let segments = build_segments(response, Some(&brands), Some(&domains));

        assert_eq!(joined(&segments), response);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(segments.last().unwrap().end, response.encode_utf16().count());
        assert!(segments.iter().filter(|s| s.is_highlight()).all(|s| s.start < s.end));
    }
}
