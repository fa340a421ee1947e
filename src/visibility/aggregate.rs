// Visibility aggregation
// Per-brand visibility across the answered prompts of a report.

use std::collections::HashMap;

use crate::models::{BrandVisibilityScore, DomainMentionTotal, ReportItem};

/// Brands tracked by a report: the target first, then competitors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandRoster {
    pub target_brand: String,
    pub competitors: Vec<String>,
}

impl BrandRoster {
    pub fn new(target_brand: impl Into<String>, competitors: Vec<String>) -> Self {
        Self {
            target_brand: target_brand.into(),
            competitors,
        }
    }

    /// `(name, is_target)` for every tracked brand, each listed once.
    pub fn brands(&self) -> Vec<(&str, bool)> {
        let mut seen = vec![brand_key(&self.target_brand)];
        let mut brands = vec![(self.target_brand.trim(), true)];
        for competitor in &self.competitors {
            let key = brand_key(competitor);
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            brands.push((competitor.trim(), false));
        }
        brands
    }
}

fn brand_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Round-half-up of `100 * mentioned / answered`; 0 when nothing was answered.
pub fn visibility_percentage(mentioned: usize, answered: usize) -> u8 {
    if answered == 0 {
        return 0;
    }
    let mentioned = mentioned.min(answered) as u128;
    let answered = answered as u128;
    ((200 * mentioned + answered) / (2 * answered)) as u8
}

pub fn answered_count(items: &[ReportItem]) -> usize {
    items.iter().filter(|item| item.answer.is_some()).count()
}

/// Visibility of every roster brand, ranked for display.
pub fn visibility_scores(items: &[ReportItem], roster: &BrandRoster) -> Vec<BrandVisibilityScore> {
    let answered = answered_count(items);

    let mut mentioned_in: HashMap<String, usize> = HashMap::new();
    for item in items.iter().filter(|item| item.answer.is_some()) {
        let mut brands_in_item: Vec<String> = item
            .brand_mentions
            .iter()
            .flatten()
            .filter(|result| !result.mentions.is_empty())
            .map(|result| brand_key(&result.brand_name))
            .collect();
        brands_in_item.sort();
        brands_in_item.dedup();
        for key in brands_in_item {
            *mentioned_in.entry(key).or_insert(0) += 1;
        }
    }

    let mut scores: Vec<BrandVisibilityScore> = roster
        .brands()
        .into_iter()
        .map(|(name, is_target)| {
            let mentioned = mentioned_in.get(&brand_key(name)).copied().unwrap_or(0);
            BrandVisibilityScore {
                brand_name: name.to_string(),
                is_target_brand: is_target,
                visibility_percentage: visibility_percentage(mentioned, answered),
            }
        })
        .collect();

    rank_for_display(&mut scores);
    scores
}

/// Target brand first, the rest by descending percentage. Stable.
pub fn rank_for_display(scores: &mut [BrandVisibilityScore]) {
    scores.sort_by(|a, b| {
        b.is_target_brand
            .cmp(&a.is_target_brand)
            .then(b.visibility_percentage.cmp(&a.visibility_percentage))
    });
}

/// Domain mention occurrences summed over answered items, most mentioned
/// first; ties keep first-seen order.
pub fn domain_mention_totals(items: &[ReportItem]) -> Vec<DomainMentionTotal> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<DomainMentionTotal> = Vec::new();

    for result in items
        .iter()
        .filter(|item| item.answer.is_some())
        .flat_map(|item| item.domain_mentions.iter().flatten())
    {
        let key = result.domain.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        let count = u32::try_from(result.mentions.len()).unwrap_or(u32::MAX);
        match index.get(&key) {
            Some(&i) => {
                let total = &mut totals[i];
                total.total_mentions = total.total_mentions.saturating_add(count);
                total.is_target_brand |= result.is_brand;
            }
            None => {
                index.insert(key, totals.len());
                totals.push(DomainMentionTotal {
                    name: result.name.clone(),
                    domain: result.domain.trim().to_string(),
                    is_target_brand: result.is_brand,
                    total_mentions: count,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total_mentions.cmp(&a.total_mentions));
    totals
}
