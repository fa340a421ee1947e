// Citation leaderboard
// Ranks the domains and pages cited across a report's answers.

use std::collections::HashMap;

use url::{Host, ParseError, Url};

use crate::models::{CitationLeaderboard, LeaderboardEntry, ReportItem};

/// Domain and page a citation URL points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitedPage {
    pub domain: String,
    pub subpath: String,
}

/// Counts keyed by string, ranked by count with ties in first-seen order.
#[derive(Debug, Default)]
pub struct RankedCounter {
    index: HashMap<String, usize>,
    entries: Vec<LeaderboardEntry>,
}

impl RankedCounter {
    pub fn add(&mut self, key: &str, count: u32) {
        match self.index.get(key) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.count = entry.count.saturating_add(count);
            }
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(LeaderboardEntry {
                    path: key.to_string(),
                    count,
                });
            }
        }
    }

    pub fn into_ranked(mut self) -> Vec<LeaderboardEntry> {
        self.entries.sort_by(|a, b| b.count.cmp(&a.count));
        self.entries
    }
}

/// Parse a citation URL. Scheme-less URLs like `a.com/x` or
/// `localhost:3000/docs` are read as https.
pub fn parse_citation(raw: &str) -> Option<CitedPage> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let url = match Url::parse(raw) {
        Ok(url) if reads_as_host_and_port(&url, raw) => with_https(raw)?,
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => with_https(raw)?,
        Err(_) => return None,
    };

    let domain = match url.host()? {
        Host::Domain(host) => registrable_domain(host)?,
        Host::Ipv4(addr) => addr.to_string(),
        Host::Ipv6(addr) => format!("[{}]", addr),
    };

    let path = url.path().trim_end_matches('/');
    let subpath = format!("{}{}", domain, path);
    Some(CitedPage { domain, subpath })
}

fn with_https(raw: &str) -> Option<Url> {
    Url::parse(&format!("https://{}", raw)).ok()
}

/// `host:port/path` parses with the host as its scheme. Real schemes never
/// contain a dot and are not followed by a bare port number.
fn reads_as_host_and_port(url: &Url, raw: &str) -> bool {
    if url.host().is_some() {
        return false;
    }
    if url.scheme().contains('.') {
        return true;
    }
    let Some((_, rest)) = raw.split_once(':') else {
        return false;
    };
    let port = rest.split(['/', '?', '#']).next().unwrap_or("");
    !port.is_empty() && port.chars().all(|ch| ch.is_ascii_digit())
}

/// Registrable part of a host name per the public suffix list, shown in
/// Unicode. Hosts without a listed suffix (`localhost`) are kept whole.
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }

    let ascii = psl::domain_str(&host).unwrap_or(host.as_str());
    let (unicode, result) = idna::domain_to_unicode(ascii);
    Some(if result.is_ok() { unicode } else { ascii.to_string() })
}

/// Leaderboard over every citation of every answered item. Citations that
/// do not parse are skipped and left out of `total_citations`.
pub fn citation_leaderboard(items: &[ReportItem]) -> CitationLeaderboard {
    let mut domains = RankedCounter::default();
    let mut subpaths = RankedCounter::default();
    let mut total_citations: u32 = 0;

    for citation in items
        .iter()
        .filter_map(|item| item.answer.as_ref())
        .flat_map(|answer| answer.citations.iter())
    {
        let Some(page) = parse_citation(&citation.url) else {
            tracing::debug!(url = %citation.url, "skipping unparsable citation");
            continue;
        };
        domains.add(&page.domain, 1);
        subpaths.add(&page.subpath, 1);
        total_citations = total_citations.saturating_add(1);
    }

    CitationLeaderboard {
        domains: domains.into_ranked(),
        subpaths: subpaths.into_ranked(),
        total_citations,
    }
}
