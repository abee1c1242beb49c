// src/services/matching.rs
use log::info;
use strsim::jaro_winkler;

use crate::config::MIN_MATCH_SCORE;
use crate::models::{SchemeInfo, SchemeMatch};

fn similarity(a: &str, b: &str) -> f64 {
    jaro_winkler(&a.to_lowercase(), &b.to_lowercase())
}

/// Resolve a free-text fund name to the best catalog entry.
///
/// A case-insensitive substring hit is preferred: a single hit wins
/// outright (score 1.0), several hits are ranked by similarity. Otherwise
/// the whole catalog is scanned and the highest-similarity entry wins,
/// ties going to the earliest catalog occurrence. Returns `None` when the
/// catalog is empty or nothing clears `MIN_MATCH_SCORE`.
pub fn find_best_scheme(catalog: &[SchemeInfo], query: &str) -> Option<SchemeMatch> {
    let query_l = query.trim().to_lowercase();
    if query_l.is_empty() || catalog.is_empty() {
        return None;
    }

    let substring_hits: Vec<&SchemeInfo> = catalog
        .iter()
        .filter(|s| s.scheme_name.to_lowercase().contains(&query_l))
        .collect();

    if substring_hits.len() == 1 {
        return Some(SchemeMatch {
            scheme: substring_hits[0].clone(),
            score: 1.0,
        });
    }
    if substring_hits.len() > 1 {
        let best = best_by_similarity(&substring_hits, query)?;
        info!(
            "Query '{}' has {} substring hits; keeping '{}'",
            query,
            substring_hits.len(),
            best.scheme.scheme_name
        );
        return Some(best);
    }

    let all: Vec<&SchemeInfo> = catalog.iter().collect();
    let best = best_by_similarity(&all, query)?;
    if best.score < MIN_MATCH_SCORE {
        info!(
            "Best candidate '{}' for query '{}' scored {:.3}, below threshold {:.2}",
            best.scheme.scheme_name, query, best.score, MIN_MATCH_SCORE
        );
        return None;
    }
    Some(best)
}

fn best_by_similarity(candidates: &[&SchemeInfo], query: &str) -> Option<SchemeMatch> {
    let mut best: Option<SchemeMatch> = None;
    for candidate in candidates {
        let score = similarity(query, &candidate.scheme_name);
        // strict `>` keeps the first occurrence on ties
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(SchemeMatch {
                scheme: (*candidate).clone(),
                score,
            });
        }
    }
    best
}
