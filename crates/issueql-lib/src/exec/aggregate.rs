//! Merging fetched sub-query batches into one result list.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::compile::SortOrder;

use super::{FETCH_CAP, Item};

/// Everything fetched for one sub-query, plus the sort it was fetched under.
#[derive(Debug, Clone)]
pub struct SubQueryBatch {
    pub items: Vec<Item>,
    pub total_count: u64,
    pub sort: Option<String>,
    pub order: SortOrder,
}

/// Combined result of one query unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregated {
    pub items: Vec<Item>,
    /// True when any sub-query matched more than the fetch cap.
    pub truncated: bool,
}

/// Combines batches into a single deduplicated list.
///
/// When at least two batches share an identical declared sort field, the
/// combined list is re-sorted under that field so the merged output reads
/// like one result stream. Otherwise batches are concatenated in sub-query
/// order with each batch's own server-side order left intact. Duplicates
/// (same URL) keep their first occurrence.
pub fn aggregate(batches: Vec<SubQueryBatch>) -> Aggregated {
    let truncated = batches.iter().any(|b| b.total_count > FETCH_CAP);
    let shared = shared_sort(&batches);

    let mut items: Vec<Item> = batches.into_iter().flat_map(|b| b.items).collect();

    if let Some((field, order)) = shared {
        if let Some(key) = SortKey::for_field(&field) {
            // Stable, so equal keys keep sub-query order.
            items.sort_by(|a, b| {
                let ascending = key.compare(a, b);
                match order {
                    SortOrder::Asc => ascending,
                    SortOrder::Desc => ascending.reverse(),
                }
            });
        }
    }

    let mut seen = HashSet::with_capacity(items.len());
    items.retain(|item| seen.insert(item.url.clone()));

    Aggregated { items, truncated }
}

/// The sort field shared by every batch, if there are at least two batches
/// and all of them declare the same one. The first batch's order wins.
fn shared_sort(batches: &[SubQueryBatch]) -> Option<(String, SortOrder)> {
    if batches.len() < 2 {
        return None;
    }
    let first = batches[0].sort.as_deref()?;
    batches
        .iter()
        .all(|b| b.sort.as_deref() == Some(first))
        .then(|| (first.to_string(), batches[0].order))
}

/// Human-readable result count: `123 results`, `1000+ results` when capped.
pub fn status_line(aggregated: &Aggregated) -> String {
    let plus = if aggregated.truncated { "+" } else { "" };
    let noun = if aggregated.items.len() == 1 && !aggregated.truncated {
        "result"
    } else {
        "results"
    };
    format!("{}{plus} {noun}", aggregated.items.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    Comments,
    Reactions,
    Interactions,
    Created,
    Updated,
}

impl SortKey {
    fn for_field(field: &str) -> Option<SortKey> {
        match field {
            "comments" => Some(SortKey::Comments),
            "reactions" => Some(SortKey::Reactions),
            "interactions" => Some(SortKey::Interactions),
            "created" => Some(SortKey::Created),
            "updated" => Some(SortKey::Updated),
            _ => None,
        }
    }

    /// Ascending comparison; the caller flips it for descending output.
    fn compare(self, a: &Item, b: &Item) -> Ordering {
        match self {
            SortKey::Comments => a.comments.cmp(&b.comments),
            SortKey::Reactions => a.reactions.cmp(&b.reactions),
            SortKey::Interactions => a.interactions().cmp(&b.interactions()),
            SortKey::Created => a.created_at.cmp(&b.created_at),
            SortKey::Updated => a.updated_at.cmp(&b.updated_at),
        }
    }
}
