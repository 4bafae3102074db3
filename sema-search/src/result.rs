//! Result adapter
//!
//! Maps the raw search response back into ordered page references. The
//! index stores entity ids; the adapter extracts the hit ids and
//! resolves them in one bulk call against the entity-id table, dropping
//! ids the store no longer knows (deleted pages) with a debug log.

use sema_core::{EntityResolver, PageRef};
use serde_json::Value;
use tracing::debug;

/// Extract the hit document ids, in score order.
pub fn parse_hit_ids(raw: &Value) -> Vec<u64> {
    raw["hits"]["hits"]
        .as_array()
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| {
                    let id = &hit["_id"];
                    id.as_u64()
                        .or_else(|| id.as_str().and_then(|s| s.parse().ok()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Whether the response reports a resource-limit truncation.
pub fn is_incomplete(raw: &Value) -> bool {
    raw["timed_out"].as_bool().unwrap_or(false)
        || raw["terminated_early"].as_bool().unwrap_or(false)
}

/// The total hit count the response reports.
pub fn total_hits(raw: &Value) -> u64 {
    let total = &raw["hits"]["total"];
    total
        .as_u64()
        .or_else(|| total["value"].as_u64())
        .unwrap_or(0)
}

/// Resolve hit ids to pages, preserving hit order and applying the
/// look-ahead convention (`limit + 1` requested).
pub fn convert_entities(
    ids: &[u64],
    resolver: &dyn EntityResolver,
    limit: usize,
) -> (Vec<PageRef>, bool) {
    let pages = resolver.resolve_ids(ids);
    let mut entities: Vec<PageRef> = ids
        .iter()
        .filter_map(|id| {
            let page = pages.get(id).cloned();
            if page.is_none() {
                debug!(id, "id no longer resolvable, dropping hit");
            }
            page
        })
        .collect();
    let has_more = entities.len() > limit;
    entities.truncate(limit);
    (entities, has_more)
}
