//! Link table for UI-form workflows.
//!
//! Each link is serialized as a 6-tuple
//! `[link_id, from_node, from_slot, to_node, to_slot, data_type]`.

use std::collections::HashMap;

use serde_json::Value;

/// A directed edge from an output slot of one node to an input of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEdge {
    pub from_node: i64,
    pub from_slot: i64,
    pub to_node: i64,
    pub to_slot: i64,
    pub data_type: String,
}

/// Lookup from link id to its edge.
pub type LinkTable = HashMap<i64, LinkEdge>;

/// Build the link lookup from the raw `links` array.
///
/// Entries that are not well-formed 6-tuples are skipped. A repeated link id
/// replaces the earlier entry.
pub fn build_link_table(links: &[Value]) -> LinkTable {
    let mut table = LinkTable::with_capacity(links.len());

    for raw in links {
        let Some((link_id, edge)) = parse_link(raw) else {
            tracing::debug!(link = %raw, "Skipping malformed link");
            continue;
        };
        if table.insert(link_id, edge).is_some() {
            tracing::debug!(link_id, "Duplicate link id, keeping the later entry");
        }
    }

    table
}

fn parse_link(raw: &Value) -> Option<(i64, LinkEdge)> {
    let [link_id, from_node, from_slot, to_node, to_slot, data_type] = raw.as_array()?.as_slice()
    else {
        return None;
    };

    let edge = LinkEdge {
        from_node: from_node.as_i64()?,
        from_slot: from_slot.as_i64()?,
        to_node: to_node.as_i64()?,
        to_slot: to_slot.as_i64()?,
        data_type: data_type.as_str()?.to_string(),
    };
    Some((link_id.as_i64()?, edge))
}
