//! Join Graph Resolution
//!
//! Picks the base table and grows the join plan outward from it.
//!
//! ## Closure rules
//!
//! - Only the declared direction is followed: a relationship is applied once
//!   its `from_table` is in the plan and its `to_table` is a known table.
//! - Every applied relationship gets its own destination alias, even when the
//!   same table is reached twice.
//! - Relationships that never become applicable are left out silently (and
//!   logged), so the tables behind them contribute nothing to the view.

use crate::semantic::model::{Relationship, Table};
use crate::semantic::naming::AliasAllocator;
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// One resolved edge of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPlanEntry<'a> {
    pub relationship: &'a Relationship,
    pub from_alias: String,
    pub to_alias: String,
}

#[derive(Debug, Clone)]
pub struct JoinPlan<'a> {
    pub base_table: &'a Table,
    pub base_alias: String,
    pub entries: Vec<JoinPlanEntry<'a>>,
    included: HashSet<&'a str>,
    unapplied: Vec<&'a Relationship>,
}

/// Choose the anchor of the FROM clause.
///
/// The `from_table` of the first relationship wins. Without relationships, or
/// when that table is not in the workspace, the largest table is used; equal
/// sizes keep input order. Returns `None` only for an empty table list.
pub fn select_base_table<'a>(
    tables: &'a [Table],
    relationships: &[Relationship],
) -> Option<&'a Table> {
    if let Some(first) = relationships.first() {
        match tables.iter().find(|t| t.id == first.from_table) {
            Some(table) => return Some(table),
            None => warn!(
                "First relationship '{}' starts at unknown table '{}'; falling back to largest table",
                first.id, first.from_table
            ),
        }
    }

    // sorted_by is stable, so ties stay in input order
    tables
        .iter()
        .sorted_by(|a, b| b.size_bytes().total_cmp(&a.size_bytes()))
        .next()
}

impl<'a> JoinPlan<'a> {
    /// Repeated-pass closure from `base_table` over `relationships`.
    ///
    /// The input slice is never reordered; pending relationships are tracked
    /// by index and each pass walks them in input order.
    pub fn build(
        base_table: &'a Table,
        tables: &'a [Table],
        relationships: &'a [Relationship],
        aliases: &mut AliasAllocator,
    ) -> Self {
        let known: HashSet<&str> = tables.iter().map(|t| t.id.as_str()).collect();

        let base_alias = aliases.next_alias();
        let mut included: HashSet<&'a str> = HashSet::new();
        included.insert(base_table.id.as_str());

        // First alias under which each table entered the plan; joins leaving
        // a table hang off this alias.
        let mut table_alias: HashMap<&'a str, String> = HashMap::new();
        table_alias.insert(base_table.id.as_str(), base_alias.clone());

        let mut pending: BTreeSet<usize> = (0..relationships.len()).collect();
        let mut entries = Vec::new();

        let mut changed = true;
        while changed && !pending.is_empty() {
            changed = false;
            let mut applied: Vec<usize> = Vec::new();

            for &idx in &pending {
                let rel = &relationships[idx];
                if !included.contains(rel.from_table.as_str())
                    || !known.contains(rel.to_table.as_str())
                {
                    continue;
                }

                let from_alias = match table_alias.get(rel.from_table.as_str()) {
                    Some(alias) => alias.clone(),
                    None => continue,
                };
                let to_alias = aliases.next_alias();
                debug!(
                    "Joining {} AS {} via '{}' ({})",
                    rel.to_table, to_alias, rel.id, rel.cardinality
                );

                table_alias
                    .entry(rel.to_table.as_str())
                    .or_insert_with(|| to_alias.clone());
                included.insert(rel.to_table.as_str());
                entries.push(JoinPlanEntry {
                    relationship: rel,
                    from_alias,
                    to_alias,
                });
                applied.push(idx);
                changed = true;
            }

            for idx in applied {
                pending.remove(&idx);
            }
        }

        let unapplied: Vec<&'a Relationship> =
            pending.into_iter().map(|idx| &relationships[idx]).collect();
        for rel in &unapplied {
            warn!(
                "Relationship '{}' ({} -> {}) is not reachable from base table '{}'; skipping",
                rel.id, rel.from_table, rel.to_table, base_table.id
            );
        }

        Self {
            base_table,
            base_alias,
            entries,
            included,
            unapplied,
        }
    }

    pub fn includes(&self, table_id: &str) -> bool {
        self.included.contains(table_id)
    }

    /// Earliest entry that joins `table_id` in; later entries for the same
    /// table do not contribute column aliases.
    pub fn first_entry_for(&self, table_id: &str) -> Option<&JoinPlanEntry<'a>> {
        self.entries
            .iter()
            .find(|entry| entry.relationship.to_table == table_id)
    }

    pub fn unapplied(&self) -> &[&'a Relationship] {
        &self.unapplied
    }
}
