//! View Workspace
//!
//! Editing operations behind the semantic-layer canvas: tables in, tables
//! out, relationships declared by hand or accepted from suggestions, and
//! per-table field selection. A workspace turns into a compile request or a
//! saved definition.

use crate::contracts::CompileRequest;
use crate::error::{Result, SemanticError};
use crate::semantic::definition::{TableState, ViewDefinition};
use crate::semantic::model::{Cardinality, Relationship, SelectedFields, Table};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// A join suggested by the external suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinProposal {
    pub from_table: String,
    pub from_field: String,
    pub to_table: String,
    pub to_field: String,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalBatch {
    #[serde(default)]
    pub proposals: Vec<JoinProposal>,
}

/// Identifier of a relationship: `<fromTable>.<fromField>-<toTable>.<toField>`.
pub fn relationship_id(from_table: &str, from_field: &str, to_table: &str, to_field: &str) -> String {
    format!("{}.{}-{}.{}", from_table, from_field, to_table, to_field)
}

impl JoinProposal {
    /// Accepted proposals become ordinary relationships.
    pub fn into_relationship(self) -> Relationship {
        let id = relationship_id(&self.from_table, &self.from_field, &self.to_table, &self.to_field);
        Relationship {
            id,
            from_table: self.from_table,
            from_field: self.from_field,
            to_table: self.to_table,
            to_field: self.to_field,
            cardinality: self.cardinality,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    tables: Vec<Table>,
    relationships: Vec<Relationship>,
    selected_fields: SelectedFields,
    /// Canvas card placement by table id.
    table_states: HashMap<String, TableState>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        tables: Vec<Table>,
        relationships: Vec<Relationship>,
        selected_fields: SelectedFields,
        table_states: HashMap<String, TableState>,
    ) -> Self {
        Self {
            tables,
            relationships,
            selected_fields,
            table_states,
        }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn selected_fields(&self) -> &SelectedFields {
        &self.selected_fields
    }

    pub fn table_states(&self) -> &HashMap<String, TableState> {
        &self.table_states
    }

    /// Record where a table's card sits on the canvas.
    pub fn set_table_state(&mut self, table_id: &str, state: TableState) {
        self.table_states.insert(table_id.to_string(), state);
    }

    /// Returns false if a table with the same id is already present.
    pub fn add_table(&mut self, table: Table) -> bool {
        if self.tables.iter().any(|t| t.id == table.id) {
            return false;
        }
        debug!("Adding table {} to workspace", table.id);
        self.tables.push(table);
        true
    }

    /// Removes the table along with every relationship touching it, its selected fields and its canvas state.
    pub fn remove_table(&mut self, table_id: &str) -> Option<Table> {
        let position = self.tables.iter().position(|t| t.id == table_id)?;
        let table = self.tables.remove(position);

        let before = self.relationships.len();
        self.relationships.retain(|r| !r.touches(table_id));
        self.selected_fields.remove(table_id);
        self.table_states.remove(table_id);

        info!(
            "Removed table {} ({} relationships dropped)",
            table_id,
            before - self.relationships.len()
        );
        Some(table)
    }

    /// Declare a relationship; the id is derived from its endpoints.
    pub fn add_relationship(
        &mut self,
        from_table: &str,
        from_field: &str,
        to_table: &str,
        to_field: &str,
        cardinality: Cardinality,
    ) -> Result<&Relationship> {
        let rel = Relationship::new(
            relationship_id(from_table, from_field, to_table, to_field),
            from_table,
            from_field,
            to_table,
            to_field,
            cardinality,
        );
        self.push_relationship(rel)
    }

    pub fn accept_proposal(&mut self, proposal: JoinProposal) -> Result<&Relationship> {
        debug!("Accepting join proposal: {}", proposal.reason);
        self.push_relationship(proposal.into_relationship())
    }

    fn push_relationship(&mut self, rel: Relationship) -> Result<&Relationship> {
        if self.relationships.iter().any(|r| r.id == rel.id) {
            return Err(SemanticError::Workspace(format!(
                "Relationship already exists: {}",
                rel.id
            )));
        }
        self.relationships.push(rel);
        self.relationships
            .last()
            .ok_or_else(|| SemanticError::Workspace("Relationship list empty after insert".to_string()))
    }

    /// Replace the relationship at `index`, keeping its position in the list.
    pub fn update_relationship(&mut self, index: usize, rel: Relationship) -> Result<()> {
        let slot = self.relationships.get_mut(index).ok_or_else(|| {
            SemanticError::Workspace(format!("No relationship at index {}", index))
        })?;
        *slot = rel;
        Ok(())
    }

    pub fn remove_relationship(&mut self, index: usize) -> Result<Relationship> {
        if index >= self.relationships.len() {
            return Err(SemanticError::Workspace(format!(
                "No relationship at index {}",
                index
            )));
        }
        Ok(self.relationships.remove(index))
    }

    /// Toggle a field. Selecting twice keeps one entry at its first position.
    pub fn set_field_selected(&mut self, table_id: &str, field: &str, selected: bool) {
        let fields = self.selected_fields.entry(table_id.to_string()).or_default();
        if selected {
            if !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        } else {
            fields.retain(|f| f != field);
        }
    }

    /// `view_` followed by the lower-cased table names joined with `_`.
    pub fn default_view_name(&self) -> String {
        format!(
            "view_{}",
            self.tables.iter().map(|t| t.name.to_lowercase()).join("_")
        )
    }

    pub fn to_request(&self, view_name: &str, namespace: &str) -> CompileRequest {
        CompileRequest {
            view_name: view_name.to_string(),
            tables: self.tables.clone(),
            relationships: self.relationships.clone(),
            selected_fields: self.selected_fields.clone(),
            namespace: namespace.to_string(),
        }
    }

    /// Saved form: table ids only, everything else as held.
    pub fn to_definition(&self) -> ViewDefinition {
        ViewDefinition {
            tables: self.tables.iter().map(|t| t.id.clone()).collect(),
            relationships: self.relationships.clone(),
            selected_fields: self.selected_fields.clone(),
            table_states: self.table_states.clone(),
        }
    }
}
