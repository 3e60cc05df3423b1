//! Saved view definitions and the schema provider seam.
//!
//! A saved definition only stores table ids; the full table records come
//! back from whatever serves warehouse schemas when the view is re-opened
//! for editing.

use crate::error::{Result, SemanticError};
use crate::semantic::model::{Relationship, SelectedFields, Table};
use crate::workspace::Workspace;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Card width/height: a pixel count or a CSS length such as `"auto"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(f64),
    Css(String),
}

/// Canvas placement of a table card. Carried through, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    pub x: f64,
    pub y: f64,
    pub width: Dimension,
    pub height: Dimension,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition {
    /// Table ids in workspace order.
    pub tables: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub selected_fields: SelectedFields,
    #[serde(default)]
    pub table_states: HashMap<String, TableState>,
}

/// Supplies table records by id.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn table(&self, table_id: &str) -> Result<Option<Table>>;
}

impl ViewDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rehydrate into an editable workspace.
    ///
    /// Ids the provider no longer knows are dropped with a warning; their
    /// relationships, selections and canvas states stay in place and simply
    /// never apply.
    pub async fn resolve(&self, provider: &dyn SchemaProvider) -> Result<Workspace> {
        let mut tables = Vec::with_capacity(self.tables.len());
        for table_id in &self.tables {
            match provider.table(table_id).await? {
                Some(table) => tables.push(table),
                None => warn!("Table '{}' from saved definition not found; skipping", table_id),
            }
        }

        info!(
            "Resolved view definition: {}/{} tables, {} relationships",
            tables.len(),
            self.tables.len(),
            self.relationships.len()
        );

        Ok(Workspace::from_parts(
            tables,
            self.relationships.clone(),
            self.selected_fields.clone(),
            self.table_states.clone(),
        ))
    }
}

/// In-memory schema provider backed by a JSON array of tables.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    pub fn new(tables: Vec<Table>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let tables: Vec<Table> = serde_json::from_str(json)?;
        Ok(Self::new(tables))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SemanticError::Metadata(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[async_trait]
impl SchemaProvider for Catalog {
    async fn table(&self, table_id: &str) -> Result<Option<Table>> {
        Ok(self.tables.get(table_id).cloned())
    }
}
