//! Semantic Layer Model
//!
//! Tables, columns and declared relationships as they arrive from the
//! warehouse schema browser. The compiler reads these but never mutates them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Table id -> column names to expose in the view, in output order.
pub type SelectedFields = HashMap<String, Vec<String>>;

const EXTERNAL_SUFFIX: &str = "_external";

/// Cardinality of a declared relationship
///
/// Documentation metadata only: every join is rendered as a LEFT JOIN.
///
/// Required on the wire: a relationship without one is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one-to-one",
            Cardinality::OneToMany => "one-to-many",
            Cardinality::ManyToOne => "many-to-one",
            Cardinality::ManyToMany => "many-to-many",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Passed through untouched.
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Fully qualified id, e.g. `project.dataset.table`. Quoted verbatim in SQL.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub schema: Vec<Column>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_bytes: Option<String>,
}

impl Table {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schema: Vec::new(),
            description: String::new(),
            location: String::new(),
            num_bytes: None,
        }
    }

    pub fn with_num_bytes(mut self, num_bytes: impl Into<String>) -> Self {
        self.num_bytes = Some(num_bytes.into());
        self
    }

    /// Display name with a single trailing `_external` removed (case-sensitive).
    pub fn clean_name(&self) -> &str {
        self.name
            .strip_suffix(EXTERNAL_SUFFIX)
            .unwrap_or(&self.name)
    }

    /// Size used to pick the default base table. Missing or unparseable sizes count as zero.
    pub fn size_bytes(&self) -> f64 {
        self.num_bytes
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|size| size.is_finite())
            .unwrap_or(0.0)
    }
}

/// A directed declared join `from_table.from_field -> to_table.to_field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub from_table: String,
    pub from_field: String,
    pub to_table: String,
    pub to_field: String,
    pub cardinality: Cardinality,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        from_table: impl Into<String>,
        from_field: impl Into<String>,
        to_table: impl Into<String>,
        to_field: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            id: id.into(),
            from_table: from_table.into(),
            from_field: from_field.into(),
            to_table: to_table.into(),
            to_field: to_field.into(),
            cardinality,
        }
    }

    pub fn touches(&self, table_id: &str) -> bool {
        self.from_table == table_id || self.to_table == table_id
    }
}
