//! View Compiler - deterministic CREATE VIEW generation
//!
//! Turns a workspace of tables, declared relationships and selected fields
//! into one `CREATE OR REPLACE VIEW` statement. Compilation never fails:
//! anything that cannot be placed in the join plan is left out, and the
//! output is always a complete statement.

use crate::config::CompilerConfig;
use crate::contracts::{CompileRequest, CompileResponse};
use crate::semantic::join_graph::{select_base_table, JoinPlan};
use crate::semantic::model::{Relationship, SelectedFields, Table};
use crate::semantic::naming::{base_column_alias, joined_column_alias, AliasAllocator};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

const INDENT: &str = "    ";
const NO_FIELDS_PLACEHOLDER: &str = "1 as no_fields_selected";

/// One `<alias>.<field> AS <name>` entry of the SELECT list.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectItem {
    table_alias: String,
    field: String,
    output_name: String,
}

impl SelectItem {
    fn render(&self) -> String {
        format!(
            "{}{}.{} AS {}",
            INDENT, self.table_alias, self.field, self.output_name
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewCompiler {
    config: CompilerConfig,
}

impl ViewCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn compile(&self, request: &CompileRequest) -> String {
        self.compile_view(
            &request.view_name,
            &request.tables,
            &request.relationships,
            &request.selected_fields,
            &request.namespace,
        )
    }

    pub fn respond(&self, request: &CompileRequest) -> CompileResponse {
        CompileResponse {
            sql_query: self.compile(request),
        }
    }

    /// Compile a view definition into a single statement.
    ///
    /// 1. Empty workspace → `SELECT 1` placeholder view
    /// 2. Base table: first relationship's source, else the largest table
    /// 3. Closure from the base table builds the join plan and aliases
    /// 4. SELECT list in input table order, duplicates by output name dropped
    /// 5. FROM + LEFT JOINs in join-plan order
    pub fn compile_view(
        &self,
        view_name: &str,
        tables: &[Table],
        relationships: &[Relationship],
        selected_fields: &SelectedFields,
        namespace: &str,
    ) -> String {
        let target = self.view_identifier(namespace, view_name);

        // Step 1: nothing to select from
        let base_table = match select_base_table(tables, relationships) {
            Some(table) => table,
            None => {
                debug!("No tables in workspace for {}; emitting placeholder view", target);
                return format!("CREATE OR REPLACE VIEW {} AS\nSELECT 1;", target);
            }
        };

        // Steps 2-3: join plan
        let mut aliases = AliasAllocator::new();
        let plan = JoinPlan::build(base_table, tables, relationships, &mut aliases);

        // Step 4: SELECT list
        let items = Self::select_items(tables, selected_fields, &plan);
        let select_lines: Vec<String> = if items.is_empty() {
            vec![format!("{}{}", INDENT, NO_FIELDS_PLACEHOLDER)]
        } else {
            items.iter().map(SelectItem::render).collect()
        };
        let select_clause = format!("SELECT\n{}", select_lines.join(",\n"));

        // Step 5: FROM + joins
        let mut from_clause = format!(
            "FROM\n{}`{}` AS {}",
            INDENT, base_table.id, plan.base_alias
        );
        for entry in &plan.entries {
            let rel = entry.relationship;
            from_clause.push_str(&format!(
                "\nLEFT JOIN `{}` AS {} ON {}.{} = {}.{}",
                rel.to_table, entry.to_alias, entry.from_alias, rel.from_field, entry.to_alias, rel.to_field
            ));
        }

        info!(
            "Compiled view {}: base {} AS {}, {} joins, {} columns",
            target,
            base_table.id,
            plan.base_alias,
            plan.entries.len(),
            items.len()
        );

        format!(
            "CREATE OR REPLACE VIEW {} AS\n{}\n{};",
            target, select_clause, from_clause
        )
    }

    /// Backtick-quoted `<namespace>.<semantic dataset>.<view>`.
    pub fn view_identifier(&self, namespace: &str, view_name: &str) -> String {
        format!(
            "`{}.{}.{}`",
            self.config.namespace_or_default(namespace),
            self.config.semantic_dataset,
            view_name
        )
    }

    fn select_items(
        tables: &[Table],
        selected_fields: &SelectedFields,
        plan: &JoinPlan<'_>,
    ) -> Vec<SelectItem> {
        let mut tables_by_id: HashMap<&str, &Table> = HashMap::new();
        for table in tables {
            tables_by_id.entry(table.id.as_str()).or_insert(table);
        }

        let mut items = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for table in tables {
            let fields = match selected_fields.get(&table.id) {
                Some(fields) if !fields.is_empty() => fields,
                _ => continue,
            };

            for field in fields {
                let placed = if table.id == plan.base_table.id {
                    Some((plan.base_alias.clone(), base_column_alias(table, field)))
                } else {
                    plan.first_entry_for(&table.id).and_then(|entry| {
                        let rel = entry.relationship;
                        tables_by_id.get(rel.from_table.as_str()).map(|from_table| {
                            (
                                entry.to_alias.clone(),
                                joined_column_alias(from_table, rel, table, field),
                            )
                        })
                    })
                };

                let (table_alias, output_name) = match placed {
                    Some(placed) => placed,
                    None => {
                        debug!("Skipping {}.{}: table not in join plan", table.id, field);
                        continue;
                    }
                };

                if !seen.insert(output_name.clone()) {
                    debug!("Dropping duplicate output column {}", output_name);
                    continue;
                }
                items.push(SelectItem {
                    table_alias,
                    field: field.clone(),
                    output_name,
                });
            }
        }

        items
    }
}
