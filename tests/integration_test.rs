use semantic_views::semantic::{Cardinality, Catalog, Relationship, SelectedFields, Table, ViewDefinition};
use semantic_views::{check_view_statement, CompileRequest, CompilerConfig, ViewCompiler, Workspace};
use serde_json::json;

fn compile(request: serde_json::Value) -> String {
    let request: CompileRequest = serde_json::from_value(request).unwrap();
    ViewCompiler::default().compile(&request)
}

fn select_clause(sql: &str) -> &str {
    let start = sql.find("SELECT").unwrap();
    let end = sql.find("FROM").unwrap();
    &sql[start..end]
}

fn table(id: &str, name: &str) -> serde_json::Value {
    json!({"id": id, "name": name, "schema": [], "description": "", "location": ""})
}

#[test]
fn test_empty_input_generates_placeholder() {
    let sql = compile(json!({
        "viewName": "test_view",
        "tables": [],
        "relationships": [],
        "selectedFields": {},
        "namespace": "test-project"
    }));

    assert!(sql.contains("SELECT 1"));
    assert!(sql.starts_with("CREATE OR REPLACE VIEW `test-project.semantic_views.test_view` AS"));
    check_view_statement(&sql).unwrap();
}

#[test]
fn test_single_table_single_field() {
    let sql = compile(json!({
        "viewName": "test_view",
        "tables": [table("p.d.t1", "t1")],
        "relationships": [],
        "selectedFields": {"p.d.t1": ["col1"]},
        "projectId": "test-project"
    }));

    assert!(sql.contains("SELECT"));
    assert!(sql.contains("a.col1 AS t1_col1"));
    assert!(sql.contains("FROM"));
    assert!(sql.contains("`p.d.t1`"));
    assert!(!sql.contains("JOIN"));
    check_view_statement(&sql).unwrap();
}

#[test]
fn test_two_tables_with_one_relationship() {
    let sql = compile(json!({
        "viewName": "test_view",
        "tables": [table("p.d.users", "users"), table("p.d.orders", "orders")],
        "relationships": [{
            "id": "rel1",
            "fromTable": "p.d.orders",
            "fromField": "user_id",
            "toTable": "p.d.users",
            "toField": "id",
            "cardinality": "many-to-one"
        }],
        "selectedFields": {"p.d.users": ["email"], "p.d.orders": ["id"]},
        "namespace": "test-project"
    }));

    assert!(sql.contains("LEFT JOIN `p.d.users` AS b ON a.user_id = b.id"));
    assert!(sql.contains("FROM\n    `p.d.orders` AS a"));
    assert!(sql.contains("b.email AS orders_user_users_email"));
    assert!(sql.contains("a.id AS orders_id"));
    check_view_statement(&sql).unwrap();
}

#[test]
fn test_unreachable_table_contributes_nothing() {
    let sql = compile(json!({
        "viewName": "v",
        "tables": [table("p.d.orders", "orders"), table("p.d.users", "users"), table("p.d.weather", "weather")],
        "relationships": [{
            "id": "rel1",
            "fromTable": "p.d.orders",
            "fromField": "user_id",
            "toTable": "p.d.users",
            "toField": "id",
            "cardinality": "many-to-one"
        }],
        "selectedFields": {"p.d.orders": ["id"], "p.d.weather": ["temperature"]},
        "namespace": "proj"
    }));

    assert!(!sql.contains("weather"));
    assert!(!sql.contains("temperature"));
    assert_eq!(sql.matches("LEFT JOIN").count(), 1);
}

#[test]
fn test_no_fields_selected_anywhere() {
    let sql = compile(json!({
        "viewName": "v",
        "tables": [table("p.d.orders", "orders"), table("p.d.users", "users")],
        "relationships": [{
            "id": "rel1",
            "fromTable": "p.d.orders",
            "fromField": "user_id",
            "toTable": "p.d.users",
            "toField": "id",
            "cardinality": "many-to-one"
        }],
        "selectedFields": {"p.d.orders": [], "p.d.ghost": ["x"]},
        "namespace": "proj"
    }));

    assert_eq!(select_clause(&sql).trim(), "SELECT\n    1 as no_fields_selected");
    check_view_statement(&sql).unwrap();
}

#[test]
fn test_duplicate_output_names_keep_first() {
    // The field list repeats `total`; only the first one survives.
    let tables = vec![
        Table::new("p.d.orders_external", "orders_external"),
        Table::new("p.d.orders", "orders"),
    ];
    let rels = vec![Relationship::new(
        "self",
        "p.d.orders_external",
        "id",
        "p.d.orders",
        "id",
        Cardinality::OneToOne,
    )];
    let mut selected = SelectedFields::new();
    selected.insert(
        "p.d.orders_external".to_string(),
        vec!["id".to_string(), "total".to_string(), "total".to_string()],
    );
    selected.insert("p.d.orders".to_string(), vec!["id".to_string()]);

    let sql = ViewCompiler::default().compile_view("v", &tables, &rels, &selected, "proj");
    let select = select_clause(&sql);

    assert_eq!(select.matches("AS orders_total").count(), 1);
    assert!(select.contains("a.id AS orders_id"));
    // `id` has no suffix to strip, so the joined column gets its own name
    assert!(select.contains("b.id AS orders_id_orders_id"));
    assert_eq!(select.matches(" AS ").count(), 3);
}

#[test]
fn test_duplicate_from_two_joined_tables_with_same_clean_name() {
    let tables = vec![
        Table::new("p.d.flights", "flights"),
        Table::new("p.d.carriers_external", "carriers_external"),
        Table::new("p.d.carriers", "carriers"),
    ];
    let rels = vec![
        Relationship::new("r1", "p.d.flights", "carrier_code", "p.d.carriers_external", "code", Cardinality::ManyToOne),
        Relationship::new("r2", "p.d.flights", "carrier_code", "p.d.carriers", "code", Cardinality::ManyToOne),
    ];
    let mut selected = SelectedFields::new();
    selected.insert("p.d.carriers_external".to_string(), vec!["name".to_string()]);
    selected.insert("p.d.carriers".to_string(), vec!["name".to_string()]);

    let sql = ViewCompiler::default().compile_view("v", &tables, &rels, &selected, "proj");
    let select = select_clause(&sql);

    assert!(select.contains("b.name AS flights_carrier_carriers_name"));
    assert!(!select.contains("c.name"));
    // both joins still appear
    assert_eq!(sql.matches("LEFT JOIN").count(), 2);
}

#[test]
fn test_compilation_is_idempotent() {
    let request = json!({
        "viewName": "v",
        "tables": [table("p.d.a", "a"), table("p.d.b", "b"), table("p.d.c", "c")],
        "relationships": [
            {"id": "r1", "fromTable": "p.d.a", "fromField": "b_id", "toTable": "p.d.b", "toField": "id", "cardinality": "many-to-one"},
            {"id": "r2", "fromTable": "p.d.b", "fromField": "c_id", "toTable": "p.d.c", "toField": "id", "cardinality": "many-to-one"}
        ],
        "selectedFields": {"p.d.a": ["x", "y"], "p.d.b": ["z"], "p.d.c": ["w"]},
        "namespace": "proj"
    });

    let first = compile(request.clone());
    let second = compile(request);
    assert_eq!(first, second);
    assert!(first.contains("LEFT JOIN `p.d.c` AS c ON b.c_id = c.id"));
    assert!(first.contains("c.w AS b_c_c_w"));
    check_view_statement(&first).unwrap();
}

#[test]
fn test_base_table_tie_break_by_size() {
    let tables = vec![
        Table::new("p.d.small", "small").with_num_bytes("100"),
        Table::new("p.d.big", "big").with_num_bytes("9000"),
        Table::new("p.d.also_big", "also_big").with_num_bytes("9000"),
    ];
    let sql = ViewCompiler::default().compile_view("v", &tables, &[], &SelectedFields::new(), "proj");
    assert!(sql.contains("FROM\n    `p.d.big` AS a;"));

    let equal = vec![Table::new("p.d.first", "first"), Table::new("p.d.second", "second")];
    let sql = ViewCompiler::default().compile_view("v", &equal, &[], &SelectedFields::new(), "proj");
    assert!(sql.contains("FROM\n    `p.d.first` AS a;"));
}

#[test]
fn test_large_graph_extends_aliases() {
    let mut tables = vec![Table::new("p.d.hub", "hub")];
    let mut rels = Vec::new();
    for i in 0..30 {
        let id = format!("p.d.spoke{}", i);
        tables.push(Table::new(id.clone(), format!("spoke{}", i)));
        rels.push(Relationship::new(
            format!("r{}", i),
            "p.d.hub",
            format!("spoke{}_id", i),
            id,
            "id",
            Cardinality::ManyToOne,
        ));
    }

    let sql = ViewCompiler::default().compile_view("v", &tables, &rels, &SelectedFields::new(), "proj");
    assert_eq!(sql.matches("LEFT JOIN").count(), 30);
    assert!(sql.contains("LEFT JOIN `p.d.spoke24` AS z ON a.spoke24_id = z.id"));
    assert!(sql.contains("LEFT JOIN `p.d.spoke25` AS a1 ON a.spoke25_id = a1.id"));
    check_view_statement(&sql).unwrap();
}

#[tokio::test]
async fn test_saved_definition_recompiles() {
    let catalog = Catalog::new(vec![
        Table::new("p.d.orders", "orders"),
        Table::new("p.d.users", "users"),
    ]);

    let mut workspace = Workspace::new();
    workspace.add_table(Table::new("p.d.orders", "orders"));
    workspace.add_table(Table::new("p.d.users", "users"));
    workspace
        .add_relationship("p.d.orders", "user_id", "p.d.users", "id", Cardinality::ManyToOne)
        .unwrap();
    workspace.set_field_selected("p.d.users", "email", true);

    let compiler = ViewCompiler::new(CompilerConfig::default());
    let original = compiler.compile(&workspace.to_request("orders_view", "proj"));

    let saved = serde_json::to_string(&workspace.to_definition()).unwrap();
    let restored = ViewDefinition::from_json(&saved)
        .unwrap()
        .resolve(&catalog)
        .await
        .unwrap();
    let recompiled = compiler.compile(&restored.to_request("orders_view", "proj"));

    assert_eq!(original, recompiled);
    assert!(recompiled.contains("b.email AS orders_user_users_email"));
}

#[tokio::test]
async fn test_reopened_definition_uses_configured_project() {
    let catalog = Catalog::new(vec![
        Table::new("p.d.orders", "orders"),
        Table::new("p.d.users", "users"),
    ]);
    let definition = ViewDefinition::from_json(
        &json!({
            "tables": ["p.d.orders", "p.d.users"],
            "relationships": [{
                "id": "p.d.orders.user_id-p.d.users.id",
                "fromTable": "p.d.orders",
                "fromField": "user_id",
                "toTable": "p.d.users",
                "toField": "id",
                "cardinality": "many-to-one"
            }],
            "selectedFields": {"p.d.users": ["email"]}
        })
        .to_string(),
    )
    .unwrap();

    let config = CompilerConfig::from_lookup(|key: &str| {
        (key == semantic_views::config::PROJECT_ENV).then(|| "acme-analytics".to_string())
    })
    .unwrap();
    let compiler = ViewCompiler::new(config);

    let workspace = definition.resolve(&catalog).await.unwrap();
    let request = workspace.to_request(&workspace.default_view_name(), "");
    let sql = compiler.compile(&request);

    assert!(sql.starts_with(
        "CREATE OR REPLACE VIEW `acme-analytics.semantic_views.view_orders_users` AS"
    ));
    assert!(sql.contains("b.email AS orders_user_users_email"));
    check_view_statement(&sql).unwrap();

    // without a configured project the empty namespace is kept as given
    let bare = ViewCompiler::default().compile(&request);
    assert!(bare.starts_with("CREATE OR REPLACE VIEW `.semantic_views.view_orders_users` AS"));
}
