//! Unit tests for the SqlBuilder query construction.

use deck_optimizer::sql_builder::escape_like;
use deck_optimizer::SqlBuilder;

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("cards").build();
    assert_eq!(sql, "SELECT *\nFROM cards");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("cards").select(&["id", "name"]).build();
    assert!(sql.starts_with("SELECT id, name\n"));
}

// ---------------------------------------------------------------------------
// WHERE conditions
// ---------------------------------------------------------------------------

#[test]
fn where_eq_adds_equality_with_param() {
    let (sql, params) = SqlBuilder::new("cards").where_eq("role", "creature").build();
    assert!(sql.contains("WHERE role = ?"));
    assert_eq!(params, vec!["creature"]);
}

#[test]
fn where_like_adds_case_insensitive_like() {
    let (sql, params) = SqlBuilder::new("cards").where_like("name", "Ember%").build();
    assert!(sql.contains("LOWER(name) LIKE LOWER(?) ESCAPE '\\'"));
    assert_eq!(params, vec!["Ember%"]);
}

#[test]
fn escape_like_protects_wildcards() {
    assert_eq!(escape_like("Ember"), "Ember");
    assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
}

#[test]
fn where_not_in_adds_exclusion() {
    let (sql, params) = SqlBuilder::new("cards")
        .where_not_in("id", &["ember-pup", "tide-eel"])
        .build();
    assert!(sql.contains("id NOT IN (?, ?)"));
    assert_eq!(params, vec!["ember-pup", "tide-eel"]);
}

#[test]
fn where_not_in_empty_is_noop() {
    let (sql, params) = SqlBuilder::new("cards").where_not_in("id", &[]).build();
    assert!(!sql.contains("WHERE"));
    assert!(params.is_empty());
}

#[test]
fn where_any_creates_or_group() {
    let (sql, params) = SqlBuilder::new("cards")
        .where_any("list_contains(string_split(element_types, ', '), ?)", &["Fire", "Water"])
        .build();
    assert!(sql.contains(
        "(list_contains(string_split(element_types, ', '), ?) OR list_contains(string_split(element_types, ', '), ?))"
    ));
    assert_eq!(params, vec!["Fire", "Water"]);
}

#[test]
fn where_any_empty_is_noop() {
    let (sql, params) = SqlBuilder::new("cards").where_any("x = ?", &[]).build();
    assert!(!sql.contains("WHERE"));
    assert!(params.is_empty());
}

#[test]
fn where_clause_appends_params_in_order() {
    let (sql, params) = SqlBuilder::new("cards")
        .where_eq("role", "creature")
        .where_clause("COALESCE(hp, 0) >= CAST(? AS BIGINT)", &["60"])
        .build();
    assert!(sql.contains("role = ?"));
    assert!(sql.contains("COALESCE(hp, 0) >= CAST(? AS BIGINT)"));
    assert_eq!(params, vec!["creature", "60"]);
}

// ---------------------------------------------------------------------------
// JOIN
// ---------------------------------------------------------------------------

#[test]
fn join_adds_clause_before_where() {
    let (sql, _) = SqlBuilder::new("cards c")
        .join("JOIN card_prices p ON c.id = p.id")
        .where_clause("p.price > 0", &[])
        .build();
    let join = sql.find("JOIN card_prices p ON c.id = p.id").unwrap();
    let filter = sql.find("WHERE p.price > 0").unwrap();
    assert!(join < filter);
}

// ---------------------------------------------------------------------------
// ORDER BY / LIMIT
// ---------------------------------------------------------------------------

#[test]
fn order_by_adds_clause() {
    let (sql, _) = SqlBuilder::new("card_meta")
        .order_by(&["relevance DESC", "freshness DESC"])
        .build();
    assert!(sql.contains("ORDER BY relevance DESC, freshness DESC"));
}

#[test]
fn limit_follows_order_by() {
    let (sql, _) = SqlBuilder::new("cards")
        .order_by(&["id ASC"])
        .limit(10)
        .build();
    assert!(sql.ends_with("ORDER BY id ASC\nLIMIT 10"));
}

// ---------------------------------------------------------------------------
// Combined / chained
// ---------------------------------------------------------------------------

#[test]
fn multiple_where_clauses_joined_with_and() {
    let (sql, _) = SqlBuilder::new("cards")
        .where_eq("role", "support")
        .where_eq("rarity", "common")
        .build();
    assert!(sql.contains("WHERE role = ? AND rarity = ?"));
}

#[test]
fn full_candidate_query() {
    let (sql, params) = SqlBuilder::new("cards c")
        .select(&["c.*"])
        .join("JOIN card_legalities l ON c.id = l.id")
        .where_eq("l.format", "standard")
        .where_eq("c.role", "creature")
        .where_not_in("c.id", &["ember-pup"])
        .where_any("list_contains(string_split(c.element_types, ', '), ?)", &["Fire"])
        .order_by(&["c.id ASC"])
        .limit(20)
        .build();

    assert!(sql.starts_with("SELECT c.*\nFROM cards c\nJOIN card_legalities l ON c.id = l.id"));
    assert!(sql.contains("WHERE l.format = ? AND c.role = ? AND c.id NOT IN (?)"));
    assert!(sql.contains("ORDER BY c.id ASC"));
    assert!(sql.contains("LIMIT 20"));
    assert_eq!(params, vec!["standard", "creature", "ember-pup", "Fire"]);
}
