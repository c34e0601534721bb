//! Connection integration tests: table creation, NDJSON loading, raw SQL.

use std::io::Write;

use deck_optimizer::Connection;
use serde_json::json;
use tempfile::NamedTempFile;

const PEOPLE: &[(&str, &str)] = &[("id", "BIGINT"), ("name", "VARCHAR"), ("score", "DOUBLE")];

fn people() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.create_table("people", PEOPLE).unwrap();
    conn.insert_records(
        "people",
        PEOPLE,
        &[
            json!({"id": 1, "name": "Alpha", "score": 1.5}),
            json!({"id": 2, "name": "Beta"}),
            json!({"id": 3, "name": "Gamma", "score": 3.0}),
        ],
    )
    .unwrap();
    conn
}

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

#[test]
fn execute_returns_correct_rows() {
    let conn = people();

    let rows = conn.execute("SELECT * FROM people ORDER BY id", &[]).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["name"], "Alpha");
    assert_eq!(rows[2]["id"], 3);
}

#[test]
fn execute_with_params() {
    let conn = people();

    let rows = conn
        .execute("SELECT * FROM people WHERE name = ?", &["Beta".to_string()])
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 2);
}

#[test]
fn missing_keys_load_as_null() {
    let conn = people();

    let rows = conn
        .execute("SELECT score FROM people WHERE id = 2", &[])
        .unwrap();
    assert!(rows[0]["score"].is_null());
}

// ---------------------------------------------------------------------------
// execute_scalar / execute_into
// ---------------------------------------------------------------------------

#[test]
fn execute_scalar_returns_single_value() {
    let conn = people();

    let count = conn
        .execute_scalar("SELECT COUNT(*) FROM people", &[])
        .unwrap()
        .unwrap();
    assert_eq!(count.as_i64().unwrap(), 3);
}

#[test]
fn execute_scalar_returns_none_for_empty_result() {
    let conn = people();

    let result = conn
        .execute_scalar("SELECT name FROM people WHERE name = ?", &["Omega".to_string()])
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn execute_into_deserializes_rows() {
    #[derive(serde::Deserialize, Debug)]
    struct Person {
        id: i64,
        name: String,
        score: Option<f64>,
    }

    let conn = people();
    let rows: Vec<Person> = conn
        .execute_into("SELECT * FROM people ORDER BY id", &[])
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].name, "Alpha");
    assert_eq!(rows[0].score, Some(1.5));
    assert_eq!(rows[1].score, None);
}

// ---------------------------------------------------------------------------
// Table registration
// ---------------------------------------------------------------------------

#[test]
fn insert_from_ndjson_appends_rows() {
    let conn = people();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"id": 4, "name": "Delta", "score": 4.0}}"#).unwrap();
    file.flush().unwrap();
    conn.insert_from_ndjson("people", PEOPLE, file.path().to_str().unwrap())
        .unwrap();

    let count = conn
        .execute_scalar("SELECT COUNT(*) FROM people", &[])
        .unwrap()
        .unwrap();
    assert_eq!(count.as_i64().unwrap(), 4);
}

#[test]
fn create_table_replaces_existing_table() {
    let conn = people();
    conn.create_table("people", PEOPLE).unwrap();

    let rows = conn.execute("SELECT * FROM people", &[]).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn empty_record_batch_is_a_noop() {
    let conn = people();
    conn.insert_records::<serde_json::Value>("people", PEOPLE, &[])
        .unwrap();

    let rows = conn.execute("SELECT * FROM people", &[]).unwrap();
    assert_eq!(rows.len(), 3);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn invalid_sql_is_an_error() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(conn.execute("SELECT * FROM nowhere", &[]).is_err());
}
