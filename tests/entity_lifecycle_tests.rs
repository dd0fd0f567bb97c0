use activerow::prelude::*;
use activerow::schema::{CREATED_AT, UPDATED_AT};
use serde_json::json;
use std::sync::Arc;

fn user_db() -> (Database, Arc<MockConnector>) {
    let mock = Arc::new(MockConnector::new());
    let mut db = Database::new(Arc::clone(&mock));
    db.register(
        EntitySchemaBuilder::new("User")
            .field("name", FieldSpec::varchar(64).not_null())
            .field("status", FieldSpec::varchar(16).default_value("pending"))
            .field("age", FieldSpec::int()),
    )
    .unwrap();
    (db, mock)
}

fn stored_user(id: i64, name: &str, status: &str) -> Row {
    row([
        ("id", Value::from(id)),
        ("name", name.into()),
        ("status", status.into()),
        ("age", Value::Null),
        ("created_at", "2024-01-01 00:00:00".into()),
        ("updated_at", Value::Null),
        ("_created_at_ts", 1704067200.into()),
        ("_updated_at_ts", Value::Null),
    ])
}

// ============================================================================
// Create, then find
// ============================================================================

#[test]
fn test_create_then_find() {
    let (db, mock) = user_db();
    let users = db.model("User").unwrap();

    mock.push_outcome(1, Some(1));
    let created = users
        .create(row([("name", "Ana"), ("status", "active")]), None)
        .unwrap();
    assert_eq!(created.id(), Some(&Value::Integer(1)));
    assert!(!created.is_dirty());

    let insert = mock.last_statement().unwrap();
    assert!(insert.starts_with(
        "INSERT INTO `user` (`name`, `status`, `age`, `created_at`) VALUES ('Ana', 'active', NULL, FROM_UNIXTIME("
    ));

    mock.push_rows(vec![stored_user(1, "Ana", "active")]);
    let found = users.find(1).unwrap().unwrap();
    assert_eq!(found.get("name").unwrap(), &Value::from("Ana"));
    assert_eq!(found.get("status").unwrap(), &Value::from("active"));
    assert_eq!(found.get(CREATED_AT).unwrap(), &Value::Integer(1704067200));
    assert_eq!(found.get(UPDATED_AT).unwrap(), &Value::Null);
    assert!(!found.is_dirty());
}

#[test]
fn test_find_by_criteria_map() {
    let (db, mock) = user_db();
    mock.push_rows(vec![]);

    let criteria = Criteria::from_json(&json!({ "name": "Ana", "age": { ">=": 18 } })).unwrap();
    let found = db.model("User").unwrap().find(criteria).unwrap();
    assert!(found.is_none());
    assert_eq!(
        mock.last_statement().unwrap(),
        "SELECT *, UNIX_TIMESTAMP(`created_at`) AS `_created_at_ts`, \
         UNIX_TIMESTAMP(`updated_at`) AS `_updated_at_ts` FROM `user` \
         WHERE `name` = 'Ana' AND `age` >= 18 LIMIT 1"
    );
}

// ============================================================================
// Dirty tracking
// ============================================================================

#[test]
fn test_dirty_tracking_across_save() {
    let (db, mock) = user_db();
    let mut user = db.model("User").unwrap().new_entity();
    assert!(user.is_dirty());
    assert_eq!(user.get("status").unwrap(), &Value::from("pending"));

    user.set("name", "Bo");
    mock.push_outcome(1, Some(8));
    assert!(user.save(&db).unwrap());
    assert!(!user.is_dirty());

    user.set("age", "27 years");
    assert!(user.is_dirty());
    assert_eq!(user.get("age").unwrap(), &Value::Integer(27));

    mock.push_outcome(1, None);
    assert!(user.save(&db).unwrap());
    assert!(!user.is_dirty());
    assert!(mock.last_statement().unwrap().ends_with("WHERE `id` = 8"));
}

#[test]
fn test_unknown_fields_are_ignored_on_assignment() {
    let (db, _) = user_db();
    let mut user = db
        .model("User")
        .unwrap()
        .build(row([("name", "Cy"), ("is_admin", "1")]), None);

    assert!(!user.set("is_admin", true));
    assert!(matches!(user.get("is_admin"), Err(OrmError::FieldNotDefined(f)) if f == "is_admin"));
    assert_eq!(user.get("name").unwrap(), &Value::from("Cy"));
}

#[test]
fn test_query_failure_carries_statement() {
    let (db, mock) = user_db();
    mock.push_error("Table 'app.user' doesn't exist");

    let err = db.model("User").unwrap().find(3).unwrap_err();
    match err {
        OrmError::QueryExecution { message, sql } => {
            assert_eq!(message, "Table 'app.user' doesn't exist");
            assert!(sql.ends_with("FROM `user` WHERE `id` = 3 LIMIT 1"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Destroy and schema introspection
// ============================================================================

#[test]
fn test_destroy_with_operator_map() {
    let (db, mock) = user_db();
    mock.push_outcome(3, None);

    let criteria = Criteria::from_json(&json!({ "where": { "status": { "in": ["banned", "spam"] } } })).unwrap();
    assert!(db.model("User").unwrap().destroy(criteria).unwrap());
    assert_eq!(
        mock.last_statement().unwrap(),
        "DELETE FROM `user` WHERE `status` IN ('banned', 'spam')"
    );
}

#[test]
fn test_meta_for_api_consumers() {
    let (db, _) = user_db();
    let meta = serde_json::to_value(db.model("User").unwrap().meta()).unwrap();
    assert_eq!(
        meta,
        json!({
            "id": { "type": "UNSIGNED INT", "primaryKey": true, "comment": null },
            "name": { "type": "VARCHAR(64)", "primaryKey": false, "comment": null },
            "status": { "type": "VARCHAR(16)", "primaryKey": false, "comment": null },
            "age": { "type": "INT", "primaryKey": false, "comment": null }
        })
    );
}

#[test]
fn test_lenient_identifiers_are_quoted() {
    let mock = Arc::new(MockConnector::new());
    let mut db = Database::with_config(
        Arc::clone(&mock),
        Config::new().strict_identifiers(false).default_timestamps(false),
    );
    db.register(EntitySchemaBuilder::new("Legacy").field("full name", FieldSpec::varchar(64)))
        .unwrap();

    mock.push_rows(vec![]);
    db.model("Legacy")
        .unwrap()
        .find(Criteria::new().where_eq("full name", "x"))
        .unwrap();
    assert_eq!(
        mock.last_statement().unwrap(),
        "SELECT * FROM `legacy` WHERE `full name` = 'x' LIMIT 1"
    );
}
