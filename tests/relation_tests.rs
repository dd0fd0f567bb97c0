use activerow::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn blog_db() -> (Database, Arc<MockConnector>) {
    let mock = Arc::new(MockConnector::new());
    let mut db = Database::with_config(Arc::clone(&mock), Config::new().default_timestamps(false));
    db.register(EntitySchemaBuilder::new("User").field("name", FieldSpec::varchar(64)))
        .unwrap();
    db.register(
        EntitySchemaBuilder::new("Post")
            .field("title", FieldSpec::varchar(120))
            .field("user_id", FieldSpec::unsigned_int())
            .belongs_to("User", Some("user_id"), Some("id")),
    )
    .unwrap();
    (db, mock)
}

fn post(id: i64, user_id: i64, title: &str) -> Row {
    row([("id", Value::from(id)), ("user_id", user_id.into()), ("title", title.into())])
}

// ============================================================================
// belongs_to: has-one upward, has-many downward
// ============================================================================

#[test]
fn test_find_includes_parent() {
    let (db, mock) = blog_db();
    mock.push_rows(vec![post(10, 1, "Hello")]);
    mock.push_rows(vec![row([("id", Value::from(1)), ("name", "Ana".into())])]);

    let criteria = Criteria::from_json(&json!({ "where": { "id": 10 }, "include": ["User"] })).unwrap();
    let post = db.model("Post").unwrap().find(criteria).unwrap().unwrap();

    assert_eq!(
        mock.statements(),
        vec![
            "SELECT * FROM `post` WHERE `id` = 10 LIMIT 1".to_string(),
            "SELECT * FROM `user` WHERE `id` = 1 LIMIT 1".to_string(),
        ]
    );
    match post.included("User") {
        Some(Included::One(Some(user))) => assert_eq!(user.get("name").unwrap(), &Value::from("Ana")),
        other => panic!("unexpected include: {:?}", other),
    }
}

#[test]
fn test_all_includes_children_per_entity() {
    let (db, mock) = blog_db();
    mock.push_rows(vec![
        row([("id", Value::from(1)), ("name", "Ana".into())]),
        row([("id", Value::from(2)), ("name", "Bo".into())]),
    ]);
    mock.push_rows(vec![post(10, 1, "Hello"), post(11, 1, "Again")]);

    let users = db
        .model("User")
        .unwrap()
        .all(Some(Criteria::new().include("Post")), false)
        .unwrap();
    let users: Vec<Entity> = users.entities().collect::<Result<_>>().unwrap();

    let counts: Vec<usize> = users
        .iter()
        .map(|u| match u.included("Post") {
            Some(Included::Many(posts)) => posts.len(),
            _ => usize::MAX,
        })
        .collect();
    assert_eq!(counts, vec![2, 0]);
    assert_eq!(
        mock.statements()[1..],
        ["SELECT * FROM `post` WHERE `user_id` IN (1, 2)".to_string()]
    );
}

#[test]
fn test_include_costs_one_query_per_relation() {
    let (db, mock) = blog_db();
    mock.push_rows(vec![
        post(10, 1, "Hello"),
        post(11, 2, "Again"),
        post(12, 1, "Third"),
    ]);
    mock.push_rows(vec![
        row([("id", Value::from(1)), ("name", "Ana".into())]),
        row([("id", Value::from(2)), ("name", "Bo".into())]),
    ]);

    let posts = db
        .model("Post")
        .unwrap()
        .all(Some(Criteria::new().include("User")), false)
        .unwrap();
    assert_eq!(mock.statements().len(), 2);
    assert_eq!(mock.last_statement().unwrap(), "SELECT * FROM `user` WHERE `id` IN (1, 2)");

    let authors: Vec<String> = posts
        .entities()
        .map(|p| match p.unwrap().included("User") {
            Some(Included::One(Some(user))) => user.get("name").unwrap().to_string(),
            other => panic!("unexpected include: {:?}", other),
        })
        .collect();
    assert_eq!(authors, ["Ana", "Bo", "Ana"]);
    assert_eq!(mock.statements().len(), 2);
}

#[test]
fn test_include_without_keys_skips_related_query() {
    let (db, mock) = blog_db();
    mock.push_rows(vec![row([("id", Value::from(12)), ("title", "Orphan".into()), ("user_id", Value::Null)])]);

    let posts: Vec<Entity> = db
        .model("Post")
        .unwrap()
        .all(Some(Criteria::new().include("User")), false)
        .unwrap()
        .entities()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(posts[0].included("User"), Some(&Included::One(None)));
    assert_eq!(mock.statements().len(), 1);
}

#[test]
fn test_unknown_include_is_skipped() {
    let (db, mock) = blog_db();
    mock.push_rows(vec![row([("id", Value::from(1)), ("name", "Ana".into())])]);

    let user = db
        .model("User")
        .unwrap()
        .find(Criteria::new().where_eq("id", 1).include("Comment"))
        .unwrap()
        .unwrap();
    assert!(user.included("Comment").is_none());
    assert_eq!(mock.statements().len(), 1);
}

#[test]
fn test_missing_foreign_key_resolves_to_nothing() {
    let (db, mock) = blog_db();
    mock.push_rows(vec![row([("id", Value::from(12)), ("title", "Orphan".into()), ("user_id", Value::Null)])]);

    let post = db
        .model("Post")
        .unwrap()
        .find(Criteria::new().where_eq("id", 12).include("User"))
        .unwrap()
        .unwrap();
    assert_eq!(post.included("User"), Some(&Included::One(None)));
    assert_eq!(mock.statements().len(), 1);
}
