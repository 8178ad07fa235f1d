use rowmap::{record, Database, Location, OrmError, SchemaSpec, Value};

const PEOPLE: &str = r#"{
    "table": "people",
    "columns": {
        "first_name": "text",
        "last_name": {"type": "text", "default": "Doe"},
        "age": "integer",
        "female": "boolean"
    }
}"#;

fn count(db: &Database) -> i64 {
    db.connection()
        .query_row("select count(*) from people", [], |r| r.get(0))
        .expect("count")
}

#[test]
fn alice_round_trips() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&SchemaSpec::from_json(PEOPLE).unwrap()).expect("mapping");
    people.create_table().expect("table");

    let mut alice = record!(people, first_name = "Alice", age = 50, female = true).unwrap();
    assert_eq!(alice.get("last_name").unwrap().as_str(), Some("Doe"));
    alice.save().expect("save");

    let all = people.get_all_objects().expect("rows");
    assert_eq!(all.len(), 1);
    let found = &all[0];
    assert_eq!(found.get("first_name").unwrap().as_str(), Some("Alice"));
    assert_eq!(found.get("last_name").unwrap().as_str(), Some("Doe"));
    assert_eq!(found.get("age").unwrap().as_i64(), Some(50));
    assert_eq!(found.get("female").unwrap().as_bool(), Some(true));
}

#[test]
fn bob_has_no_age_and_typos_never_reach_storage() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&SchemaSpec::from_json(PEOPLE).unwrap()).expect("mapping");
    people.create_table().expect("table");

    let mut bob = record!(people, first_name = "Bob", female = false).unwrap();
    assert_eq!(bob.get("age").unwrap(), &Value::Null);
    assert!(matches!(bob.set("fist_name", "Robert"), Err(OrmError::UnknownField { .. })));
    assert_eq!(count(&db), 0);
}

#[test]
fn mutate_after_save_updates_without_duplicating() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&SchemaSpec::from_json(PEOPLE).unwrap()).expect("mapping");
    people.create_table().expect("table");

    let mut carol = record!(people, first_name = "Carol", age = 33, female = true).unwrap();
    carol.save().expect("insert");
    carol.set("last_name", "Jones").unwrap();
    carol.save().expect("update");

    assert_eq!(count(&db), 1);
    let all = people.get_all_objects().expect("rows");
    assert_eq!(all[0].get("last_name").unwrap().as_str(), Some("Jones"));
}
