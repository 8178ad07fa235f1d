use rowmap::{record, Database, Location, OrmError, SchemaSpec, State, TypeTag, Value};

fn people_schema() -> SchemaSpec {
    SchemaSpec::new("people")
        .column("first_name", TypeTag::Text)
        .column_with_default("last_name", TypeTag::Text, "Doe")
        .column("age", TypeTag::Integer)
        .column("female", TypeTag::Boolean)
        .column("height", TypeTag::Real)
}

#[test]
fn defaults_apply_unless_overridden() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&people_schema()).expect("mapping");
    let alice = record!(people, first_name = "Alice", age = 50, female = true).expect("record");
    assert_eq!(alice.get("last_name").unwrap(), &Value::from("Doe"));
    let bob = record!(people, first_name = "Bob", last_name = "Smith").expect("record");
    assert_eq!(bob.get("last_name").unwrap().as_str(), Some("Smith"));
}

#[test]
fn omitted_columns_without_default_are_null() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&people_schema()).expect("mapping");
    let bob = record!(people, first_name = "Bob", female = false).expect("record");
    assert!(bob.get("age").unwrap().is_null());
    assert!(bob.get("height").unwrap().is_null());
    assert_eq!(bob.get("female").unwrap().as_bool(), Some(false));
}

#[test]
fn new_records_are_unsaved() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&people_schema()).expect("mapping");
    let carol = record!(people).expect("record");
    assert_eq!(carol.state(), State::New);
    assert!(!carol.is_persisted());
    assert_eq!(carol.row_id(), None);
}

#[test]
fn unknown_fields_are_rejected_at_construction() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&people_schema()).expect("mapping");
    let err = record!(people, first_name = "Alice", frist_name = "Alice").unwrap_err();
    match err {
        OrmError::UnknownField { table, field } => {
            assert_eq!(table, "people");
            assert_eq!(field, "frist_name");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_fields_are_rejected_on_read_and_write() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&people_schema()).expect("mapping");
    let mut bob = record!(people, first_name = "Bob").expect("record");
    assert!(matches!(bob.set("agee", 40), Err(OrmError::UnknownField { .. })));
    assert!(matches!(bob.get("agee"), Err(OrmError::UnknownField { .. })));
    let names: Vec<&str> = bob.values().map(|(name, _)| name).collect();
    assert_eq!(names, ["first_name", "last_name", "age", "female", "height"]);
}

#[test]
fn mistyped_values_are_rejected() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&people_schema()).expect("mapping");
    let err = record!(people, age = "fifty").unwrap_err();
    match err {
        OrmError::Type { column, expected, found } => {
            assert_eq!(column, "age");
            assert_eq!(expected, TypeTag::Integer);
            assert_eq!(found, "text");
        }
        other => panic!("unexpected error: {other}"),
    }
    // no silent truncation of reals into integers
    assert!(matches!(record!(people, age = 50.5), Err(OrmError::Type { .. })));
    // booleans are not integers, in either direction
    assert!(matches!(record!(people, female = 1), Err(OrmError::Type { .. })));
    assert!(matches!(record!(people, age = true), Err(OrmError::Type { .. })));
    assert!(matches!(record!(people, first_name = 7), Err(OrmError::Type { .. })));
}

#[test]
fn reals_widen_integers() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&people_schema()).expect("mapping");
    let mut dave = record!(people, height = 180).expect("record");
    assert_eq!(dave.get("height").unwrap(), &Value::Real(180.0));
    dave.set("height", 1.85).expect("real");
    assert_eq!(dave.get("height").unwrap().as_f64(), Some(1.85));
}

#[test]
fn failed_mutation_keeps_previous_value() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&people_schema()).expect("mapping");
    let mut erin = record!(people, age = 30).expect("record");
    assert!(erin.set("age", "thirty").is_err());
    assert_eq!(erin.get("age").unwrap().as_i64(), Some(30));
    erin.set("age", 31).expect("integer");
    assert_eq!(erin.get("age").unwrap().as_i64(), Some(31));
    erin.set("age", Value::Null).expect("null clears");
    assert!(erin.get("age").unwrap().is_null());
    erin.set("last_name", None::<&str>).expect("null clears");
    assert!(erin.get("last_name").unwrap().is_null());
}

#[test]
fn create_accepts_name_value_pairs() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&people_schema()).expect("mapping");
    let frank = people
        .create([("first_name", Value::from("Frank")), ("age", Value::from(22))])
        .expect("record");
    assert_eq!(frank.get("first_name").unwrap().as_str(), Some("Frank"));
    assert_eq!(frank.get("age").unwrap().as_i64(), Some(22));
}

#[test]
fn records_render_and_serialize() {
    let db = Database::open(Location::InMemory).expect("db");
    let people = db.map(&people_schema()).expect("mapping");
    let alice = record!(people, first_name = "Alice", age = 50, female = true).expect("record");
    assert_eq!(
        alice.to_string(),
        "people#new { first_name: \"Alice\", last_name: \"Doe\", age: 50, female: true, height: null }"
    );
    let json = serde_json::to_value(&alice).expect("serializes");
    assert_eq!(
        json,
        serde_json::json!({
            "id": null,
            "first_name": "Alice",
            "last_name": "Doe",
            "age": 50,
            "female": true,
            "height": null
        })
    );
}
