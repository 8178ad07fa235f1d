//! Rowmap – schema-driven row mapping over a single SQLite file.
//!
//! Rowmap turns a declarative table schema into a *mapping*: a constructor for
//! records whose fields are exactly the declared columns, each holding a value
//! of the declared type. Records are built in memory and written explicitly:
//! the first `save` inserts a row, later saves update that same row.
//!
//! ## Modules
//! * [`datatype`] – The closed set of [`datatype::TypeTag`]s (text, integer,
//!   boolean, real) with their coercion rules, and the dynamic
//!   [`datatype::Value`] a column holds.
//! * [`schema`] – The declarative [`schema::SchemaSpec`] (short form
//!   `"text"`, long form `{"type": "text", "default": "Doe"}`) and its
//!   compilation into a validated [`schema::Table`].
//! * [`construct`] – The [`construct::Database`] handle, the
//!   [`construct::Mapping`] bound to it and the [`construct::Record`]s it
//!   produces.
//! * [`persist`] – SQL generation and execution: insert-or-update on save,
//!   table creation, and hydration of all rows.
//! * [`settings`] – File and environment configuration for the binary.
//!
//! ## Persistence
//! Every value is bound as a statement parameter. Table and column names are
//! spliced into SQL text, which is why the schema only accepts plain
//! identifiers. Rows are identified by SQLite's native `rowid`; tables made
//! by [`construct::Mapping::create_table`] alias it as `id`.
//!
//! ## Quick Start
//! ```
//! use rowmap::{record, construct::{Database, Location}, datatype::{TypeTag, Value}, schema::SchemaSpec};
//! let db = Database::open(Location::InMemory).unwrap();
//! let schema = SchemaSpec::new("people")
//!     .column("first_name", TypeTag::Text)
//!     .column_with_default("last_name", TypeTag::Text, "Doe")
//!     .column("age", TypeTag::Integer)
//!     .column("female", TypeTag::Boolean);
//! let people = db.map(&schema).unwrap();
//! people.create_table().unwrap();
//! let mut alice = record!(people, first_name = "Alice", age = 50, female = true).unwrap();
//! assert_eq!(alice.get("last_name").unwrap(), &Value::from("Doe"));
//! alice.save().unwrap();
//! assert!(alice.set("frist_name", "Alicia").is_err());
//! assert_eq!(people.get_all_objects().unwrap().len(), 1);
//! ```
//!
//! ## Scope
//! There is no filtering, deleting, joining or migrating: a
//! mapping can create its table, save records and read all of them back.

pub mod construct;
pub mod datatype;
pub mod error;
pub mod persist;
pub mod schema;
pub mod settings;

pub use construct::{Database, Location, Mapping, Record, State};
pub use datatype::{TypeTag, Value};
pub use error::{OrmError, Result};
pub use schema::SchemaSpec;
