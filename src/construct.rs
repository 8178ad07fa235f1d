// used for the storage handle
use rusqlite::config::DbConfig;
use rusqlite::Connection;
use tracing::info;

// used for the command line and settings surfaces
use serde::ser::{Serialize, SerializeMap, Serializer};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// our own stuff that we need
use crate::datatype::Value;
use crate::error::{OrmError, Result};
use crate::persist::Statements;
use crate::schema::{Column, SchemaSpec, Table};

/// Sentinel accepted by `Location::from_str` for an ephemeral database.
pub const IN_MEMORY: &str = ":memory:";

// ------------- Database -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    InMemory,
    File(PathBuf),
}

impl FromStr for Location {
    type Err = OrmError;
    fn from_str(location: &str) -> Result<Self> {
        match location.trim() {
            "" => Err(OrmError::Config("database location must not be empty".into())),
            IN_MEMORY => Ok(Location::InMemory),
            path => Ok(Location::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Location::InMemory => write!(f, "{}", IN_MEMORY),
            Location::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Owns the connection that mappings borrow.
#[derive(Debug)]
pub struct Database {
    connection: Connection,
    location: Location,
}

impl Database {
    pub fn open(location: Location) -> Result<Self> {
        let connection = match &location {
            Location::InMemory => Connection::open_in_memory()?,
            Location::File(path) => Connection::open(path)?,
        };
        // a double-quoted name that matches no column must fail, not turn into a string literal
        connection.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DML, false)?;
        connection.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DDL, false)?;
        info!(%location, "opened database");
        Ok(Self {
            connection,
            location,
        })
    }
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
    pub fn location(&self) -> &Location {
        &self.location
    }
    /// Compile `schema` and bind the result to this database.
    pub fn map(&self, schema: &SchemaSpec) -> Result<Mapping<'_>> {
        Mapping::compile(&self.connection, schema)
    }
}

// ------------- Mapping -------------
/// A compiled table bound to a connection. Every record created or hydrated
/// through it borrows it, so it necessarily outlives them.
pub struct Mapping<'db> {
    pub(crate) table: Table,
    pub(crate) db: &'db Connection,
    pub(crate) statements: Statements,
}

impl<'db> Mapping<'db> {
    pub fn new(db: &'db Connection, table: Table) -> Self {
        let statements = Statements::new(&table);
        Self {
            table,
            db,
            statements,
        }
    }
    pub fn compile(db: &'db Connection, schema: &SchemaSpec) -> Result<Self> {
        Ok(Self::new(db, schema.compile()?))
    }
    pub fn table(&self) -> &Table {
        &self.table
    }
    pub fn name(&self) -> &str {
        self.table.name()
    }
    pub fn columns(&self) -> &[Column] {
        self.table.columns()
    }
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.table.column(name)
    }

    /// Build a new, unsaved record from `name = value` pairs. Columns that are
    /// not mentioned take their default, or null when they have none.
    pub fn create<'a, I>(&self, fields: I) -> Result<Record<'_>>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let mut values: Vec<Value> = self
            .columns()
            .iter()
            .map(|column| column.default_value().cloned().unwrap_or_default())
            .collect();
        for (name, value) in fields {
            let position = self.position(name)?;
            let column = &self.columns()[position];
            values[position] = column.tag().coerce(column.name(), value)?;
        }
        Ok(Record {
            mapping: self,
            values,
            state: State::New,
        })
    }

    pub(crate) fn position(&self, name: &str) -> Result<usize> {
        self.table
            .position(name)
            .ok_or_else(|| OrmError::UnknownField {
                table: self.table.name().to_string(),
                field: name.to_string(),
            })
    }
}

impl fmt::Debug for Mapping<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Build a record from keyword-style pairs:
/// `record!(people, first_name = "Alice", age = 50)`.
#[macro_export]
macro_rules! record {
    ($mapping:expr $(, $field:ident = $value:expr)* $(,)?) => {{
        let fields: ::std::vec::Vec<(&str, $crate::datatype::Value)> =
            ::std::vec![$((stringify!($field), $crate::datatype::Value::from($value))),*];
        $mapping.create(fields)
    }};
}

// ------------- Record -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Never written; the next save inserts.
    New,
    /// Written at least once; the next save updates this row.
    Saved { row_id: i64 },
}

/// One (possibly unsaved) row. Holds exactly one value per mapped column.
#[derive(Clone)]
pub struct Record<'m> {
    pub(crate) mapping: &'m Mapping<'m>,
    pub(crate) values: Vec<Value>,
    pub(crate) state: State,
}

impl<'m> Record<'m> {
    pub fn mapping(&self) -> &'m Mapping<'m> {
        self.mapping
    }
    pub fn state(&self) -> State {
        self.state
    }
    pub fn is_persisted(&self) -> bool {
        matches!(self.state, State::Saved { .. })
    }
    pub fn row_id(&self) -> Option<i64> {
        match self.state {
            State::New => None,
            State::Saved { row_id } => Some(row_id),
        }
    }
    pub fn get(&self, name: &str) -> Result<&Value> {
        Ok(&self.values[self.mapping.position(name)?])
    }
    /// Assign a column. Unknown names and mistyped values are rejected and
    /// leave the record as it was.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let position = self.mapping.position(name)?;
        let column = &self.mapping.columns()[position];
        self.values[position] = column.tag().coerce(column.name(), value.into())?;
        Ok(())
    }
    /// Column names paired with their current values, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.mapping
            .columns()
            .iter()
            .map(Column::name)
            .zip(self.values.iter())
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Record")
            .field("table", &self.mapping.name())
            .field("state", &self.state)
            .field("values", &self.values)
            .finish()
    }
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.state {
            State::New => write!(f, "{}#new {{", self.mapping.name())?,
            State::Saved { row_id } => write!(f, "{}#{} {{", self.mapping.name(), row_id)?,
        }
        for (i, (name, value)) in self.values().enumerate() {
            let separator = if i == 0 { " " } else { ", " };
            write!(f, "{}{}: {}", separator, name, value)?;
        }
        write!(f, " }}")
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("id", &self.row_id())?;
        for (name, value) in self.values() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
