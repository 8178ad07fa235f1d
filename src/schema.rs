//! Declarative schema input and its compilation into a closed column set.
//!
//! A [`SchemaSpec`] is what callers write (by hand, or through `serde` from
//! JSON/TOML/settings files). [`SchemaSpec::compile`] validates it and produces
//! a [`Table`], the normalized form every mapping is built from.

use std::collections::{HashMap, HashSet};
use std::hash::BuildHasherDefault;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use seahash::SeaHasher;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::datatype::{TypeTag, Value};
use crate::error::{OrmError, Result};

pub(crate) type ColumnHasher = BuildHasherDefault<SeaHasher>;

lazy_static! {
    // names end up inside SQL text, so only plain identifiers are let through
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Names SQLite uses for the implicit row identity, plus the `id` column
/// created by `Mapping::create_table`.
pub const RESERVED_COLUMNS: [&str; 4] = ["id", "rowid", "oid", "_rowid_"];

// ------------- Declarations -------------
/// One column as written in a schema: either a bare type token (`"text"`) or
/// a record with a type and an optional default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColumnDecl {
    Short(String),
    Long {
        #[serde(rename = "type", default)]
        tag: Option<String>,
        #[serde(default)]
        default: Option<Value>,
    },
}

/// Column declarations in the order they were written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnSpecs(Vec<(String, ColumnDecl)>);

impl ColumnSpecs {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnDecl)> {
        self.0.iter().map(|(name, decl)| (name.as_str(), decl))
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct ColumnSpecsVisitor;

impl<'de> Visitor<'de> for ColumnSpecsVisitor {
    type Value = ColumnSpecs;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a map from column names to types or {{type, default}} records")
    }
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<ColumnSpecs, A::Error> {
        let mut columns = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, decl)) = map.next_entry::<String, ColumnDecl>()? {
            columns.push((name, decl));
        }
        Ok(ColumnSpecs(columns))
    }
}

impl<'de> Deserialize<'de> for ColumnSpecs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ColumnSpecsVisitor)
    }
}

/// The declarative schema of one table.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SchemaSpec {
    // both default to empty so that a missing key is reported by `compile`
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub columns: ColumnSpecs,
}

impl SchemaSpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: ColumnSpecs::default(),
        }
    }
    /// Add a column in short form.
    pub fn column(mut self, name: impl Into<String>, tag: TypeTag) -> Self {
        self.columns
            .0
            .push((name.into(), ColumnDecl::Short(tag.token().to_string())));
        self
    }
    /// Add a column in long form, with a default.
    pub fn column_with_default(
        mut self,
        name: impl Into<String>,
        tag: TypeTag,
        default: impl Into<Value>,
    ) -> Self {
        self.columns.0.push((
            name.into(),
            ColumnDecl::Long {
                tag: Some(tag.token().to_string()),
                default: Some(default.into()),
            },
        ));
        self
    }
    /// Parse a JSON schema document. Malformed documents are schema errors.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| OrmError::Schema(e.to_string()))
    }

    pub fn compile(&self) -> Result<Table> {
        check_identifier("table", &self.table)?;
        if self.columns.is_empty() {
            return Err(OrmError::Schema(format!(
                "table '{}' declares no columns",
                self.table
            )));
        }
        let mut columns = Vec::with_capacity(self.columns.len());
        let mut positions = HashMap::<String, usize, ColumnHasher>::default();
        // SQLite compares identifiers without regard to ASCII case
        let mut folded = HashSet::<String, ColumnHasher>::default();
        for (name, decl) in self.columns.iter() {
            check_identifier("column", name)?;
            if RESERVED_COLUMNS
                .iter()
                .any(|reserved| reserved.eq_ignore_ascii_case(name))
            {
                return Err(OrmError::Schema(format!(
                    "cannot use '{}' as column name, it is reserved for the row identity",
                    name
                )));
            }
            let (token, default) = match decl {
                ColumnDecl::Short(token) => (Some(token), None),
                ColumnDecl::Long { tag, default } => (tag.as_ref(), default.as_ref()),
            };
            let tag: TypeTag = token
                .ok_or_else(|| {
                    OrmError::Schema(format!("column '{}' is missing its type", name))
                })?
                .parse()?;
            // fail fast on defaults that could never be stored
            let default = match default {
                None | Some(Value::Null) => None,
                Some(value) => Some(tag.coerce(name, value.clone()).map_err(|e| {
                    OrmError::Schema(format!("invalid default for column '{}': {}", name, e))
                })?),
            };
            if !folded.insert(name.to_ascii_lowercase()) {
                return Err(OrmError::Schema(format!(
                    "column '{}' is declared more than once",
                    name
                )));
            }
            positions.insert(name.to_string(), columns.len());
            columns.push(Column {
                name: name.to_string(),
                tag,
                default,
            });
        }
        Ok(Table {
            name: self.table.clone(),
            columns,
            positions,
        })
    }
}

fn check_identifier(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(OrmError::Schema(format!("{} name must not be empty", what)));
    }
    if !IDENTIFIER.is_match(name) {
        return Err(OrmError::Schema(format!(
            "{} name '{}' is not a plain identifier",
            what, name
        )));
    }
    Ok(())
}

// ------------- Compiled -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    tag: TypeTag,
    default: Option<Value>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn tag(&self) -> TypeTag {
        self.tag
    }
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// A validated table layout: columns in declaration order plus a name lookup.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    positions: HashMap<String, usize, ColumnHasher>,
}

impl Table {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}
