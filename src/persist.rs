// used for persistence
use rusqlite::ToSql;
use tracing::{debug, info, trace, warn};

use crate::construct::{Mapping, Record, State};
use crate::error::{OrmError, Result};
use crate::schema::{Column, Table};

// ------------- Statements -------------
// Only identifiers that passed schema validation are spliced into SQL text,
// every value travels as a bound parameter.
fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

fn parameter(column: &Column) -> String {
    format!(":{}", column.name())
}

/// SQL text that only depends on the table layout, built once per mapping.
#[derive(Debug, Clone)]
pub(crate) struct Statements {
    table: String,
    parameters: Vec<String>,
    create_table: String,
    update: String,
    select_all: String,
}

impl Statements {
    pub(crate) fn new(table: &Table) -> Self {
        let name = quote(table.name());
        let columns = table.columns();
        let parameters: Vec<String> = columns.iter().map(parameter).collect();
        let definitions: Vec<String> = columns
            .iter()
            .map(|column| format!("{} {}", quote(column.name()), column.tag().sql_type()))
            .collect();
        let assignments: Vec<String> = columns
            .iter()
            .zip(parameters.iter())
            .map(|(column, parameter)| format!("{} = {}", quote(column.name()), parameter))
            .collect();
        let selected: Vec<String> = columns.iter().map(|column| quote(column.name())).collect();
        Self {
            create_table: format!(
                "create table if not exists {} (id integer primary key autoincrement, {})",
                name,
                definitions.join(", ")
            ),
            update: format!(
                "update {} set {} where rowid = :rowid",
                name,
                assignments.join(", ")
            ),
            select_all: format!("select rowid, {} from {}", selected.join(", "), name),
            table: name,
            parameters,
        }
    }

    /// Only columns currently holding a value are named.
    fn insert(&self, table: &Table, present: &[usize]) -> String {
        if present.is_empty() {
            return format!("insert into {} default values", self.table);
        }
        let columns: Vec<String> = present
            .iter()
            .map(|&i| quote(table.columns()[i].name()))
            .collect();
        let parameters: Vec<&str> = present.iter().map(|&i| self.parameters[i].as_str()).collect();
        format!(
            "insert into {} ({}) values ({})",
            self.table,
            columns.join(", "),
            parameters.join(", ")
        )
    }
}

// ------------- Persistence -------------
impl<'db> Mapping<'db> {
    /// Create the backing table unless it already exists. The table gets an
    /// `id` column aliasing SQLite's rowid, which is what saves target.
    pub fn create_table(&self) -> Result<()> {
        debug!(sql = %self.statements.create_table, "executing");
        self.db
            .execute(&self.statements.create_table, [])
            .inspect_err(|e| warn!(error = %e, table = self.name(), "could not create table"))?;
        info!(table = self.name(), "table ready");
        Ok(())
    }

    /// Read every row of the table, in the order the engine returns them, as
    /// saved records. Each call runs a fresh scan.
    pub fn get_all_objects(&self) -> Result<Vec<Record<'_>>> {
        let sql = &self.statements.select_all;
        debug!(%sql, "executing");
        let mut statement = self
            .db
            .prepare_cached(sql)
            .inspect_err(|e| warn!(error = %e, table = self.name(), "could not read rows"))?;
        let mut rows = statement.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let row_id: i64 = row.get(0)?;
            let mut values = Vec::with_capacity(self.columns().len());
            for (i, column) in self.columns().iter().enumerate() {
                values.push(column.tag().hydrate(column.name(), row.get_ref(i + 1)?)?);
            }
            records.push(Record {
                mapping: self,
                values,
                state: State::Saved { row_id },
            });
        }
        trace!(table = self.name(), rows = records.len(), "hydrated");
        Ok(records)
    }
}

impl Record<'_> {
    /// Insert the record if it was never saved, otherwise update its row.
    /// On failure the record keeps its previous state.
    pub fn save(&mut self) -> Result<()> {
        let outcome = match self.state {
            State::New => self.insert().map(|row_id| {
                self.state = State::Saved { row_id };
            }),
            State::Saved { row_id } => self.update(row_id),
        };
        outcome.inspect_err(|e| warn!(error = %e, table = self.mapping.name(), "save failed"))
    }

    fn insert(&self) -> Result<i64> {
        let mapping = self.mapping;
        let present: Vec<usize> = self
            .values
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .map(|(i, _)| i)
            .collect();
        let sql = mapping.statements.insert(&mapping.table, &present);
        debug!(%sql, "executing");
        let params: Vec<(&str, &dyn ToSql)> = present
            .iter()
            .map(|&i| {
                (
                    mapping.statements.parameters[i].as_str(),
                    &self.values[i] as &dyn ToSql,
                )
            })
            .collect();
        mapping.db.prepare_cached(&sql)?.execute(params.as_slice())?;
        Ok(mapping.db.last_insert_rowid())
    }

    fn update(&self, row_id: i64) -> Result<()> {
        let mapping = self.mapping;
        let sql = &mapping.statements.update;
        debug!(%sql, row_id, "executing");
        let mut params: Vec<(&str, &dyn ToSql)> = mapping
            .statements
            .parameters
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(|value| value as &dyn ToSql))
            .collect();
        params.push((":rowid", &row_id as &dyn ToSql));
        let changed = mapping.db.prepare_cached(sql)?.execute(params.as_slice())?;
        if changed == 0 {
            return Err(OrmError::Storage(format!(
                "row {} no longer exists in table '{}'",
                row_id,
                mapping.name()
            )));
        }
        Ok(())
    }
}
