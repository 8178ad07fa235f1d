use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::construct::Location;
use crate::error::Result;
use crate::schema::SchemaSpec;

/// What the `rowmap` binary needs: where the database lives and which table
/// to map. Read from a file (format picked by extension), then overridden by
/// `ROWMAP_*` environment variables, e.g. `ROWMAP_DATABASE=:memory:`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: String,
    pub schema: SchemaSpec,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()).required(true))
            .add_source(Environment::with_prefix("ROWMAP"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
    pub fn location(&self) -> Result<Location> {
        self.database.parse()
    }
}
