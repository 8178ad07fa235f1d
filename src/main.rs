//! `rowmap <settings-file> [insert <json-object>]`
//!
//! Opens the database named in the settings, makes sure the mapped table
//! exists, optionally saves one record built from a JSON object and prints
//! every row as a line of JSON.

use std::collections::BTreeMap;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use rowmap::settings::Settings;
use rowmap::{Database, OrmError, Result, Value};

const USAGE: &str = "usage: rowmap <settings-file> [insert <json-object>]";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "rowmap failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let (path, command) = args
        .split_first()
        .ok_or_else(|| OrmError::Config(USAGE.to_string()))?;
    let settings = Settings::load(path)?;
    let database = Database::open(settings.location()?)?;
    let mapping = database.map(&settings.schema)?;
    mapping.create_table()?;

    match command {
        [] => {}
        [verb, payload] if verb == "insert" => {
            let fields: BTreeMap<String, Value> = serde_json::from_str(payload)?;
            let mut record = mapping.create(fields.iter().map(|(k, v)| (k.as_str(), v.clone())))?;
            record.save()?;
        }
        _ => return Err(OrmError::Config(USAGE.to_string())),
    }

    for record in mapping.get_all_objects()? {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
