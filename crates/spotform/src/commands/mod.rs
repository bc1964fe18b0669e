mod diff;
mod plan;
mod read;
mod schema;

use crate::Commands;
use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use spotform_core::{ConfigHandle, FieldRegistry};
use std::path::Path;

/// Run a subcommand against one resource registry
pub fn run<R>(registry: &'static FieldRegistry<R>, command: &Commands) -> anyhow::Result<()>
where
    R: Default + Serialize + DeserializeOwned,
{
    match command {
        Commands::Plan { config, .. } => plan::handle(registry, config.as_deref()),
        Commands::Diff { config, state, .. } => diff::handle(registry, config, state.as_deref()),
        Commands::Read { remote, config, .. } => read::handle(registry, remote, config.as_deref()),
        Commands::Schema { .. } => schema::handle(registry),
    }
}

/// Load and decode a configuration document against the registry schema
fn decode_config<R>(
    registry: &FieldRegistry<R>,
    explicit: Option<&Path>,
) -> anyhow::Result<ConfigHandle> {
    let path = spotform_config::find_config_file(explicit)?;
    let document = spotform_config::load_document(&path)?;
    registry
        .decode_config(&document)
        .with_context(|| format!("invalid {} configuration in {}", registry.name(), path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
