use colored::Colorize;
use serde::Serialize;
use spotform_core::{FieldRegistry, Reconciler};
use std::path::Path;

pub fn handle<R>(registry: &FieldRegistry<R>, config: Option<&Path>) -> anyhow::Result<()>
where
    R: Default + Serialize,
{
    let handle = super::decode_config(registry, config)?;
    let payload = Reconciler::new(registry).on_create(None, &handle)?;

    eprintln!("{} {} create payload", "✓".green().bold(), registry.name().cyan());
    super::print_json(&payload)
}
