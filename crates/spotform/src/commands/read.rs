use anyhow::Context;
use colored::Colorize;
use serde::de::DeserializeOwned;
use spotform_core::{FieldRegistry, Reconciler};
use std::path::Path;

pub fn handle<R>(
    registry: &FieldRegistry<R>,
    remote: &Path,
    config: Option<&Path>,
) -> anyhow::Result<()>
where
    R: Default + DeserializeOwned,
{
    let content = std::fs::read_to_string(remote)
        .with_context(|| format!("failed to read {}", remote.display()))?;
    let remote_object: R = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a {} object", remote.display(), registry.name()))?;

    let mut handle = match config {
        Some(path) => super::decode_config(registry, Some(path))?,
        None => registry.handle(),
    };
    Reconciler::new(registry).on_read(&remote_object, &mut handle)?;

    if config.is_some() {
        let drifted: Vec<_> = registry
            .field_names()
            .into_iter()
            .filter(|name| handle.has_change(name))
            .collect();
        for name in &drifted {
            eprintln!("{} {}", "~".yellow().bold(), name.as_str().yellow());
        }
        if drifted.is_empty() {
            eprintln!("{} {}", "✓".green().bold(), "in sync".green());
        }
    }

    super::print_json(handle.observed())
}
