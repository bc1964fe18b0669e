use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use spotform_core::{FieldRegistry, Reconciler};
use std::path::Path;

pub fn handle<R>(
    registry: &FieldRegistry<R>,
    config: &Path,
    state: Option<&Path>,
) -> anyhow::Result<()>
where
    R: Default + Serialize,
{
    let mut handle = super::decode_config(registry, Some(config))?;

    if let Some(state) = state {
        let document = spotform_config::load_document(state)?;
        let observed = registry
            .decode_config(&document)
            .with_context(|| format!("invalid state in {}", state.display()))?;
        handle.load_observed(observed.desired().clone())?;
    }

    let plan = Reconciler::new(registry).on_update(&handle)?;
    if plan.has_changes {
        eprintln!("{} {}", "~".yellow().bold(), plan.summary().yellow());
    } else {
        eprintln!("{} {}", "✓".green().bold(), plan.summary().green());
    }
    super::print_json(&plan)
}
