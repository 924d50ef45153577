use std::path::Path;

use anyhow::Result;

use corral_types::ProjectRoot;

use super::root::load_root;
use super::ExitStatus;

/// Prints the recorded constraint and override (if any) for a single
/// import path, straight out of the parsed root manifest. Entirely
/// offline: no version list or source is consulted.
pub(crate) fn require(workspace_root: &Path, import_path: &str) -> Result<ExitStatus> {
    let (_, manifest, _) = load_root(workspace_root)?;
    let project = ProjectRoot::new(import_path);

    let constraint = manifest.dependency_constraints.get(&project);
    let override_ = manifest.overrides.get(&project);

    if constraint.is_none() && override_.is_none() {
        println!("{import_path}: no recorded constraint or override");
        return Ok(ExitStatus::UserError);
    }

    if let Some(props) = constraint {
        println!("{import_path}: constraint {}", props.constraint);
    }
    if let Some(props) = override_ {
        print!("{import_path}: override {}", props.constraint);
        match &props.source {
            Some(source) => println!(" from {source}"),
            None => println!(),
        }
    }
    Ok(ExitStatus::Success)
}
