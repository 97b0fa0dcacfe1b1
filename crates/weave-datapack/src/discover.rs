//! Source discovery

use std::fs;
use std::path::Path;

use walkdir::WalkDir;
use weave_compiler::SourceUnit;

use crate::{DatapackError, Result, FUNCTIONS_DIR, FUNCTION_EXTENSION};

/// Every `<root>/<namespace>/functions/**/*.mcfunction`, sorted
pub fn discover(root: &Path) -> Result<Vec<SourceUnit>> {
    let mut units = Vec::new();
    for namespace in namespaces(root)? {
        let functions = root.join(&namespace).join(FUNCTIONS_DIR);
        if !functions.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&functions).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|s| s.to_str()) != Some(FUNCTION_EXTENSION)
            {
                continue;
            }
            let relative = path
                .strip_prefix(&functions)
                .map_err(|_| DatapackError::InvalidPath(path.display().to_string()))?
                .with_extension("");
            let parts = relative
                .components()
                .map(|c| {
                    c.as_os_str()
                        .to_str()
                        .ok_or_else(|| DatapackError::InvalidPath(path.display().to_string()))
                })
                .collect::<Result<Vec<_>>>()?;
            let text = fs::read_to_string(path)?;
            units.push(SourceUnit::new(namespace.clone(), parts.join("/"), text));
        }
    }
    log::debug!("discovered {} source file(s) under {}", units.len(), root.display());
    Ok(units)
}

/// Names of the namespace directories directly under `root`, sorted
pub fn namespaces(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry
            .file_name()
            .into_string()
            .map_err(|name| DatapackError::InvalidPath(name.to_string_lossy().to_string()))?;
        names.push(name);
    }
    names.sort();
    Ok(names)
}
