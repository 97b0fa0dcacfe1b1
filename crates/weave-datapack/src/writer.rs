//! Serialization of an output tree into a datapack data directory

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;
use weave_compiler::{FunctionId, OutputTree};

use crate::discover::namespaces;
use crate::{DatapackError, Result, FUNCTIONS_DIR, FUNCTION_EXTENSION};

/// `tags/functions/<name>.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<bool>,
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
}

impl TagFile {
    /// Append string values not already present
    pub fn merge(&mut self, values: &[String]) {
        for value in values {
            let value = serde_json::Value::String(value.clone());
            if !self.values.contains(&value) {
                self.values.push(value);
            }
        }
    }
}

/// What a write produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub functions: usize,
    pub tags: usize,
    pub copied: usize,
}

pub struct DatapackWriter {
    out: PathBuf,
}

impl DatapackWriter {
    pub fn new(out: impl Into<PathBuf>) -> Self {
        Self { out: out.into() }
    }

    pub fn out(&self) -> &Path {
        &self.out
    }

    /// Write a whole tree, copying non-function resources from `source`
    pub fn write(&self, tree: &OutputTree, source: Option<&Path>) -> Result<WriteSummary> {
        fs::create_dir_all(&self.out)?;
        let mut summary = WriteSummary::default();

        if let Some(source) = source {
            summary.copied = self.copy_resources(source)?;
        }

        for namespace in tree.namespaces() {
            let functions = self.out.join(namespace).join(FUNCTIONS_DIR);
            if functions.exists() {
                log::debug!("clearing {}", functions.display());
                fs::remove_dir_all(&functions)?;
            }
        }

        for snippet in &tree.snippets {
            let path = self.function_path(&snippet.id)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, snippet.content())?;
            summary.functions += 1;
        }

        for (tag, values) in &tree.tags {
            let id = FunctionId::parse(tag).ok_or_else(|| DatapackError::InvalidPath(tag.clone()))?;
            let path = self.tag_path(&id)?;
            let mut file = if path.is_file() {
                let text = fs::read_to_string(&path)?;
                serde_json::from_str::<TagFile>(&text)
                    .map_err(|source| DatapackError::InvalidTag { path: path.clone(), source })?
            } else {
                TagFile::default()
            };
            file.merge(values);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, serde_json::to_string_pretty(&file)?)?;
            summary.tags += 1;
        }

        log::info!(
            "wrote {} function(s) and {} tag(s) to {}",
            summary.functions,
            summary.tags,
            self.out.display()
        );
        Ok(summary)
    }

    /// Copy every namespace sub-directory except `functions`; returns files copied
    pub fn copy_resources(&self, source: &Path) -> Result<usize> {
        let mut copied = 0;
        let out = self.out.canonicalize().unwrap_or_else(|_| self.out.clone());
        for namespace in namespaces(source)? {
            let from_namespace = source.join(&namespace);
            let resolved = from_namespace
                .canonicalize()
                .unwrap_or_else(|_| from_namespace.clone());
            if out.starts_with(&resolved) {
                continue;
            }
            for entry in fs::read_dir(&from_namespace)? {
                let entry = entry?;
                if !entry.file_type()?.is_dir() || entry.file_name() == FUNCTIONS_DIR {
                    continue;
                }
                let from = entry.path();
                let to = self.out.join(&namespace).join(entry.file_name());
                copied += copy_dir(&from, &to)?;
            }
        }
        Ok(copied)
    }

    fn function_path(&self, id: &FunctionId) -> Result<PathBuf> {
        file_path(self.out.join(&id.namespace).join(FUNCTIONS_DIR), id, FUNCTION_EXTENSION)
    }

    fn tag_path(&self, id: &FunctionId) -> Result<PathBuf> {
        file_path(self.out.join(&id.namespace).join("tags").join(FUNCTIONS_DIR), id, "json")
    }
}

/// `<base>/<path>.<extension>`, rejecting ids that escape their directory
fn file_path(mut base: PathBuf, id: &FunctionId, extension: &str) -> Result<PathBuf> {
    let safe = |part: &str| !part.is_empty() && part != "." && part != ".." && !part.contains(['/', '\\']);
    let parts: Vec<&str> = id.path.split('/').collect();
    if !safe(&id.namespace) || !parts.iter().all(|p| safe(p)) {
        return Err(DatapackError::InvalidPath(id.to_string()));
    }
    let (last, dirs) = parts
        .split_last()
        .ok_or_else(|| DatapackError::InvalidPath(id.to_string()))?;
    for dir in dirs {
        base.push(dir);
    }
    base.push(format!("{last}.{extension}"));
    Ok(base)
}

fn copy_dir(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(from) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| DatapackError::InvalidPath(entry.path().display().to_string()))?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
