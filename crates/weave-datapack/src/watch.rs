//! Rebuild-on-change file watching

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::{DatapackError, Result};

/// Quiet period that ends a burst of events
const SETTLE: Duration = Duration::from_millis(150);

/// Watches a source tree, ignoring changes under the given paths
pub struct SourceWatcher {
    root: PathBuf,
    ignored: Vec<PathBuf>,
    events: Receiver<notify::Result<Event>>,
    _watcher: RecommendedWatcher,
}

impl SourceWatcher {
    pub fn new(root: &Path, ignored: Vec<PathBuf>) -> Result<Self> {
        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        let ignored = ignored
            .into_iter()
            .map(|path| path.canonicalize().unwrap_or(path))
            .collect();
        Ok(Self {
            root: root.canonicalize().unwrap_or_else(|_| root.to_path_buf()),
            ignored,
            events: rx,
            _watcher: watcher,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Block until a relevant change, then collect the rest of its burst
    pub fn wait(&self) -> Result<Vec<PathBuf>> {
        let mut changed = Vec::new();
        while changed.is_empty() {
            let event = self.events.recv().map_err(|_| DatapackError::Disconnected)?;
            self.collect(event, &mut changed);
        }
        loop {
            match self.events.recv_timeout(SETTLE) {
                Ok(event) => self.collect(event, &mut changed),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return Err(DatapackError::Disconnected),
            }
        }
        changed.sort();
        changed.dedup();
        Ok(changed)
    }

    fn collect(&self, event: notify::Result<Event>, changed: &mut Vec<PathBuf>) {
        match event {
            Ok(event) => changed.extend(relevant_paths(&event, &self.ignored)),
            Err(err) => log::warn!("watch error: {err}"),
        }
    }
}

/// Changed paths of an event that should trigger a rebuild
pub fn relevant_paths(event: &Event, ignored: &[PathBuf]) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => event
            .paths
            .iter()
            .filter(|path| !ignored.iter().any(|ignored| path.starts_with(ignored)))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    #[test]
    fn output_changes_are_ignored() {
        let event = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/pack/demo/functions/main.mcfunction"))
            .add_path(PathBuf::from("/pack/out/demo/functions/main.mcfunction"));
        let paths = relevant_paths(&event, &[PathBuf::from("/pack/out")]);
        assert_eq!(paths, vec![PathBuf::from("/pack/demo/functions/main.mcfunction")]);
    }

    #[test]
    fn access_events_are_ignored() {
        let event = Event::new(EventKind::Access(AccessKind::Any)).add_path(PathBuf::from("/pack/a"));
        assert!(relevant_paths(&event, &[]).is_empty());
        let event = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/pack/a"));
        assert_eq!(relevant_paths(&event, &[]).len(), 1);
    }
}
