use std::collections::{HashMap, HashSet};

use crate::error::{AnalysisConfigError, Result};

/// Stable handle of a process inside its [`ProcessIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessKey(pub(crate) usize);

/// A physics process classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    pub name: String,
    pub id: u64,
    pub label: Option<String>,
    parents: Vec<ProcessKey>,
    children: Vec<ProcessKey>,
}

impl Process {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
            label: None,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn parents(&self) -> &[ProcessKey] {
        &self.parents
    }

    pub fn children(&self) -> &[ProcessKey] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Unique-by-name collection of processes and their parent/child links.
#[derive(Debug, Clone, Default)]
pub struct ProcessIndex {
    processes: Vec<Process>,
    names: HashMap<String, ProcessKey>,
}

impl ProcessIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a process, dropping any links it carries from another index.
    pub fn add_process(&mut self, mut process: Process) -> Result<ProcessKey> {
        if self.names.contains_key(&process.name) {
            return Err(AnalysisConfigError::DuplicateProcess { name: process.name });
        }
        process.parents.clear();
        process.children.clear();

        let key = ProcessKey(self.processes.len());
        self.names.insert(process.name.clone(), key);
        self.processes.push(process);
        Ok(key)
    }

    /// Make `child` a subprocess of `parent`. Linking twice is a no-op.
    pub fn add_child(&mut self, parent: ProcessKey, child: ProcessKey) -> Result<()> {
        if parent == child || self.is_ancestor(child, parent) {
            return Err(AnalysisConfigError::InvalidProcessLink {
                parent: self.processes[parent.0].name.clone(),
                child: self.processes[child.0].name.clone(),
            });
        }
        if !self.processes[parent.0].children.contains(&child) {
            self.processes[parent.0].children.push(child);
            self.processes[child.0].parents.push(parent);
        }
        Ok(())
    }

    pub fn key(&self, name: &str) -> Option<ProcessKey> {
        self.names.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Process> {
        self.key(name).map(|key| &self.processes[key.0])
    }

    pub fn require(&self, name: &str) -> Result<ProcessKey> {
        self.key(name)
            .ok_or_else(|| AnalysisConfigError::ProcessNotFound {
                name: name.to_string(),
            })
    }

    pub fn process(&self, key: ProcessKey) -> &Process {
        &self.processes[key.0]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Processes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ProcessKey, &Process)> {
        self.processes
            .iter()
            .enumerate()
            .map(|(i, p)| (ProcessKey(i), p))
    }

    /// Processes without parents, in insertion order.
    pub fn roots(&self) -> Vec<ProcessKey> {
        self.iter()
            .filter(|(_, p)| p.is_root())
            .map(|(key, _)| key)
            .collect()
    }

    /// Topmost ancestors of a process; the process itself when it has no parents.
    pub fn root_processes(&self, key: ProcessKey) -> Vec<ProcessKey> {
        let mut roots = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![key];

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let process = &self.processes[current.0];
            if process.is_root() {
                roots.push(current);
            } else {
                stack.extend(process.parents.iter().rev().copied());
            }
        }

        roots
    }

    /// Depth-first pre-order walk over the subprocesses of `key`.
    ///
    /// Yields each reachable process once together with its depth relative to
    /// `key` (0 for `key` itself, which is only yielded when `include_self`).
    pub fn walk(&self, key: ProcessKey, include_self: bool) -> Vec<(ProcessKey, usize)> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![(key, 0usize)];

        while let Some((current, depth)) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if current != key || include_self {
                out.push((current, depth));
            }
            let children = &self.processes[current.0].children;
            stack.extend(children.iter().rev().map(|&c| (c, depth + 1)));
        }

        out
    }

    fn is_ancestor(&self, candidate: ProcessKey, of: ProcessKey) -> bool {
        let mut stack = vec![of];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == candidate {
                return true;
            }
            if seen.insert(current) {
                stack.extend(self.processes[current.0].parents.iter().copied());
            }
        }
        false
    }

    /// Copy the given processes into a new index.
    ///
    /// Links are kept only when both ends are part of the selection. Duplicate
    /// keys are ignored; order follows first appearance.
    pub fn subset(&self, keys: impl IntoIterator<Item = ProcessKey>) -> ProcessIndex {
        let mut out = ProcessIndex::new();
        let mut mapping: HashMap<ProcessKey, ProcessKey> = HashMap::new();

        for key in keys {
            if mapping.contains_key(&key) {
                continue;
            }
            let process = &self.processes[key.0];
            let new_key = ProcessKey(out.processes.len());
            out.names.insert(process.name.clone(), new_key);
            out.processes.push(Process {
                parents: Vec::new(),
                children: Vec::new(),
                ..process.clone()
            });
            mapping.insert(key, new_key);
        }

        for (&old, &new) in &mapping {
            let children: Vec<_> = self.processes[old.0]
                .children
                .iter()
                .filter_map(|c| mapping.get(c).copied())
                .collect();
            out.processes[new.0].children = children;
            let parents: Vec<_> = self.processes[old.0]
                .parents
                .iter()
                .filter_map(|p| mapping.get(p).copied())
                .collect();
            out.processes[new.0].parents = parents;
        }

        out
    }

    /// Register `name` and its whole subtree from `source`, keeping links.
    ///
    /// Processes already present are left untouched.
    pub fn extend_from(&mut self, source: &ProcessIndex, name: &str) -> Result<usize> {
        let root = source.require(name)?;
        let mut added = 0;

        let walked = source.walk(root, true);
        for &(key, _) in &walked {
            let process = source.process(key);
            if !self.contains(&process.name) {
                self.add_process(process.clone())?;
                added += 1;
            }
        }
        for &(key, _) in &walked {
            let process = source.process(key);
            let parent = self.require(&process.name)?;
            for &child in process.children() {
                let child = self.require(&source.process(child).name)?;
                self.add_child(parent, child)?;
            }
        }

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tt_index() -> ProcessIndex {
        let mut index = ProcessIndex::new();
        let tt = index.add_process(Process::new("tt", 1000)).unwrap();
        let sl = index.add_process(Process::new("tt_sl", 1100)).unwrap();
        let dl = index.add_process(Process::new("tt_dl", 1200)).unwrap();
        index.add_process(Process::new("st", 2000)).unwrap();
        index.add_child(tt, sl).unwrap();
        index.add_child(tt, dl).unwrap();
        index
    }

    #[test]
    fn duplicate_process_rejected() {
        let mut index = tt_index();
        let err = index.add_process(Process::new("tt", 1)).unwrap_err();
        assert!(matches!(err, AnalysisConfigError::DuplicateProcess { .. }));
    }

    #[test]
    fn roots_of_subprocess() {
        let index = tt_index();
        let sl = index.key("tt_sl").unwrap();
        let roots = index.root_processes(sl);
        assert_eq!(roots, vec![index.key("tt").unwrap()]);
        assert_eq!(index.roots().len(), 2);
    }

    #[test]
    fn walk_preorder_with_depth() {
        let index = tt_index();
        let tt = index.key("tt").unwrap();

        let names: Vec<_> = index
            .walk(tt, true)
            .into_iter()
            .map(|(k, d)| (index.process(k).name.as_str(), d))
            .collect();
        assert_eq!(names, vec![("tt", 0), ("tt_sl", 1), ("tt_dl", 1)]);
        assert_eq!(index.walk(tt, false).len(), 2);
    }

    #[test]
    fn subset_keeps_internal_links_only() {
        let index = tt_index();
        let keys = [index.key("tt_sl").unwrap(), index.key("tt").unwrap()];
        let sub = index.subset(keys);

        assert_eq!(sub.len(), 2);
        assert!(!sub.contains("tt_dl"));
        assert_eq!(sub.get("tt").unwrap().children().len(), 1);
        assert_eq!(sub.get("tt_sl").unwrap().parents().len(), 1);
    }

    #[test]
    fn cyclic_link_rejected() {
        let mut index = tt_index();
        let tt = index.key("tt").unwrap();
        let sl = index.key("tt_sl").unwrap();
        assert!(index.add_child(sl, tt).is_err());
        assert!(index.add_child(tt, tt).is_err());
    }

    #[test]
    fn extend_from_copies_subtree() {
        let source = tt_index();
        let mut target = ProcessIndex::new();
        assert_eq!(target.extend_from(&source, "tt").unwrap(), 3);
        assert_eq!(target.extend_from(&source, "tt").unwrap(), 0);
        assert_eq!(target.get("tt").unwrap().children().len(), 2);
        assert!(target.extend_from(&source, "missing").is_err());
    }
}
