//! Ordered registry of candidates and their discovery lineage.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("unknown parent candidate: {0}")]
    UnknownParent(String),
}

/// One root candidate with its discovered children, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateNode {
    pub id: String,
    pub children: Vec<String>,
}

/// Ordered tree of candidate ids.
///
/// Root order is attempt priority; child order is discovery order. Child
/// lists are append-only within a run: embed discovery can happen
/// incrementally as different pages of a source are scraped, and a later
/// batch extends rather than replaces the earlier one.
#[derive(Debug, Default)]
pub struct CandidateTree {
    roots: Vec<String>,
    children: HashMap<String, Vec<String>>,
}

impl CandidateTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the run's top-level candidates, replacing any prior tree.
    pub fn register_roots(&mut self, ids: Vec<String>) {
        self.children = ids.iter().map(|id| (id.clone(), Vec::new())).collect();
        self.roots = ids;
    }

    /// Append children under a known candidate.
    ///
    /// A child id belongs to exactly one parent: ids the tree already knows
    /// are dropped with a warning instead of being re-homed.
    pub fn attach_children(
        &mut self,
        parent_id: &str,
        child_ids: Vec<String>,
    ) -> Result<(), TreeError> {
        if !self.contains(parent_id) {
            return Err(TreeError::UnknownParent(parent_id.to_string()));
        }
        let fresh: Vec<String> = child_ids
            .into_iter()
            .filter(|child| {
                if self.contains(child) {
                    warn!(candidate = %child, parent = parent_id, "duplicate embed discovery dropped");
                    false
                } else {
                    true
                }
            })
            .collect();
        for child in &fresh {
            self.children.insert(child.clone(), Vec::new());
        }
        if let Some(siblings) = self.children.get_mut(parent_id) {
            siblings.extend(fresh);
        }
        Ok(())
    }

    /// Whether `id` was registered as a root or attached as a child.
    pub fn contains(&self, id: &str) -> bool {
        self.children.contains_key(id)
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Ordered snapshot: every root with its children.
    pub fn snapshot(&self) -> Vec<CandidateNode> {
        self.roots
            .iter()
            .map(|id| CandidateNode {
                id: id.clone(),
                children: self.children_of(id).to_vec(),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.roots.clear();
        self.children.clear();
    }
}
