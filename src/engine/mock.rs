//! engine::mock
//!
//! In-memory object store for engine unit tests.
//!
//! Commits come from a [`MemGraph`]; every commit in it shares the single
//! tree held by the mock, so "the HEAD tree" is simply `files_in_tree`.
//! Safe checkouts can be made to fail to simulate a dirty working tree.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::core::diff::{DiffStats, TextDiff, WhitespaceMode};
use crate::core::revwalk::testing::MemGraph;
use crate::core::revwalk::{CommitGraph, CommitNode};
use crate::core::status::{StatusFlags, StatusOptions};
use crate::core::types::{BranchName, ObjectId, RefName};
use crate::git::{
    CheckoutStrategy, FileMode, HeadState, IndexEntry, ObjectStore, StoreError, TreeEntry,
    WorkdirChange,
};

/// Recorded mutating calls, for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    CreateBranch(String),
    SetHead(String),
    CheckoutTree(CheckoutStrategy),
    CheckoutHead(Option<String>, CheckoutStrategy),
    Add(String),
}

#[derive(Debug)]
pub struct MockStore {
    pub graph: MemGraph,
    pub work_dir: Option<PathBuf>,
    pub git_dir: PathBuf,
    pub head: RefCell<Option<HeadState>>,
    /// Ref name to commit
    pub refs: RefCell<BTreeMap<String, ObjectId>>,
    /// Local branch ref to upstream ref
    pub upstreams: HashMap<String, String>,
    /// Path to content, in the shared commit tree
    pub tree: HashMap<String, (ObjectId, FileMode)>,
    /// Path to blob id in the index
    pub index: HashMap<String, (ObjectId, FileMode)>,
    pub blobs: HashMap<ObjectId, Vec<u8>>,
    pub workdir: HashMap<String, Vec<u8>>,
    pub statuses: Vec<(String, StatusFlags)>,
    pub changes: Vec<WorkdirChange>,
    /// Safe checkouts fail with a conflict
    pub dirty: bool,
    /// Every store call fails
    pub broken: bool,
    pub last_status_options: RefCell<Option<StatusOptions>>,
    pub operations: RefCell<Vec<MockOperation>>,
    next_blob: u32,
}

impl Default for MockStore {
    fn default() -> Self {
        Self {
            graph: MemGraph::default(),
            work_dir: Some(PathBuf::from("/work")),
            git_dir: PathBuf::from("/work/.git"),
            head: RefCell::new(None),
            refs: RefCell::new(BTreeMap::new()),
            upstreams: HashMap::new(),
            tree: HashMap::new(),
            index: HashMap::new(),
            blobs: HashMap::new(),
            workdir: HashMap::new(),
            statuses: Vec::new(),
            changes: Vec::new(),
            dirty: false,
            broken: false,
            last_status_options: RefCell::new(None),
            operations: RefCell::new(Vec::new()),
            next_blob: 0,
        }
    }
}

impl MockStore {
    /// Store with commit 1 on `refs/heads/master`, checked out.
    pub fn on_master() -> Self {
        let mut store = Self::default();
        store.graph.add(1, &[], 100);
        store.set_ref("refs/heads/master", crate::core::revwalk::testing::oid(1));
        *store.head.borrow_mut() = Some(HeadState::Branch(RefName::new("refs/heads/master").unwrap()));
        store
    }

    pub fn set_ref(&self, name: &str, id: ObjectId) {
        self.refs.borrow_mut().insert(name.to_string(), id);
    }

    pub fn add_blob(&mut self, content: &[u8]) -> ObjectId {
        self.next_blob += 1;
        let mut bytes = [0xbb; 20];
        bytes[16..].copy_from_slice(&self.next_blob.to_be_bytes());
        let id = ObjectId::from_bytes(&bytes).unwrap();
        self.blobs.insert(id, content.to_vec());
        id
    }

    pub fn commit_file(&mut self, path: &str, content: &[u8]) -> ObjectId {
        let id = self.add_blob(content);
        self.tree.insert(path.to_string(), (id, FileMode::Blob));
        self.index.insert(path.to_string(), (id, FileMode::Blob));
        self.workdir.insert(path.to_string(), content.to_vec());
        id
    }

    pub fn stage_file(&mut self, path: &str, content: &[u8]) {
        let id = self.add_blob(content);
        self.index.insert(path.to_string(), (id, FileMode::Blob));
    }

    pub fn operations(&self) -> Vec<MockOperation> {
        self.operations.borrow().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.broken {
            return Err(StoreError::Internal {
                message: "mock store is broken".to_string(),
            });
        }
        Ok(())
    }

    fn record(&self, op: MockOperation) {
        self.operations.borrow_mut().push(op);
    }
}

impl CommitGraph for MockStore {
    type Error = StoreError;

    fn commit(&self, id: &ObjectId) -> Result<CommitNode, StoreError> {
        self.check()?;
        self.graph.commit(id).map_err(|missing| StoreError::ObjectNotFound {
            oid: missing.0.to_hex(),
        })
    }
}

impl ObjectStore for MockStore {
    fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn head(&self) -> Result<Option<HeadState>, StoreError> {
        self.check()?;
        Ok(self.head.borrow().clone())
    }

    fn head_commit(&self) -> Result<Option<ObjectId>, StoreError> {
        self.resolve_ref("HEAD")
    }

    fn resolve_ref(&self, refname: &str) -> Result<Option<ObjectId>, StoreError> {
        self.check()?;
        if refname == "HEAD" {
            return match self.head.borrow().as_ref() {
                Some(HeadState::Branch(name)) => Ok(self.refs.borrow().get(name.as_str()).copied()),
                Some(HeadState::Detached(id)) => Ok(Some(*id)),
                None => Ok(None),
            };
        }
        Ok(self.refs.borrow().get(refname).copied())
    }

    fn reference_target(&self, refname: &str) -> Result<Option<ObjectId>, StoreError> {
        self.resolve_ref(refname)
    }

    fn reference_names(&self) -> Result<Vec<String>, StoreError> {
        self.check()?;
        Ok(self.refs.borrow().keys().cloned().collect())
    }

    fn create_branch(&self, name: &BranchName, target: &ObjectId) -> Result<RefName, StoreError> {
        self.check()?;
        let refname = RefName::for_branch(name);
        if self.refs.borrow().contains_key(refname.as_str()) {
            return Err(StoreError::Conflict {
                message: format!("{refname} already exists"),
            });
        }
        self.set_ref(refname.as_str(), *target);
        self.record(MockOperation::CreateBranch(refname.to_string()));
        Ok(refname)
    }

    fn set_head(&self, refname: &RefName) -> Result<(), StoreError> {
        self.check()?;
        *self.head.borrow_mut() = Some(HeadState::Branch(refname.clone()));
        self.record(MockOperation::SetHead(refname.to_string()));
        Ok(())
    }

    fn upstream_of(&self, refname: &RefName) -> Result<Option<RefName>, StoreError> {
        self.check()?;
        Ok(self
            .upstreams
            .get(refname.as_str())
            .map(|u| RefName::new(u.as_str()))
            .transpose()?)
    }

    fn peel_to_tree(&self, refname: &RefName) -> Result<ObjectId, StoreError> {
        let commit = self
            .resolve_ref(refname.as_str())?
            .ok_or_else(|| StoreError::RefNotFound {
                refname: refname.to_string(),
            })?;
        Ok(self.commit(&commit)?.tree)
    }

    fn tree_entry(&self, _tree: &ObjectId, path: &str) -> Result<Option<TreeEntry>, StoreError> {
        self.check()?;
        Ok(self
            .tree
            .get(path)
            .map(|(id, mode)| TreeEntry { id: *id, mode: *mode }))
    }

    fn blob(&self, id: &ObjectId) -> Result<Vec<u8>, StoreError> {
        self.check()?;
        self.blobs.get(id).cloned().ok_or_else(|| StoreError::ObjectNotFound {
            oid: id.to_hex(),
        })
    }

    fn index_entry(&self, path: &str) -> Result<Option<IndexEntry>, StoreError> {
        self.check()?;
        Ok(self.index.get(path).map(|(id, mode)| IndexEntry {
            path: path.to_string(),
            id: *id,
            mode: *mode,
        }))
    }

    fn add_to_index(&self, path: &str) -> Result<(), StoreError> {
        self.check()?;
        if !self.workdir.contains_key(path) {
            return Err(StoreError::PathNotFound {
                path: path.to_string(),
            });
        }
        self.record(MockOperation::Add(path.to_string()));
        Ok(())
    }

    fn refresh_index(&self) -> Result<(), StoreError> {
        self.check()
    }

    fn is_ignored(&self, path: &str) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self
            .statuses
            .iter()
            .any(|(p, f)| p == path && f.contains(StatusFlags::IGNORED)))
    }

    fn statuses(&self, options: &StatusOptions) -> Result<Vec<(String, StatusFlags)>, StoreError> {
        self.check()?;
        *self.last_status_options.borrow_mut() = Some(options.clone());
        Ok(self
            .statuses
            .iter()
            .filter(|(_, flags)| options.include_ignored || !flags.contains(StatusFlags::IGNORED))
            .filter(|(_, flags)| options.include_untracked || !flags.contains(StatusFlags::WT_NEW))
            .filter(|(path, _)| {
                options.pathspecs.is_empty()
                    || options
                        .pathspecs
                        .iter()
                        .any(|spec| path.starts_with(spec.trim_end_matches('*')))
            })
            .cloned()
            .collect())
    }

    fn status_file(&self, path: &str) -> Result<StatusFlags, StoreError> {
        self.check()?;
        Ok(self
            .statuses
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, f)| *f)
            .unwrap_or_default())
    }

    fn workdir_changes(&self, _tree: &ObjectId) -> Result<Vec<WorkdirChange>, StoreError> {
        self.check()?;
        Ok(self.changes.clone())
    }

    fn workdir_line_stats(&self, _tree: &ObjectId, path: &str) -> Result<DiffStats, StoreError> {
        self.check()?;
        let old = match self.tree.get(path) {
            Some((id, _)) => self.blobs.get(id).cloned().unwrap_or_default(),
            None => Vec::new(),
        };
        let new = self.workdir.get(path).cloned().unwrap_or_default();
        Ok(TextDiff::compute(&old, &new, WhitespaceMode::Exact).stats())
    }

    fn checkout_head(&self, path: Option<&str>, strategy: CheckoutStrategy) -> Result<(), StoreError> {
        self.check()?;
        self.record(MockOperation::CheckoutHead(path.map(String::from), strategy));
        Ok(())
    }

    fn checkout_tree(&self, _tree: &ObjectId, strategy: CheckoutStrategy) -> Result<(), StoreError> {
        self.check()?;
        if self.dirty && strategy == CheckoutStrategy::Safe {
            return Err(StoreError::Conflict {
                message: "1 conflict prevents checkout".to_string(),
            });
        }
        self.record(MockOperation::CheckoutTree(strategy));
        Ok(())
    }

    fn config_string(&self, _key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(None)
    }

    fn set_config_string(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        self.check()
    }
}
