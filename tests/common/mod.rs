//! Shared fixture for integration tests.
//!
//! Repositories are built with git2 inside a `TempDir`, so the tests do not
//! depend on a git binary being installed. Commit times advance by one
//! minute per commit to keep ancestry ordering deterministic.

#![allow(dead_code)]

use std::cell::Cell;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use repolens::Repository;

/// A scratch repository on disk.
pub struct TestRepo {
    dir: TempDir,
    repo: git2::Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    /// Repository on `master` with `a.txt` = "first line\n" committed.
    pub fn new() -> Self {
        let fixture = Self::empty();
        fixture.commit_file("a.txt", "first line\n", "Initial commit");
        fixture
    }

    /// Repository on an unborn `master`.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head("master");
        let repo = git2::Repository::init_opts(dir.path(), &opts).expect("git init failed");
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        Self {
            dir,
            repo,
            clock: Cell::new(1_600_000_000),
        }
    }

    /// Working directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a working-tree file.
    pub fn file(&self, path: &str) -> PathBuf {
        self.path().join(path)
    }

    pub fn git(&self) -> &git2::Repository {
        &self.repo
    }

    /// Open the façade on this repository.
    pub fn open(&self) -> Repository {
        Repository::open(self.path()).expect("failed to open test repo")
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.file(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    pub fn remove(&self, path: &str) {
        std::fs::remove_file(self.file(path)).unwrap();
    }

    /// Stage one path with git2.
    pub fn stage(&self, path: &str) {
        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
    }

    fn signature(&self) -> git2::Signature<'static> {
        let now = self.clock.get() + 60;
        self.clock.set(now);
        git2::Signature::new("Test User", "test@example.com", &git2::Time::new(now, 0)).unwrap()
    }

    fn head_commit(&self) -> Option<git2::Commit<'_>> {
        self.repo.head().ok().and_then(|h| h.peel_to_commit().ok())
    }

    /// Stage every change in the working tree and commit it on HEAD.
    pub fn commit_all(&self, message: &str) -> git2::Oid {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let parent = self.head_commit();
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let sig = self.signature();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Write, stage and commit one file.
    pub fn commit_file(&self, path: &str, content: &str, message: &str) -> git2::Oid {
        self.write(path, content);
        self.commit_all(message)
    }

    /// Commit with explicit parents and HEAD's tree, without moving any ref.
    pub fn raw_commit(&self, parents: &[git2::Oid], message: &str) -> git2::Oid {
        let tree = match self.head_commit() {
            Some(commit) => commit.tree().unwrap(),
            None => {
                let empty = self.repo.treebuilder(None).unwrap().write().unwrap();
                self.repo.find_tree(empty).unwrap()
            }
        };
        let parents: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|id| self.repo.find_commit(*id).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
        let sig = self.signature();
        self.repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    /// Point a ref at a commit, creating it if needed.
    pub fn set_ref(&self, name: &str, id: git2::Oid) {
        self.repo.reference(name, id, true, "test").unwrap();
    }

    /// Create a branch at HEAD.
    pub fn branch(&self, name: &str) {
        let head = self.head_commit().expect("HEAD has no commit");
        self.repo.branch(name, &head, false).unwrap();
    }

    /// Check out an existing branch with git2, forcing.
    pub fn switch(&self, name: &str) {
        let refname = format!("refs/heads/{name}");
        let tree = self
            .repo
            .find_reference(&refname)
            .unwrap()
            .peel_to_tree()
            .unwrap();
        let mut builder = git2::build::CheckoutBuilder::new();
        builder.force();
        self.repo
            .checkout_tree(tree.as_object(), Some(&mut builder))
            .unwrap();
        self.repo.set_head(&refname).unwrap();
    }

    /// Add an `origin` remote and make `origin/<branch>` the upstream of
    /// `branch`, pointing at `target`.
    pub fn set_upstream(&self, branch: &str, target: git2::Oid) {
        if self.repo.find_remote("origin").is_err() {
            self.repo
                .remote("origin", "https://example.invalid/repo.git")
                .unwrap();
        }
        self.set_ref(&format!("refs/remotes/origin/{branch}"), target);
        let mut config = self.repo.config().unwrap();
        config
            .set_str(&format!("branch.{branch}.remote"), "origin")
            .unwrap();
        config
            .set_str(
                &format!("branch.{branch}.merge"),
                &format!("refs/heads/{branch}"),
            )
            .unwrap();
    }

    /// Append a pattern to `.git/info/exclude`.
    pub fn exclude(&self, pattern: &str) {
        let path = self.repo.path().join("info").join("exclude");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut existing = std::fs::read_to_string(&path).unwrap_or_default();
        existing.push_str(pattern);
        existing.push('\n');
        std::fs::write(path, existing).unwrap();
    }

    /// Full name of the ref HEAD points at.
    pub fn head_name(&self) -> String {
        self.repo.head().unwrap().name().unwrap().to_string()
    }
}
