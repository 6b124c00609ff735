//! Mercurial repository detection and operations

use std::path::{Path, PathBuf};

use super::fingerprint::RevisionFingerprint;
use super::runner::HgRunner;
use crate::{Error, Result};

/// Revision used when the caller does not name one
pub const DEFAULT_REVISION: &str = "default";

/// Where to synchronize from, where to, and at which revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySpec {
    /// Source repository URI or local path
    pub source: String,
    /// Destination working copy directory
    pub dest: PathBuf,
    /// Changeset id, branch or tag to end up at
    pub revision: String,
}

impl RepositorySpec {
    /// Create a spec targeting the `default` branch
    pub fn new(source: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            revision: DEFAULT_REVISION.to_string(),
        }
    }

    /// Target a specific revision
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// Reject specs that cannot be synchronized
    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(Error::Config("Source repository must not be empty".to_string()));
        }
        if self.dest.as_os_str().is_empty() {
            return Err(Error::Config("Destination path must not be empty".to_string()));
        }
        if self.revision.trim().is_empty() {
            return Err(Error::Config("Revision must not be empty".to_string()));
        }
        // hg would parse these as options
        if self.source.starts_with('-') {
            return Err(Error::Config(format!(
                "Source repository must not start with '-': {}",
                self.source
            )));
        }
        if self.revision.starts_with('-') {
            return Err(Error::Config(format!(
                "Revision must not start with '-': {}",
                self.revision
            )));
        }
        Ok(())
    }
}

/// A Mercurial working copy driven through an [`HgRunner`]
pub struct HgRepo<'a> {
    runner: &'a dyn HgRunner,
    spec: &'a RepositorySpec,
}

impl std::fmt::Debug for HgRepo<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HgRepo")
            .field("program", &self.runner.program())
            .field("spec", &self.spec)
            .finish()
    }
}

impl<'a> HgRepo<'a> {
    /// Bind a runner to a repository spec
    pub fn new(runner: &'a dyn HgRunner, spec: &'a RepositorySpec) -> Self {
        Self { runner, spec }
    }

    /// Destination working copy directory
    pub fn dest(&self) -> &Path {
        &self.spec.dest
    }

    /// Path to the repository-local config file
    pub fn hgrc_path(&self) -> PathBuf {
        hgrc_path(&self.spec.dest)
    }

    /// Whether a repository already exists at the destination
    pub fn exists(&self) -> bool {
        is_hg_repo(&self.spec.dest)
    }

    /// Current branch, changeset id and tags of the working copy
    pub fn fingerprint(&self) -> Result<RevisionFingerprint> {
        let output = self.run(&["id", "-b", "-i", "-t"], true)?;
        Ok(RevisionFingerprint::new(output))
    }

    /// Full 40-character changeset id of the working copy parent
    pub fn full_id(&self) -> Result<String> {
        let output = self.run(&["--debug", "id", "-i"], true)?;
        Ok(output.trim().to_string())
    }

    /// Whether the working copy already sits on the requested changeset
    ///
    /// Only a revision that looks like a changeset hash can match; branch
    /// names, tags and revision numbers always need a pull.
    pub fn at_revision(&self) -> Result<bool> {
        let revision = self.spec.revision.trim();
        if !looks_like_changeset(revision) {
            return Ok(false);
        }
        let current = self.full_id()?;
        Ok(current.starts_with(&revision.to_ascii_lowercase()))
    }

    /// `hg clone <source> <dest> -r <revision>`
    pub fn clone_from_source(&self) -> Result<()> {
        let args = vec![
            "clone".to_string(),
            self.spec.source.clone(),
            self.dest_arg(),
            "-r".to_string(),
            self.spec.revision.clone(),
        ];
        self.runner.run_checked(&args)?;
        Ok(())
    }

    /// Pull history for the requested revision from the source
    pub fn pull(&self) -> Result<()> {
        let spec = self.spec;
        self.run(&["pull", "-r", spec.revision.as_str(), spec.source.as_str()], true)?;
        Ok(())
    }

    /// Update the working copy to the tip of its branch
    pub fn update(&self) -> Result<()> {
        self.run(&["update"], true)?;
        Ok(())
    }

    /// Update to the current revision, discarding uncommitted changes
    pub fn force_update(&self) -> Result<()> {
        self.run(&["update", "-C", "-r", "."], true)?;
        Ok(())
    }

    /// Update the working copy to the requested revision
    pub fn switch_revision(&self) -> Result<()> {
        self.run(&["update", "-r", self.spec.revision.as_str()], true)?;
        Ok(())
    }

    /// Paths of files present in the working copy but not tracked
    pub fn untracked_files(&self) -> Result<Vec<String>> {
        let output = self.run(&["status", "-u", "-n"], true)?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Delete untracked files; needs the purge extension enabled
    pub fn purge(&self) -> Result<()> {
        self.run(&["purge"], true)?;
        Ok(())
    }

    fn dest_arg(&self) -> String {
        self.spec.dest.to_string_lossy().to_string()
    }

    /// Run a subcommand against the destination repository
    fn run(&self, args: &[&str], in_repo: bool) -> Result<String> {
        let mut full: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        if in_repo {
            full.push("-R".to_string());
            full.push(self.dest_arg());
        }
        Ok(self.runner.run_checked(&full)?.stdout)
    }
}

/// Path of the repository-local config file under `dest`
pub fn hgrc_path(dest: &Path) -> PathBuf {
    dest.join(".hg").join("hgrc")
}

/// Check if `dest` holds a Mercurial repository
///
/// Looks for `.hg/hgrc`, which `hg clone` always writes.
pub fn is_hg_repo(dest: impl AsRef<Path>) -> bool {
    hgrc_path(dest.as_ref()).is_file()
}

fn looks_like_changeset(revision: &str) -> bool {
    revision.len() >= 7 && revision.len() <= 40 && revision.chars().all(|c| c.is_ascii_hexdigit())
}
