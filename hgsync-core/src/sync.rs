//! Clone-or-update synchronization of a working copy
//!
//! A run either clones the source into an empty destination, or cleans,
//! pulls and updates an existing working copy. Both paths then switch to
//! the requested revision, and the fingerprints taken before and after
//! decide whether anything changed. Every failing `hg` call aborts the run.

use serde::{Deserialize, Serialize};

use crate::cleanup::{cleanup, CleanupOptions};
use crate::hg::{HgRepo, HgRunner, RepositorySpec, RevisionFingerprint};
use crate::phase::{StateMachine, SyncPhase};
use crate::Result;

/// Knobs for a synchronization run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Cleanup steps to run on an existing working copy
    pub cleanup: CleanupOptions,
    /// Clone when the destination has no repository
    pub clone: bool,
    /// Pull and update an existing repository, and switch after cloning
    pub update: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            cleanup: CleanupOptions::default(),
            clone: true,
            update: true,
        }
    }
}

/// Structured outcome handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Fingerprint before the run, empty after a fresh clone
    pub before: String,
    /// Fingerprint after the run
    pub after: String,
    /// Whether the working copy changed
    pub changed: bool,
    /// Whether local modifications or untracked files were removed
    pub cleaned: bool,
}

impl SyncResult {
    /// Compare fingerprints and fold in the cleanup flag
    pub fn detect(before: RevisionFingerprint, after: RevisionFingerprint, cleaned: bool) -> Self {
        let changed = before != after || cleaned;
        Self {
            before: before.into(),
            after: after.into(),
            changed,
            cleaned,
        }
    }
}

/// Drives one clone-or-update run against a destination
pub struct Synchronizer<'a> {
    runner: &'a dyn HgRunner,
    spec: RepositorySpec,
    options: SyncOptions,
}

impl<'a> Synchronizer<'a> {
    /// Create a synchronizer with default options
    pub fn new(runner: &'a dyn HgRunner, spec: RepositorySpec) -> Self {
        Self {
            runner,
            spec,
            options: SyncOptions::default(),
        }
    }

    /// Use the given options
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the synchronization
    pub fn run(&self) -> Result<SyncResult> {
        self.spec.validate()?;

        let mut phases = SyncPhase::machine();
        match self.drive(&mut phases) {
            Ok(result) => {
                tracing::info!(
                    dest = %self.spec.dest.display(),
                    before = %result.before,
                    after = %result.after,
                    changed = result.changed,
                    cleaned = result.cleaned,
                    "Synchronization finished"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(
                    dest = %self.spec.dest.display(),
                    phase = ?phases.current_phase(),
                    error = %e,
                    "Synchronization failed"
                );
                phases.force_phase(SyncPhase::Failed);
                Err(e)
            }
        }
    }

    fn drive(&self, phases: &mut StateMachine<SyncPhase>) -> Result<SyncResult> {
        let repo = HgRepo::new(self.runner, &self.spec);
        let mut before = RevisionFingerprint::empty();
        let mut cleaned = false;

        if !repo.exists() {
            if !self.options.clone {
                tracing::info!(
                    dest = %self.spec.dest.display(),
                    "No repository at destination and cloning is disabled"
                );
                phases.transition_to(SyncPhase::Done)?;
                return Ok(SyncResult::detect(before.clone(), before, false));
            }

            tracing::info!(
                source = %self.spec.source,
                dest = %self.spec.dest.display(),
                revision = %self.spec.revision,
                "Cloning repository"
            );
            repo.clone_from_source()?;
            phases.transition_to(SyncPhase::Cloned)?;
        } else if !self.options.update {
            let current = repo.fingerprint()?;
            phases.transition_to(SyncPhase::Done)?;
            return Ok(SyncResult::detect(current.clone(), current, false));
        } else {
            before = repo.fingerprint()?;

            cleaned = cleanup(&repo, self.options.cleanup)?.cleaned();
            phases.transition_to(SyncPhase::Cleaned)?;

            if repo.at_revision()? {
                tracing::info!(
                    revision = %self.spec.revision,
                    "Already at requested changeset, skipping pull"
                );
            } else {
                repo.pull()?;
                phases.transition_to(SyncPhase::Pulled)?;

                repo.update()?;
                phases.transition_to(SyncPhase::Updated)?;
            }
        }

        if self.options.update {
            repo.switch_revision()?;
            phases.transition_to(SyncPhase::Switched)?;
        }

        let after = repo.fingerprint()?;
        phases.transition_to(SyncPhase::Done)?;

        Ok(SyncResult::detect(before, after, cleaned))
    }
}
