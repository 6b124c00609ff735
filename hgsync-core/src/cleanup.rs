//! Working copy cleanup before pulling
//!
//! Discards uncommitted modifications and purges untracked files according
//! to [`CleanupOptions`].

use crate::hg::{AppliedPatch, ConfigEntry, ConfigPatch, HgRepo};
use crate::Result;

/// Which cleanup steps to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Discard uncommitted modifications to tracked files
    pub force: bool,
    /// Delete files not tracked by Mercurial
    pub purge: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            force: true,
            purge: false,
        }
    }
}

/// Outcome of the discard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardOutcome {
    /// Nothing to discard
    Clean,
    /// Modifications were discarded
    Discarded,
    /// A forced update ran but the working copy is still modified
    StillDirty,
}

impl DiscardOutcome {
    /// Whether the working copy was changed by discarding
    pub fn discarded(&self) -> bool {
        matches!(self, DiscardOutcome::Discarded)
    }
}

/// What the cleanup step did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    /// Discard outcome, `None` when `force` was off
    pub discard: Option<DiscardOutcome>,
    /// Whether untracked files were deleted
    pub purged: bool,
}

impl CleanupReport {
    /// Whether anything was discarded or purged
    pub fn cleaned(&self) -> bool {
        self.discard.is_some_and(|d| d.discarded()) || self.purged
    }
}

/// Run the cleanup steps selected by `options`
pub fn cleanup(repo: &HgRepo<'_>, options: CleanupOptions) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    if options.force {
        report.discard = Some(discard(repo)?);
    }

    if options.purge {
        report.purged = purge(repo)?;
    }

    Ok(report)
}

/// Throw away uncommitted modifications to tracked files
pub fn discard(repo: &HgRepo<'_>) -> Result<DiscardOutcome> {
    if !repo.fingerprint()?.is_dirty() {
        return Ok(DiscardOutcome::Clean);
    }

    repo.force_update()?;

    if repo.fingerprint()?.is_dirty() {
        tracing::warn!(
            dest = %repo.dest().display(),
            "Working copy still has local modifications after forced update"
        );
        return Ok(DiscardOutcome::StillDirty);
    }

    tracing::info!(dest = %repo.dest().display(), "Discarded local modifications");
    Ok(DiscardOutcome::Discarded)
}

/// Delete untracked files, enabling the purge extension just for the call
///
/// Returns whether any files were deleted. The hgrc is restored before
/// this returns, whichever way it returns.
pub fn purge(repo: &HgRepo<'_>) -> Result<bool> {
    let path = repo.hgrc_path();
    let patch = ConfigPatch::new(&path, ConfigEntry::purge_extension());
    let guard = PatchGuard::new(patch.apply()?);

    let purged = purge_untracked(repo);
    let reverted = guard.finish();

    // A purge failure wins over a revert failure, which is still logged
    match (purged, reverted) {
        (Err(e), Err(revert_err)) => {
            tracing::warn!("Failed to revert hgrc patch in {:?}: {}", path, revert_err);
            Err(e)
        }
        (Err(e), Ok(())) | (Ok(_), Err(e)) => Err(e),
        (Ok(purged), Ok(())) => Ok(purged),
    }
}

fn purge_untracked(repo: &HgRepo<'_>) -> Result<bool> {
    let untracked = repo.untracked_files()?;
    if untracked.is_empty() {
        return Ok(false);
    }

    repo.purge()?;
    tracing::info!(
        dest = %repo.dest().display(),
        files = untracked.len(),
        "Purged untracked files"
    );
    Ok(true)
}

/// Reverts an applied hgrc patch when dropped
struct PatchGuard(Option<AppliedPatch>);

impl PatchGuard {
    fn new(applied: AppliedPatch) -> Self {
        Self(Some(applied))
    }

    /// Revert now and report the outcome
    fn finish(mut self) -> Result<()> {
        match self.0.take() {
            Some(applied) => applied.revert(),
            None => Ok(()),
        }
    }
}

impl Drop for PatchGuard {
    fn drop(&mut self) {
        // Only reached without `finish`, i.e. while unwinding
        if let Some(applied) = self.0.take() {
            let path = applied.path().to_path_buf();
            if let Err(e) = applied.revert() {
                tracing::warn!("Failed to revert hgrc patch in {:?}: {}", path, e);
            }
        }
    }
}
