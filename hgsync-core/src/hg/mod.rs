//! Mercurial operations for hgsync
//!
//! This module provides repository detection, the `hg` command runner,
//! working copy fingerprints and hgrc editing.

mod fingerprint;
mod hgrc;
mod repo;
mod runner;

pub use fingerprint::{RevisionFingerprint, DIRTY_MARKER};
pub use hgrc::{AppliedPatch, ConfigEntry, ConfigPatch, HgrcDocument};
pub use repo::{hgrc_path, is_hg_repo, HgRepo, RepositorySpec, DEFAULT_REVISION};
pub use runner::{CommandOutput, HgRunner, ProcessRunner};
