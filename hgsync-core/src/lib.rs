//! hgsync Core - Core library for synchronizing Mercurial working copies
//!
//! This crate clones a Mercurial repository into a destination directory, or
//! brings an existing working copy up to date with its source, and reports
//! whether the working copy changed.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod hg;
pub mod phase;
pub mod sync;

pub use cleanup::{CleanupOptions, CleanupReport, DiscardOutcome};
pub use config::Config;
pub use error::{Error, Result};
pub use hg::{HgRepo, HgRunner, ProcessRunner, RepositorySpec, RevisionFingerprint};
pub use phase::SyncPhase;
pub use sync::{SyncOptions, SyncResult, Synchronizer};
