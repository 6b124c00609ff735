//! Sync command - Clone or update a Mercurial working copy

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use hgsync_core::{
    CleanupOptions, Config, ProcessRunner, RepositorySpec, SyncOptions, SyncResult, Synchronizer,
};

/// How to print the result
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// One JSON object on stdout
    #[default]
    Json,
    /// Human-readable lines
    Text,
}

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Source repository URL or local path
    #[arg(long, visible_alias = "source")]
    pub repo: String,

    /// Destination directory for the working copy
    #[arg(long)]
    pub dest: PathBuf,

    /// Changeset id, branch or tag to synchronize to
    #[arg(long, default_value = hgsync_core::hg::DEFAULT_REVISION)]
    pub revision: String,

    /// Discard uncommitted local modifications (overrides config, normally true)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub force: Option<bool>,

    /// Delete untracked files before pulling (overrides config, normally false)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub purge: Option<bool>,

    /// Do nothing if the destination has no repository
    #[arg(long)]
    pub no_clone: bool,

    /// Leave an existing working copy untouched
    #[arg(long)]
    pub no_update: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl SyncArgs {
    /// Execute the sync command
    ///
    /// Returns whether the run succeeded; failures are reported on stdout
    /// in the selected format.
    pub fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<bool> {
        let dest = if self.dest.is_absolute() {
            self.dest.clone()
        } else {
            std::env::current_dir()?.join(&self.dest)
        };

        let options = self.options(config);

        if verbose {
            tracing::info!(
                repo = %self.repo,
                dest = %dest.display(),
                revision = %self.revision,
                options = ?options,
                "Starting hgsync run"
            );
        }

        let spec = RepositorySpec::new(&self.repo, dest).with_revision(&self.revision);
        let runner = ProcessRunner::new().with_executable(&config.hg.executable);

        match Synchronizer::new(&runner, spec).with_options(options).run() {
            Ok(result) => {
                self.print_result(&result)?;
                Ok(true)
            }
            Err(e) => {
                self.print_failure(&e.to_string())?;
                Ok(false)
            }
        }
    }

    /// Run options; cleanup flags come from `config`, which already
    /// carries `--force`/`--purge`
    pub fn options(&self, config: &Config) -> SyncOptions {
        SyncOptions {
            cleanup: CleanupOptions {
                force: config.defaults.force,
                purge: config.defaults.purge,
            },
            clone: !self.no_clone,
            update: !self.no_update,
        }
    }

    fn print_result(&self, result: &SyncResult) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(result)?),
            OutputFormat::Text => {
                println!("before:  {}", display_or_none(&result.before));
                println!("after:   {}", display_or_none(&result.after));
                println!("changed: {}", result.changed);
                println!("cleaned: {}", result.cleaned);
            }
        }
        Ok(())
    }

    fn print_failure(&self, msg: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let failure = serde_json::json!({ "failed": true, "msg": msg });
                println!("{}", serde_json::to_string(&failure)?);
            }
            OutputFormat::Text => println!("failed: {}", msg),
        }
        Ok(())
    }
}

fn display_or_none(fingerprint: &str) -> &str {
    if fingerprint.is_empty() {
        "(none)"
    } else {
        fingerprint
    }
}
