//! In-memory stand-in for the `hg` executable
//!
//! Keeps just enough repository state (changeset, dirty flag, untracked
//! files) to answer the subcommands the synchronizer issues, and records
//! every invocation.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hgsync_core::hg::{CommandOutput, HgRunner, HgrcDocument};
use hgsync_core::Result;

pub const OLD_ID: &str = "1a2b3c4d5e6f";
pub const NEW_ID: &str = "9f8e7d6c5b4a";

#[derive(Debug, Clone)]
struct Local {
    id: String,
    pulled: Option<String>,
    dirty: bool,
    untracked: Vec<String>,
}

#[derive(Debug)]
struct State {
    local: Option<Local>,
    remote_id: String,
    sticky_dirty: bool,
    failures: HashMap<String, String>,
}

pub struct FakeHg {
    dest: PathBuf,
    state: RefCell<State>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl FakeHg {
    /// Destination without a repository; the remote is at `NEW_ID`
    pub fn empty(dest: &Path) -> Self {
        Self {
            dest: dest.to_path_buf(),
            state: RefCell::new(State {
                local: None,
                remote_id: NEW_ID.to_string(),
                sticky_dirty: false,
                failures: HashMap::new(),
            }),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Existing clean working copy at `local_id`, remote at `remote_id`
    pub fn existing(dest: &Path, local_id: &str, remote_id: &str) -> Self {
        let fake = Self::empty(dest);
        write_hgrc(dest, "https://example.com/r");
        {
            let mut state = fake.state.borrow_mut();
            state.remote_id = remote_id.to_string();
            state.local = Some(Local {
                id: local_id.to_string(),
                pulled: None,
                dirty: false,
                untracked: Vec::new(),
            });
        }
        fake
    }

    pub fn make_dirty(&self) {
        self.with_local(|l| l.dirty = true);
    }

    pub fn add_untracked(&self, file: &str) {
        self.with_local(|l| l.untracked.push(file.to_string()));
    }

    /// Forced updates leave the working copy modified
    pub fn keep_dirty(&self) {
        self.state.borrow_mut().sticky_dirty = true;
    }

    /// Make the given subcommand fail with `stderr`
    pub fn fail_on(&self, subcommand: &str, stderr: &str) {
        self.state
            .borrow_mut()
            .failures
            .insert(subcommand.to_string(), stderr.to_string());
    }

    pub fn untracked(&self) -> Vec<String> {
        self.state
            .borrow()
            .local
            .as_ref()
            .map(|l| l.untracked.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Number of invocations of `subcommand`
    pub fn count(&self, subcommand: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| subcommand_of(c) == subcommand)
            .count()
    }

    /// Number of `hg update` calls without `-r` or `-C`
    pub fn plain_updates(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| subcommand_of(c) == "update")
            .filter(|c| !c.iter().any(|a| a == "-r" || a == "-C"))
            .count()
    }

    /// Number of `hg update -C` calls
    pub fn forced_updates(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| subcommand_of(c) == "update" && c.iter().any(|a| a == "-C"))
            .count()
    }

    fn with_local(&self, f: impl FnOnce(&mut Local)) {
        let mut state = self.state.borrow_mut();
        f(state.local.as_mut().expect("no working copy"));
    }

    fn hgrc_path(&self) -> PathBuf {
        self.dest.join(".hg").join("hgrc")
    }

    fn handle(&self, args: &[String]) -> CommandOutput {
        let sub = subcommand_of(args).to_string();
        let mut state = self.state.borrow_mut();

        if let Some(stderr) = state.failures.get(&sub) {
            return CommandOutput::failed(stderr.clone());
        }

        let remote_id = state.remote_id.clone();
        let sticky_dirty = state.sticky_dirty;

        if sub == "clone" {
            write_hgrc(&self.dest, &args[1]);
            state.local = Some(Local {
                id: remote_id,
                pulled: None,
                dirty: false,
                untracked: Vec::new(),
            });
            return CommandOutput::ok("");
        }

        let Some(local) = state.local.as_mut() else {
            return CommandOutput::failed("abort: repository not found!");
        };

        match sub.as_str() {
            "id" if args[0] == "--debug" => {
                CommandOutput::ok(format!("{:0<40}\n", local.id))
            }
            "id" => {
                let marker = if local.dirty { "+" } else { "" };
                let tip = if local.id == remote_id { " tip" } else { "" };
                CommandOutput::ok(format!("{}{} default{}\n", local.id, marker, tip))
            }
            "pull" => {
                local.pulled = Some(remote_id);
                CommandOutput::ok("pulling from https://example.com/r\n")
            }
            "update" if args.iter().any(|a| a == "-C") => {
                local.dirty = sticky_dirty;
                CommandOutput::ok("1 files updated\n")
            }
            "update" => {
                if let Some(pulled) = &local.pulled {
                    local.id = pulled.clone();
                }
                CommandOutput::ok("0 files updated\n")
            }
            "status" => {
                let mut out = local.untracked.join("\n");
                if !out.is_empty() {
                    out.push('\n');
                }
                CommandOutput::ok(out)
            }
            "purge" => {
                let doc = HgrcDocument::load(&self.hgrc_path()).expect("read hgrc");
                if doc.get("extensions", "purge").is_none() {
                    return CommandOutput::failed("hg: unknown command 'purge'");
                }
                local.untracked.clear();
                CommandOutput::ok("")
            }
            other => CommandOutput::failed(format!("hg: unknown command '{}'", other)),
        }
    }
}

impl HgRunner for FakeHg {
    fn program(&self) -> &str {
        "hg"
    }

    fn run(&self, args: &[String]) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(args.to_vec());
        Ok(self.handle(args))
    }
}

fn subcommand_of(args: &[String]) -> &str {
    args.iter()
        .map(String::as_str)
        .find(|a| !a.starts_with("--"))
        .unwrap_or("")
}

fn write_hgrc(dest: &Path, source: &str) {
    std::fs::create_dir_all(dest.join(".hg")).unwrap();
    std::fs::write(
        dest.join(".hg").join("hgrc"),
        format!("[paths]\ndefault = {}\n", source),
    )
    .unwrap();
}

pub fn hgrc_text(dest: &Path) -> String {
    std::fs::read_to_string(dest.join(".hg").join("hgrc")).unwrap()
}
