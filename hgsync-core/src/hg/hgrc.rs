//! Repository-local `.hg/hgrc` editing
//!
//! The file is parsed into sections and `key = value` entries and written
//! back whole. Lines the parser does not interpret (comments, blank lines,
//! `%include` directives, continuation lines) are preserved verbatim.

use std::path::{Path, PathBuf};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Section(String),
    Entry { key: String, value: String, raw: String },
    Raw(String),
}

impl Line {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        // Indented lines continue the previous value
        if raw.starts_with(char::is_whitespace) && !trimmed.is_empty() {
            return Line::Raw(raw.to_string());
        }

        if trimmed.is_empty() || trimmed.starts_with(['#', ';', '%']) {
            return Line::Raw(raw.to_string());
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return Line::Section(name.trim().to_string());
        }

        match raw.split_once('=') {
            Some((key, value)) => Line::Entry {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
                raw: raw.to_string(),
            },
            None => Line::Raw(raw.to_string()),
        }
    }

    fn entry(key: &str, value: &str) -> Self {
        let raw = if value.is_empty() {
            format!("{} =", key)
        } else {
            format!("{} = {}", key, value)
        };
        Line::Entry {
            key: key.to_string(),
            value: value.to_string(),
            raw,
        }
    }

    fn render(&self) -> String {
        match self {
            Line::Section(name) => format!("[{}]", name),
            Line::Entry { raw, .. } => raw.clone(),
            Line::Raw(raw) => raw.clone(),
        }
    }
}

/// Parsed hgrc file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HgrcDocument {
    lines: Vec<Line>,
}

impl HgrcDocument {
    /// Parse hgrc text
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(Line::parse).collect(),
        }
    }

    /// Read and parse a file; a missing file is an empty document
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the whole document back to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render())?;
        Ok(())
    }

    /// Render the document as hgrc text
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.render());
            out.push('\n');
        }
        out
    }

    /// Section name governing each line (`None` before the first header)
    fn sections(&self) -> Vec<Option<&str>> {
        let mut current = None;
        self.lines
            .iter()
            .map(|line| {
                if let Line::Section(name) = line {
                    current = Some(name.as_str());
                }
                current
            })
            .collect()
    }

    /// Value of `key` in `section`; the last definition wins, as in hg
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let sections = self.sections();
        self.lines
            .iter()
            .zip(sections)
            .filter_map(|(line, sec)| match line {
                Line::Entry { key: k, value, .. } if sec == Some(section) && k == key => {
                    Some(value.as_str())
                }
                _ => None,
            })
            .last()
    }

    /// Set `key` in `section`, creating the section if needed
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let existing = {
            let sections = self.sections();
            self.lines
                .iter()
                .zip(&sections)
                .rposition(|(line, sec)| {
                    matches!(line, Line::Entry { key: k, .. } if k == key) && *sec == Some(section)
                })
        };
        if let Some(idx) = existing {
            self.lines[idx] = Line::entry(key, value);
            return;
        }

        let header = self
            .lines
            .iter()
            .rposition(|l| matches!(l, Line::Section(name) if name == section));
        if let Some(idx) = header {
            self.lines.insert(idx + 1, Line::entry(key, value));
            return;
        }

        if !self.lines.is_empty() && !self.is_blank_tail() {
            self.lines.push(Line::Raw(String::new()));
        }
        self.lines.push(Line::Section(section.to_string()));
        self.lines.push(Line::entry(key, value));
    }

    fn is_blank_tail(&self) -> bool {
        matches!(self.lines.last(), Some(Line::Raw(raw)) if raw.trim().is_empty())
    }
}

/// A single `[section] key = value` line in an hgrc
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub section: String,
    pub key: String,
    pub value: String,
}

impl ConfigEntry {
    /// Create an entry
    pub fn new(section: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// `[extensions] purge =`, which makes `hg purge` available
    pub fn purge_extension() -> Self {
        Self::new("extensions", "purge", "")
    }
}

/// A pending, reversible edit of an hgrc file
#[derive(Debug, Clone)]
pub struct ConfigPatch {
    path: PathBuf,
    entry: ConfigEntry,
}

impl ConfigPatch {
    /// Describe an edit that sets `entry` in the file at `path`
    pub fn new(path: impl Into<PathBuf>, entry: ConfigEntry) -> Self {
        Self {
            path: path.into(),
            entry,
        }
    }

    /// Write the entry to the file, remembering its exact prior bytes
    pub fn apply(self) -> Result<AppliedPatch> {
        let original = match std::fs::read(&self.path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let text = original
            .as_deref()
            .map(String::from_utf8_lossy)
            .unwrap_or_default();
        let mut doc = HgrcDocument::parse(&text);
        doc.set(&self.entry.section, &self.entry.key, &self.entry.value);
        doc.save(&self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            section = %self.entry.section,
            key = %self.entry.key,
            "Applied hgrc patch"
        );

        Ok(AppliedPatch {
            patch: self,
            original,
        })
    }
}

/// An hgrc edit that has been written and must be reverted
#[derive(Debug)]
#[must_use = "an applied patch stays in the hgrc until reverted"]
pub struct AppliedPatch {
    patch: ConfigPatch,
    /// File content before the edit; `None` when there was no file
    original: Option<Vec<u8>>,
}

impl AppliedPatch {
    /// The path of the edited file
    pub fn path(&self) -> &Path {
        &self.patch.path
    }

    /// Restore the file byte for byte to its state before [`ConfigPatch::apply`]
    pub fn revert(self) -> Result<()> {
        match &self.original {
            Some(bytes) => std::fs::write(&self.patch.path, bytes)?,
            None => std::fs::remove_file(&self.patch.path)?,
        }

        tracing::debug!(path = %self.patch.path.display(), "Reverted hgrc patch");
        Ok(())
    }
}
