//! Markdown documents on disk, keyed by `(content type, slug)`

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::types::{ContentType, Frontmatter, FrontmatterValue};

const EXTENSION: &str = "md";

/// File-backed store of synced documents, one directory per content type
#[derive(Debug, Clone)]
pub struct ContentStore {
    posts_dir: PathBuf,
    pages_dir: PathBuf,
}

impl ContentStore {
    pub fn new(posts_dir: impl Into<PathBuf>, pages_dir: impl Into<PathBuf>) -> Self {
        Self {
            posts_dir: posts_dir.into(),
            pages_dir: pages_dir.into(),
        }
    }

    /// Output directory for a content type
    pub fn dir(&self, kind: ContentType) -> &Path {
        match kind {
            ContentType::Post => &self.posts_dir,
            ContentType::Page => &self.pages_dir,
        }
    }

    /// Create both output directories. Failure here is fatal for a sync run.
    pub fn create_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.posts_dir)?;
        fs::create_dir_all(&self.pages_dir)?;
        Ok(())
    }

    /// Path of the document for `slug`
    pub fn path_for(&self, kind: ContentType, slug: &str) -> Result<PathBuf> {
        validate_slug(slug)?;
        Ok(self.dir(kind).join(format!("{}.{}", slug, EXTENSION)))
    }

    /// Write (or overwrite) a document. Identical input gives identical bytes.
    pub fn write(
        &self,
        kind: ContentType,
        slug: &str,
        frontmatter: &Frontmatter,
        body: &str,
    ) -> Result<PathBuf> {
        let path = self.path_for(kind, slug)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, render_document(frontmatter, body))?;
        Ok(path)
    }

    /// Slugs of all documents currently on disk for a content type
    pub fn list_slugs(&self, kind: ContentType) -> Result<BTreeSet<String>> {
        let entries = match fs::read_dir(self.dir(kind)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };

        let mut slugs = BTreeSet::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                slugs.insert(stem.to_string());
            }
        }
        Ok(slugs)
    }

    /// Remove a document; returns whether a file was actually deleted
    pub fn delete(&self, kind: ContentType, slug: &str) -> Result<bool> {
        let path = self.path_for(kind, slug)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reject slugs that would escape the output directory
fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty()
        || slug == "."
        || slug == ".."
        || slug.contains(['/', '\\', '\0'])
    {
        return Err(SyncError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Serialize frontmatter and body into the on-disk document format:
///
/// ```text
/// ---
/// title: "Hello"
/// draft: false
/// categories:
///   - 1
/// ---
///
/// body
/// ```
pub fn render_document(frontmatter: &Frontmatter, body: &str) -> String {
    let mut out = String::from("---\n");
    for (key, value) in frontmatter.iter() {
        match value {
            FrontmatterValue::List(items) => {
                let _ = writeln!(out, "{}:", key);
                for item in items {
                    let _ = writeln!(out, "  - {}", item);
                }
            }
            FrontmatterValue::String(s) => {
                let _ = writeln!(out, "{}: {}", key, quote(s));
            }
            FrontmatterValue::Bool(b) => {
                let _ = writeln!(out, "{}: {}", key, b);
            }
            FrontmatterValue::Integer(n) => {
                let _ = writeln!(out, "{}: {}", key, n);
            }
        }
    }
    out.push_str("---\n\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// YAML double-quoted scalar
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
