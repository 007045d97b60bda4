//! Shader source catalog and fetcher for fragview.
//!
//! This crate is the provider half of the renderer's seam: it maps
//! human-facing shader names to opaque [`ShaderRef`]s and fetches the text
//! behind a reference on demand. The renderer never looks inside a
//! reference; the two shapes this catalog produces are plain file paths and
//! `http(s)://` URLs, both served by [`SourceClient`].

mod fetch;

pub use fetch::SourceClient;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use renderer::ShaderRef;
use tracing::debug;

/// Static name → reference table for the shaders a session may display.
///
/// Names are stored sorted so rotation order is stable across runs.
#[derive(Clone, Debug, Default)]
pub struct ShaderCatalog {
    entries: BTreeMap<String, ShaderRef>,
}

impl ShaderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from every `*.frag` file directly inside `dir`.
    /// Names are the file stems.
    pub fn discover(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            bail!("shader directory '{}' does not exist", dir.display());
        }

        let mut entries = BTreeMap::new();
        let listing = std::fs::read_dir(dir)
            .with_context(|| format!("reading shader directory '{}'", dir.display()))?;
        for entry in listing {
            let entry = entry
                .with_context(|| format!("listing shader directory '{}'", dir.display()))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("frag") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            debug!(name = stem, path = %path.display(), "catalogued shader");
            entries.insert(
                stem.to_string(),
                ShaderRef::new(path.to_string_lossy().into_owned()),
            );
        }

        Ok(Self { entries })
    }

    pub fn insert(&mut self, name: impl Into<String>, reference: ShaderRef) {
        self.entries.insert(name.into(), reference);
    }

    /// Looks up the loadable reference behind a catalogued name.
    pub fn resolve(&self, name: &str) -> Option<&ShaderRef> {
        self.entries.get(name)
    }

    /// Catalogued names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_frag_files_only() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("plasma.frag"), "void main() {}").unwrap();
        std::fs::write(temp.path().join("waves.frag"), "void main() {}").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "not a shader").unwrap();

        let catalog = ShaderCatalog::discover(temp.path()).expect("discover shaders");
        assert_eq!(catalog.names(), vec!["plasma", "waves"]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn resolve_returns_the_file_reference() {
        let temp = tempfile::tempdir().unwrap();
        let shader_path = temp.path().join("rings.frag");
        std::fs::write(&shader_path, "void main() {}").unwrap();

        let catalog = ShaderCatalog::discover(temp.path()).unwrap();
        let reference = catalog.resolve("rings").expect("rings is catalogued");
        assert_eq!(reference.as_str(), shader_path.to_string_lossy());
        assert!(catalog.resolve("missing").is_none());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let gone = temp.path().join("nope");
        assert!(ShaderCatalog::discover(&gone).is_err());
    }

    #[test]
    fn empty_directory_yields_empty_catalog() {
        let temp = tempfile::tempdir().unwrap();
        let catalog = ShaderCatalog::discover(temp.path()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn inserted_entries_resolve() {
        let mut catalog = ShaderCatalog::new();
        catalog.insert("remote", ShaderRef::new("https://example.com/remote.frag"));
        assert_eq!(
            catalog.resolve("remote").map(ShaderRef::as_str),
            Some("https://example.com/remote.frag")
        );
    }
}
