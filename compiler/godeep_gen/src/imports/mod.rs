//! Import aliases for the generated file.
//!
//! Every package referenced from generated code gets exactly one local
//! alias, and every alias names exactly one package. The first package to
//! claim a name keeps it; later packages with the same name fall back to
//! their flattened import path.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Default)]
pub struct ImportTable {
    /// Import path to alias, ordered by path for emission.
    by_path: BTreeMap<String, String>,
    /// Alias to import path.
    by_alias: FxHashMap<String, String>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The alias for the package at `path` whose declared name is `name`,
    /// assigning one on first use.
    pub fn alias_for(&mut self, path: &str, name: &str) -> &str {
        if !self.by_path.contains_key(path) {
            let alias = self.fresh_alias(path, name);
            self.by_alias.insert(alias.clone(), path.to_owned());
            self.by_path.insert(path.to_owned(), alias);
        }
        self.by_path.get(path).map_or("", String::as_str)
    }

    fn fresh_alias(&self, path: &str, name: &str) -> String {
        if !name.is_empty() && !self.by_alias.contains_key(name) {
            return name.to_owned();
        }
        let flat = flatten_path(path);
        if !self.by_alias.contains_key(&flat) {
            return flat;
        }
        (2..)
            .map(|n| format!("{flat}{n}"))
            .find(|alias| !self.by_alias.contains_key(alias))
            .unwrap_or(flat)
    }

    #[cfg(test)]
    pub(crate) fn alias(&self, path: &str) -> Option<&str> {
        self.by_path.get(path).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn path(&self, alias: &str) -> Option<&str> {
        self.by_alias.get(alias).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// `(path, alias)` pairs sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_path
            .iter()
            .map(|(path, alias)| (path.as_str(), alias.as_str()))
    }

    /// The import spec line for one entry: the alias is written only when
    /// it differs from the last path segment.
    pub fn spec_line(path: &str, alias: &str) -> String {
        let last = path.rsplit('/').next().unwrap_or(path);
        if last == alias {
            format!("{path:?}")
        } else {
            format!("{alias} {path:?}")
        }
    }
}

/// `github.com/a/b-c` becomes `github_com_a_b_c`.
pub fn flatten_path(path: &str) -> String {
    let mut flat: String = path
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if flat.is_empty() || flat.starts_with(|c: char| c.is_ascii_digit()) {
        flat.insert(0, '_');
    }
    flat
}
