//! The loaded package graph.

use std::path::PathBuf;
#[cfg(test)]
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::{Idx, PkgId, Pool};

/// One package of the program.
#[derive(Clone, Debug)]
pub struct Package {
    /// Import path; empty for the universe block.
    pub path: String,
    /// Declared package name, or a guess from the path for opaque packages.
    pub name: String,
    /// Source directory; `None` for opaque packages and the universe.
    pub dir: Option<PathBuf>,
    /// Source not available: names resolve to opaque named types.
    pub opaque: bool,
    pub(crate) scope: FxHashMap<String, Idx>,
    /// Integer constants, for array lengths in importing packages.
    pub(crate) consts: FxHashMap<String, i128>,
}

impl Package {
    pub(crate) fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Package {
            path: path.into(),
            name: name.into(),
            dir: None,
            opaque: false,
            scope: FxHashMap::default(),
            consts: FxHashMap::default(),
        }
    }

    /// Package-scope type name lookup. Aliases are already resolved to the
    /// type they denote.
    pub fn lookup(&self, name: &str) -> Option<Idx> {
        self.scope.get(name).copied()
    }

    /// Declared type names, sorted.
    #[cfg(test)]
    pub(crate) fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scope.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Every package reachable from the target, with their shared type pool.
#[derive(Debug)]
pub struct Program {
    pub(crate) pool: Pool,
    pub(crate) packages: Vec<Package>,
    pub(crate) target: PkgId,
}

impl Program {
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// The package named on the command line.
    pub fn target(&self) -> PkgId {
        self.target
    }

    #[inline]
    pub fn package(&self, id: PkgId) -> &Package {
        &self.packages[id.index()]
    }

    pub fn lookup(&self, pkg: PkgId, name: &str) -> Option<Idx> {
        self.package(pkg).lookup(name)
    }

    /// All packages with their ids, universe first.
    pub fn packages(&self) -> impl Iterator<Item = (PkgId, &Package)> {
        self.packages.iter().enumerate().map(|(i, pkg)| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "package count is bounded by the pool"
            )]
            let id = PkgId(i as u32);
            (id, pkg)
        })
    }

    /// The package loaded from `dir`, if any.
    #[cfg(test)]
    pub(crate) fn package_at(&self, dir: &Path) -> Option<PkgId> {
        self.packages()
            .find(|(_, pkg)| pkg.dir.as_deref() == Some(dir))
            .map(|(id, _)| id)
    }
}
