//! Package loading.
//!
//! Each package is loaded in phases: parse signatures, declare type names,
//! resolve imports (loading module-local ones recursively), resolve type
//! expressions, attach methods, reject invalid recursive types. Once the
//! target is loaded, generic instances get their substituted underlying
//! types.
//!
//! Imports outside the module are read from `vendor/`, `replace`
//! directories, the module cache and `GOROOT`. One that cannot be read is
//! opaque: the package exists, and every name referenced through it
//! becomes a named type with no known structure or methods.

mod constant;
mod module;
mod resolve;
mod universe;

use std::path::{Path, PathBuf};

use godeep_ir::ast::File;
use godeep_parse::{parse_source, ParseMode};
use rustc_hash::FxHashMap;

pub use module::{Module, ReplaceTarget, Replacement, Requirement};

use crate::{BuildContext, LoadError, Package, PkgId, Pool, Program, SourceTree};

/// Load the package in `dir` and everything it imports.
pub fn load_program<T: SourceTree + ?Sized>(tree: &T, dir: &Path) -> Result<Program, LoadError> {
    let module = Module::discover(tree, dir)?;
    Loader::new(tree, module, BuildContext::from_env()).load(dir)
}

/// One parsed file of a package.
struct SourceFile {
    path: PathBuf,
    text: String,
    ast: File,
}

pub struct Loader<'t, T: SourceTree + ?Sized> {
    tree: &'t T,
    context: BuildContext,
    module: Module,
    pool: Pool,
    packages: Vec<Package>,
    by_path: FxHashMap<String, PkgId>,
    /// Import paths being loaded, outermost first.
    loading: Vec<String>,
}

impl<'t, T: SourceTree + ?Sized> Loader<'t, T> {
    pub fn new(tree: &'t T, module: Module, context: BuildContext) -> Self {
        let mut pool = Pool::new();
        let universe = universe::universe(&mut pool);
        Loader {
            tree,
            context,
            module,
            pool,
            packages: vec![universe],
            by_path: FxHashMap::default(),
            loading: Vec::new(),
        }
    }

    /// Load the target package in `dir` and finish the type pool.
    pub fn load(mut self, dir: &Path) -> Result<Program, LoadError> {
        let path = self.module.import_path(dir).ok_or_else(|| {
            LoadError::failure(
                &dir.display().to_string(),
                format!("not inside module {}", self.module.path),
            )
        })?;
        let target = self.load_dir(dir, &path)?;
        self.pool.resolve_instances();
        tracing::debug!(
            packages = self.packages.len(),
            types = self.pool.len(),
            "program loaded"
        );
        Ok(Program {
            pool: self.pool,
            packages: self.packages,
            target,
        })
    }

    fn alloc(&mut self, package: Package) -> PkgId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "package count is bounded by the pool"
        )]
        let id = PkgId(self.packages.len() as u32);
        self.by_path.insert(package.path.clone(), id);
        self.packages.push(package);
        id
    }

    fn load_dir(&mut self, dir: &Path, path: &str) -> Result<PkgId, LoadError> {
        if let Some(&id) = self.by_path.get(path) {
            return Ok(id);
        }
        let sources = self.read_sources(dir, path)?;
        let Some(first) = sources.first() else {
            return Err(LoadError::EmptyPackageSet {
                path: path.to_owned(),
            });
        };
        let name = first.ast.package.name.clone();
        if let Some(other) = sources.iter().find(|src| src.ast.package.name != name) {
            return Err(LoadError::failure(
                path,
                format!(
                    "found packages {name} ({}) and {} ({}) in {}",
                    file_name(&first.path),
                    other.ast.package.name,
                    file_name(&other.path),
                    dir.display()
                ),
            ));
        }

        let mut package = Package::new(path, name);
        package.dir = Some(dir.to_path_buf());
        let id = self.alloc(package);
        self.loading.push(path.to_owned());
        let result = self.load_package(id, path, &sources);
        self.loading.pop();
        result?;
        tracing::debug!(path, files = sources.len(), "loaded package");
        Ok(id)
    }

    /// Parse the files of `dir` that take part in the build.
    fn read_sources(&self, dir: &Path, path: &str) -> Result<Vec<SourceFile>, LoadError> {
        let files = self
            .tree
            .files_in(dir)
            .map_err(|err| LoadError::failure(path, format!("cannot read {}: {err}", dir.display())))?;
        let mut sources = Vec::new();
        for file in files {
            let Some(name) = file.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if !name.ends_with(".go") || name.ends_with("_test.go") || name.starts_with(['_', '.']) {
                continue;
            }
            let text = self
                .tree
                .read_to_string(&file)
                .map_err(|err| LoadError::failure(path, format!("{}: {err}", file.display())))?;
            if !self.context.platform.includes(name, &text) {
                tracing::trace!(file = name, "excluded by build constraints");
                continue;
            }
            let ast = parse_source(&text, ParseMode::Signatures).map_err(|err| {
                LoadError::failure(
                    path,
                    format!("{}:{}: {err}", file.display(), err.span().line_col(&text)),
                )
            })?;
            sources.push(SourceFile {
                path: file,
                text,
                ast,
            });
        }
        Ok(sources)
    }

    /// Find or load the package with import path `path`.
    fn import(&mut self, path: &str) -> Result<PkgId, LoadError> {
        if let Some(pos) = self.loading.iter().position(|p| p == path) {
            let mut chain = self.loading[pos..].join(" -> ");
            chain.push_str(" -> ");
            chain.push_str(path);
            return Err(LoadError::failure(
                path,
                format!("import cycle not allowed: {chain}"),
            ));
        }
        if let Some(&id) = self.by_path.get(path) {
            return Ok(id);
        }
        if let Some(dir) = self.module.dir_of(path) {
            return self.load_dir(&dir, path);
        }
        // `unsafe` and cgo's `C` have no source to read.
        if path != "unsafe" && path != "C" {
            let dirs = self.module.external_dirs(path, &self.context);
            if let Some(dir) = dirs.into_iter().find(|dir| self.tree.is_dir(dir)) {
                return Ok(self.load_external(&dir, path));
            }
            tracing::debug!(path, "package source not found; opaque import");
        }
        Ok(self.opaque_package(path))
    }

    /// Load a package from outside the main module. One that fails to
    /// load is kept as an opaque package instead.
    fn load_external(&mut self, dir: &Path, path: &str) -> PkgId {
        match self.load_dir(dir, path) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(
                    path,
                    dir = %dir.display(),
                    error = %err,
                    "cannot load package; its types are copied shallowly"
                );
                self.opaque_package(path)
            }
        }
    }

    /// Mark `path` opaque, dropping whatever a failed load declared.
    fn opaque_package(&mut self, path: &str) -> PkgId {
        if let Some(&id) = self.by_path.get(path) {
            let package = &mut self.packages[id.index()];
            package.opaque = true;
            package.scope.clear();
            package.consts.clear();
            return id;
        }
        let mut package = Package::new(path, guess_package_name(path));
        package.opaque = true;
        self.alloc(package)
    }
}

fn file_name(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_name()
        .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy())
}

/// The package name Go tooling would assume for an import path it cannot
/// read: the last segment, skipping a `/vN` major version, without a
/// `.vN` suffix or `go-` prefix.
pub fn guess_package_name(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);
    if is_major_version(last) {
        if let Some(prev) = segments.next() {
            last = prev;
        }
    }
    if let Some((head, version)) = last.rsplit_once(".v") {
        if !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit()) {
            last = head;
        }
    }
    let last = last.strip_prefix("go-").unwrap_or(last);
    let mut name: String = last
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}
