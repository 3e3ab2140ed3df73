//! The main module, its `go.mod`, and where imports outside it live.

use std::path::{Component, Path, PathBuf};

use crate::{BuildContext, LoadError, SourceTree};

/// The Go module enclosing the target directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub root: PathBuf,
    pub path: String,
    pub requires: Vec<Requirement>,
    pub replaces: Vec<Replacement>,
}

/// A `require` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
}

/// A `replace` directive. A version on the left side is not checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    pub path: String,
    pub target: ReplaceTarget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplaceTarget {
    /// A local directory, already joined to the module root.
    Dir(PathBuf),
    /// Another module version, read from the module cache.
    Module { path: String, version: String },
}

impl Module {
    /// Find `go.mod` in `dir` or its nearest ancestor. Without one, `dir`
    /// is its own module named after the directory.
    pub fn discover<T: SourceTree + ?Sized>(tree: &T, dir: &Path) -> Result<Module, LoadError> {
        for root in dir.ancestors() {
            let go_mod = root.join("go.mod");
            if !tree.is_file(&go_mod) {
                continue;
            }
            let text = tree.read_to_string(&go_mod).map_err(|err| {
                LoadError::failure(&dir.display().to_string(), format!("{}: {err}", go_mod.display()))
            })?;
            return Module::parse(root, &text).ok_or_else(|| {
                LoadError::failure(
                    &dir.display().to_string(),
                    format!("{}: no module directive", go_mod.display()),
                )
            });
        }
        let path = dir
            .file_name()
            .map_or_else(|| "main".to_owned(), |name| name.to_string_lossy().into_owned());
        Ok(Module {
            root: dir.to_path_buf(),
            path,
            requires: Vec::new(),
            replaces: Vec::new(),
        })
    }

    /// Read the directives of a `go.mod` file that locate packages.
    /// `None` without a `module` directive.
    pub fn parse(root: &Path, go_mod: &str) -> Option<Module> {
        let mut path = None;
        let mut requires = Vec::new();
        let mut replaces = Vec::new();
        let mut block: Option<&str> = None;
        for line in go_mod.lines() {
            let line = line.split("//").next().unwrap_or_default();
            let mut words: Vec<&str> = line.split_whitespace().map(unquote).collect();
            if words.is_empty() {
                continue;
            }
            let verb = match block {
                Some(_) if words[0] == ")" => {
                    block = None;
                    continue;
                }
                Some(verb) => verb,
                None => {
                    let verb = words.remove(0);
                    if words == ["("] {
                        block = Some(verb);
                        continue;
                    }
                    verb
                }
            };
            match (verb, words.as_slice()) {
                ("module", [module, ..]) => path = Some((*module).to_owned()),
                ("require", [module, version, ..]) => requires.push(Requirement {
                    path: (*module).to_owned(),
                    version: (*version).to_owned(),
                }),
                ("replace", _) => replaces.extend(replacement(root, &words)),
                _ => {}
            }
        }
        Some(Module {
            root: root.to_path_buf(),
            path: path?,
            requires,
            replaces,
        })
    }

    /// Import path of a directory inside the module.
    pub fn import_path(&self, dir: &Path) -> Option<String> {
        let rel = dir.strip_prefix(&self.root).ok()?;
        let mut path = self.path.clone();
        for component in rel.components() {
            path.push('/');
            path.push_str(&component.as_os_str().to_string_lossy());
        }
        Some(path)
    }

    /// Directory of a module-local import path.
    pub fn dir_of(&self, import: &str) -> Option<PathBuf> {
        within(import, &self.path).map(|rest| join(&self.root, rest))
    }

    /// Where an import from outside the module may live, in the order the
    /// `go` command looks: `vendor/`, a replacement, a required module in
    /// the module cache, then the standard library.
    pub(super) fn external_dirs(&self, import: &str, context: &BuildContext) -> Vec<PathBuf> {
        let mut dirs = vec![join(&self.root.join("vendor"), import)];
        let cache = context.module_cache.as_deref();

        let replaced = self
            .replaces
            .iter()
            .filter_map(|r| within(import, &r.path).map(|rest| (r, rest)))
            .max_by_key(|(r, _)| r.path.len());
        if let Some((replacement, rest)) = replaced {
            match &replacement.target {
                ReplaceTarget::Dir(dir) => dirs.push(join(dir, rest)),
                ReplaceTarget::Module { path, version } => {
                    dirs.extend(cache.map(|cache| join(&cache_dir(cache, path, version), rest)));
                }
            }
        } else if let Some((required, rest)) = self
            .requires
            .iter()
            .filter_map(|r| within(import, &r.path).map(|rest| (r, rest)))
            .max_by_key(|(r, _)| r.path.len())
        {
            dirs.extend(
                cache.map(|cache| join(&cache_dir(cache, &required.path, &required.version), rest)),
            );
        }

        if let Some(goroot) = &context.goroot {
            let src = goroot.join("src");
            if is_standard(import) {
                dirs.push(join(&src, import));
            }
            dirs.push(join(&src.join("vendor"), import));
        }
        dirs
    }
}

/// `old [version] => dir` or `old [version] => new version`.
fn replacement(root: &Path, words: &[&str]) -> Option<Replacement> {
    let arrow = words.iter().position(|w| *w == "=>")?;
    let path = (*words.first().filter(|_| arrow > 0)?).to_owned();
    let target = match &words[arrow + 1..] {
        [dir] if is_local(dir) => ReplaceTarget::Dir(normalize(&root.join(dir))),
        [module, version] => ReplaceTarget::Module {
            path: (*module).to_owned(),
            version: (*version).to_owned(),
        },
        _ => return None,
    };
    Some(Replacement { path, target })
}

fn is_local(target: &str) -> bool {
    target == "."
        || target == ".."
        || target.starts_with("./")
        || target.starts_with("../")
        || target.starts_with('/')
}

/// Drop `.` and resolve `..` without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn unquote(word: &str) -> &str {
    word.strip_prefix('"')
        .and_then(|w| w.strip_suffix('"'))
        .unwrap_or(word)
}

/// The rest of `import` below module `module`: `""` for the module's root
/// package, `None` when it is not inside the module.
fn within<'a>(import: &'a str, module: &str) -> Option<&'a str> {
    let rest = import.strip_prefix(module)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

fn join(base: &Path, rest: &str) -> PathBuf {
    if rest.is_empty() {
        base.to_path_buf()
    } else {
        base.join(rest)
    }
}

/// Standard library paths have no dot in their first element.
fn is_standard(import: &str) -> bool {
    !import.split('/').next().unwrap_or(import).contains('.')
}

/// `<cache>/<path>@<version>`. Upper-case letters are stored as `!` and
/// the lower-case letter so that paths survive case-insensitive file
/// systems.
fn cache_dir(cache: &Path, path: &str, version: &str) -> PathBuf {
    cache.join(format!("{}@{}", escape_case(path), escape_case(version)))
}

fn escape_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
