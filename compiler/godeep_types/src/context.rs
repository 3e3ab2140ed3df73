//! Where packages outside the main module come from.

use std::path::PathBuf;

use crate::Platform;

/// The parts of a Go installation the loader reads: the target platform
/// for file selection, the standard library under `GOROOT`, and the
/// module download cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildContext {
    pub platform: Platform,
    /// `$GOROOT`; standard library packages live in its `src/`.
    pub goroot: Option<PathBuf>,
    /// `$GOMODCACHE`: downloaded modules as `<path>@<version>` directories.
    pub module_cache: Option<PathBuf>,
}

impl BuildContext {
    /// Read the same variables the `go` command does. `GOOS` and `GOARCH`
    /// default to the host; the module cache defaults to the first
    /// `GOPATH` entry's `pkg/mod`, then `~/go/pkg/mod`.
    pub fn from_env() -> Self {
        let host = Platform::host();
        let platform = Platform {
            os: non_empty("GOOS").unwrap_or(host.os),
            arch: non_empty("GOARCH").unwrap_or(host.arch),
        };
        let goroot = non_empty("GOROOT").map(PathBuf::from);
        let module_cache = non_empty("GOMODCACHE")
            .map(PathBuf::from)
            .or_else(|| {
                let gopath = std::env::var_os("GOPATH")?;
                std::env::split_paths(&gopath)
                    .next()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(|dir| dir.join("pkg").join("mod"))
            })
            .or_else(|| non_empty("HOME").map(|home| PathBuf::from(home).join("go/pkg/mod")));
        tracing::debug!(?platform, ?goroot, ?module_cache, "build context");
        BuildContext {
            platform,
            goroot,
            module_cache,
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.is_empty())
}
