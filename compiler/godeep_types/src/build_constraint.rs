//! File selection by build constraints.
//!
//! A file takes part in the build when its `//go:build` line (if any) holds
//! for the host platform and its name carries no `_GOOS`/`_GOARCH` suffix
//! for another platform. `//go:build ignore` files never match.

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "arm", "arm64", "loong64", "mips", "mipsle", "mips64", "mips64le", "ppc64",
    "ppc64le", "riscv64", "s390x", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// The platform files are selected for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// The platform this process runs on, in Go's spelling.
    pub fn host() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "x86" => "386",
            "aarch64" => "arm64",
            "powerpc64" => "ppc64",
            "wasm32" => "wasm",
            other => other,
        };
        Platform {
            os: os.to_owned(),
            arch: arch.to_owned(),
        }
    }

    fn has_tag(&self, tag: &str) -> bool {
        tag == self.os
            || tag == self.arch
            || tag == "gc"
            || (tag == "unix" && UNIX_OS.contains(&self.os.as_str()))
            || tag.strip_prefix("go1.").is_some_and(|minor| minor.parse::<u32>().is_ok())
    }

    /// Whether a file with this name and contents takes part in the build.
    pub fn includes(&self, file_name: &str, source: &str) -> bool {
        self.name_matches(file_name)
            && build_line(source).is_none_or(|expr| self.eval(expr).unwrap_or(false))
    }

    /// `name_GOOS_GOARCH.go`, `name_GOOS.go` and `name_GOARCH.go` suffixes.
    fn name_matches(&self, file_name: &str) -> bool {
        let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
        let parts: Vec<&str> = stem.split('_').collect();
        let n = parts.len();
        if n >= 3 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return parts[n - 2] == self.os && parts[n - 1] == self.arch;
        }
        if n >= 2 {
            let last = parts[n - 1];
            if KNOWN_OS.contains(&last) {
                return last == self.os;
            }
            if KNOWN_ARCH.contains(&last) {
                return last == self.arch;
            }
        }
        true
    }

    /// Evaluate a constraint expression; `None` if it is malformed.
    fn eval(&self, expr: &str) -> Option<bool> {
        let tokens = tokenize(expr);
        let mut parser = ExprParser {
            tokens: &tokens,
            pos: 0,
            platform: self,
        };
        let value = parser.or()?;
        (parser.pos == tokens.len()).then_some(value)
    }
}

/// The expression of the first `//go:build` line in the file header. Legacy
/// `// +build` lines are only honoured for `ignore`.
fn build_line(source: &str) -> Option<&str> {
    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("/*") || line.starts_with('*') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("//go:build") {
            return Some(rest.trim());
        }
        if let Some(rest) = line.strip_prefix("// +build") {
            if rest.split_whitespace().any(|tag| tag == "ignore") {
                return Some("ignore");
            }
        }
        if !line.starts_with("//") {
            break;
        }
    }
    None
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Tok<'a> {
    Tag(&'a str),
    Not,
    And,
    Or,
    Open,
    Close,
}

fn tokenize(expr: &str) -> Vec<Tok<'_>> {
    let mut tokens = Vec::new();
    let mut rest = expr;
    while let Some(c) = rest.chars().next() {
        let (tok, len) = match c {
            ' ' | '\t' => {
                rest = &rest[1..];
                continue;
            }
            '!' => (Tok::Not, 1),
            '(' => (Tok::Open, 1),
            ')' => (Tok::Close, 1),
            '&' if rest.starts_with("&&") => (Tok::And, 2),
            '|' if rest.starts_with("||") => (Tok::Or, 2),
            _ => {
                let len = rest
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                    .unwrap_or(rest.len())
                    .max(c.len_utf8());
                (Tok::Tag(&rest[..len]), len)
            }
        };
        tokens.push(tok);
        rest = &rest[len..];
    }
    tokens
}

struct ExprParser<'t, 'a> {
    tokens: &'t [Tok<'a>],
    pos: usize,
    platform: &'t Platform,
}

impl ExprParser<'_, '_> {
    fn or(&mut self) -> Option<bool> {
        let mut value = self.and()?;
        while self.tokens.get(self.pos) == Some(&Tok::Or) {
            self.pos += 1;
            let rhs = self.and()?;
            value = value || rhs;
        }
        Some(value)
    }

    fn and(&mut self) -> Option<bool> {
        let mut value = self.unary()?;
        while self.tokens.get(self.pos) == Some(&Tok::And) {
            self.pos += 1;
            let rhs = self.unary()?;
            value = value && rhs;
        }
        Some(value)
    }

    fn unary(&mut self) -> Option<bool> {
        let tok = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        match tok {
            Tok::Not => self.unary().map(|v| !v),
            Tok::Open => {
                let value = self.or()?;
                (self.tokens.get(self.pos) == Some(&Tok::Close)).then(|| {
                    self.pos += 1;
                    value
                })
            }
            Tok::Tag(tag) => Some(self.platform.has_tag(tag)),
            Tok::And | Tok::Or | Tok::Close => None,
        }
    }
}
