//! Indented Go source text.

/// Line-oriented text buffer. Indentation is one tab per level, as gofmt
/// writes it.
#[derive(Clone, Debug, Default)]
pub(crate) struct CodeBuffer {
    text: String,
    level: usize,
}

impl CodeBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// An empty buffer whose lines start at the current level of `self`,
    /// for code that is kept only if it turns out non-empty.
    pub(crate) fn child(&self) -> Self {
        CodeBuffer {
            text: String::new(),
            level: self.level,
        }
    }

    pub(crate) fn line(&mut self, line: impl AsRef<str>) {
        for _ in 0..self.level {
            self.text.push('\t');
        }
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    /// Write `line` and indent what follows.
    pub(crate) fn open(&mut self, line: impl AsRef<str>) {
        self.line(line);
        self.level += 1;
    }

    /// Dedent and write `line`.
    pub(crate) fn close(&mut self, line: impl AsRef<str>) {
        self.level = self.level.saturating_sub(1);
        self.line(line);
    }

    pub(crate) fn append(&mut self, other: CodeBuffer) {
        self.text.push_str(&other.text);
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn into_string(self) -> String {
        self.text
    }
}
