//! Issue paths.

/// One step into a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// The location of a value inside the validated container.
///
/// Rendered as dot-joined segments (`contact.email`, `ranges.0.from`);
/// the root renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePath {
    segments: Vec<Segment>,
}

impl IssuePath {
    /// Creates an empty (root) path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    pub(crate) fn push_key(&mut self, key: &str) {
        self.segments.push(Segment::Key(key.to_string()));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }

    /// Renders the path followed by an extra key, without mutating it.
    #[must_use]
    pub fn join(&self, key: &str) -> String {
        let base = self.render();
        if base.is_empty() {
            key.to_string()
        } else if key.is_empty() {
            base
        } else {
            format!("{base}.{key}")
        }
    }

    /// Renders the path as a dot-joined string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match segment {
                Segment::Key(key) => out.push_str(key),
                Segment::Index(index) => out.push_str(&index.to_string()),
            }
        }
        out
    }
}
