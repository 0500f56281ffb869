//! JSON Pointer (RFC 6901) locations used to report where in a document a
//! repair failed.

use std::fmt;

/// One step of a [`Pointer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// Location of a value inside a WCON document, rendered as a JSON Pointer.
///
/// The whole document renders as `/` rather than the empty pointer.
///
/// # Example
///
/// ```
/// use wcon_dialect::Pointer;
///
/// let at = Pointer::root().key("data").index(3).key("@MWT").key("a/b");
/// assert_eq!(at.to_string(), "/data/3/@MWT/a~1b");
/// assert_eq!(at.record_index(), Some(3));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pointer {
    steps: Vec<Step>,
}

impl Pointer {
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new pointer extended by an object key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Step::Key(key.into()));
        Self { steps }
    }

    /// Returns a new pointer extended by an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Step::Index(index));
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// The track record index, for pointers of the form `/data/<n>/...`.
    pub fn record_index(&self) -> Option<usize> {
        match self.steps.as_slice() {
            [Step::Key(data), Step::Index(n), ..] if data == "data" => Some(*n),
            _ => None,
        }
    }
}

/// Escapes a key per RFC 6901: `~` becomes `~0` and `/` becomes `~1`.
pub fn escape_key(key: &str) -> String {
    if !key.contains('/') && !key.contains('~') {
        return key.to_string();
    }
    // `~` first, otherwise the `~` introduced for `/` would be escaped again.
    key.replace('~', "~0").replace('/', "~1")
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("/");
        }
        for step in &self.steps {
            match step {
                Step::Key(key) => write!(f, "/{}", escape_key(key))?,
                Step::Index(index) => write!(f, "/{index}")?,
            }
        }
        Ok(())
    }
}
