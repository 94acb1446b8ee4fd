//! Error types for the rewrite engine
//!
//! - [`MappingError`]: a tag matched a rule pattern but has no replacement
//! - [`RewriteError`]: a [`MappingError`] located at a node of the document
//! - [`PatchError`]: a [`RewriteError`] attributed to a document kind

use std::fmt;

use migrate_model::DocumentKind;

/// Tag matched a rule pattern but has no entry in the tag table
///
/// Patterns are compiled from the same table, so this signals a broken
/// rule set rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("matched tag but unable to find replacement {tag}")]
pub struct MappingError {
    /// Matched tag text
    pub tag: String,
}

impl MappingError {
    /// Create mapping error for `tag`
    #[inline]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// One step of a [`NodePath`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathSegment {
    Field(&'static str),
    Index(&'static str, usize),
}

/// Location of a node inside a document
///
/// Rendered as `widgets[1].definition.requests[0].queries[2].query`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath {
    segments: Vec<PathSegment>,
}

impl NodePath {
    /// Path made of a single field
    #[inline]
    #[must_use]
    pub fn field(name: &'static str) -> Self {
        Self {
            segments: vec![PathSegment::Field(name)],
        }
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path points at the document root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn prepend(&mut self, segment: PathSegment) {
        self.segments.insert(0, segment);
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Field(name) => f.write_str(name)?,
                PathSegment::Index(name, index) => write!(f, "{name}[{index}]")?,
            }
        }
        Ok(())
    }
}

/// [`MappingError`] raised at a node of a document
///
/// Built at the failing leaf and extended with parent segments while it
/// propagates upward.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {source}")]
pub struct RewriteError {
    path: NodePath,
    #[source]
    source: MappingError,
}

impl RewriteError {
    /// Error raised at field `name`
    #[inline]
    #[must_use]
    pub fn at(name: &'static str, source: MappingError) -> Self {
        Self {
            path: NodePath::field(name),
            source,
        }
    }

    /// Prefix the path with field `name`
    #[inline]
    #[must_use]
    pub fn within(mut self, name: &'static str) -> Self {
        self.path.prepend(PathSegment::Field(name));
        self
    }

    /// Prefix the path with element `index` of list `name`
    #[inline]
    #[must_use]
    pub fn within_index(mut self, name: &'static str, index: usize) -> Self {
        self.path.prepend(PathSegment::Index(name, index));
        self
    }

    /// Location of the failing node
    #[inline]
    #[must_use]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Underlying mapping failure
    #[inline]
    #[must_use]
    pub fn mapping(&self) -> &MappingError {
        &self.source
    }
}

/// Patching a document failed
///
/// The caller's document is never modified. `rewritten_before_failure`
/// reports whether some nodes had already been rewritten when the failure
/// hit, i.e. the document was not clean.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} {source}")]
pub struct PatchError {
    kind: DocumentKind,
    rewritten_before_failure: bool,
    #[source]
    source: RewriteError,
}

impl PatchError {
    /// Create patch error for a document of `kind`
    #[inline]
    #[must_use]
    pub fn new(kind: DocumentKind, rewritten_before_failure: bool, source: RewriteError) -> Self {
        Self {
            kind,
            rewritten_before_failure,
            source,
        }
    }

    /// Kind of the document that failed
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Whether earlier nodes had been rewritten before the failure
    #[inline]
    #[must_use]
    pub fn rewritten_before_failure(&self) -> bool {
        self.rewritten_before_failure
    }

    /// Located failure
    #[inline]
    #[must_use]
    pub fn rewrite_error(&self) -> &RewriteError {
        &self.source
    }
}
