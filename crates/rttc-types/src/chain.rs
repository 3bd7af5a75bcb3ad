//! Location chains: where in a nested value a check currently is.
//!
//! A [`Chain`] is an immutable, parent-linked list of [`Segment`]s living on
//! the stack of the recursive walk. Extending never touches the parent, so
//! sibling calls (e.g. union alternatives) can branch from the same chain.
//! Failures snapshot the chain into an owned `Vec<Segment>`.

use std::fmt;

use crate::value::Value;

/// One step of a location path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// The check root, labelled with the root value's type name.
    Root(String),
    /// Attribute access: `.name`
    Attr(String),
    /// Index or key: `[0]`, `['id']`
    Key(Value),
    /// A synthetic step rendered verbatim: `[?]` for set elements,
    /// `<key>` for mapping keys.
    Marker(&'static str),
}

impl Segment {
    /// Any element of a set.
    pub const ANY_ELEMENT: Segment = Segment::Marker("[?]");
    /// A key of a mapping.
    pub const MAP_KEY: Segment = Segment::Marker("<key>");

    pub fn index(i: usize) -> Self {
        Segment::Key(Value::Int(i64::try_from(i).unwrap_or(i64::MAX)))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Root(label) => write!(f, "{label}"),
            Segment::Attr(name) => write!(f, ".{name}"),
            Segment::Key(key) => write!(f, "[{key}]"),
            Segment::Marker(text) => write!(f, "{text}"),
        }
    }
}

/// Parent-linked location path.
#[derive(Debug)]
pub struct Chain<'a> {
    parent: Option<&'a Chain<'a>>,
    segment: Segment,
}

impl Chain<'static> {
    /// Start a chain at the check root.
    pub fn root(label: impl Into<String>) -> Self {
        Chain {
            parent: None,
            segment: Segment::Root(label.into()),
        }
    }
}

impl<'a> Chain<'a> {
    /// A new chain one segment longer. `self` is left untouched.
    pub fn extend(&'a self, segment: Segment) -> Chain<'a> {
        Chain {
            parent: Some(self),
            segment,
        }
    }

    /// Number of segments, root included.
    pub fn depth(&self) -> usize {
        1 + self.parent.map_or(0, Chain::depth)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Owned root-to-leaf snapshot.
    pub fn segments(&self) -> Vec<Segment> {
        let mut out = Vec::with_capacity(self.depth());
        let mut cursor = Some(self);
        while let Some(link) = cursor {
            out.push(link.segment.clone());
            cursor = link.parent;
        }
        out.reverse();
        out
    }

    /// Rendered path. A bare root renders as the empty string.
    pub fn render(&self) -> String {
        render_path(&self.segments())
    }
}

/// Render a path snapshot. A bare root renders as the empty string.
pub fn render_path(segments: &[Segment]) -> String {
    if segments.len() <= 1 {
        return String::new();
    }
    segments.iter().map(ToString::to_string).collect()
}

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_root_renders_empty() {
        let root = Chain::root("list");
        assert_eq!(root.render(), "");
        assert!(root.is_root());
        assert_eq!(root.depth(), 1);
    }

    #[test]
    fn test_nested_render() {
        let root = Chain::root("list");
        let outer = root.extend(Segment::index(1));
        let inner = outer.extend(Segment::index(0));
        assert_eq!(inner.render(), "list[1][0]");
        assert_eq!(inner.depth(), 3);
    }

    #[test]
    fn test_segment_kinds() {
        let root = Chain::root("Pair");
        let attr = root.extend(Segment::Attr("x".into()));
        let key = attr.extend(Segment::Key(Value::str("id")));
        let marker = key.extend(Segment::ANY_ELEMENT);
        assert_eq!(marker.render(), "Pair.x['id'][?]");
    }

    #[test]
    fn test_siblings_share_parent() {
        let root = Chain::root("dict");
        let a = root.extend(Segment::MAP_KEY);
        let b = root.extend(Segment::Key(Value::Int(3)));
        assert_eq!(a.render(), "dict<key>");
        assert_eq!(b.render(), "dict[3]");
        assert_eq!(root.render(), "");
    }
}
