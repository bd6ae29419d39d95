//! String leaf traversal
//!
//! Every substitution phase works on the string leaves of the tree. The
//! iterators here visit them depth-first in insertion order, skipping
//! non-string scalars, and report where each leaf lives so it can be
//! rewritten in place.

use std::fmt;

use crate::value::Value;

/// One step of a location: a mapping key or a sequence index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A key in a mapping (e.g., "database" in "database.host")
    Key(String),
    /// An index in a sequence (e.g., 0 in "servers[0]")
    Index(usize),
}

/// Owned location of a leaf, relative to the root
///
/// Displays in accessor syntax, e.g. `nested.list[1]`, so it can be fed
/// back into [`Value::get_path`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LeafPath(Vec<Segment>);

impl LeafPath {
    /// The root location
    pub fn root() -> Self {
        Self::default()
    }

    /// Segments from the root down
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        Self(segments)
    }
}

impl From<Vec<Segment>> for LeafPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for LeafPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

impl Value {
    /// The string leaf at `path`, if that location holds a string
    pub fn string_at(&self, path: &LeafPath) -> Option<&str> {
        let mut current = self;
        for segment in path.segments() {
            current = match (segment, current) {
                (Segment::Key(key), Value::Mapping(map)) => map.get(key)?,
                (Segment::Index(idx), Value::Sequence(seq)) => seq.get(*idx)?,
                _ => return None,
            };
        }
        current.as_str()
    }

    /// Mutable access to the string leaf at `path`
    pub fn string_at_mut(&mut self, path: &LeafPath) -> Option<&mut String> {
        let mut current = self;
        for segment in path.segments() {
            current = match (segment, current) {
                (Segment::Key(key), Value::Mapping(map)) => map.get_mut(key)?,
                (Segment::Index(idx), Value::Sequence(seq)) => seq.get_mut(*idx)?,
                _ => return None,
            };
        }
        match current {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Iterate over every string leaf of `value` with its location
pub fn string_leaves(value: &Value) -> StringLeaves<'_> {
    StringLeaves::new(value)
}

/// Iterate over every string leaf of `value`, handing out writable references
pub fn string_leaves_mut(value: &mut Value) -> StringLeavesMut<'_> {
    StringLeavesMut::new(value)
}

enum Frame<'a> {
    Map(indexmap::map::Iter<'a, String, Value>),
    Seq(std::iter::Enumerate<std::slice::Iter<'a, Value>>),
}

/// Lazy iterator returned by [`string_leaves`]
pub struct StringLeaves<'a> {
    root: Option<&'a str>,
    stack: Vec<(LeafPath, Frame<'a>)>,
}

impl<'a> StringLeaves<'a> {
    fn new(value: &'a Value) -> Self {
        let mut leaves = Self {
            root: None,
            stack: Vec::new(),
        };
        match value {
            Value::String(s) => leaves.root = Some(s),
            Value::Mapping(map) => leaves.stack.push((LeafPath::root(), Frame::Map(map.iter()))),
            Value::Sequence(seq) => leaves
                .stack
                .push((LeafPath::root(), Frame::Seq(seq.iter().enumerate()))),
            _ => {}
        }
        leaves
    }
}

impl<'a> Iterator for StringLeaves<'a> {
    type Item = (LeafPath, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(s) = self.root.take() {
            return Some((LeafPath::root(), s));
        }

        loop {
            let next = match self.stack.last_mut()? {
                (prefix, Frame::Map(iter)) => iter
                    .next()
                    .map(|(key, value)| (prefix.child(Segment::Key(key.clone())), value)),
                (prefix, Frame::Seq(iter)) => iter
                    .next()
                    .map(|(idx, value)| (prefix.child(Segment::Index(idx)), value)),
            };

            let Some((path, value)) = next else {
                self.stack.pop();
                continue;
            };

            match value {
                Value::String(s) => return Some((path, s)),
                Value::Mapping(map) => self.stack.push((path, Frame::Map(map.iter()))),
                Value::Sequence(seq) => self.stack.push((path, Frame::Seq(seq.iter().enumerate()))),
                _ => {}
            }
        }
    }
}

enum FrameMut<'a> {
    Map(indexmap::map::IterMut<'a, String, Value>),
    Seq(std::iter::Enumerate<std::slice::IterMut<'a, Value>>),
}

/// Lazy iterator returned by [`string_leaves_mut`]
pub struct StringLeavesMut<'a> {
    root: Option<&'a mut String>,
    stack: Vec<(LeafPath, FrameMut<'a>)>,
}

impl<'a> StringLeavesMut<'a> {
    fn new(value: &'a mut Value) -> Self {
        let mut leaves = Self {
            root: None,
            stack: Vec::new(),
        };
        match value {
            Value::String(s) => leaves.root = Some(s),
            Value::Mapping(map) => leaves
                .stack
                .push((LeafPath::root(), FrameMut::Map(map.iter_mut()))),
            Value::Sequence(seq) => leaves
                .stack
                .push((LeafPath::root(), FrameMut::Seq(seq.iter_mut().enumerate()))),
            _ => {}
        }
        leaves
    }
}

impl<'a> Iterator for StringLeavesMut<'a> {
    type Item = (LeafPath, &'a mut String);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(s) = self.root.take() {
            return Some((LeafPath::root(), s));
        }

        loop {
            let next = match self.stack.last_mut()? {
                (prefix, FrameMut::Map(iter)) => iter
                    .next()
                    .map(|(key, value)| (prefix.child(Segment::Key(key.clone())), value)),
                (prefix, FrameMut::Seq(iter)) => iter
                    .next()
                    .map(|(idx, value)| (prefix.child(Segment::Index(idx)), value)),
            };

            let Some((path, value)) = next else {
                self.stack.pop();
                continue;
            };

            match value {
                Value::String(s) => return Some((path, s)),
                Value::Mapping(map) => self.stack.push((path, FrameMut::Map(map.iter_mut()))),
                Value::Sequence(seq) => self
                    .stack
                    .push((path, FrameMut::Seq(seq.iter_mut().enumerate()))),
                _ => {}
            }
        }
    }
}
