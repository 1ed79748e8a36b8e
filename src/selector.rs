// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Selector trees and pointer markers.
//!
//! A [`Selector`] mirrors the shape of (a subset of) the value it is applied to. Inner nodes are
//! [`Branch`]es, recursed into key by key; leaves are [`Pointer`]s, written as strings that start
//! with [`Pointer::SENTINEL`]. The bare marker `"#"` is the [`Pointer::Default`] pointer, and any
//! longer marker is a [`Pointer::Named`] one.
//!
//! ```rust
//! use graftree::{Pointer, Selector, SelectorNode, value};
//!
//! let selector = Selector::from_value(&value!({
//!     "person" => { "address" => { "permanent" => "#", "temporary" => "#/tmp" } }
//! }))
//! .unwrap();
//!
//! let address = selector.get("person").and_then(|p| p.get("address")).unwrap();
//! assert_eq!(address.get("permanent"), Some(&SelectorNode::Pointer(Pointer::Default)));
//! assert_eq!(
//!     address.get("temporary"),
//!     Some(&SelectorNode::Pointer(Pointer::Named("#/tmp".into())))
//! );
//! ```
use crate::Value;
use smallvec::SmallVec;
use std::{error, fmt};

/// Identifies which pending operation a selector leaf resolves to.
///
/// Pointers are opaque tags. A named pointer such as `#/a/b` is matched by exact string equality
/// only; no prefix or path-like structure is implied by the slashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pointer {
    /// The bare `#` marker.
    #[default]
    Default,
    /// Any marker longer than `#`, stored including its leading `#`.
    Named(String),
}

impl Pointer {
    /// The character every pointer marker starts with.
    pub const SENTINEL: char = '#';

    /// Parses a pointer marker.
    ///
    /// Returns `None` if `marker` does not start with [`Pointer::SENTINEL`].
    pub fn parse(marker: &str) -> Option<Self> {
        match marker {
            "#" => Some(Pointer::Default),
            m if m.starts_with(Self::SENTINEL) => Some(Pointer::Named(m.to_string())),
            _ => None,
        }
    }

    /// Parses a marker that names a pointer other than the default.
    ///
    /// This is the rule used when switching the active pointer of an
    /// [`UpdateBuilder`](crate::UpdateBuilder): only markers longer than `#` qualify.
    pub fn parse_named(marker: &str) -> Option<Self> {
        (marker.len() > 1 && marker.starts_with(Self::SENTINEL))
            .then(|| Pointer::Named(marker.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Pointer::Default => "#",
            Pointer::Named(name) => name,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Pointer::Default)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of a selector tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorNode {
    /// Recurse into the matching children of the value.
    Branch(Branch),
    /// A leaf to resolve against the pending operations.
    Pointer(Pointer),
}

impl SelectorNode {
    /// Returns the child selector under `key` if this node is a branch.
    pub fn get(&self, key: &str) -> Option<&SelectorNode> {
        match self {
            SelectorNode::Branch(b) => b.get(key),
            SelectorNode::Pointer(_) => None,
        }
    }

    /// Visits every pointer below (and including) this node in depth-first order.
    pub fn pointers(&self) -> Vec<&Pointer> {
        let mut out = Vec::new();
        self.collect_pointers(&mut out);
        out
    }

    fn collect_pointers<'a>(&'a self, out: &mut Vec<&'a Pointer>) {
        match self {
            SelectorNode::Pointer(p) => out.push(p),
            SelectorNode::Branch(b) => {
                for (_, node) in b.iter() {
                    node.collect_pointers(out);
                }
            }
        }
    }
}

impl From<Pointer> for SelectorNode {
    fn from(value: Pointer) -> Self {
        SelectorNode::Pointer(value)
    }
}

impl From<Branch> for SelectorNode {
    fn from(value: Branch) -> Self {
        SelectorNode::Branch(value)
    }
}

/// An ordered mapping from keys to child selectors.
///
/// Keys are visited in insertion order. Inserting an existing key replaces its selector in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branch {
    entries: Vec<(String, SelectorNode)>,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the selector under `key`, builder style.
    pub fn with(mut self, key: impl Into<String>, node: impl Into<SelectorNode>) -> Self {
        self.insert(key, node);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<SelectorNode>) {
        let key = key.into();
        let node = node.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = node,
            None => self.entries.push((key, node)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SelectorNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &SelectorNode)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A validated selector tree.
///
/// The root is always a [`Branch`] with at least one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    root: SelectorNode,
}

impl Selector {
    /// Wraps a root branch, rejecting an empty one.
    pub fn new(root: Branch) -> Result<Self, SelectorError> {
        if root.is_empty() {
            return Err(SelectorError::InvalidSelector { found: "empty object" });
        }
        Ok(Self {
            root: SelectorNode::Branch(root),
        })
    }

    /// Builds a selector from a value tree.
    ///
    /// Objects become branches and strings starting with `#` become pointers. Arrays become
    /// branches keyed by element index, skipping `null` holes, so that selectors can address
    /// array elements. Any other leaf is rejected.
    pub fn from_value(value: &Value) -> Result<Self, SelectorError> {
        let Value::Object(object) = value else {
            return Err(SelectorError::InvalidSelector {
                found: value.type_name(),
            });
        };
        let mut path = SmallVec::new();
        Self::new(branch_from_entries(
            object.iter().map(|(k, v)| (k.to_string(), v)),
            &mut path,
        )?)
    }

    pub fn root(&self) -> &SelectorNode {
        &self.root
    }

    /// Returns the child selector under `key` at the top level.
    pub fn get(&self, key: &str) -> Option<&SelectorNode> {
        self.root.get(key)
    }

    /// Every pointer in the selector, in depth-first key order.
    pub fn pointers(&self) -> Vec<&Pointer> {
        self.root.pointers()
    }
}

impl TryFrom<&Value> for Selector {
    type Error = SelectorError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl TryFrom<Branch> for Selector {
    type Error = SelectorError;

    fn try_from(value: Branch) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn node_from_value(
    value: &Value,
    path: &mut SmallVec<[String; 4]>,
) -> Result<SelectorNode, SelectorError> {
    match value {
        Value::String(marker) => Pointer::parse(marker).map(SelectorNode::Pointer).ok_or_else(|| {
            SelectorError::InvalidLeaf {
                path: path.clone(),
                found: "string without pointer marker",
            }
        }),
        Value::Object(object) => {
            branch_from_entries(object.iter().map(|(k, v)| (k.to_string(), v)), path)
                .map(SelectorNode::Branch)
        }
        Value::Array(array) => branch_from_entries(
            array
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v)),
            path,
        )
        .map(SelectorNode::Branch),
        other => Err(SelectorError::InvalidLeaf {
            path: path.clone(),
            found: other.type_name(),
        }),
    }
}

fn branch_from_entries<'a>(
    entries: impl Iterator<Item = (String, &'a Value)>,
    path: &mut SmallVec<[String; 4]>,
) -> Result<Branch, SelectorError> {
    let mut branch = Branch::new();
    for (key, child) in entries {
        path.push(key);
        let node = node_from_value(child, path)?;
        let key = path.pop().unwrap_or_default();
        branch.insert(key, node);
    }
    Ok(branch)
}

/// Error returned when a selector cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The top-level selector is not an object with at least one key.
    InvalidSelector { found: &'static str },

    /// A nested selector leaf is neither an object, an array, nor a pointer marker.
    InvalidLeaf {
        path: SmallVec<[String; 4]>,
        found: &'static str,
    },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::InvalidSelector { found } => {
                write!(f, "invalid selector: expected a non-empty object, found {found}")
            }
            SelectorError::InvalidLeaf { path, found } => {
                write!(f, "invalid selector leaf at <root>")?;
                for p in path {
                    write!(f, ".{p}")?;
                }
                write!(f, ": expected an object or pointer marker, found {found}")
            }
        }
    }
}

impl error::Error for SelectorError {}
