//! Owned FBX node tree.
//!
//! `fbxcel` parses the binary container; this module copies its tree into
//! plain [`FbxNode`]s so the importer (and its tests) never depend on the
//! parser's borrowed handles.

use std::io::Cursor;

use fbxcel::{low::v7400::AttributeValue, tree::any::AnyTree};

use crate::error::LoadCause;

/// A node attribute, with integer and float widths collapsed.
#[derive(Clone, Debug, PartialEq)]
pub enum Attr {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Bytes(Vec<u8>),
}

impl Attr {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Attr::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Attr::Float(v) => Some(*v),
            Attr::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attr::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Attr::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            Attr::Ints(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FbxNode {
    pub name: String,
    pub attrs: Vec<Attr>,
    pub children: Vec<FbxNode>,
}

impl FbxNode {
    pub fn new(name: impl Into<String>, attrs: Vec<Attr>, children: Vec<FbxNode>) -> Self {
        Self {
            name: name.into(),
            attrs,
            children,
        }
    }

    pub fn child(&self, name: &str) -> Option<&FbxNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FbxNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn attr(&self, idx: usize) -> Option<&Attr> {
        self.attrs.get(idx)
    }

    pub fn attr_i64(&self, idx: usize) -> Option<i64> {
        self.attr(idx).and_then(Attr::as_i64)
    }

    pub fn attr_str(&self, idx: usize) -> Option<&str> {
        self.attr(idx).and_then(Attr::as_str)
    }

    /// First attribute of the named child as a float array, e.g. `Vertices`.
    pub fn child_floats(&self, name: &str) -> Option<&[f64]> {
        self.child(name).and_then(|c| c.attr(0)).and_then(Attr::as_floats)
    }

    /// First attribute of the named child as an integer array, e.g. `KeyTime`.
    pub fn child_ints(&self, name: &str) -> Option<&[i64]> {
        self.child(name).and_then(|c| c.attr(0)).and_then(Attr::as_ints)
    }

    pub fn child_str(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.attr_str(0))
    }
}

/// Parses a binary FBX document and returns its (nameless) root node.
pub fn parse_document(bytes: &[u8]) -> Result<FbxNode, LoadCause> {
    let tree = AnyTree::from_seekable_reader(Cursor::new(bytes))
        .map_err(|e| LoadCause::Parse(e.to_string()))?;
    #[allow(unreachable_patterns)]
    match tree {
        AnyTree::V7400(_, tree, _) => Ok(convert_node(tree.root())),
        _ => Err(LoadCause::UnsupportedVersion),
    }
}

fn convert_node(node: fbxcel::tree::v7400::NodeHandle<'_>) -> FbxNode {
    FbxNode {
        name: node.name().to_string(),
        attrs: node.attributes().iter().map(convert_attr).collect(),
        children: node.children().map(convert_node).collect(),
    }
}

fn convert_attr(value: &AttributeValue) -> Attr {
    #[allow(unreachable_patterns)]
    match value {
        AttributeValue::Bool(v) => Attr::Bool(*v),
        AttributeValue::I16(v) => Attr::Int(i64::from(*v)),
        AttributeValue::I32(v) => Attr::Int(i64::from(*v)),
        AttributeValue::I64(v) => Attr::Int(*v),
        AttributeValue::F32(v) => Attr::Float(f64::from(*v)),
        AttributeValue::F64(v) => Attr::Float(*v),
        AttributeValue::ArrBool(v) => Attr::Ints(v.iter().map(|&b| i64::from(b)).collect()),
        AttributeValue::ArrI32(v) => Attr::Ints(v.iter().map(|&i| i64::from(i)).collect()),
        AttributeValue::ArrI64(v) => Attr::Ints(v.clone()),
        AttributeValue::ArrF32(v) => Attr::Floats(v.iter().map(|&f| f64::from(f)).collect()),
        AttributeValue::ArrF64(v) => Attr::Floats(v.clone()),
        AttributeValue::Binary(v) => Attr::Bytes(v.clone()),
        AttributeValue::String(v) => Attr::Str(v.clone()),
        _ => Attr::Bytes(Vec::new()),
    }
}

