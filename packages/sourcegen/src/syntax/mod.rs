//! Owned syntax model consumed by the rewrite loop.
//!
//! A [`SyntaxTree`] is a value: it is built once from a source text by a
//! [`Parser`] and never mutated afterwards. Every rewrite produces a new text
//! and therefore a new tree.

pub mod typescript;

pub use typescript::TypeScriptParser;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::error::ParseError;

/// Parser collaborator - converts source text to a [`SyntaxTree`].
pub trait Parser {
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError>;
}

/// Half-open byte range `[start, end)` into a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Slice `source` by this span.
    ///
    /// Returns `None` if the span is inverted, runs past the end of the text
    /// or does not fall on UTF-8 character boundaries.
    pub fn slice(self, source: &str) -> Option<&str> {
        if self.start > self.end {
            return None;
        }
        source.get(self.start..self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Kind tag of a declaration node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyntaxKind {
    SourceFile,
    ClassDeclaration,
    ClassExpression,
    Constructor,
    MethodDeclaration,
    GetAccessor,
    SetAccessor,
    PropertyDeclaration,
    AccessorProperty,
    StaticBlock,
    IndexSignature,
}

impl SyntaxKind {
    /// Class-like declarations own members.
    pub fn is_container(self) -> bool {
        matches!(self, SyntaxKind::ClassDeclaration | SyntaxKind::ClassExpression)
    }

    /// Kinds that can carry decorators.
    pub fn is_annotatable(self) -> bool {
        !self.flag().is_empty()
    }

    /// The single-kind set for this kind. Non-annotatable kinds map to the
    /// empty set and are therefore never admitted by a kind restriction.
    pub fn flag(self) -> SyntaxKinds {
        match self {
            SyntaxKind::ClassDeclaration => SyntaxKinds::CLASS_DECLARATION,
            SyntaxKind::ClassExpression => SyntaxKinds::CLASS_EXPRESSION,
            SyntaxKind::Constructor => SyntaxKinds::CONSTRUCTOR,
            SyntaxKind::MethodDeclaration => SyntaxKinds::METHOD_DECLARATION,
            SyntaxKind::GetAccessor => SyntaxKinds::GET_ACCESSOR,
            SyntaxKind::SetAccessor => SyntaxKinds::SET_ACCESSOR,
            SyntaxKind::PropertyDeclaration => SyntaxKinds::PROPERTY_DECLARATION,
            SyntaxKind::AccessorProperty => SyntaxKinds::ACCESSOR_PROPERTY,
            SyntaxKind::SourceFile | SyntaxKind::StaticBlock | SyntaxKind::IndexSignature => {
                SyntaxKinds::empty()
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyntaxKind::SourceFile => "sourceFile",
            SyntaxKind::ClassDeclaration => "classDeclaration",
            SyntaxKind::ClassExpression => "classExpression",
            SyntaxKind::Constructor => "constructor",
            SyntaxKind::MethodDeclaration => "methodDeclaration",
            SyntaxKind::GetAccessor => "getAccessor",
            SyntaxKind::SetAccessor => "setAccessor",
            SyntaxKind::PropertyDeclaration => "propertyDeclaration",
            SyntaxKind::AccessorProperty => "accessorProperty",
            SyntaxKind::StaticBlock => "staticBlock",
            SyntaxKind::IndexSignature => "indexSignature",
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of annotatable kinds, used to restrict which declarations a
    /// generator may be offered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyntaxKinds: u16 {
        const CLASS_DECLARATION = 1 << 0;
        const CLASS_EXPRESSION = 1 << 1;
        const CONSTRUCTOR = 1 << 2;
        const METHOD_DECLARATION = 1 << 3;
        const GET_ACCESSOR = 1 << 4;
        const SET_ACCESSOR = 1 << 5;
        const PROPERTY_DECLARATION = 1 << 6;
        const ACCESSOR_PROPERTY = 1 << 7;

        const CONTAINERS = Self::CLASS_DECLARATION.bits() | Self::CLASS_EXPRESSION.bits();
        const MEMBERS = Self::CONSTRUCTOR.bits()
            | Self::METHOD_DECLARATION.bits()
            | Self::GET_ACCESSOR.bits()
            | Self::SET_ACCESSOR.bits()
            | Self::PROPERTY_DECLARATION.bits()
            | Self::ACCESSOR_PROPERTY.bits();
    }
}

impl SyntaxKinds {
    /// Whether a declaration of `kind` is admitted by this set.
    pub fn admits(self, kind: SyntaxKind) -> bool {
        self.intersects(kind.flag())
    }
}

impl From<SyntaxKind> for SyntaxKinds {
    fn from(kind: SyntaxKind) -> Self {
        kind.flag()
    }
}

impl FromIterator<SyntaxKind> for SyntaxKinds {
    fn from_iter<I: IntoIterator<Item = SyntaxKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(SyntaxKinds::empty(), |acc, kind| acc | kind.flag())
    }
}

/// One argument expression of a call-style decorator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub span: Span,
}

impl Argument {
    pub fn new(span: Span) -> Self {
        Self { span }
    }
}

/// A decorator attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Name by which the decorator was invoked (`Foo`, or `ns.Foo` for `@ns.Foo()`).
    pub name: String,

    /// Range of the whole decorator, `@` included.
    pub span: Span,

    /// `None` for `@Foo`, `Some` (possibly empty) for `@Foo(...)`.
    pub arguments: Option<Vec<Argument>>,
}

impl Annotation {
    /// A decorator written without call syntax.
    pub fn bare(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            arguments: None,
        }
    }

    /// A decorator written with call syntax.
    pub fn call(name: impl Into<String>, span: Span, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            span,
            arguments: Some(arguments),
        }
    }

    pub fn is_call(&self) -> bool {
        self.arguments.is_some()
    }
}

/// A position-addressed node of the tree.
///
/// For containers `children` are the members in source order. For every
/// other kind `children` are the containers nested anywhere inside the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: SyntaxKind,
    pub span: Span,
    pub annotations: SmallVec<[Annotation; 2]>,
    pub children: Vec<Declaration>,
}

impl Declaration {
    pub fn new(kind: SyntaxKind, span: Span) -> Self {
        Self {
            kind,
            span,
            annotations: SmallVec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_child(mut self, child: Declaration) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Members of a container; empty for every other kind.
    pub fn members(&self) -> &[Declaration] {
        if self.is_container() {
            &self.children
        } else {
            &[]
        }
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

pub struct Descendants<'t> {
    stack: Vec<&'t Declaration>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = &'t Declaration;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Parsed representation of one source text.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: Arc<str>,
    root: Declaration,
}

impl SyntaxTree {
    /// Assemble a tree from a source text and top-level declarations.
    ///
    /// The root node spans the whole text and has kind [`SyntaxKind::SourceFile`].
    pub fn new(source: impl Into<Arc<str>>, declarations: Vec<Declaration>) -> Self {
        let source = source.into();
        let root = Declaration {
            kind: SyntaxKind::SourceFile,
            span: Span::new(0, source.len()),
            annotations: SmallVec::new(),
            children: declarations,
        };
        Self { source, root }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_arc(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    pub fn root(&self) -> &Declaration {
        &self.root
    }

    /// Exact source text covered by `span`, if the span is valid for this tree.
    pub fn text(&self, span: Span) -> Option<&str> {
        span.slice(&self.source)
    }

    /// All annotated declarations in document order.
    pub fn annotated(&self) -> impl Iterator<Item = &Declaration> {
        self.root
            .descendants()
            .filter(|node| !node.annotations.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_slice_rejects_bad_ranges() {
        let source = "café";
        assert_eq!(Span::new(0, 3).slice(source), Some("caf"));
        assert_eq!(Span::new(0, 4).slice(source), None); // inside `é`
        assert_eq!(Span::new(3, 2).slice(source), None);
        assert_eq!(Span::new(0, 99).slice(source), None);
    }

    #[test]
    fn test_kind_sets() {
        assert!(SyntaxKinds::CONTAINERS.admits(SyntaxKind::ClassExpression));
        assert!(!SyntaxKinds::CONTAINERS.admits(SyntaxKind::MethodDeclaration));
        assert!(SyntaxKinds::MEMBERS.admits(SyntaxKind::GetAccessor));
        assert!(!SyntaxKinds::all().admits(SyntaxKind::StaticBlock));

        let kinds: SyntaxKinds = [SyntaxKind::MethodDeclaration, SyntaxKind::PropertyDeclaration]
            .into_iter()
            .collect();
        assert!(kinds.admits(SyntaxKind::PropertyDeclaration));
        assert!(!kinds.admits(SyntaxKind::Constructor));
    }

    #[test]
    fn test_descendants_are_preorder() {
        let tree = SyntaxTree::new(
            "0123456789",
            vec![Declaration::new(SyntaxKind::ClassDeclaration, Span::new(0, 6))
                .with_child(Declaration::new(SyntaxKind::MethodDeclaration, Span::new(1, 3)))
                .with_child(Declaration::new(SyntaxKind::PropertyDeclaration, Span::new(3, 5)))],
        );
        let kinds: Vec<_> = tree.root().descendants().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::SourceFile,
                SyntaxKind::ClassDeclaration,
                SyntaxKind::MethodDeclaration,
                SyntaxKind::PropertyDeclaration,
            ]
        );
    }
}
