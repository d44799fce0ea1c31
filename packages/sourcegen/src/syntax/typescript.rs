//! TypeScript parser collaborator backed by oxc.
//!
//! The oxc AST lives in an arena that is dropped at the end of [`Parser::parse`],
//! so the tree is lowered into the owned [`Declaration`] model right away:
//! classes become containers, class elements become members, and any class
//! found inside another node is attached to the nearest enclosing declaration.

use oxc_allocator::Allocator;
use oxc_ast::ast::{self, Class, ClassElement, ClassType, Decorator, Expression, MethodDefinitionKind};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser as OxcParser;
use oxc_span::{GetSpan, SourceType};
use smallvec::SmallVec;
use std::path::Path;

use super::{Annotation, Argument, Declaration, Parser, Span, SyntaxKind, SyntaxTree};
use crate::error::ParseError;

/// Parses TypeScript (or JavaScript/TSX) sources with decorators.
#[derive(Debug, Clone, Copy)]
pub struct TypeScriptParser {
    source_type: SourceType,
}

impl TypeScriptParser {
    /// Parser for `.ts` module sources.
    pub fn new() -> Self {
        Self {
            source_type: SourceType::ts(),
        }
    }

    /// Parser for `.tsx` module sources.
    pub fn tsx() -> Self {
        Self {
            source_type: SourceType::tsx(),
        }
    }

    /// Parser matching the extension of `path`, if the extension is known.
    pub fn for_path(path: impl AsRef<Path>) -> Option<Self> {
        SourceType::from_path(path)
            .ok()
            .map(|source_type| Self { source_type })
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }
}

impl Default for TypeScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for TypeScriptParser {
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        let allocator = Allocator::default();
        let ret = OxcParser::new(&allocator, source, self.source_type).parse();

        if ret.panicked || !ret.errors.is_empty() {
            let diagnostics: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
            let message = diagnostics
                .first()
                .cloned()
                .unwrap_or_else(|| "parser aborted".to_string());
            return Err(ParseError::new(message).with_diagnostics(diagnostics));
        }

        let mut collector = ClassCollector::new(source);
        collector.visit_program(&ret.program);

        Ok(SyntaxTree::new(source, collector.found))
    }
}

fn to_span(span: oxc_span::Span) -> Span {
    Span::new(span.start as usize, span.end as usize)
}

/// Range of a declaration including the decorators written in front of it.
fn decorated_span(span: oxc_span::Span, decorators: &[Decorator<'_>]) -> Span {
    decorators
        .iter()
        .fold(to_span(span), |acc, decorator| acc.merge(to_span(decorator.span)))
}

/// Collects the outermost classes below whatever node it is run on.
///
/// A class is lowered together with its members and is not walked any
/// further by the visitor; nested classes are picked up by the lowering of
/// the member that contains them.
struct ClassCollector<'s> {
    source: &'s str,
    found: Vec<Declaration>,
}

impl<'s> ClassCollector<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            found: Vec::new(),
        }
    }

    fn lower_class(&self, class: &Class<'_>, export_span: Option<oxc_span::Span>) -> Declaration {
        let kind = match class.r#type {
            ClassType::ClassDeclaration => SyntaxKind::ClassDeclaration,
            ClassType::ClassExpression => SyntaxKind::ClassExpression,
        };

        // `export` is a modifier of the class, so it belongs to the target range.
        let mut span = decorated_span(class.span, &class.decorators);
        if let Some(export_span) = export_span {
            span = span.merge(to_span(export_span));
        }

        let mut node = Declaration::new(kind, span);
        node.annotations = self.annotations(&class.decorators);
        node.children = class
            .body
            .body
            .iter()
            .map(|element| self.lower_member(element))
            .collect();
        node
    }

    fn lower_member(&self, element: &ClassElement<'_>) -> Declaration {
        let no_decorators: &[Decorator<'_>] = &[];
        let (kind, span, decorators) = match element {
            ClassElement::MethodDefinition(method) => {
                let kind = match method.kind {
                    MethodDefinitionKind::Constructor => SyntaxKind::Constructor,
                    MethodDefinitionKind::Method => SyntaxKind::MethodDeclaration,
                    MethodDefinitionKind::Get => SyntaxKind::GetAccessor,
                    MethodDefinitionKind::Set => SyntaxKind::SetAccessor,
                };
                (kind, method.span, &method.decorators[..])
            }
            ClassElement::PropertyDefinition(prop) => {
                (SyntaxKind::PropertyDeclaration, prop.span, &prop.decorators[..])
            }
            ClassElement::AccessorProperty(accessor) => {
                (SyntaxKind::AccessorProperty, accessor.span, &accessor.decorators[..])
            }
            ClassElement::StaticBlock(block) => (SyntaxKind::StaticBlock, block.span, no_decorators),
            ClassElement::TSIndexSignature(sig) => {
                (SyntaxKind::IndexSignature, sig.span, no_decorators)
            }
        };

        let mut nested = ClassCollector::new(self.source);
        nested.visit_class_element(element);

        let mut node = Declaration::new(kind, decorated_span(span, decorators));
        node.annotations = self.annotations(decorators);
        node.children = nested.found;
        node
    }

    fn annotations(&self, decorators: &[Decorator<'_>]) -> SmallVec<[Annotation; 2]> {
        decorators
            .iter()
            .filter_map(|decorator| self.annotation(decorator))
            .collect()
    }

    /// Only `@Name` and `@callee(...)` forms name a generator; any other
    /// decorator expression is ignored.
    fn annotation(&self, decorator: &Decorator<'_>) -> Option<Annotation> {
        let span = to_span(decorator.span);
        match &decorator.expression {
            Expression::Identifier(ident) => Some(Annotation::bare(ident.name.as_str(), span)),
            Expression::CallExpression(call) => {
                let name = to_span(call.callee.span()).slice(self.source)?;
                let arguments = call
                    .arguments
                    .iter()
                    .map(|arg| Argument::new(to_span(arg.span())))
                    .collect();
                Some(Annotation::call(name, span, arguments))
            }
            _ => None,
        }
    }
}

impl<'a> Visit<'a> for ClassCollector<'_> {
    fn visit_class(&mut self, class: &Class<'a>) {
        let node = self.lower_class(class, None);
        self.found.push(node);
    }

    fn visit_export_named_declaration(&mut self, it: &ast::ExportNamedDeclaration<'a>) {
        if let Some(ast::Declaration::ClassDeclaration(class)) = &it.declaration {
            let node = self.lower_class(class, Some(it.span));
            self.found.push(node);
        } else {
            walk::walk_export_named_declaration(self, it);
        }
    }

    fn visit_export_default_declaration(&mut self, it: &ast::ExportDefaultDeclaration<'a>) {
        if let ast::ExportDefaultDeclarationKind::ClassDeclaration(class) = &it.declaration {
            let node = self.lower_class(class, Some(it.span));
            self.found.push(node);
        } else {
            walk::walk_export_default_declaration(self, it);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SyntaxTree {
        TypeScriptParser::new().parse(source).expect("parse failed")
    }

    #[test]
    fn test_bare_and_call_decorators_are_distinguished() {
        let tree = parse("@A @B() @C(1, 'two') class X {}");
        let class = &tree.root().children[0];
        assert_eq!(class.kind, SyntaxKind::ClassDeclaration);
        assert_eq!(class.annotations.len(), 3);
        assert_eq!(class.annotations[0].name, "A");
        assert_eq!(class.annotations[0].arguments, None);
        assert_eq!(class.annotations[1].arguments, Some(vec![]));
        let args = class.annotations[2].arguments.as_ref().unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(tree.text(args[0].span), Some("1"));
        assert_eq!(tree.text(args[1].span), Some("'two'"));
    }

    #[test]
    fn test_declaration_range_covers_decorators() {
        let source = "@Mark\nclass X {}\n";
        let tree = parse(source);
        let class = &tree.root().children[0];
        assert_eq!(tree.text(class.span), Some("@Mark\nclass X {}"));
        assert_eq!(tree.text(class.annotations[0].span), Some("@Mark"));
    }

    #[test]
    fn test_member_kinds() {
        let tree = parse(
            "class X {\n  constructor() {}\n  m() {}\n  get g() { return 1 }\n  set g(v) {}\n  p = 1\n  static {}\n}\n",
        );
        let kinds: Vec<_> = tree.root().children[0]
            .children
            .iter()
            .map(|member| member.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Constructor,
                SyntaxKind::MethodDeclaration,
                SyntaxKind::GetAccessor,
                SyntaxKind::SetAccessor,
                SyntaxKind::PropertyDeclaration,
                SyntaxKind::StaticBlock,
            ]
        );
    }

    #[test]
    fn test_member_decorator_with_qualified_callee() {
        let tree = parse("class X { @ns.Gen(a, b) m() {} @ns.Bare n() {} }");
        let members = &tree.root().children[0].children;
        assert_eq!(members[0].annotations[0].name, "ns.Gen");
        assert!(members[1].annotations.is_empty());
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = TypeScriptParser::new().parse("class {").unwrap_err();
        assert!(!err.diagnostics.is_empty());
    }
}
