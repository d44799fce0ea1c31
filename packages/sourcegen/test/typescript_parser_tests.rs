//! TypeScript parser tests
//!
//! Shape of the trees lowered from oxc ASTs.

use sourcegen::{Parser, SyntaxKind, SyntaxTree, TypeScriptParser};

fn parse(source: &str) -> SyntaxTree {
    TypeScriptParser::new().parse(source).expect("parse failed")
}

#[test]
fn should_lower_top_level_classes_in_document_order() {
    let tree = parse("class A {}\nfunction f() {}\nclass B {}\n");
    let root = tree.root();
    assert_eq!(root.kind, SyntaxKind::SourceFile);
    assert_eq!(root.span.end, tree.source().len());

    let names: Vec<_> = root
        .children
        .iter()
        .map(|class| tree.text(class.span).unwrap())
        .collect();
    assert_eq!(names, vec!["class A {}", "class B {}"]);
}

#[test]
fn should_include_export_keywords_in_the_class_range() {
    let tree = parse("@A export class X {}\n@B export default class Y {}\n");
    let classes = &tree.root().children;
    assert_eq!(tree.text(classes[0].span), Some("@A export class X {}"));
    assert_eq!(tree.text(classes[1].span), Some("@B export default class Y {}"));
}

#[test]
fn should_classify_class_expressions() {
    let tree = parse("const Foo = class {\n  @Gen m() {}\n};\n");
    let class = &tree.root().children[0];
    assert_eq!(class.kind, SyntaxKind::ClassExpression);
    assert!(class.is_container());
    assert_eq!(tree.text(class.span), Some("class {\n  @Gen m() {}\n}"));
    assert_eq!(class.children[0].kind, SyntaxKind::MethodDeclaration);
}

#[test]
fn should_lower_accessor_properties() {
    let tree = parse("class X {\n  @Gen accessor value = 1;\n}\n");
    let member = &tree.root().children[0].children[0];
    assert_eq!(member.kind, SyntaxKind::AccessorProperty);
    assert_eq!(tree.text(member.span), Some("@Gen accessor value = 1;"));
}

#[test]
fn should_keep_index_signatures_unannotated() {
    let tree = parse("class X {\n  [key: string]: unknown;\n}\n");
    let member = &tree.root().children[0].children[0];
    assert_eq!(member.kind, SyntaxKind::IndexSignature);
    assert!(member.annotations.is_empty());
    assert!(!member.kind.is_annotatable());
}

#[test]
fn should_nest_classes_declared_inside_members() {
    let source = "class Outer {\n  make() {\n    return class Inner {\n      @Gen m() {}\n    };\n  }\n  p = class {};\n}\n";
    let tree = parse(source);
    let outer = &tree.root().children[0];
    assert_eq!(tree.root().children.len(), 1);

    let make = &outer.children[0];
    assert_eq!(make.kind, SyntaxKind::MethodDeclaration);
    assert_eq!(make.children.len(), 1);
    let inner = &make.children[0];
    assert_eq!(inner.kind, SyntaxKind::ClassExpression);
    assert_eq!(inner.children[0].annotations[0].name, "Gen");

    let property = &outer.children[1];
    assert_eq!(property.kind, SyntaxKind::PropertyDeclaration);
    assert_eq!(property.children[0].kind, SyntaxKind::ClassExpression);
}

#[test]
fn should_keep_sibling_ranges_disjoint() {
    let tree = parse("class A {\n  @X a() {}\n  @Y() b = 1;\n  @Z c() {}\n}\n");
    let members = &tree.root().children[0].children;
    for pair in members.windows(2) {
        assert!(pair[0].span.end <= pair[1].span.start);
    }
    for member in members {
        assert!(member.span.start >= tree.root().children[0].span.start);
        assert!(member.span.end <= tree.root().children[0].span.end);
    }
}

#[test]
fn should_list_annotated_declarations_in_document_order() {
    let tree = parse("@A class X {\n  @B m() {}\n}\nclass Y {\n  @C n() {}\n}\n@D class Z {}\n");
    let names: Vec<_> = tree
        .annotated()
        .map(|node| node.annotations[0].name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B", "C", "D"]);
}

#[test]
fn should_keep_argument_text_verbatim() {
    let tree = parse("@Gen({ a: 1 },  'x' , [1,2]) class X {}");
    let annotation = &tree.root().children[0].annotations[0];
    let args: Vec<_> = annotation
        .arguments
        .as_ref()
        .unwrap()
        .iter()
        .map(|arg| tree.text(arg.span).unwrap())
        .collect();
    assert_eq!(args, vec!["{ a: 1 }", "'x'", "[1,2]"]);
    assert_eq!(tree.text(annotation.span), Some("@Gen({ a: 1 },  'x' , [1,2])"));
}

#[test]
fn should_choose_the_source_type_from_the_path() {
    assert!(TypeScriptParser::for_path("a/component.tsx").is_some());
    assert!(TypeScriptParser::for_path("a/component.ts").is_some());
    assert!(TypeScriptParser::for_path("a/README").is_none());

    let tsx = TypeScriptParser::tsx();
    let tree = tsx
        .parse("@Gen class View { render() { return <div />; } }")
        .unwrap();
    assert_eq!(tree.root().children[0].annotations[0].name, "Gen");
}
