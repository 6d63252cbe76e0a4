use bumpalo::Bump;
use staple_core::{PrimitiveKind, SemanticError, Type};
use staple_parser::Parser;
use staple_parser::ast::{Expr, Item, Script, Stmt};

use super::*;
use crate::passes::DeclarationPass;

fn with_resolved(source: &str, check: impl FnOnce(&Script<'_>, &CompilationContext)) {
    let arena = Bump::new();
    let script = Parser::parse(source, &arena).unwrap();
    let mut ctx = CompilationContext::new();
    DeclarationPass::new(&mut ctx).run(&script);
    assert!(!ctx.has_errors(), "declaration errors: {}", ctx.diagnostics);
    ResolutionPass::new(&mut ctx).run(&script);
    check(&script, &ctx);
}

fn errors(source: &str) -> Vec<SemanticError> {
    let mut found = Vec::new();
    with_resolved(source, |_, ctx| {
        found = ctx.diagnostics.semantic_errors().to_vec();
    });
    found
}

fn function_body<'s, 'ast>(script: &'s Script<'ast>, name: &str) -> &'s [Stmt<'ast>] {
    script
        .functions()
        .find(|f| f.name.name == name)
        .and_then(|f| f.body)
        .map(|b| b.stmts)
        .unwrap()
}

fn assign_target<'ast>(stmt: &Stmt<'ast>) -> &'ast Expr<'ast> {
    match stmt {
        Stmt::Expr(s) => match s.expr {
            Expr::Assign(assign) => assign.target,
            other => panic!("expected assignment, found {other:?}"),
        },
        other => panic!("expected expression statement, found {other:?}"),
    }
}

fn is_mismatch(error: &SemanticError, needle: &str) -> bool {
    matches!(error, SemanticError::TypeMismatch { message, .. } if message.contains(needle))
}

#[test]
fn inner_block_shadows_outer() {
    let source = r#"
        int main() {
            int x = 1;
            {
                int x = 2;
                x = 3;
            }
            x = 4;
            return x;
        }
    "#;
    with_resolved(source, |script, ctx| {
        assert!(!ctx.has_errors(), "{}", ctx.diagnostics);
        let body = function_body(script, "main");
        let Stmt::VarDecl(outer) = &body[0] else { panic!() };
        let Stmt::Block(block) = &body[1] else { panic!() };
        let Stmt::VarDecl(inner) = &block.stmts[0] else { panic!() };

        let outer_symbol = ctx.bindings.symbol(outer.id).unwrap();
        let inner_symbol = ctx.bindings.symbol(inner.id).unwrap();
        assert_ne!(outer_symbol, inner_symbol);

        let inside = assign_target(&block.stmts[1]);
        assert_eq!(ctx.bindings.symbol(inside.id()), Some(inner_symbol));
        let after = assign_target(&body[2]);
        assert_eq!(ctx.bindings.symbol(after.id()), Some(outer_symbol));
    });
}

#[test]
fn redefinition_reports_once_and_keeps_first() {
    let source = r#"
        int main() {
            int x = 1;
            bool x = true;
            x = 5;
            return x;
        }
    "#;
    with_resolved(source, |script, ctx| {
        let errors = ctx.diagnostics.semantic_errors();
        assert_eq!(errors.len(), 1, "{}", ctx.diagnostics);
        assert!(matches!(&errors[0], SemanticError::DuplicateDeclaration { name, .. } if name == "x"));

        let body = function_body(script, "main");
        let Stmt::VarDecl(first) = &body[0] else { panic!() };
        let target = assign_target(&body[2]);
        assert_eq!(ctx.bindings.symbol(target.id()), ctx.bindings.symbol(first.id));
    });
}

#[test]
fn every_class_gets_an_implicit_init() {
    with_resolved("class Shape { int sides; }", |script, ctx| {
        let Item::Class(class) = &script.items[0] else { panic!() };
        let shape = ctx.bindings.symbol(class.id).unwrap();
        let entry = ctx.symbols.class(shape).unwrap();
        assert_eq!(entry.functions.len(), 1);
        let init = ctx.symbols.function(entry.functions[0]).unwrap();
        assert_eq!(init.name, "init");
        assert_eq!(init.link_name, "Shape_init");
        assert!(init.is_implicit());
        assert_eq!(entry.parent, Some(ctx.symbols.root_class()));
    });
}

#[test]
fn user_init_replaces_implicit_init() {
    let source = r#"
        class Counter {
            int count;
            int get() { return count; }
            void init() { count = 0; }
        }
    "#;
    with_resolved(source, |script, ctx| {
        assert!(!ctx.has_errors(), "{}", ctx.diagnostics);
        let Item::Class(class) = &script.items[0] else { panic!() };
        let counter = ctx.bindings.symbol(class.id).unwrap();
        let entry = ctx.symbols.class(counter).unwrap();
        let names: Vec<_> = entry.functions.iter().map(|f| ctx.symbols.name(*f)).collect();
        assert_eq!(names, ["init", "get"]);
        assert!(!ctx.symbols.function(entry.functions[0]).unwrap().is_implicit());
    });
}

#[test]
fn init_with_other_signature_is_a_duplicate() {
    let errors = errors("class Counter { int init() { return 1; } }");
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::DuplicateDeclaration { name, .. } if name == "init"));
}

#[test]
fn extends_allows_forward_references() {
    let source = r#"
        class Square extends Shape { int side; }
        class Shape { int sides; }
    "#;
    with_resolved(source, |script, ctx| {
        assert!(!ctx.has_errors(), "{}", ctx.diagnostics);
        let Item::Class(square) = &script.items[0] else { panic!() };
        let Item::Class(shape) = &script.items[1] else { panic!() };
        let square = ctx.bindings.symbol(square.id).unwrap();
        let shape = ctx.bindings.symbol(shape.id).unwrap();
        assert_eq!(ctx.symbols.class(square).unwrap().parent, Some(shape));
    });
}

#[test]
fn inheritance_problems_are_reported() {
    let errors = errors(
        r#"
        class A extends B { }
        class B extends A { }
        class C extends Missing { }
        struct P { int x; }
        class D extends P { }
        "#,
    );
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert!(is_mismatch(&errors[0], "circular inheritance"));
    assert!(matches!(&errors[1], SemanticError::UnresolvedSymbol { name, .. } if name == "Missing"));
    assert!(is_mismatch(&errors[2], "not a class"));
}

#[test]
fn inherited_members_are_visible_in_bodies() {
    let source = r#"
        class Square extends Shape {
            int area() { return side * side + offset(); }
        }
        class Shape {
            int side;
            int offset() { return 0; }
        }
    "#;
    let errors = errors(source);
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn member_access_and_calls() {
    let source = r#"
        struct Point { int x; int y; }
        class Shape {
            Point origin;
            int sides;
            int count() { return sides; }
        }
        int total(Shape* s) {
            Point p;
            p.x = s.origin.y;
            return s.count() + s.sides + p.x;
        }
    "#;
    let errors = errors(source);
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn integer_literals_take_their_context_type() {
    let source = r#"
        uint8 small() {
            uint8 b = 3;
            return b + 1;
        }
    "#;
    with_resolved(source, |script, ctx| {
        assert!(!ctx.has_errors(), "{}", ctx.diagnostics);
        let body = function_body(script, "small");
        let Stmt::VarDecl(decl) = &body[0] else { panic!() };
        let init = decl.init.unwrap();
        assert_eq!(
            ctx.bindings.type_of(init.id()),
            Some(&Type::Primitive(PrimitiveKind::UInt8))
        );
    });
}

#[test]
fn type_errors() {
    let errors = errors(
        r#"
        extern int printf(int8* format, ...);
        int f(int a, bool b) {
            if (a) { return 1; }
            int c = a + b;
            bool d = a < 300;
            printf();
            printf("%d %d", a, c);
            f(1);
            return d;
        }
        "#,
    );
    assert_eq!(errors.len(), 5, "{errors:?}");
    assert!(is_mismatch(&errors[0], "if condition must be 'bool'"));
    assert!(is_mismatch(&errors[1], "operator '+'"));
    assert!(is_mismatch(&errors[2], "expects at least 1"));
    assert!(is_mismatch(&errors[3], "expects 2"));
    assert!(is_mismatch(&errors[4], "cannot use a value of type 'bool' as 'int32'"));
}

#[test]
fn pointer_arguments_are_immutable() {
    let errors = errors(
        r#"
        class Node {
            Node* next;
            void relink(Node* other, int depth) {
                other = next;
                self = other;
                depth = 3;
                next = other;
            }
        }
        "#,
    );
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(is_mismatch(&errors[0], "pointer argument 'other'"));
    assert!(is_mismatch(&errors[1], "pointer argument 'self'"));
}

#[test]
fn missing_return_is_reported() {
    let errors = errors(
        r#"
        int sign(int x) {
            if (x < 0) { return 0; }
        }
        int both(bool b) {
            if (b) { return 1; } else { return 2; }
        }
        "#,
    );
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(is_mismatch(&errors[0], "function 'sign'"));
}

#[test]
fn unknown_names() {
    let errors = errors(
        r#"
        int main() {
            Missing* m;
            return nothing + run();
        }
        "#,
    );
    let names: Vec<_> = errors
        .iter()
        .filter_map(|e| match e {
            SemanticError::UnresolvedSymbol { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["Missing", "nothing", "run"]);
}

#[test]
fn unbraced_branches_scope_their_declarations() {
    let leaked = errors(
        r#"
        int f(bool c) {
            if (c) int x = 1;
            return x;
        }
        "#,
    );
    assert_eq!(leaked.len(), 1, "{leaked:?}");
    assert!(matches!(&leaked[0], SemanticError::UnresolvedSymbol { name, .. } if name == "x"));

    // Each branch is its own scope, so the same name in both is no redefinition.
    let both = errors(
        r#"
        int g(bool c) {
            if (c) int y = 1; else int y = 2;
            return 0;
        }
        "#,
    );
    assert!(both.is_empty(), "{both:?}");
}

#[test]
fn generated_names_clash_with_user_names() {
    let method = errors(
        r#"
        class Shape { int area() { return 1; } }
        int Shape_area() { return 2; }
        "#,
    );
    assert_eq!(method.len(), 1, "{method:?}");
    assert!(matches!(
        &method[0],
        SemanticError::DuplicateDeclaration { name, .. } if name == "Shape_area"
    ));

    let record = errors("struct ShapeClass { int x; } class Shape {}");
    assert_eq!(record.len(), 1, "{record:?}");
    assert!(matches!(
        &record[0],
        SemanticError::DuplicateDeclaration { name, .. } if name == "ShapeClass"
    ));

    // Records and globals are separate namespaces.
    let separate = errors("struct ShapeName { int x; } class Shape {} void Object_ini() {}");
    assert!(separate.is_empty(), "{separate:?}");
}

#[test]
fn records_cannot_contain_themselves() {
    let direct = errors("class A { A inner; }");
    assert_eq!(direct.len(), 1, "{direct:?}");
    assert!(is_mismatch(&direct[0], "'A' contains itself by value"));

    let mutual = errors("struct P { Q q; } struct Q { P p; }");
    assert_eq!(mutual.len(), 2, "{mutual:?}");
    assert!(is_mismatch(&mutual[0], "'P'"));
    assert!(is_mismatch(&mutual[1], "'Q'"));

    let inherited = errors("class Base { Derived held; } class Derived extends Base {}");
    assert_eq!(inherited.len(), 2, "{inherited:?}");

    let linked = errors("class Node { Node* next; } struct Pair { Node* a; Node* b; }");
    assert!(linked.is_empty(), "{linked:?}");
}
