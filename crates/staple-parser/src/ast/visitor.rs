//! Read-only traversal of the syntax tree.
//!
//! Implement [`Visitor`] and override the hooks you care about; the default
//! implementations call the matching `walk_*` function, which visits children
//! in source order.

use super::{Block, ClassDecl, ClassMember, Expr, FunctionDecl, Item, Script, Stmt, StructDecl};

pub trait Visitor<'ast> {
    fn visit_item(&mut self, item: &Item<'ast>) {
        walk_item(self, item);
    }

    fn visit_class(&mut self, class: &ClassDecl<'ast>) {
        walk_class(self, class);
    }

    fn visit_struct(&mut self, _decl: &StructDecl<'ast>) {}

    fn visit_function(&mut self, function: &FunctionDecl<'ast>) {
        walk_function(self, function);
    }

    fn visit_block(&mut self, block: &Block<'ast>) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Stmt<'ast>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr<'ast>) {
        walk_expr(self, expr);
    }
}

pub fn walk_script<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, script: &Script<'ast>) {
    for item in script.items {
        visitor.visit_item(item);
    }
}

pub fn walk_item<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, item: &Item<'ast>) {
    match item {
        Item::Class(class) => visitor.visit_class(class),
        Item::Struct(decl) => visitor.visit_struct(decl),
        Item::Function(function) => visitor.visit_function(function),
    }
}

pub fn walk_class<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, class: &ClassDecl<'ast>) {
    for member in class.members {
        if let ClassMember::Method(method) = member {
            visitor.visit_function(method);
        }
    }
}

pub fn walk_function<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    function: &FunctionDecl<'ast>,
) {
    if let Some(body) = function.body {
        visitor.visit_block(body);
    }
}

pub fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, block: &Block<'ast>) {
    for stmt in block.stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &Stmt<'ast>) {
    match stmt {
        Stmt::Block(block) => visitor.visit_block(block),
        Stmt::VarDecl(decl) => {
            if let Some(init) = decl.init {
                visitor.visit_expr(init);
            }
        }
        Stmt::If(if_stmt) => {
            visitor.visit_expr(if_stmt.condition);
            visitor.visit_stmt(if_stmt.then_stmt);
            if let Some(else_stmt) = if_stmt.else_stmt {
                visitor.visit_stmt(else_stmt);
            }
        }
        Stmt::Return(ret) => {
            if let Some(value) = ret.value {
                visitor.visit_expr(value);
            }
        }
        Stmt::Expr(expr_stmt) => visitor.visit_expr(expr_stmt.expr),
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &Expr<'ast>) {
    match expr {
        Expr::Literal(_) | Expr::Ident(_) => {}
        Expr::Binary(binary) => {
            visitor.visit_expr(binary.left);
            visitor.visit_expr(binary.right);
        }
        Expr::Assign(assign) => {
            visitor.visit_expr(assign.target);
            visitor.visit_expr(assign.value);
        }
        Expr::Call(call) => {
            if let Some(receiver) = call.receiver {
                visitor.visit_expr(receiver);
            }
            for arg in call.args {
                visitor.visit_expr(arg);
            }
        }
        Expr::Member(member) => visitor.visit_expr(member.object),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use crate::ast::LiteralKind;
    use bumpalo::Bump;

    #[derive(Default)]
    struct Strings(Vec<String>);

    impl<'ast> Visitor<'ast> for Strings {
        fn visit_expr(&mut self, expr: &Expr<'ast>) {
            if let Expr::Literal(lit) = expr
                && let LiteralKind::String(text) = lit.kind
            {
                self.0.push(text.to_string());
            }
            walk_expr(self, expr);
        }
    }

    #[test]
    fn visits_literals_in_source_order() {
        let arena = Bump::new();
        let script = Parser::parse(
            r#"
            extern int puts(uint8* s);
            class Greeter {
                void greet() { puts("hi"); }
            }
            int main() {
                if (true) { puts("a"); } else { puts("b"); }
                return puts("c");
            }
            "#,
            &arena,
        )
        .unwrap();

        let mut strings = Strings::default();
        walk_script(&mut strings, &script);
        assert_eq!(strings.0, vec!["hi", "a", "b", "c"]);
    }
}
