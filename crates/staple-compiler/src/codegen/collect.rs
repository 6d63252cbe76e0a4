//! Compile-unit hoisting: gather what must be declared before any function
//! body is lowered.

use staple_core::NodeId;
use staple_parser::ast::visitor::{Visitor, walk_expr};
use staple_parser::ast::{Expr, LiteralKind};

/// Collects every string literal of a unit in source order.
#[derive(Debug, Default)]
pub struct LiteralCollector<'ast> {
    pub literals: Vec<(NodeId, &'ast str)>,
}

impl<'ast> Visitor<'ast> for LiteralCollector<'ast> {
    fn visit_expr(&mut self, expr: &Expr<'ast>) {
        if let Expr::Literal(literal) = expr
            && let LiteralKind::String(text) = literal.kind
        {
            self.literals.push((literal.id, text));
        }
        walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use staple_parser::Parser;
    use staple_parser::ast::visitor::walk_script;

    #[test]
    fn repeated_texts_keep_every_occurrence() {
        let arena = Bump::new();
        let script = Parser::parse(
            r#"
            extern int puts(int8* s);
            void main() { puts("x"); puts("y"); puts("x"); }
            "#,
            &arena,
        )
        .unwrap();

        let mut collector = LiteralCollector::default();
        walk_script(&mut collector, &script);
        let texts: Vec<&str> = collector.literals.iter().map(|(_, text)| *text).collect();
        assert_eq!(texts, vec!["x", "y", "x"]);
    }
}
