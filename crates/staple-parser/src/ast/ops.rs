//! Binary operators and their precedence.

use crate::lexer::TokenKind;
use std::fmt;

/// Binary operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `||`, short-circuiting
    LogicalOr,
    /// `&&`, evaluates both sides
    LogicalAnd,
    Arithmetic(ArithmeticOp),
    Compare(CompareOp),
}

/// Integer arithmetic and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    BitAnd,
    BitOr,
    BitXor,
}

/// Integer comparisons; all produce `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use ArithmeticOp::*;
        use CompareOp::*;
        Some(match kind {
            TokenKind::PipePipe => BinaryOp::LogicalOr,
            TokenKind::AmpAmp => BinaryOp::LogicalAnd,
            TokenKind::Pipe => BinaryOp::Arithmetic(BitOr),
            TokenKind::Caret => BinaryOp::Arithmetic(BitXor),
            TokenKind::Amp => BinaryOp::Arithmetic(BitAnd),
            TokenKind::EqualEqual => BinaryOp::Compare(Eq),
            TokenKind::BangEqual => BinaryOp::Compare(Ne),
            TokenKind::Less => BinaryOp::Compare(Lt),
            TokenKind::LessEqual => BinaryOp::Compare(Le),
            TokenKind::Greater => BinaryOp::Compare(Gt),
            TokenKind::GreaterEqual => BinaryOp::Compare(Ge),
            TokenKind::Plus => BinaryOp::Arithmetic(Add),
            TokenKind::Minus => BinaryOp::Arithmetic(Sub),
            TokenKind::Star => BinaryOp::Arithmetic(Mul),
            TokenKind::Slash => BinaryOp::Arithmetic(Div),
            _ => return None,
        })
    }

    /// Left and right binding power. All binary operators are left-associative.
    pub fn binding_power(self) -> (u8, u8) {
        use ArithmeticOp::*;
        match self {
            BinaryOp::LogicalOr => (3, 4),
            BinaryOp::LogicalAnd => (5, 6),
            BinaryOp::Arithmetic(BitOr) => (7, 8),
            BinaryOp::Arithmetic(BitXor) => (9, 10),
            BinaryOp::Arithmetic(BitAnd) => (11, 12),
            BinaryOp::Compare(CompareOp::Eq | CompareOp::Ne) => (13, 14),
            BinaryOp::Compare(_) => (15, 16),
            BinaryOp::Arithmetic(Add | Sub) => (17, 18),
            BinaryOp::Arithmetic(Mul | Div) => (19, 20),
        }
    }
}

impl ArithmeticOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::BitAnd => "&",
            ArithmeticOp::BitOr => "|",
            ArithmeticOp::BitXor => "^",
        }
    }
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::Arithmetic(op) => op.as_str(),
            BinaryOp::Compare(op) => op.as_str(),
        })
    }
}
