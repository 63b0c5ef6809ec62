//! Operators and keyword words carried by nodes.

use std::fmt;

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Quo,
    Rem,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    AndNot,

    // Short-circuit
    LogicalAnd,
    LogicalOr,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl BinaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Quo => "/",
            Self::Rem => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::AndNot => "&^",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }

    /// `&&` and `||`: the right operand is evaluated only when needed.
    #[inline]
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr)
    }

    #[inline]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    #[inline]
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::Shl | Self::Shr)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// `+x`
    Pos,
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `^x`
    BitNot,
    /// `<-x`
    Recv,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Pos => "+",
            Self::Neg => "-",
            Self::Not => "!",
            Self::BitNot => "^",
            Self::Recv => "<-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Assignment forms: `=`, `:=`, and `op=`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    Define,
    Compound(BinaryOp),
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignOp::Assign => f.write_str("="),
            AssignOp::Define => f.write_str(":="),
            AssignOp::Compound(op) => write!(f, "{op}="),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IncDecOp {
    Inc,
    Dec,
}

impl fmt::Display for IncDecOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IncDecOp::Inc => "++",
            IncDecOp::Dec => "--",
        })
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BranchOp {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl fmt::Display for BranchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BranchOp::Break => "break",
            BranchOp::Continue => "continue",
            BranchOp::Goto => "goto",
            BranchOp::Fallthrough => "fallthrough",
        })
    }
}

/// Class of a basic literal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// Channel direction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ChanDir {
    Send,
    Recv,
    #[default]
    Both,
}
