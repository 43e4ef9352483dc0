//! Flat s-expression rendering of the surface tree.

use std::fmt;

use crate::expr::{BinOp, Block, Expr, Item};

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Sub => write!(f, "-"),
            Self::Mul => write!(f, "*"),
            Self::Div => write!(f, "/"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Var(name) => write!(f, "{name}"),
            Self::Let { var, value, body } => {
                write!(f, "(let ({}:{} ({value})) in {body})", var.name, var.ty)
            }
            Self::Binary { op, lhs, rhs } => write!(f, "( {op} {lhs} {rhs})"),
            Self::Access { object, field } => write!(f, "{object}.{field}"),
            Self::Create { name, fields } => {
                write!(f, "(create {name}(")?;
                for field in fields {
                    write!(f, "{field} ")?;
                }
                write!(f, "))")
            }
            Self::Apply { name, args } => {
                write!(f, "(apply {name}(")?;
                for arg in args {
                    write!(f, "{arg} ")?;
                }
                write!(f, "))")
            }
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Func(func) => {
                write!(f, "(let_f ({} (", func.name)?;
                for p in &func.params {
                    write!(f, "{}:{} ", p.name, p.ty)?;
                }
                write!(f, ") {}))", func.body)
            }
            Self::Struct(s) => {
                write!(f, "(let_s ({} (", s.name)?;
                for field in &s.fields {
                    write!(f, "{}:{} ", field.name, field.ty)?;
                }
                write!(f, ")))")
            }
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}
