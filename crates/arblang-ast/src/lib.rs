//! Surface AST for Arb-Lang.
//!
//! A front end (or a test) builds a [`Block`] of struct and function
//! definitions with these constructors; type names stay as strings until
//! lowering resolves them. The `Display` impls render the flat
//! s-expression form used for inspection.

mod display;
mod expr;

pub use expr::{BinOp, Block, Expr, FuncDef, Item, StructDef, TypedVar};
