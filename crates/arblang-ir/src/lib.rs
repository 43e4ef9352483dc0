//! Arb-Lang intermediate representation.
//!
//! An arena-based, let-normalised IR for per-compartment biophysical
//! update functions. Every computation is named by a let, scopes nest
//! linearly, and each node carries its resolved type.

pub mod arena;
mod display;
mod error;
mod node;
mod types;

pub use arena::{Arena, Handle, UniqueArena};
pub use display::dump_program;
pub use error::IrError;
pub use node::{BinaryOp, Node, NodeKind, Program, VarDef};
pub use types::{Parameter, StructMember, Type, TypeInner, format_type};
