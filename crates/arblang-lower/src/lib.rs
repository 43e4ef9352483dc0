//! Lowering pass: `arblang_ast::Block` → `arblang_ir::Program`.
//!
//! Resolves names, checks types, converts every function body to
//! A-normal form, and stitches the top-level definitions into a single
//! nested scope chain terminating in a halt.

mod canon;
mod lower;

use arblang_ast::Block;
use arblang_ir::{NodeKind, Program};

/// Lowers a surface block into a nested, canonicalised IR program.
///
/// Fails with the first error encountered; no partial IR is returned.
pub fn lower(block: &Block) -> Result<Program, LowerError> {
    let mut lowerer = lower::Lowerer::new();
    let statements = lowerer.lower_block(block)?;
    let mut program = lowerer.finish();

    let mut canon = canon::Canonicaliser::new();
    for &statement in &statements {
        if matches!(program.nodes[statement].kind, NodeKind::Func { .. }) {
            canon.run(&mut program, statement);
        }
    }

    lower::nest(&mut program, &statements);
    log::debug!(
        "lowered {} statements, {} nodes",
        statements.len(),
        program.nodes.len()
    );
    Ok(program)
}

/// Errors raised while lowering a surface block.
///
/// All are fatal to the current compilation and carry the offending name
/// together with the expected/actual kind or type name.
#[derive(Debug, thiserror::Error)]
pub enum LowerError {
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("'{0}' is not a struct")]
    NotAStruct(String),
    #[error("'{0}' is not a function")]
    NotAFunction(String),
    #[error("struct '{strukt}' has no field '{field}'")]
    FieldUnknown { strukt: String, field: String },
    #[error("'{name}' expects {expected} arguments, found {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },
    #[error("redefinition of '{0}'")]
    Redefinition(String),
}
