//! Error types for the Arb-Lang IR.

/// Invariant violations detected by the validator.
///
/// Any of these is fatal to the current compilation; no pass recovers
/// from a malformed IR.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// A non-halt node carries no type.
    #[error("node [{node}] has no type")]
    MissingType { node: usize },

    /// A node's type disagrees with what its position requires.
    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// A definition and its declared type disagree on a name.
    #[error("definition '{definition}' does not match its type '{ty}'")]
    NameMismatch { definition: String, ty: String },

    /// An operand position that must hold an atom holds something else.
    #[error("non-canonical operand in {context}")]
    NonCanonical { context: String },

    /// A binder with an empty name or a function type.
    #[error("malformed binder '{name}': {reason}")]
    MalformedBinder { name: String, reason: String },

    /// An access index that names no field of the struct.
    #[error("field index {index} out of bounds for struct '{strukt}'")]
    FieldIndex { strukt: String, index: u32 },

    /// A scope position holding a node kind that cannot terminate or
    /// continue the chain.
    #[error("malformed scope in {context}")]
    MalformedScope { context: String },
}
