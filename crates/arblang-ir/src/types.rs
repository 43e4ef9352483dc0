//! Type model: floats, named records, and function signatures.

use crate::arena::{Handle, UniqueArena};

/// A member of a struct type. Field order is significant for
/// construction and access.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct StructMember {
    pub name: String,
    pub ty: Handle<Type>,
}

/// A formal parameter of a function type.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Handle<Type>,
}

/// A type. Only `Float` is unnamed; structs and functions are compared
/// nominally, so one handle is interned per declared name and handle
/// equality is the identity test.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Type {
    pub name: Option<String>,
    pub inner: TypeInner,
}

/// The concrete shape of a type.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum TypeInner {
    /// The only primitive.
    Float,
    /// A named record with ordered fields.
    Struct { fields: Vec<StructMember> },
    /// A function signature. The name of the carrying [`Type`] equals the
    /// name of the function value it belongs to.
    Function {
        params: Vec<Parameter>,
        result: Handle<Type>,
    },
}

impl Type {
    /// The primitive float type.
    pub const FLOAT: Self = Self {
        name: None,
        inner: TypeInner::Float,
    };

    pub fn is_float(&self) -> bool {
        matches!(self.inner, TypeInner::Float)
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.inner, TypeInner::Struct { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.inner, TypeInner::Function { .. })
    }
}

/// Formats a type's display name: `float` for the primitive, the declared
/// name for structs and functions.
pub fn format_type(ty: &Type, types: &UniqueArena<Type>) -> String {
    if let Some(ref name) = ty.name {
        return name.clone();
    }
    match ty.inner {
        TypeInner::Float => "float".into(),
        // Named shapes always carry their name; this arm only fires for
        // hand-built types that forgot one.
        TypeInner::Struct { ref fields } => format!("struct({} fields)", fields.len()),
        TypeInner::Function { ref params, result } => {
            let ret = format_type(&types[result], types);
            format!("fn({} params) -> {ret}", params.len())
        }
    }
}
