//! Surface expressions and top-level items.
//!
//! Type names are plain strings here; they are resolved against the
//! declarations in scope when the block is lowered.

/// A `name: type-name` pair, used for let binders, function parameters,
/// and struct fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedVar {
    pub name: String,
    pub ty: String,
}

impl TypedVar {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// A surface expression.
#[derive(Clone, Debug)]
pub enum Expr {
    /// A literal float.
    Float(f64),
    /// A use of a name; resolved during lowering.
    Var(String),
    /// `let var = value in body`.
    Let {
        var: TypedVar,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    /// Arithmetic on two float-valued operands.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `object.field` on a struct-typed variable.
    Access { object: String, field: String },
    /// Record construction with fields in declared order.
    Create { name: String, fields: Vec<Expr> },
    /// Function application.
    Apply { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn float(value: f64) -> Self {
        Self::Float(value)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    pub fn binding(var: TypedVar, value: Expr, body: Expr) -> Self {
        Self::Let {
            var,
            value: Box::new(value),
            body: Box::new(body),
        }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Sub, lhs, rhs)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Mul, lhs, rhs)
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinOp::Div, lhs, rhs)
    }

    pub fn access(object: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Access {
            object: object.into(),
            field: field.into(),
        }
    }

    pub fn create(name: impl Into<String>, fields: Vec<Expr>) -> Self {
        Self::Create {
            name: name.into(),
            fields,
        }
    }

    pub fn apply(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Apply {
            name: name.into(),
            args,
        }
    }
}

/// A function definition: name, declared return type, ordered parameters,
/// and a body expression.
#[derive(Clone, Debug)]
pub struct FuncDef {
    pub name: String,
    pub ret: String,
    pub params: Vec<TypedVar>,
    pub body: Expr,
}

/// A struct definition with ordered fields.
#[derive(Clone, Debug)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<TypedVar>,
}

/// A top-level item. Blocks hold only these, so a statement that is
/// neither a function nor a struct is unrepresentable.
#[derive(Clone, Debug)]
pub enum Item {
    Func(FuncDef),
    Struct(StructDef),
}

impl Item {
    pub fn func(
        name: impl Into<String>,
        ret: impl Into<String>,
        params: Vec<TypedVar>,
        body: Expr,
    ) -> Self {
        Self::Func(FuncDef {
            name: name.into(),
            ret: ret.into(),
            params,
            body,
        })
    }

    pub fn strukt(name: impl Into<String>, fields: Vec<TypedVar>) -> Self {
        Self::Struct(StructDef {
            name: name.into(),
            fields,
        })
    }

    /// The declared name of the item.
    pub fn name(&self) -> &str {
        match self {
            Self::Func(f) => &f.name,
            Self::Struct(s) => &s.name,
        }
    }
}

/// The top-level container: an ordered list of definitions. Order is
/// significant; every type name an item mentions must be introduced by an
/// earlier item (or be the primitive `float`).
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub items: Vec<Item>,
}

impl Block {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}
