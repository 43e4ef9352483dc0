//! IR nodes — a let-normalised expression tree stored in an arena.

use crate::arena::{Arena, Handle, UniqueArena};
use crate::types::{Type, TypeInner};

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// A named binder carrying its resolved type. Binders are introduced by
/// lets, function parameters, and struct fields; [`NodeKind::VarRef`]
/// holds a non-owning back-reference to one.
#[derive(Clone, Debug)]
pub struct VarDef {
    pub name: String,
    pub ty: Handle<Type>,
}

/// An IR node: a kind plus its resolved type.
///
/// Only [`NodeKind::Halt`] has no type.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub ty: Option<Handle<Type>>,
}

/// The kind of an IR node.
///
/// `Let`, `Func`, and `Struct` own their value/body and their scope;
/// `VarRef` is a non-owning back-reference to a binder that dominates the
/// use site. In canonical form, every operand of `Binary`, `Create`, and
/// `Apply` is an atom (a literal or a reference), and `Access` objects are
/// references by construction.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// A literal float. Type: float.
    FloatLit(f64),
    /// A use of a binder. Type: the binder's type.
    VarRef(Handle<VarDef>),
    /// `let var = value in scope`. Type: the scope's type.
    Let {
        var: Handle<VarDef>,
        value: Handle<Node>,
        scope: Handle<Node>,
    },
    /// Arithmetic on two float operands. Type: float.
    Binary {
        op: BinaryOp,
        left: Handle<Node>,
        right: Handle<Node>,
    },
    /// Field selection by index; `object` is a `VarRef` node of struct
    /// type. Type: the selected field's type.
    Access { object: Handle<Node>, index: u32 },
    /// Record construction in declared field order. Type: the struct.
    Create { fields: Vec<Handle<Node>> },
    /// Function application. Type: the function type wrapper; the value
    /// type is the function's result (see [`Program::value_type`]).
    Apply { args: Vec<Handle<Node>> },
    /// A top-level function definition and the scope it is visible in.
    /// Type: the function type of the same name.
    Func {
        name: String,
        params: Vec<Handle<VarDef>>,
        body: Handle<Node>,
        scope: Handle<Node>,
    },
    /// A top-level struct definition and the scope it is visible in.
    /// Type: the struct type of the same name.
    Struct {
        name: String,
        fields: Vec<Handle<VarDef>>,
        scope: Handle<Node>,
    },
    /// Terminator of the top-level chain of nested scopes. No type.
    Halt,
}

impl NodeKind {
    /// An atom is a literal or a variable reference; atoms are the only
    /// operands permitted in canonical form.
    pub fn is_atom(&self) -> bool {
        matches!(self, Self::FloatLit(_) | Self::VarRef(_))
    }
}

/// A lowered program: the arenas plus the root of the nested scope chain.
///
/// The root is a chain of `Struct`/`Func` nodes linked through their
/// scopes and terminated by a single `Halt`.
#[derive(Clone, Debug)]
pub struct Program {
    /// Deduplicated type arena; one handle per declared name.
    pub types: UniqueArena<Type>,
    /// All binders.
    pub defs: Arena<VarDef>,
    /// All IR nodes. Append-only; passes mutate slots in place and may
    /// leave abandoned slots behind.
    pub nodes: Arena<Node>,
    /// First statement of the nested chain, or the halt node for an
    /// empty program.
    pub root: Handle<Node>,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// Creates an empty program whose root is a lone halt node.
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.append(Node {
            kind: NodeKind::Halt,
            ty: None,
        });
        Self {
            types: UniqueArena::new(),
            defs: Arena::new(),
            nodes,
            root,
        }
    }

    /// Interns the primitive float type.
    pub fn float_type(&mut self) -> Handle<Type> {
        self.types.insert(Type::FLOAT)
    }

    /// The type a node evaluates to: its carried type, except for `Apply`
    /// whose carried type is the function wrapper and whose value type is
    /// the function's result.
    pub fn value_type(&self, handle: Handle<Node>) -> Option<Handle<Type>> {
        let ty = self.nodes[handle].ty?;
        match (&self.nodes[handle].kind, &self.types[ty].inner) {
            (NodeKind::Apply { .. }, TypeInner::Function { result, .. }) => Some(*result),
            _ => Some(ty),
        }
    }

    /// Iterates over the top-level statements of the nested chain, in
    /// declaration order.
    pub fn statements(&self) -> impl Iterator<Item = Handle<Node>> + '_ {
        let mut cursor = Some(self.root);
        std::iter::from_fn(move || {
            let handle = cursor?;
            match self.nodes[handle].kind {
                NodeKind::Func { scope, .. } | NodeKind::Struct { scope, .. } => {
                    cursor = Some(scope);
                    Some(handle)
                }
                _ => {
                    cursor = None;
                    None
                }
            }
        })
    }

    /// Looks up a top-level function by name.
    pub fn function(&self, name: &str) -> Option<Handle<Node>> {
        self.statements().find(|&h| {
            matches!(&self.nodes[h].kind, NodeKind::Func { name: n, .. } if n == name)
        })
    }
}
