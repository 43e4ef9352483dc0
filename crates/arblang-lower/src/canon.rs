//! A-normal-form conversion of function bodies.
//!
//! After this pass every operand of a binary operation, create, or apply
//! is an atom (a literal or a variable reference), and every non-atomic
//! computation is named by its own let. Fresh binders are drawn from a
//! monotonic counter with the `_ll` prefix, local to one lowering run.

use arblang_ir::{Handle, Node, NodeKind, Program, Type, VarDef};

pub(crate) struct Canonicaliser {
    counter: usize,
}

impl Canonicaliser {
    pub(crate) fn new() -> Self {
        Self { counter: 0 }
    }

    fn fresh_name(&mut self) -> String {
        let name = format!("_ll{}", self.counter);
        self.counter += 1;
        name
    }

    /// Rewrites one function's body into a chain of lets ending in an
    /// atom. User-written lets keep their binders and their order; the
    /// temporaries a value needs are bound immediately above it, so every
    /// binder dominates its uses. A body that is already canonical comes
    /// back semantically unchanged.
    pub(crate) fn run(&mut self, program: &mut Program, func: Handle<Node>) {
        let NodeKind::Func { body, .. } = program.nodes[func].kind else {
            return;
        };

        let mut bindings: Vec<(Handle<VarDef>, Handle<Node>)> = Vec::new();
        let mut cursor = body;
        let tail = loop {
            match program.nodes[cursor].kind.clone() {
                NodeKind::Let { var, value, scope } => {
                    let value = self.canon_value(program, value, &mut bindings);
                    bindings.push((var, value));
                    cursor = scope;
                }
                kind if kind.is_atom() => break cursor,
                _ => break self.lift(program, cursor, &mut bindings),
            }
        };

        // Rebuild the chain back-to-front so each let's type equals the
        // type of its scope.
        let mut chain = tail;
        for (var, value) in bindings.into_iter().rev() {
            let ty = program.nodes[chain].ty;
            chain = program.nodes.append(Node {
                kind: NodeKind::Let {
                    var,
                    value,
                    scope: chain,
                },
                ty,
            });
        }

        if let NodeKind::Func { body, .. } = &mut program.nodes[func].kind {
            *body = chain;
        }
    }

    /// Canonicalises a node in let-value position: its operands are
    /// lifted to atoms, but the node itself stays where the let already
    /// names it. A nested let in value position is flattened into the
    /// binding list and replaced by its terminal value.
    fn canon_value(
        &mut self,
        program: &mut Program,
        handle: Handle<Node>,
        bindings: &mut Vec<(Handle<VarDef>, Handle<Node>)>,
    ) -> Handle<Node> {
        match program.nodes[handle].kind.clone() {
            NodeKind::FloatLit(_) | NodeKind::VarRef(_) | NodeKind::Access { .. } => handle,
            NodeKind::Binary { op, left, right } => {
                let left = self.lift(program, left, bindings);
                let right = self.lift(program, right, bindings);
                program.nodes[handle].kind = NodeKind::Binary { op, left, right };
                handle
            }
            NodeKind::Create { fields } => {
                let fields = fields
                    .into_iter()
                    .map(|f| self.lift(program, f, bindings))
                    .collect();
                program.nodes[handle].kind = NodeKind::Create { fields };
                handle
            }
            NodeKind::Apply { args } => {
                let args = args
                    .into_iter()
                    .map(|a| self.lift(program, a, bindings))
                    .collect();
                program.nodes[handle].kind = NodeKind::Apply { args };
                handle
            }
            NodeKind::Let { var, value, scope } => {
                let value = self.canon_value(program, value, bindings);
                bindings.push((var, value));
                self.canon_value(program, scope, bindings)
            }
            // Top-level kinds never appear inside a function body.
            NodeKind::Func { .. } | NodeKind::Struct { .. } | NodeKind::Halt => handle,
        }
    }

    /// Lifts a node to an atom: atoms pass through, anything else is
    /// canonicalised, bound to a fresh let, and replaced by a reference
    /// to the fresh binder. Children are lifted before their parent, so
    /// the binding list stays in dependency order.
    fn lift(
        &mut self,
        program: &mut Program,
        handle: Handle<Node>,
        bindings: &mut Vec<(Handle<VarDef>, Handle<Node>)>,
    ) -> Handle<Node> {
        if program.nodes[handle].kind.is_atom() {
            return handle;
        }
        let value = self.canon_value(program, handle, bindings);
        let ty = binder_type(program, value);
        let def = program.defs.append(VarDef {
            name: self.fresh_name(),
            ty,
        });
        bindings.push((def, value));
        program.nodes.append(Node {
            kind: NodeKind::VarRef(def),
            ty: Some(ty),
        })
    }
}

/// The type a fresh binder takes for a lifted value: the value type, so
/// an apply's binder carries the callee's result rather than the
/// function wrapper.
fn binder_type(program: &Program, handle: Handle<Node>) -> Handle<Type> {
    program
        .value_type(handle)
        .expect("lowered nodes carry a type")
}
