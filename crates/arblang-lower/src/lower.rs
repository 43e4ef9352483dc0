//! Name resolution and type checking: surface items to typed IR nodes.

use std::collections::HashMap;

use arblang_ast as ast;
use arblang_ir::{
    BinaryOp, Handle, Node, NodeKind, Parameter, Program, StructMember, Type, TypeInner, VarDef,
    format_type,
};

use crate::LowerError;

/// Lowers one block. Carries two lookup tables: `defined_types`, seeded
/// with the primitive `float` and extended by each top-level item, and
/// `scope_vars`, cleared between items and populated as binders are
/// encountered during the descent.
pub(crate) struct Lowerer {
    program: Program,
    halt: Handle<Node>,
    float: Handle<Type>,
    defined_types: HashMap<String, Handle<Type>>,
    scope_vars: HashMap<String, Handle<VarDef>>,
}

impl Lowerer {
    pub(crate) fn new() -> Self {
        let mut program = Program::new();
        let halt = program.root;
        let float = program.float_type();
        let mut defined_types = HashMap::new();
        defined_types.insert("float".to_string(), float);
        Self {
            program,
            halt,
            float,
            defined_types,
            scope_vars: HashMap::new(),
        }
    }

    pub(crate) fn finish(self) -> Program {
        self.program
    }

    /// Lowers every item in declaration order, returning their node
    /// handles. Scopes are left pointing at the halt node; [`nest`] wires
    /// the chain afterwards.
    pub(crate) fn lower_block(
        &mut self,
        block: &ast::Block,
    ) -> Result<Vec<Handle<Node>>, LowerError> {
        let mut statements = Vec::with_capacity(block.items.len());
        for item in &block.items {
            if self.defined_types.contains_key(item.name()) {
                return Err(LowerError::Redefinition(item.name().to_string()));
            }
            self.scope_vars.clear();
            let handle = match item {
                ast::Item::Struct(s) => self.lower_struct(s)?,
                ast::Item::Func(f) => self.lower_func(f)?,
            };
            statements.push(handle);
        }
        Ok(statements)
    }

    fn resolve_type(&self, name: &str) -> Result<Handle<Type>, LowerError> {
        self.defined_types
            .get(name)
            .copied()
            .ok_or_else(|| LowerError::UnknownType(name.to_string()))
    }

    fn type_name(&self, ty: Handle<Type>) -> String {
        format_type(&self.program.types[ty], &self.program.types)
    }

    fn lower_struct(&mut self, s: &ast::StructDef) -> Result<Handle<Node>, LowerError> {
        let mut members = Vec::with_capacity(s.fields.len());
        let mut defs = Vec::with_capacity(s.fields.len());
        for field in &s.fields {
            let ty = self.resolve_type(&field.ty)?;
            members.push(StructMember {
                name: field.name.clone(),
                ty,
            });
            defs.push(self.program.defs.append(VarDef {
                name: field.name.clone(),
                ty,
            }));
        }

        let ty = self.program.types.insert(Type {
            name: Some(s.name.clone()),
            inner: TypeInner::Struct { fields: members },
        });
        self.defined_types.insert(s.name.clone(), ty);

        Ok(self.program.nodes.append(Node {
            kind: NodeKind::Struct {
                name: s.name.clone(),
                fields: defs,
                scope: self.halt,
            },
            ty: Some(ty),
        }))
    }

    fn lower_func(&mut self, f: &ast::FuncDef) -> Result<Handle<Node>, LowerError> {
        let ret = self.resolve_type(&f.ret)?;

        let mut params = Vec::with_capacity(f.params.len());
        let mut defs = Vec::with_capacity(f.params.len());
        for param in &f.params {
            let ty = self.resolve_type(&param.ty)?;
            params.push(Parameter {
                name: param.name.clone(),
                ty,
            });
            let def = self.program.defs.append(VarDef {
                name: param.name.clone(),
                ty,
            });
            self.scope_vars.insert(param.name.clone(), def);
            defs.push(def);
        }

        let (body, body_ty) = self.lower_expr(&f.body)?;
        if body_ty != ret {
            return Err(LowerError::TypeMismatch {
                context: format!("return value of '{}'", f.name),
                expected: self.type_name(ret),
                found: self.type_name(body_ty),
            });
        }

        let ty = self.program.types.insert(Type {
            name: Some(f.name.clone()),
            inner: TypeInner::Function {
                params,
                result: ret,
            },
        });
        self.defined_types.insert(f.name.clone(), ty);

        Ok(self.program.nodes.append(Node {
            kind: NodeKind::Func {
                name: f.name.clone(),
                params: defs,
                body,
                scope: self.halt,
            },
            ty: Some(ty),
        }))
    }

    /// Lowers a body expression, returning the node together with its
    /// value type (for an apply, the callee's result rather than the
    /// function wrapper the node itself carries).
    fn lower_expr(&mut self, expr: &ast::Expr) -> Result<(Handle<Node>, Handle<Type>), LowerError> {
        match expr {
            ast::Expr::Float(v) => {
                let node = self.program.nodes.append(Node {
                    kind: NodeKind::FloatLit(*v),
                    ty: Some(self.float),
                });
                Ok((node, self.float))
            }

            ast::Expr::Var(name) => {
                let def = self
                    .scope_vars
                    .get(name)
                    .copied()
                    .ok_or_else(|| LowerError::UnknownVariable(name.clone()))?;
                let ty = self.program.defs[def].ty;
                let node = self.program.nodes.append(Node {
                    kind: NodeKind::VarRef(def),
                    ty: Some(ty),
                });
                Ok((node, ty))
            }

            ast::Expr::Let { var, value, body } => {
                let (value, value_ty) = self.lower_expr(value)?;
                let declared = self.resolve_type(&var.ty)?;
                if value_ty != declared {
                    return Err(LowerError::TypeMismatch {
                        context: format!("binding '{}'", var.name),
                        expected: self.type_name(declared),
                        found: self.type_name(value_ty),
                    });
                }
                let def = self.program.defs.append(VarDef {
                    name: var.name.clone(),
                    ty: declared,
                });
                self.scope_vars.insert(var.name.clone(), def);
                let (scope, scope_ty) = self.lower_expr(body)?;
                let node = self.program.nodes.append(Node {
                    kind: NodeKind::Let { var: def, value, scope },
                    ty: Some(scope_ty),
                });
                Ok((node, scope_ty))
            }

            ast::Expr::Binary { op, lhs, rhs } => {
                let (left, left_ty) = self.lower_expr(lhs)?;
                let (right, right_ty) = self.lower_expr(rhs)?;
                for ty in [left_ty, right_ty] {
                    if ty != self.float {
                        return Err(LowerError::TypeMismatch {
                            context: "binary operand".to_string(),
                            expected: "float".to_string(),
                            found: self.type_name(ty),
                        });
                    }
                }
                let node = self.program.nodes.append(Node {
                    kind: NodeKind::Binary {
                        op: lower_op(*op),
                        left,
                        right,
                    },
                    ty: Some(self.float),
                });
                Ok((node, self.float))
            }

            ast::Expr::Access { object, field } => {
                let def = self
                    .scope_vars
                    .get(object)
                    .copied()
                    .ok_or_else(|| LowerError::UnknownVariable(object.clone()))?;
                let object_ty = self.program.defs[def].ty;
                let TypeInner::Struct { fields } = &self.program.types[object_ty].inner else {
                    return Err(LowerError::NotAStruct(object.clone()));
                };
                let Some(index) = fields.iter().position(|m| m.name == *field) else {
                    return Err(LowerError::FieldUnknown {
                        strukt: self.type_name(object_ty),
                        field: field.clone(),
                    });
                };
                let field_ty = fields[index].ty;
                let reference = self.program.nodes.append(Node {
                    kind: NodeKind::VarRef(def),
                    ty: Some(object_ty),
                });
                let node = self.program.nodes.append(Node {
                    kind: NodeKind::Access {
                        object: reference,
                        index: index as u32,
                    },
                    ty: Some(field_ty),
                });
                Ok((node, field_ty))
            }

            ast::Expr::Create { name, fields } => {
                let ty = self.resolve_type(name)?;
                let TypeInner::Struct { fields: members } = &self.program.types[ty].inner else {
                    return Err(LowerError::NotAStruct(name.clone()));
                };
                // Clone the declared shape to release the borrow on the
                // type arena before appending nodes.
                let members = members.clone();
                if fields.len() != members.len() {
                    return Err(LowerError::Arity {
                        name: name.clone(),
                        expected: members.len(),
                        found: fields.len(),
                    });
                }
                let mut lowered = Vec::with_capacity(fields.len());
                for (field, member) in fields.iter().zip(&members) {
                    let (handle, field_ty) = self.lower_expr(field)?;
                    if field_ty != member.ty {
                        return Err(LowerError::TypeMismatch {
                            context: format!("field '{}' of '{name}'", member.name),
                            expected: self.type_name(member.ty),
                            found: self.type_name(field_ty),
                        });
                    }
                    lowered.push(handle);
                }
                let node = self.program.nodes.append(Node {
                    kind: NodeKind::Create { fields: lowered },
                    ty: Some(ty),
                });
                Ok((node, ty))
            }

            ast::Expr::Apply { name, args } => {
                let ty = self.resolve_type(name)?;
                let TypeInner::Function { params, result } = &self.program.types[ty].inner else {
                    return Err(LowerError::NotAFunction(name.clone()));
                };
                let params = params.clone();
                let result = *result;
                if args.len() != params.len() {
                    return Err(LowerError::Arity {
                        name: name.clone(),
                        expected: params.len(),
                        found: args.len(),
                    });
                }
                let mut lowered = Vec::with_capacity(args.len());
                for (arg, param) in args.iter().zip(&params) {
                    let (handle, arg_ty) = self.lower_expr(arg)?;
                    if arg_ty != param.ty {
                        return Err(LowerError::TypeMismatch {
                            context: format!("argument '{}' of '{name}'", param.name),
                            expected: self.type_name(param.ty),
                            found: self.type_name(arg_ty),
                        });
                    }
                    lowered.push(handle);
                }
                let node = self.program.nodes.append(Node {
                    kind: NodeKind::Apply { args: lowered },
                    ty: Some(ty),
                });
                Ok((node, result))
            }
        }
    }
}

fn lower_op(op: ast::BinOp) -> BinaryOp {
    match op {
        ast::BinOp::Add => BinaryOp::Add,
        ast::BinOp::Sub => BinaryOp::Sub,
        ast::BinOp::Mul => BinaryOp::Mul,
        ast::BinOp::Div => BinaryOp::Div,
    }
}

/// Wires the top-level chain: each statement's scope becomes the next
/// statement, the last keeps the halt terminator, and the first becomes
/// the program root.
pub(crate) fn nest(program: &mut Program, statements: &[Handle<Node>]) {
    for window in 0..statements.len().saturating_sub(1) {
        let next = statements[window + 1];
        match &mut program.nodes[statements[window]].kind {
            NodeKind::Func { scope, .. } | NodeKind::Struct { scope, .. } => *scope = next,
            _ => {}
        }
    }
    if let Some(&first) = statements.first() {
        program.root = first;
    }
}
