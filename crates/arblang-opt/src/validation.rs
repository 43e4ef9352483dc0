//! IR validation.
//!
//! Walks the nested program and enforces the structural and type
//! invariants every pass must preserve. The walk never mutates; the
//! first violation is returned.

use arblang_ir::{Handle, IrError, Node, NodeKind, Program, Type, TypeInner, VarDef, format_type};

/// Validates a nested program against the IR invariants.
pub fn validate(program: &Program) -> Result<(), IrError> {
    let mut cursor = program.root;
    loop {
        match &program.nodes[cursor].kind {
            NodeKind::Struct { .. } => {
                validate_struct(program, cursor)?;
                cursor = scope_of(program, cursor);
            }
            NodeKind::Func { .. } => {
                validate_func(program, cursor)?;
                cursor = scope_of(program, cursor);
            }
            NodeKind::Halt => return Ok(()),
            _ => {
                return Err(IrError::MalformedScope {
                    context: "top-level chain".to_string(),
                });
            }
        }
    }
}

fn scope_of(program: &Program, handle: Handle<Node>) -> Handle<Node> {
    match program.nodes[handle].kind {
        NodeKind::Struct { scope, .. } | NodeKind::Func { scope, .. } => scope,
        _ => handle,
    }
}

fn type_name(program: &Program, ty: Handle<Type>) -> String {
    format_type(&program.types[ty], &program.types)
}

fn node_type(program: &Program, handle: Handle<Node>) -> Result<Handle<Type>, IrError> {
    program.nodes[handle].ty.ok_or(IrError::MissingType {
        node: handle.index(),
    })
}

fn validate_vardef(program: &Program, def: Handle<VarDef>) -> Result<(), IrError> {
    let VarDef { name, ty } = &program.defs[def];
    if name.is_empty() {
        return Err(IrError::MalformedBinder {
            name: name.clone(),
            reason: "empty name".to_string(),
        });
    }
    if program.types[*ty].is_function() {
        return Err(IrError::MalformedBinder {
            name: name.clone(),
            reason: "binders cannot have function type".to_string(),
        });
    }
    Ok(())
}

fn validate_struct(program: &Program, handle: Handle<Node>) -> Result<(), IrError> {
    let NodeKind::Struct { name, fields, .. } = &program.nodes[handle].kind else {
        return Ok(());
    };
    let ty = node_type(program, handle)?;
    let Type {
        name: ty_name,
        inner: TypeInner::Struct { fields: members },
    } = &program.types[ty]
    else {
        return Err(IrError::TypeMismatch {
            context: format!("struct '{name}'"),
            expected: "a struct type".to_string(),
            found: type_name(program, ty),
        });
    };
    if ty_name.as_deref() != Some(name.as_str()) {
        return Err(IrError::NameMismatch {
            definition: name.clone(),
            ty: type_name(program, ty),
        });
    }
    if fields.len() != members.len() {
        return Err(IrError::TypeMismatch {
            context: format!("field count of struct '{name}'"),
            expected: members.len().to_string(),
            found: fields.len().to_string(),
        });
    }
    for (&def, member) in fields.iter().zip(members) {
        validate_vardef(program, def)?;
        let VarDef {
            name: def_name,
            ty: def_ty,
        } = &program.defs[def];
        if *def_name != member.name {
            return Err(IrError::NameMismatch {
                definition: def_name.clone(),
                ty: type_name(program, ty),
            });
        }
        if *def_ty != member.ty {
            return Err(IrError::TypeMismatch {
                context: format!("field '{}' of struct '{name}'", member.name),
                expected: type_name(program, member.ty),
                found: type_name(program, *def_ty),
            });
        }
    }
    Ok(())
}

fn validate_func(program: &Program, handle: Handle<Node>) -> Result<(), IrError> {
    let NodeKind::Func {
        name, params, body, ..
    } = &program.nodes[handle].kind
    else {
        return Ok(());
    };
    let ty = node_type(program, handle)?;
    let Type {
        name: ty_name,
        inner:
            TypeInner::Function {
                params: ty_params,
                result,
            },
    } = &program.types[ty]
    else {
        return Err(IrError::TypeMismatch {
            context: format!("function '{name}'"),
            expected: "a function type".to_string(),
            found: type_name(program, ty),
        });
    };
    if ty_name.as_deref() != Some(name.as_str()) {
        return Err(IrError::NameMismatch {
            definition: name.clone(),
            ty: type_name(program, ty),
        });
    }
    if params.len() != ty_params.len() {
        return Err(IrError::TypeMismatch {
            context: format!("parameter count of '{name}'"),
            expected: ty_params.len().to_string(),
            found: params.len().to_string(),
        });
    }
    for (&def, param) in params.iter().zip(ty_params) {
        validate_vardef(program, def)?;
        let VarDef {
            name: def_name,
            ty: def_ty,
        } = &program.defs[def];
        if *def_name != param.name {
            return Err(IrError::NameMismatch {
                definition: def_name.clone(),
                ty: type_name(program, ty),
            });
        }
        if *def_ty != param.ty {
            return Err(IrError::TypeMismatch {
                context: format!("parameter '{}' of '{name}'", param.name),
                expected: type_name(program, param.ty),
                found: type_name(program, *def_ty),
            });
        }
    }

    validate_expr(program, *body)?;
    let body_ty = program
        .value_type(*body)
        .ok_or(IrError::MissingType { node: body.index() })?;
    if body_ty != *result {
        return Err(IrError::TypeMismatch {
            context: format!("body of '{name}'"),
            expected: type_name(program, *result),
            found: type_name(program, body_ty),
        });
    }
    Ok(())
}

fn validate_atom(program: &Program, handle: Handle<Node>, context: &str) -> Result<(), IrError> {
    if !program.nodes[handle].kind.is_atom() {
        return Err(IrError::NonCanonical {
            context: context.to_string(),
        });
    }
    validate_expr(program, handle)
}

fn validate_expr(program: &Program, handle: Handle<Node>) -> Result<(), IrError> {
    let ty = node_type(program, handle)?;
    match &program.nodes[handle].kind {
        NodeKind::FloatLit(_) => {
            if !program.types[ty].is_float() {
                return Err(IrError::TypeMismatch {
                    context: "float literal".to_string(),
                    expected: "float".to_string(),
                    found: type_name(program, ty),
                });
            }
            Ok(())
        }

        NodeKind::VarRef(def) => {
            let def_ty = program.defs[*def].ty;
            if def_ty != ty {
                return Err(IrError::TypeMismatch {
                    context: format!("reference to '{}'", program.defs[*def].name),
                    expected: type_name(program, def_ty),
                    found: type_name(program, ty),
                });
            }
            Ok(())
        }

        NodeKind::Let { var, value, scope } => {
            validate_vardef(program, *var)?;
            validate_expr(program, *value)?;
            validate_expr(program, *scope)?;
            let scope_ty = node_type(program, *scope)?;
            if ty != scope_ty {
                return Err(IrError::TypeMismatch {
                    context: format!("let '{}'", program.defs[*var].name),
                    expected: type_name(program, scope_ty),
                    found: type_name(program, ty),
                });
            }
            Ok(())
        }

        NodeKind::Binary { left, right, .. } => {
            if !program.types[ty].is_float() {
                return Err(IrError::TypeMismatch {
                    context: "binary operation".to_string(),
                    expected: "float".to_string(),
                    found: type_name(program, ty),
                });
            }
            for &operand in [left, right] {
                validate_atom(program, operand, "binary operand")?;
                let operand_ty = node_type(program, operand)?;
                if !program.types[operand_ty].is_float() {
                    return Err(IrError::TypeMismatch {
                        context: "binary operand".to_string(),
                        expected: "float".to_string(),
                        found: type_name(program, operand_ty),
                    });
                }
            }
            Ok(())
        }

        NodeKind::Access { object, index } => {
            if !matches!(program.nodes[*object].kind, NodeKind::VarRef(_)) {
                return Err(IrError::NonCanonical {
                    context: "access object".to_string(),
                });
            }
            validate_expr(program, *object)?;
            let object_ty = node_type(program, *object)?;
            let TypeInner::Struct { fields } = &program.types[object_ty].inner else {
                return Err(IrError::TypeMismatch {
                    context: "access object".to_string(),
                    expected: "a struct type".to_string(),
                    found: type_name(program, object_ty),
                });
            };
            let Some(member) = fields.get(*index as usize) else {
                return Err(IrError::FieldIndex {
                    strukt: type_name(program, object_ty),
                    index: *index,
                });
            };
            if member.ty != ty {
                return Err(IrError::TypeMismatch {
                    context: format!("access '{}'", member.name),
                    expected: type_name(program, member.ty),
                    found: type_name(program, ty),
                });
            }
            Ok(())
        }

        NodeKind::Create { fields } => {
            let TypeInner::Struct { fields: members } = &program.types[ty].inner else {
                return Err(IrError::TypeMismatch {
                    context: "create".to_string(),
                    expected: "a struct type".to_string(),
                    found: type_name(program, ty),
                });
            };
            if fields.len() != members.len() {
                return Err(IrError::TypeMismatch {
                    context: format!("field count of create {}", type_name(program, ty)),
                    expected: members.len().to_string(),
                    found: fields.len().to_string(),
                });
            }
            for (&field, member) in fields.iter().zip(members) {
                validate_atom(program, field, "create field")?;
                let field_ty = node_type(program, field)?;
                if field_ty != member.ty {
                    return Err(IrError::TypeMismatch {
                        context: format!("create field '{}'", member.name),
                        expected: type_name(program, member.ty),
                        found: type_name(program, field_ty),
                    });
                }
            }
            Ok(())
        }

        NodeKind::Apply { args } => {
            let TypeInner::Function { params, .. } = &program.types[ty].inner else {
                return Err(IrError::TypeMismatch {
                    context: "apply".to_string(),
                    expected: "a function type".to_string(),
                    found: type_name(program, ty),
                });
            };
            if args.len() != params.len() {
                return Err(IrError::TypeMismatch {
                    context: format!("argument count of apply {}", type_name(program, ty)),
                    expected: params.len().to_string(),
                    found: args.len().to_string(),
                });
            }
            for (&arg, param) in args.iter().zip(params) {
                validate_atom(program, arg, "apply argument")?;
                let arg_ty = node_type(program, arg)?;
                if arg_ty != param.ty {
                    return Err(IrError::TypeMismatch {
                        context: format!("apply argument '{}'", param.name),
                        expected: type_name(program, param.ty),
                        found: type_name(program, arg_ty),
                    });
                }
            }
            Ok(())
        }

        NodeKind::Func { .. } | NodeKind::Struct { .. } | NodeKind::Halt => {
            Err(IrError::MalformedScope {
                context: "function body".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arblang_ast::{Block, Expr, Item, TypedVar};

    fn lowered(items: Vec<Item>) -> Program {
        arblang_lower::lower(&Block::new(items)).expect("lowering failed")
    }

    fn sample() -> Program {
        lowered(vec![
            Item::strukt("state", vec![TypedVar::new("m", "float")]),
            Item::func(
                "f",
                "float",
                vec![TypedVar::new("s", "state")],
                Expr::mul(Expr::access("s", "m"), Expr::access("s", "m")),
            ),
        ])
    }

    #[test]
    fn accepts_lowered_program() {
        let program = sample();
        validate(&program).expect("validator rejected a lowered program");
    }

    #[test]
    fn accepts_empty_program() {
        let program = Program::new();
        validate(&program).expect("validator rejected the empty program");
    }

    #[test]
    fn rejects_missing_type() {
        let mut program = sample();
        // Strip the type from the first function body node.
        let func = program.function("f").unwrap();
        let NodeKind::Func { body, .. } = program.nodes[func].kind else {
            unreachable!()
        };
        program.nodes[body].ty = None;
        assert!(matches!(
            validate(&program),
            Err(IrError::MissingType { .. })
        ));
    }

    #[test]
    fn rejects_name_mismatch() {
        let mut program = sample();
        let func = program.function("f").unwrap();
        if let NodeKind::Func { name, .. } = &mut program.nodes[func].kind {
            *name = "renamed".to_string();
        }
        assert!(matches!(
            validate(&program),
            Err(IrError::NameMismatch { .. })
        ));
    }

    #[test]
    fn rejects_non_canonical_operand() {
        let mut program = sample();
        let func = program.function("f").unwrap();
        let NodeKind::Func { body, .. } = program.nodes[func].kind else {
            unreachable!()
        };
        // Deep in the chain, find the binary let and plant a non-atomic
        // operand (the access node itself instead of its binder).
        let mut cursor = body;
        loop {
            let NodeKind::Let { value, scope, .. } = program.nodes[cursor].kind else {
                panic!("no binary value found");
            };
            if matches!(program.nodes[value].kind, NodeKind::Binary { .. }) {
                let access = program
                    .nodes
                    .iter()
                    .find(|(_, n)| matches!(n.kind, NodeKind::Access { .. }))
                    .map(|(h, _)| h)
                    .unwrap();
                if let NodeKind::Binary { left, .. } = &mut program.nodes[value].kind {
                    *left = access;
                }
                break;
            }
            cursor = scope;
        }
        assert!(matches!(
            validate(&program),
            Err(IrError::NonCanonical { .. })
        ));
    }

    #[test]
    fn rejects_let_scope_type_disagreement() {
        let mut program = sample();
        let func = program.function("f").unwrap();
        let NodeKind::Func { body, .. } = program.nodes[func].kind else {
            unreachable!()
        };
        let state = program
            .types
            .iter()
            .find(|(_, t)| t.name.as_deref() == Some("state"))
            .map(|(h, _)| h)
            .unwrap();
        program.nodes[body].ty = Some(state);
        assert!(matches!(
            validate(&program),
            Err(IrError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn rejects_field_index_out_of_bounds() {
        let mut program = sample();
        let access = program
            .nodes
            .iter()
            .find(|(_, n)| matches!(n.kind, NodeKind::Access { .. }))
            .map(|(h, _)| h)
            .unwrap();
        if let NodeKind::Access { index, .. } = &mut program.nodes[access].kind {
            *index = 7;
        }
        assert!(matches!(validate(&program), Err(IrError::FieldIndex { .. })));
    }

    #[test]
    fn rejects_malformed_binder() {
        let mut program = sample();
        let func = program.function("f").unwrap();
        let NodeKind::Func { body, .. } = program.nodes[func].kind else {
            unreachable!()
        };
        let NodeKind::Let { var, .. } = program.nodes[body].kind else {
            panic!("expected canonical let chain");
        };
        program.defs[var].name.clear();
        assert!(matches!(
            validate(&program),
            Err(IrError::MalformedBinder { .. })
        ));
    }
}
