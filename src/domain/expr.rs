//! Expression analysis: two pure functions over an expression tree.
//!
//! [`dependencies`] collects the type, method and field references an
//! expression uses; [`complexity`] counts ternary expressions and
//! short-circuit boolean operator occurrences. The two traversals are
//! deliberately not the same walk: complexity ignores several children that
//! dependencies visits (cast targets, constructors, field receivers' types),
//! and each function must keep its own recursion shape.

use crate::domain::ast::{Expr, FieldBinding, MethodBinding, TypeBinding};
use std::collections::HashSet;

/// A tagged reference discovered in an expression. Clients distinguish the
/// three kinds themselves when turning references into graph edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolRef {
    Type(TypeBinding),
    Method(MethodBinding),
    Field(FieldBinding),
}

/// All type, method and field references found in the expression and every
/// expression nested inside it. Unresolved bindings contribute nothing.
pub fn dependencies(e: &Expr) -> HashSet<SymbolRef> {
    let mut out = HashSet::new();
    collect(e, &mut out);
    out
}

fn add_type(out: &mut HashSet<SymbolRef>, t: &Option<TypeBinding>) {
    if let Some(t) = t {
        out.insert(SymbolRef::Type(t.clone()));
    }
}

fn collect(e: &Expr, out: &mut HashSet<SymbolRef>) {
    match e {
        Expr::Assignment { lhs, rhs } => {
            collect(lhs, out);
            collect(rhs, out);
        }
        Expr::Cast { target, inner } => {
            add_type(out, target);
            collect(inner, out);
        }
        Expr::Instantiation {
            instantiated,
            constructor,
            args,
            receiver,
        } => {
            for arg in args {
                collect(arg, out);
            }
            if let Some(c) = constructor {
                out.insert(SymbolRef::Method(c.clone()));
            }
            add_type(out, instantiated);
            if let Some(r) = receiver {
                collect(r, out);
            }
        }
        Expr::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            collect(cond, out);
            collect(then_expr, out);
            collect(else_expr, out);
        }
        Expr::FieldAccess {
            resolved_type,
            field,
            receiver,
        } => {
            add_type(out, resolved_type);
            if let Some(f) = field {
                out.insert(SymbolRef::Field(f.clone()));
                if let Some(declaring) = &f.declaring {
                    out.insert(SymbolRef::Type(declaring.clone()));
                }
            }
            if let Some(r) = receiver {
                collect(r, out);
            }
        }
        Expr::Infix {
            left,
            right,
            extended,
            ..
        } => {
            collect(left, out);
            collect(right, out);
            for operand in extended {
                collect(operand, out);
            }
        }
        Expr::InstanceOf { operand, target } => {
            collect(operand, out);
            add_type(out, target);
        }
        Expr::Call {
            method,
            args,
            receiver,
        } => {
            if let Some(m) = method {
                out.insert(SymbolRef::Type(m.declaring.clone()));
                out.insert(SymbolRef::Type(m.return_type.clone()));
                out.insert(SymbolRef::Method(m.clone()));
            }
            for arg in args {
                collect(arg, out);
            }
            if let Some(r) = receiver {
                collect(r, out);
            }
        }
        Expr::Parenthesized(inner) => collect(inner, out),
        Expr::Postfix { operand } => collect(operand, out),
        Expr::Name { resolved_type } => add_type(out, resolved_type),
        Expr::TypeLiteral { target } => add_type(out, target),
        Expr::Literal | Expr::Other => {}
    }
}

/// Number of conditional expressions and short-circuit boolean operator
/// occurrences in the expression tree. An `a && b && c` chain is one infix
/// node with one extended operand and contributes 2 of its own.
pub fn complexity(e: &Expr) -> u32 {
    match e {
        Expr::Assignment { lhs, rhs } => complexity(lhs) + complexity(rhs),
        Expr::Cast { inner, .. } => complexity(inner),
        Expr::Instantiation { args, receiver, .. } => {
            let mut result: u32 = args.iter().map(complexity).sum();
            if let Some(r) = receiver {
                result += complexity(r);
            }
            result
        }
        Expr::Conditional {
            cond,
            then_expr,
            else_expr,
        } => 1 + complexity(cond) + complexity(then_expr) + complexity(else_expr),
        Expr::FieldAccess { receiver, .. } => receiver.as_deref().map(complexity).unwrap_or(0),
        Expr::Infix {
            op,
            left,
            right,
            extended,
        } => {
            let mut result = complexity(left) + complexity(right);
            for operand in extended {
                result += complexity(operand);
            }
            if op.is_short_circuit() {
                result += 1 + extended.len() as u32;
            }
            result
        }
        Expr::InstanceOf { operand, .. } => complexity(operand),
        Expr::Call { args, receiver, .. } => {
            let mut result: u32 = args.iter().map(complexity).sum();
            if let Some(r) = receiver {
                result += complexity(r);
            }
            result
        }
        Expr::Parenthesized(inner) => complexity(inner),
        Expr::Postfix { operand } => complexity(operand),
        Expr::Name { .. } | Expr::TypeLiteral { .. } | Expr::Literal | Expr::Other => 0,
    }
}
