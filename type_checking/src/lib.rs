#![warn(rust_2018_idioms)]
#![warn(
    clippy::print_stdout,
    clippy::unimplemented,
    clippy::doc_markdown,
    clippy::items_after_statements,
    clippy::match_same_arms,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::use_self,
    clippy::use_debug
)]

//! Static type checking of method calls and object construction over a
//! nominal class hierarchy.
//!
//! The [`type_system::TypeSystem`] is built once, by hand or from a
//! [`decl::HierarchyDecl`], and is only read afterwards. An [`expr::Expr`]
//! tree is then validated with [`expr::Expr::check_types`], which reports the
//! first violated rule as a [`error::TypeError`].

pub mod checker;
pub mod decl;
pub mod error;
pub mod expr;
pub mod type_system;

pub use self::{
    checker::{ExprTypeChecker, NullIs},
    error::{Callee, TypeError, TypeErrorKind, TypeList},
    expr::Expr,
    type_system::{CheckedType, ClassDef, ClassDefId, ClassMethodDef, TypeSystem, TypeSystemError},
};

use diagnostics::Diagnostics;

/// Checks `expr` and writes the error, if any, to `diagnostics`.
/// Returns true iff the expression is well typed.
pub fn check_and_report<'src>(
    expr: &Expr<'src>,
    type_system: &TypeSystem<'src>,
    diagnostics: &Diagnostics,
) -> bool {
    match expr.check_types(type_system) {
        Ok(()) => true,
        Err(error) => {
            log::debug!("`{}` is ill-typed: {:?}", expr, error.kind());
            diagnostics.error(&error);
            if let TypeError::UnknownMethod {
                did_you_mean: Some(name),
                ..
            } = &error
            {
                diagnostics.note(&format_args!("did you mean `{}`?", name));
            }
            false
        }
    }
}
