use itertools::Itertools;
use std::fmt;
use strtab::Symbol;

use crate::type_system::{CheckedType, TypeSystem};

/// An already constructed expression tree. Every node owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'src> {
    /// e.g. `x` in `x.foo()`. The declared type comes from whoever resolved
    /// the name and is trusted as is.
    Variable {
        name: Symbol<'src>,
        declared_type: CheckedType<'src>,
    },
    /// e.g. `5`, kept in its source representation
    Literal {
        value: String,
        ty: CheckedType<'src>,
    },
    NullLiteral,
    /// e.g. `foo.bar(0, 1, 2)`
    MethodCall {
        receiver: Box<Expr<'src>>,
        method_name: Symbol<'src>,
        args: Vec<Expr<'src>>,
    },
    /// e.g. `new Foo(0, 1, 2)`
    ConstructorCall {
        instantiated_type: CheckedType<'src>,
        args: Vec<Expr<'src>>,
    },
}

impl<'src> Expr<'src> {
    pub fn variable(name: Symbol<'src>, declared_type: CheckedType<'src>) -> Self {
        Expr::Variable {
            name,
            declared_type,
        }
    }

    pub fn literal<S: Into<String>>(value: S, ty: CheckedType<'src>) -> Self {
        Expr::Literal {
            value: value.into(),
            ty,
        }
    }

    pub fn null() -> Self {
        Expr::NullLiteral
    }

    pub fn method_call(receiver: Expr<'src>, method_name: Symbol<'src>, args: Vec<Expr<'src>>) -> Self {
        Expr::MethodCall {
            receiver: Box::new(receiver),
            method_name,
            args,
        }
    }

    pub fn constructor_call(instantiated_type: CheckedType<'src>, args: Vec<Expr<'src>>) -> Self {
        Expr::ConstructorCall {
            instantiated_type,
            args,
        }
    }

    /// The compile-time type of this expression.
    ///
    /// This does not validate anything. On an expression that does not pass
    /// [`Expr::check_types`] the result is a type that need not make sense,
    /// e.g. [`CheckedType::Unknown`] for a method that does not exist.
    pub fn static_type(&self, type_system: &TypeSystem<'src>) -> CheckedType<'src> {
        match self {
            Expr::Variable { declared_type, .. } => *declared_type,
            Expr::Literal { ty, .. } => *ty,
            Expr::NullLiteral => CheckedType::Null,
            Expr::MethodCall {
                receiver,
                method_name,
                ..
            } => {
                let receiver_ty = receiver.static_type(type_system);
                type_system
                    .lookup_method(&receiver_ty, *method_name)
                    .map(|method| method.return_ty)
                    .unwrap_or(CheckedType::Unknown(*method_name))
            }
            Expr::ConstructorCall {
                instantiated_type, ..
            } => *instantiated_type,
        }
    }
}

impl fmt::Display for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Variable { name, .. } => write!(f, "{}", name),
            Expr::Literal { value, .. } => write!(f, "{}", value),
            Expr::NullLiteral => write!(f, "null"),
            Expr::MethodCall {
                receiver,
                method_name,
                args,
            } => write!(f, "{}.{}({})", receiver, method_name, args.iter().join(", ")),
            Expr::ConstructorCall {
                instantiated_type,
                args,
            } => write!(f, "new {}({})", instantiated_type, args.iter().join(", ")),
        }
    }
}
