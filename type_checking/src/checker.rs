use strtab::Symbol;

use crate::{
    error::{Callee, TypeError, TypeList},
    expr::Expr,
    type_system::{CheckedType, TypeSystem},
};

/// Where a null argument may be passed.
///
/// Method calls accept null even for primitive parameters while constructor
/// calls do not. The two call forms have always disagreed on this and
/// callers observe the difference, so both rules are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullIs {
    AssignableToAnyParameter,
    AssignableToReferenceParameters,
}

pub struct ExprTypeChecker<'ts, 'src> {
    type_system: &'ts TypeSystem<'src>,
}

impl<'ts, 'src> ExprTypeChecker<'ts, 'src> {
    pub fn new(type_system: &'ts TypeSystem<'src>) -> Self {
        ExprTypeChecker { type_system }
    }

    /// Validates `expr` and all of its subexpressions, stopping at the first
    /// rule that is violated.
    pub fn check(&self, expr: &Expr<'src>) -> Result<(), TypeError> {
        match expr {
            Expr::Variable { .. } | Expr::Literal { .. } | Expr::NullLiteral => Ok(()),
            Expr::MethodCall {
                receiver,
                method_name,
                args,
            } => {
                log::debug!("checking method call `{}`", expr);
                self.check_method_call(receiver, *method_name, args)
            }
            Expr::ConstructorCall {
                instantiated_type,
                args,
            } => {
                log::debug!("checking constructor call `{}`", expr);
                self.check_constructor_call(instantiated_type, args)
            }
        }
    }

    fn check_method_call(
        &self,
        receiver: &Expr<'src>,
        method_name: Symbol<'src>,
        args: &[Expr<'src>],
    ) -> Result<(), TypeError> {
        // the receiver itself is not validated, only its static type is used
        let receiver_ty = receiver.static_type(self.type_system);

        if receiver_ty.is_primitive() {
            return Err(TypeError::NotInstantiableReceiver {
                ty: receiver_ty.to_string(),
            });
        }

        let method = match self.type_system.lookup_method(&receiver_ty, method_name) {
            Some(method) => method,
            None => {
                return Err(TypeError::UnknownMethod {
                    ty: receiver_ty.to_string(),
                    method_name: method_name.to_string(),
                    did_you_mean: self
                        .suggest_method(&receiver_ty, method_name)
                        .map(|name| name.to_string()),
                });
            }
        };
        log::debug!(
            "resolved {}.{} to a method returning {}",
            receiver_ty,
            method_name,
            method.return_ty
        );

        let callee = Callee::Method {
            ty: receiver_ty.to_string(),
            method_name: method.name.to_string(),
        };
        self.check_args(callee, &method.params, args, NullIs::AssignableToAnyParameter)
    }

    fn check_constructor_call(
        &self,
        instantiated_type: &CheckedType<'src>,
        args: &[Expr<'src>],
    ) -> Result<(), TypeError> {
        // only classes have constructors, primitives, null and void do not
        let params = match self.type_system.lookup_constructor(instantiated_type) {
            Some(params) => params,
            None => {
                return Err(TypeError::NotInstantiableType {
                    ty: instantiated_type.to_string(),
                });
            }
        };

        let callee = Callee::Constructor(instantiated_type.to_string());
        self.check_args(callee, params, args, NullIs::AssignableToReferenceParameters)
    }

    /// Checks the argument count first. Only then each argument is validated
    /// and compared to its parameter, in order.
    fn check_args(
        &self,
        callee: Callee,
        params: &[CheckedType<'src>],
        args: &[Expr<'src>],
        null_is: NullIs,
    ) -> Result<(), TypeError> {
        if params.len() != args.len() {
            return Err(TypeError::ArityMismatch {
                callee,
                expected: params.len(),
                actual: args.len(),
            });
        }

        let arg_types: Vec<_> = args
            .iter()
            .map(|arg| arg.static_type(self.type_system))
            .collect();

        for (i, (arg, param)) in args.iter().zip(params).enumerate() {
            self.check(arg)?;
            log::trace!(
                "argument {} of {}: {} for parameter of type {}",
                i,
                callee,
                arg_types[i],
                param
            );
            if !self.is_assignable(param, &arg_types[i], null_is) {
                return Err(TypeError::ArgumentTypeMismatch {
                    callee,
                    expected: TypeList::of(params),
                    actual: TypeList::of(&arg_types),
                });
            }
        }

        Ok(())
    }

    /// Widening goes exactly one level up the hierarchy: a `B` parameter
    /// accepts an `A` if `A` declares `B` as a supertype, but a supertype of
    /// `B` does not.
    pub fn is_assignable(
        &self,
        param: &CheckedType<'src>,
        arg: &CheckedType<'src>,
        null_is: NullIs,
    ) -> bool {
        if arg == param || self.type_system.is_direct_supertype_of(param, arg) {
            return true;
        }

        match null_is {
            NullIs::AssignableToAnyParameter => arg.is_null(),
            NullIs::AssignableToReferenceParameters => arg.is_null() && !param.is_primitive(),
        }
    }

    fn suggest_method(&self, ty: &CheckedType<'src>, name: Symbol<'src>) -> Option<Symbol<'src>> {
        self.type_system
            .resolve_class(ty)
            .and_then(|class| strtab::closest(name, class.method_names()))
    }
}

impl<'src> Expr<'src> {
    /// Validates this expression against `type_system`, see
    /// [`ExprTypeChecker::check`].
    pub fn check_types(&self, type_system: &TypeSystem<'src>) -> Result<(), TypeError> {
        ExprTypeChecker::new(type_system).check(self)
    }
}
