//! Compile-time type errors reported by the expression checker.

use failure::Fail;
use itertools::Itertools;
use std::fmt;
use strum_macros::{Display, EnumIter};

use crate::type_system::CheckedType;

/// What a call expression invokes, as it is named in error messages.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Callee {
    #[display(fmt = "{}.{}()", ty, method_name)]
    Method { ty: String, method_name: String },
    #[display(fmt = "{} constructor", _0)]
    Constructor(String),
}

/// A parenthesized, comma separated list of type names, e.g. `(int, String)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeList(pub Vec<String>);

impl TypeList {
    pub fn of<'a, 'src: 'a, I>(types: I) -> Self
    where
        I: IntoIterator<Item = &'a CheckedType<'src>>,
    {
        TypeList(types.into_iter().map(ToString::to_string).collect())
    }
}

impl fmt::Display for TypeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}

#[derive(Debug, Fail, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[fail(display = "Type {} does not have methods", ty)]
    NotInstantiableReceiver { ty: String },
    #[fail(display = "{} has no method named {}", ty, method_name)]
    UnknownMethod {
        ty: String,
        method_name: String,
        /// A method of the receiver type with a similar name
        did_you_mean: Option<String>,
    },
    #[fail(display = "Type {} is not instantiable", ty)]
    NotInstantiableType { ty: String },
    #[fail(
        display = "Wrong number of arguments for {}: expected {}, got {}",
        callee, expected, actual
    )]
    ArityMismatch {
        callee: Callee,
        expected: usize,
        actual: usize,
    },
    #[fail(
        display = "{} expects arguments of type {}, but got {}",
        callee, expected, actual
    )]
    ArgumentTypeMismatch {
        callee: Callee,
        expected: TypeList,
        actual: TypeList,
    },
}

/// The cause of a [`TypeError`], without the types and names it mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TypeErrorKind {
    NotInstantiableReceiver,
    UnknownMethod,
    NotInstantiableType,
    ArityMismatch,
    ArgumentTypeMismatch,
}

impl TypeError {
    pub fn kind(&self) -> TypeErrorKind {
        match self {
            TypeError::NotInstantiableReceiver { .. } => TypeErrorKind::NotInstantiableReceiver,
            TypeError::UnknownMethod { .. } => TypeErrorKind::UnknownMethod,
            TypeError::NotInstantiableType { .. } => TypeErrorKind::NotInstantiableType,
            TypeError::ArityMismatch { .. } => TypeErrorKind::ArityMismatch,
            TypeError::ArgumentTypeMismatch { .. } => TypeErrorKind::ArgumentTypeMismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn messages() {
        let method = Callee::Method {
            ty: "String".to_string(),
            method_name: "charAt".to_string(),
        };
        let ctor = Callee::Constructor("Point".to_string());

        let cases = vec![
            (
                TypeError::NotInstantiableReceiver {
                    ty: "int".to_string(),
                },
                "Type int does not have methods",
            ),
            (
                TypeError::UnknownMethod {
                    ty: "String".to_string(),
                    method_name: "lenght".to_string(),
                    did_you_mean: Some("length".to_string()),
                },
                "String has no method named lenght",
            ),
            (
                TypeError::NotInstantiableType {
                    ty: "null".to_string(),
                },
                "Type null is not instantiable",
            ),
            (
                TypeError::ArityMismatch {
                    callee: method.clone(),
                    expected: 1,
                    actual: 0,
                },
                "Wrong number of arguments for String.charAt(): expected 1, got 0",
            ),
            (
                TypeError::ArityMismatch {
                    callee: ctor.clone(),
                    expected: 2,
                    actual: 3,
                },
                "Wrong number of arguments for Point constructor: expected 2, got 3",
            ),
            (
                TypeError::ArgumentTypeMismatch {
                    callee: ctor,
                    expected: TypeList::of(&[CheckedType::Double, CheckedType::Double]),
                    actual: TypeList::of(&[CheckedType::Double, CheckedType::Boolean]),
                },
                "Point constructor expects arguments of type (double, double), but got (double, boolean)",
            ),
            (
                TypeError::ArgumentTypeMismatch {
                    callee: method,
                    expected: TypeList(vec![]),
                    actual: TypeList(vec![]),
                },
                "String.charAt() expects arguments of type (), but got ()",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(expected, error.to_string());
        }
    }

    #[test]
    fn kind_names_the_variant() {
        let error = TypeError::NotInstantiableType {
            ty: "int".to_string(),
        };
        assert_eq!(TypeErrorKind::NotInstantiableType, error.kind());
        assert_eq!("NotInstantiableType", error.kind().to_string());
    }

    #[test]
    fn every_kind_has_a_distinct_name() {
        let names: HashSet<_> = TypeErrorKind::iter().map(|kind| kind.to_string()).collect();
        assert_eq!(5, names.len());
        assert!(names.contains("ArgumentTypeMismatch"));
    }
}
