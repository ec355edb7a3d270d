use failure::Fail;
use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
    rc::Rc,
};
use strtab::Symbol;

#[derive(Debug, Fail, Clone, PartialEq, Eq)]
pub enum TypeSystemError {
    #[fail(display = "redefinition of class '{}'", name)]
    ClassAlreadyDeclared { name: String },
    #[fail(display = "'{}' is a builtin type and cannot be declared as a class", name)]
    ReservedTypeName { name: String },
    #[fail(
        display = "redefinition of method '{}' in class '{}'",
        method_name, class_name
    )]
    MethodAlreadyDeclared {
        class_name: String,
        method_name: String,
    },
    #[fail(
        display = "class '{}' cannot have '{}' as a supertype, only classes can",
        class_name, supertype
    )]
    InvalidSupertype {
        class_name: String,
        supertype: String,
    },
    #[fail(display = "type '{}' does not exist", name)]
    TypeDoesNotExist { name: String },
}

/// The nominal class hierarchy expressions are checked against.
///
/// Builtin types (`int`, `boolean`, `double`, `void` and the null type) are
/// not stored here, they are variants of [`CheckedType`].
#[derive(Debug, Default)]
pub struct TypeSystem<'src> {
    defined_classes: HashMap<Symbol<'src>, ClassDef<'src>>,
}

impl<'src> TypeSystem<'src> {
    pub fn new() -> Self {
        TypeSystem::default()
    }

    pub fn add_class_def(
        &mut self,
        class_def: ClassDef<'src>,
    ) -> Result<ClassDefId<'src>, TypeSystemError> {
        let name = class_def.name;
        if CheckedType::builtin_named(name.as_str()).is_some() || name == *"null" {
            return Err(TypeSystemError::ReservedTypeName {
                name: name.to_string(),
            });
        }

        match self.defined_classes.entry(name) {
            Entry::Occupied(_) => Err(TypeSystemError::ClassAlreadyDeclared {
                name: name.to_string(),
            }),
            Entry::Vacant(e) => {
                e.insert(class_def);
                Ok(ClassDefId { id: name })
            }
        }
    }

    pub fn class_mut(&mut self, id: ClassDefId<'src>) -> &mut ClassDef<'src> {
        self.defined_classes
            .get_mut(&id.id)
            .expect("Ids always point to existing classes")
    }

    #[cfg(test)]
    pub(crate) fn class(&self, id: ClassDefId<'src>) -> &ClassDef<'src> {
        self.defined_classes
            .get(&id.id)
            .expect("Ids always point to existing classes")
    }

    /// Resolves a type name as it would be written in source code, e.g.
    /// `int` or `String`. The null type has no name and is never returned.
    pub fn type_named(&self, name: &str) -> Option<CheckedType<'src>> {
        CheckedType::builtin_named(name).or_else(|| {
            self.defined_classes
                .keys()
                .find(|class_name| **class_name == *name)
                .map(|class_name| CheckedType::TypeRef(ClassDefId { id: *class_name }))
        })
    }

    /// The class behind a type, if the type is a class of this type system.
    pub fn resolve_class(&self, ty: &CheckedType<'src>) -> Option<&ClassDef<'src>> {
        match ty {
            CheckedType::TypeRef(id) => self.defined_classes.get(&id.id),
            _ => None,
        }
    }

    /// Methods are looked up on exactly the given type. Inherited methods are
    /// not visible, and builtin types have no methods at all.
    pub fn lookup_method(
        &self,
        ty: &CheckedType<'src>,
        name: Symbol<'src>,
    ) -> Option<Rc<ClassMethodDef<'src>>> {
        self.resolve_class(ty).and_then(|class| class.method(name))
    }

    /// Parameter types of the constructor of `ty`. `None` if `ty` is not a
    /// class and can therefore not be constructed.
    pub fn lookup_constructor(&self, ty: &CheckedType<'src>) -> Option<&[CheckedType<'src>]> {
        self.resolve_class(ty).map(ClassDef::constructor_params)
    }

    /// True iff `supertype` is one of the supertypes `ty` declares itself.
    /// Supertypes of supertypes are not considered.
    pub fn is_direct_supertype_of(
        &self,
        supertype: &CheckedType<'src>,
        ty: &CheckedType<'src>,
    ) -> bool {
        match (supertype, self.resolve_class(ty)) {
            (CheckedType::TypeRef(supertype_id), Some(class)) => {
                class.supertypes().contains(supertype_id)
            }
            _ => false,
        }
    }

    pub fn defined_classes(&self) -> impl Iterator<Item = &ClassDef<'src>> {
        self.defined_classes.values()
    }
}

/// A `ClassDefId` refers to a class definition.
///
/// Having an instance of this struct ensures that
/// the type system that issued this instance can
/// provide the definition of that class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClassDefId<'src> {
    id: Symbol<'src>,
}

impl<'src> From<ClassDefId<'src>> for CheckedType<'src> {
    fn from(id: ClassDefId<'src>) -> CheckedType<'src> {
        CheckedType::TypeRef(id)
    }
}

impl<'src> fmt::Display for ClassDefId<'src> {
    fn fmt(&self, f: &'_ mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[derive(Debug)]
pub struct ClassDef<'src> {
    pub name: Symbol<'src>,
    supertypes: Vec<ClassDefId<'src>>,
    // `None` behaves like a declared constructor without parameters
    constructor: Option<Vec<CheckedType<'src>>>,
    methods: HashMap<Symbol<'src>, Rc<ClassMethodDef<'src>>>,
}

impl<'src> ClassDef<'src> {
    pub fn new(name: Symbol<'src>) -> ClassDef<'src> {
        ClassDef {
            name,
            supertypes: Vec::new(),
            constructor: None,
            methods: HashMap::new(),
        }
    }

    /// Supertypes are class ids, so primitives and null can never end up
    /// in the supertype relation.
    pub fn add_supertype(&mut self, supertype: ClassDefId<'src>) {
        if !self.supertypes.contains(&supertype) {
            self.supertypes.push(supertype);
        }
    }

    pub fn supertypes(&self) -> &[ClassDefId<'src>] {
        &self.supertypes
    }

    pub fn set_constructor(&mut self, params: Vec<CheckedType<'src>>) {
        self.constructor = Some(params);
    }

    #[cfg(test)]
    pub(crate) fn has_declared_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn constructor_params(&self) -> &[CheckedType<'src>] {
        match &self.constructor {
            Some(params) => params,
            None => &[],
        }
    }

    pub fn add_method(&mut self, method: ClassMethodDef<'src>) -> Result<(), TypeSystemError> {
        match self.methods.entry(method.name) {
            Entry::Occupied(_) => Err(TypeSystemError::MethodAlreadyDeclared {
                class_name: self.name.to_string(),
                method_name: method.name.to_string(),
            }),
            Entry::Vacant(e) => {
                e.insert(Rc::new(method));
                Ok(())
            }
        }
    }

    pub fn method(&self, name: Symbol<'src>) -> Option<Rc<ClassMethodDef<'src>>> {
        self.methods.get(&name).map(Rc::clone)
    }

    pub fn method_names<'a>(&'a self) -> impl Iterator<Item = Symbol<'src>> + 'a {
        self.methods.keys().cloned()
    }
}

#[derive(Debug)]
pub struct ClassMethodDef<'src> {
    /// Name of the method
    pub name: Symbol<'src>,
    pub params: Vec<CheckedType<'src>>,
    pub return_ty: CheckedType<'src>,
}

impl<'src> ClassMethodDef<'src> {
    pub fn new(
        name: Symbol<'src>,
        params: Vec<CheckedType<'src>>,
        return_ty: CheckedType<'src>,
    ) -> ClassMethodDef<'src> {
        ClassMethodDef {
            name,
            params,
            return_ty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckedType<'src> {
    Int,
    Boolean,
    Double,
    Void,
    Null,
    TypeRef(ClassDefId<'src>),
    /// Result of asking an ill-typed method call for its type, carries the
    /// name of the method that could not be resolved.
    Unknown(Symbol<'src>),
}

impl<'src> CheckedType<'src> {
    pub const PRIMITIVES: [CheckedType<'static>; 3] =
        [CheckedType::Int, CheckedType::Boolean, CheckedType::Double];

    pub fn builtin_named(name: &str) -> Option<CheckedType<'static>> {
        match name {
            "int" => Some(CheckedType::Int),
            "boolean" => Some(CheckedType::Boolean),
            "double" => Some(CheckedType::Double),
            "void" => Some(CheckedType::Void),
            _ => None,
        }
    }

    /// `void` is deliberately not a primitive: it is only ever a return type.
    pub fn is_primitive(&self) -> bool {
        match self {
            CheckedType::Int | CheckedType::Boolean | CheckedType::Double => true,
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        *self == CheckedType::Null
    }
}

impl<'src> fmt::Display for CheckedType<'src> {
    fn fmt(&self, f: &'_ mut fmt::Formatter<'_>) -> fmt::Result {
        use self::CheckedType::*;
        match self {
            Int => write!(f, "int"),
            Boolean => write!(f, "boolean"),
            Double => write!(f, "double"),
            Void => write!(f, "void"),
            Null => write!(f, "null"),
            TypeRef(name) => write!(f, "{}", name),
            Unknown(name) => write!(f, "?{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strtab::StringTable;

    macro_rules! class {
        ($ts:expr, $strtab:expr, $name:expr) => {
            $ts.add_class_def(ClassDef::new($strtab.intern($name)))
                .expect("class names in tests are unique")
        };
    }

    #[test]
    fn classes_cannot_be_redefined() {
        let mut strtab = StringTable::new();
        let mut ts = TypeSystem::new();
        class!(ts, strtab, "Object");

        let err = ts
            .add_class_def(ClassDef::new(strtab.intern("Object")))
            .unwrap_err();
        assert_eq!(
            TypeSystemError::ClassAlreadyDeclared {
                name: "Object".to_string()
            },
            err
        );
    }

    #[test]
    fn builtin_names_are_reserved() {
        let mut strtab = StringTable::new();
        let mut ts = TypeSystem::new();
        for name in &["int", "boolean", "double", "void", "null"] {
            let err = ts.add_class_def(ClassDef::new(strtab.intern(*name)));
            assert_matches_reserved(err);
        }
        assert_eq!(0, ts.defined_classes().count());
    }

    fn assert_matches_reserved(result: Result<ClassDefId<'_>, TypeSystemError>) {
        match result {
            Err(TypeSystemError::ReservedTypeName { .. }) => (),
            other => panic!("expected ReservedTypeName, got {:?}", other),
        }
    }

    #[test]
    fn methods_are_not_inherited() {
        let mut strtab = StringTable::new();
        let mut ts = TypeSystem::new();
        let object = class!(ts, strtab, "Object");
        let string = class!(ts, strtab, "String");
        ts.class_mut(string).add_supertype(object);

        let hash = strtab.intern("hashCode");
        ts.class_mut(object)
            .add_method(ClassMethodDef::new(hash, vec![], CheckedType::Int))
            .unwrap();

        assert!(ts.lookup_method(&object.into(), hash).is_some());
        assert!(ts.lookup_method(&string.into(), hash).is_none());
        assert!(ts.lookup_method(&CheckedType::Int, hash).is_none());
        assert!(ts.lookup_method(&CheckedType::Null, hash).is_none());
    }

    #[test]
    fn methods_cannot_be_redefined() {
        let mut strtab = StringTable::new();
        let mut ts = TypeSystem::new();
        let string = class!(ts, strtab, "String");
        let length = strtab.intern("length");

        let class = ts.class_mut(string);
        class
            .add_method(ClassMethodDef::new(length, vec![], CheckedType::Int))
            .unwrap();
        let err = class
            .add_method(ClassMethodDef::new(length, vec![], CheckedType::Double))
            .unwrap_err();
        assert_eq!("redefinition of method 'length' in class 'String'", err.to_string());
    }

    #[test]
    fn supertype_relation_is_one_level_only() {
        let mut strtab = StringTable::new();
        let mut ts = TypeSystem::new();
        let c = class!(ts, strtab, "C");
        let b = class!(ts, strtab, "B");
        let a = class!(ts, strtab, "A");
        ts.class_mut(b).add_supertype(c);
        ts.class_mut(a).add_supertype(b);

        assert!(ts.is_direct_supertype_of(&b.into(), &a.into()));
        assert!(ts.is_direct_supertype_of(&c.into(), &b.into()));
        assert!(!ts.is_direct_supertype_of(&c.into(), &a.into()));
        assert!(!ts.is_direct_supertype_of(&a.into(), &b.into()));
        assert!(!ts.is_direct_supertype_of(&a.into(), &a.into()));
    }

    #[test]
    fn a_class_may_have_several_supertypes() {
        let mut strtab = StringTable::new();
        let mut ts = TypeSystem::new();
        let comparable = class!(ts, strtab, "Comparable");
        let object = class!(ts, strtab, "Object");
        let string = class!(ts, strtab, "String");
        ts.class_mut(string).add_supertype(object);
        ts.class_mut(string).add_supertype(comparable);
        ts.class_mut(string).add_supertype(object);

        assert_eq!(&[object, comparable], ts.class(string).supertypes());
        assert!(ts.is_direct_supertype_of(&comparable.into(), &string.into()));
        assert!(ts.is_direct_supertype_of(&object.into(), &string.into()));
    }

    #[test]
    fn builtins_have_no_supertypes() {
        let mut strtab = StringTable::new();
        let mut ts = TypeSystem::new();
        let object: CheckedType<'_> = class!(ts, strtab, "Object").into();

        assert!(!ts.is_direct_supertype_of(&object, &CheckedType::Null));
        assert!(!ts.is_direct_supertype_of(&object, &CheckedType::Int));
        assert!(!ts.is_direct_supertype_of(&CheckedType::Int, &object));
    }

    #[test]
    fn constructor_defaults_to_no_params() {
        let mut strtab = StringTable::new();
        let mut ts = TypeSystem::new();
        let point = class!(ts, strtab, "Point");

        assert!(!ts.class(point).has_declared_constructor());
        assert_eq!(Some(&[][..]), ts.lookup_constructor(&point.into()));

        ts.class_mut(point)
            .set_constructor(vec![CheckedType::Double, CheckedType::Double]);
        assert_eq!(
            Some(&[CheckedType::Double, CheckedType::Double][..]),
            ts.lookup_constructor(&point.into())
        );
        assert_eq!(None, ts.lookup_constructor(&CheckedType::Boolean));
        assert_eq!(None, ts.lookup_constructor(&CheckedType::Null));
    }

    #[test]
    fn type_names_resolve_to_builtins_and_classes() {
        let mut strtab = StringTable::new();
        let mut ts = TypeSystem::new();
        let string = class!(ts, strtab, "String");

        assert_eq!(Some(CheckedType::Int), ts.type_named("int"));
        assert_eq!(Some(CheckedType::Void), ts.type_named("void"));
        assert_eq!(Some(CheckedType::TypeRef(string)), ts.type_named("String"));
        assert_eq!(None, ts.type_named("null"));
        assert_eq!(None, ts.type_named("Strin"));
    }

    #[test]
    fn only_int_boolean_and_double_are_primitive() {
        for primitive in CheckedType::PRIMITIVES.iter() {
            assert!(primitive.is_primitive());
        }
        assert!(!CheckedType::Void.is_primitive());
        assert!(!CheckedType::Null.is_primitive());
        assert!(CheckedType::Null.is_null());
        assert_eq!("double", CheckedType::Double.to_string());
    }
}
