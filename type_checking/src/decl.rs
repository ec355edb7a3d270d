//! Declarative description of a class hierarchy, e.g. loaded from JSON:
//!
//! ```json
//! { "classes": [
//!     { "name": "Object" },
//!     { "name": "String", "supertypes": ["Object"], "constructor": ["int"],
//!       "methods": [{ "name": "length", "returns": "int" }] }
//! ] }
//! ```

use serde_derive::{Deserialize, Serialize};
use strtab::StringTable;

use crate::type_system::{CheckedType, ClassDef, ClassMethodDef, TypeSystem, TypeSystemError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyDecl {
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Parameter types; a class without one can be constructed without
    /// arguments
    #[serde(default)]
    pub constructor: Option<Vec<String>>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub returns: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl HierarchyDecl {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl<'src> TypeSystem<'src> {
    /// Builds the type system described by `decl`.
    ///
    /// All class names are registered before any signature is resolved, so
    /// classes may refer to classes declared after them.
    pub fn from_decl(
        strtab: &mut StringTable<'src>,
        decl: &'src HierarchyDecl,
    ) -> Result<Self, TypeSystemError> {
        let mut type_system = TypeSystem::new();

        // first pass: find all classes and add them to the type system
        let mut class_ids = Vec::with_capacity(decl.classes.len());
        for class_decl in &decl.classes {
            let id = type_system.add_class_def(ClassDef::new(strtab.intern(&class_decl.name)))?;
            class_ids.push(id);
        }

        // second pass: resolve supertypes and signatures against the first pass
        for (class_decl, class_id) in decl.classes.iter().zip(class_ids) {
            let mut supertypes = Vec::with_capacity(class_decl.supertypes.len());
            for supertype in &class_decl.supertypes {
                match resolve(&type_system, supertype)? {
                    CheckedType::TypeRef(id) => supertypes.push(id),
                    _ => {
                        return Err(TypeSystemError::InvalidSupertype {
                            class_name: class_decl.name.clone(),
                            supertype: supertype.clone(),
                        });
                    }
                }
            }

            let constructor = match &class_decl.constructor {
                Some(params) => Some(resolve_all(&type_system, params)?),
                None => None,
            };

            let mut methods = Vec::with_capacity(class_decl.methods.len());
            for method in &class_decl.methods {
                methods.push(ClassMethodDef::new(
                    strtab.intern(&method.name),
                    resolve_all(&type_system, &method.params)?,
                    resolve(&type_system, &method.returns)?,
                ));
            }

            let class_def = type_system.class_mut(class_id);
            for supertype in supertypes {
                class_def.add_supertype(supertype);
            }
            if let Some(params) = constructor {
                class_def.set_constructor(params);
            }
            for method in methods {
                class_def.add_method(method)?;
            }
        }

        log::debug!(
            "built type system with {} classes",
            type_system.defined_classes().count()
        );
        Ok(type_system)
    }
}

fn resolve<'src>(
    type_system: &TypeSystem<'src>,
    name: &str,
) -> Result<CheckedType<'src>, TypeSystemError> {
    type_system
        .type_named(name)
        .ok_or_else(|| TypeSystemError::TypeDoesNotExist {
            name: name.to_string(),
        })
}

fn resolve_all<'src>(
    type_system: &TypeSystem<'src>,
    names: &[String],
) -> Result<Vec<CheckedType<'src>>, TypeSystemError> {
    names.iter().map(|name| resolve(type_system, name)).collect()
}
