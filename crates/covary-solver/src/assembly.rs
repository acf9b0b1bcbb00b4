//! Interchange model: named type definitions, members and assemblies.
//!
//! These shapes mirror the versioned JSON schema that downstream per-target
//! code generators also consume. Every value is produced once per compilation
//! and is immutable for the lifetime of a check, which is what lets the
//! resolver and the covariance engine be shared across threads freely.

use crate::types::TypeReference;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the segments of an fqn.
pub const FQN_SEPARATOR: char = '.';

/// Owning assembly name of an fqn: everything before the first separator.
///
/// An fqn without a separator is treated as a bare assembly name.
#[inline]
pub fn assembly_name_of(fqn: &str) -> &str {
    fqn.split_once(FQN_SEPARATOR).map_or(fqn, |(assembly, _)| assembly)
}

// =============================================================================
// Members
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeReference,
    /// Read-only property. Only immutable properties may be narrowed.
    #[serde(default, skip_serializing_if = "is_false")]
    pub immutable: bool,
    #[serde(default, rename = "static", skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, rename = "abstract", skip_serializing_if = "is_false")]
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeReference,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnValue {
    #[serde(rename = "type")]
    pub type_ref: TypeReference,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    /// `None` means the method returns void.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, rename = "static", skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(default, rename = "abstract", skip_serializing_if = "is_false")]
    pub is_abstract: bool,
}

impl Method {
    #[inline]
    pub fn return_type(&self) -> Option<&TypeReference> {
        self.returns.as_ref().map(|r| &r.type_ref)
    }
}

/// A borrowed member of a class or interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member<'a> {
    Property(&'a Property),
    Method(&'a Method),
}

impl<'a> Member<'a> {
    pub fn name(self) -> &'a str {
        match self {
            Member::Property(p) => &p.name,
            Member::Method(m) => &m.name,
        }
    }

    pub fn is_static(self) -> bool {
        match self {
            Member::Property(p) => p.is_static,
            Member::Method(m) => m.is_static,
        }
    }

    pub fn kind_name(self) -> &'static str {
        match self {
            Member::Property(_) => "property",
            Member::Method(_) => "method",
        }
    }
}

fn find_member<'a>(
    properties: &'a [Property],
    methods: &'a [Method],
    name: &str,
) -> Option<Member<'a>> {
    properties
        .iter()
        .find(|p| p.name == name)
        .map(Member::Property)
        .or_else(|| methods.iter().find(|m| m.name == name).map(Member::Method))
}

fn members<'a>(
    properties: &'a [Property],
    methods: &'a [Method],
) -> impl Iterator<Item = Member<'a>> {
    properties
        .iter()
        .map(Member::Property)
        .chain(methods.iter().map(Member::Method))
}

// =============================================================================
// Named type definitions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassType {
    pub fqn: String,
    /// Single inheritance: at most one base class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceType {
    pub fqn: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub fqn: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<EnumMember>,
}

/// Kind tag of a named type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
        })
    }
}

/// A named type definition, tagged by `"kind"` in the interchange format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDef {
    Class(ClassType),
    Interface(InterfaceType),
    Enum(EnumType),
}

impl TypeDef {
    pub fn fqn(&self) -> &str {
        match self {
            TypeDef::Class(c) => &c.fqn,
            TypeDef::Interface(i) => &i.fqn,
            TypeDef::Enum(e) => &e.fqn,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            TypeDef::Class(_) => TypeKind::Class,
            TypeDef::Interface(_) => TypeKind::Interface,
            TypeDef::Enum(_) => TypeKind::Enum,
        }
    }

    /// Base class fqn. Only classes have one.
    pub fn base(&self) -> Option<&str> {
        match self {
            TypeDef::Class(c) => c.base.as_deref(),
            TypeDef::Interface(_) | TypeDef::Enum(_) => None,
        }
    }

    /// Directly declared interfaces (implemented by a class, extended by an
    /// interface). Enums declare none.
    pub fn interfaces(&self) -> &[String] {
        match self {
            TypeDef::Class(c) => &c.interfaces,
            TypeDef::Interface(i) => &i.interfaces,
            TypeDef::Enum(_) => &[],
        }
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            TypeDef::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match self {
            TypeDef::Interface(i) => Some(i),
            _ => None,
        }
    }

    /// Look up a directly declared member by name (properties first).
    pub fn member(&self, name: &str) -> Option<Member<'_>> {
        match self {
            TypeDef::Class(c) => c.member(name),
            TypeDef::Interface(i) => i.member(name),
            TypeDef::Enum(_) => None,
        }
    }

    /// Iterate directly declared members: properties, then methods.
    pub fn members(&self) -> Box<dyn Iterator<Item = Member<'_>> + '_> {
        match self {
            TypeDef::Class(c) => Box::new(members(&c.properties, &c.methods)),
            TypeDef::Interface(i) => Box::new(members(&i.properties, &i.methods)),
            TypeDef::Enum(_) => Box::new(std::iter::empty()),
        }
    }
}

impl ClassType {
    pub fn member(&self, name: &str) -> Option<Member<'_>> {
        find_member(&self.properties, &self.methods, name)
    }
}

impl InterfaceType {
    pub fn member(&self, name: &str) -> Option<Member<'_>> {
        find_member(&self.properties, &self.methods, name)
    }
}

impl From<ClassType> for TypeDef {
    fn from(value: ClassType) -> Self {
        TypeDef::Class(value)
    }
}

impl From<InterfaceType> for TypeDef {
    fn from(value: InterfaceType) -> Self {
        TypeDef::Interface(value)
    }
}

impl From<EnumType> for TypeDef {
    fn from(value: EnumType) -> Self {
        TypeDef::Enum(value)
    }
}

// =============================================================================
// Assemblies
// =============================================================================

/// Public API surface of one compiled module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Type definitions keyed by fqn, in declaration order.
    #[serde(default)]
    pub types: IndexMap<String, TypeDef>,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            types: IndexMap::new(),
        }
    }

    /// Builder: add a type definition keyed by its own fqn.
    pub fn with_type(mut self, def: impl Into<TypeDef>) -> Self {
        self.insert(def.into());
        self
    }

    /// Insert a type definition keyed by its own fqn, replacing any previous
    /// definition with the same fqn.
    pub fn insert(&mut self, def: TypeDef) -> Option<TypeDef> {
        self.types.insert(def.fqn().to_string(), def)
    }

    #[inline]
    pub fn get(&self, fqn: &str) -> Option<&TypeDef> {
        self.types.get(fqn)
    }

    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The assemblies transitively required by the one being checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyClosure {
    assemblies: Vec<Assembly>,
}

impl DependencyClosure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, assembly: Assembly) {
        self.assemblies.push(assembly);
    }

    /// Find a dependency by assembly name. The first match wins.
    pub fn find(&self, name: &str) -> Option<&Assembly> {
        self.assemblies.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assembly> {
        self.assemblies.iter()
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }
}

impl FromIterator<Assembly> for DependencyClosure {
    fn from_iter<T: IntoIterator<Item = Assembly>>(iter: T) -> Self {
        Self {
            assemblies: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DependencyClosure {
    type Item = &'a Assembly;
    type IntoIter = std::slice::Iter<'a, Assembly>;

    fn into_iter(self) -> Self::IntoIter {
        self.assemblies.iter()
    }
}

#[inline]
fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
#[path = "../tests/assembly_tests.rs"]
mod tests;
