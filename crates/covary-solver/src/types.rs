//! Type reference model.
//!
//! A [`TypeReference`] is the structural description of a member's type as it
//! appears in the interchange model. It is a closed sum type: every consumer
//! matches on it exhaustively, so adding a shape is a compile error everywhere
//! a decision has to be made about it.
//!
//! Equality is the derived structural equality:
//! - `Named` compares only the fqn (nominal identity)
//! - `Primitive` compares the kind
//! - `Collection` compares the kind and the element type
//! - `Union` / `Intersection` compare arms pairwise **in order**
//!
//! Unions and intersections are conceptually sets, but the interchange format
//! stores them as sequences and equality follows the sequence. Two unions that
//! list the same arms in a different order are *not* equal.

use serde::{Deserialize, Serialize};

/// Atomic built-in types shared by every target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Date,
    String,
    Number,
    Boolean,
    Json,
    Any,
}

impl PrimitiveType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Json => "json",
            Self::Any => "any",
        }
    }
}

/// Kind of a generic collection. Maps are always keyed by string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Array,
    Map,
}

impl CollectionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Map => "map",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionType {
    pub kind: CollectionKind,
    #[serde(rename = "elementtype")]
    pub element_type: Box<TypeReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnionType {
    pub types: Vec<TypeReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntersectionType {
    pub types: Vec<TypeReference>,
}

/// A reference to a type, exactly one shape populated.
///
/// Serialized in the interchange shape, e.g. `{"fqn": "pkg.Dog"}` or
/// `{"collection": {"kind": "array", "elementtype": {"primitive": "string"}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeReference {
    Primitive(PrimitiveType),
    #[serde(rename = "fqn")]
    Named(String),
    Collection(CollectionType),
    Union(UnionType),
    Intersection(IntersectionType),
}

impl TypeReference {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn primitive(kind: PrimitiveType) -> Self {
        Self::Primitive(kind)
    }

    pub fn named(fqn: impl Into<String>) -> Self {
        Self::Named(fqn.into())
    }

    pub fn array(element: TypeReference) -> Self {
        Self::Collection(CollectionType {
            kind: CollectionKind::Array,
            element_type: Box::new(element),
        })
    }

    pub fn map(element: TypeReference) -> Self {
        Self::Collection(CollectionType {
            kind: CollectionKind::Map,
            element_type: Box::new(element),
        })
    }

    pub fn union(types: Vec<TypeReference>) -> Self {
        Self::Union(UnionType { types })
    }

    pub fn intersection(types: Vec<TypeReference>) -> Self {
        Self::Intersection(IntersectionType { types })
    }

    // =========================================================================
    // Classification
    // =========================================================================

    #[inline]
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    #[inline]
    pub fn as_named(&self) -> Option<&str> {
        match self {
            Self::Named(fqn) => Some(fqn),
            _ => None,
        }
    }

    #[inline]
    pub fn as_collection(&self) -> Option<&CollectionType> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    #[inline]
    pub fn as_union(&self) -> Option<&UnionType> {
        match self {
            Self::Union(union) => Some(union),
            _ => None,
        }
    }

    #[inline]
    pub fn as_intersection(&self) -> Option<&IntersectionType> {
        match self {
            Self::Intersection(intersection) => Some(intersection),
            _ => None,
        }
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    #[inline]
    pub fn is_union(&self) -> bool {
        matches!(self, Self::Union(_))
    }

    #[inline]
    pub fn is_intersection(&self) -> bool {
        matches!(self, Self::Intersection(_))
    }

    /// Returns the element type if this is `array<T>`.
    #[inline]
    pub fn array_element(&self) -> Option<&TypeReference> {
        match self {
            Self::Collection(c) if c.kind == CollectionKind::Array => Some(&c.element_type),
            _ => None,
        }
    }

    /// Returns the element type if this is `map<T>`.
    #[inline]
    pub fn map_element(&self) -> Option<&TypeReference> {
        match self {
            Self::Collection(c) if c.kind == CollectionKind::Map => Some(&c.element_type),
            _ => None,
        }
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.array_element().is_some()
    }

    #[inline]
    pub fn is_map(&self) -> bool {
        self.map_element().is_some()
    }

    /// Whether every union and intersection in this reference has at least
    /// two arms.
    ///
    /// Deserialization accepts any arity, so references coming from disk may
    /// violate this. The covariance engine rejects malformed references.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Primitive(_) | Self::Named(_) => true,
            Self::Collection(c) => c.element_type.is_well_formed(),
            Self::Union(UnionType { types }) | Self::Intersection(IntersectionType { types }) => {
                types.len() >= 2 && types.iter().all(TypeReference::is_well_formed)
            }
        }
    }

    /// Visit every named fqn referenced anywhere inside this reference.
    pub fn for_each_fqn<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Self::Primitive(_) => {}
            Self::Named(fqn) => f(fqn),
            Self::Collection(c) => c.element_type.for_each_fqn(f),
            Self::Union(UnionType { types }) | Self::Intersection(IntersectionType { types }) => {
                for ty in types {
                    ty.for_each_fqn(f);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
