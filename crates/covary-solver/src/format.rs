//! Canonical rendering of type references for diagnostics.
//!
//! Rendered strings are for humans only and never used for identity.

use crate::types::{IntersectionType, TypeReference, UnionType};
use std::fmt;

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeReference::Primitive(kind) => f.write_str(kind.as_str()),
            TypeReference::Named(fqn) => f.write_str(fqn),
            TypeReference::Collection(c) => write!(f, "{}<{}>", c.kind.as_str(), c.element_type),
            TypeReference::Union(UnionType { types }) => write_joined(f, types, " | "),
            TypeReference::Intersection(IntersectionType { types }) => {
                write_joined(f, types, " & ")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[TypeReference], sep: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

/// Render a type reference in its canonical diagnostic form.
pub fn render(type_ref: &TypeReference) -> String {
    type_ref.to_string()
}

/// Render an optional type reference, using `void` for an absent type.
pub fn render_optional(type_ref: Option<&TypeReference>) -> String {
    type_ref.map_or_else(|| String::from("void"), render)
}
