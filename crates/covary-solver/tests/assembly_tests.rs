use super::*;
use crate::test_fixtures::{class, enumeration, interface, zoo};
use crate::types::PrimitiveType;

const WIDGETS: &str = r#"{
  "name": "widgets",
  "version": "1.2.0",
  "types": {
    "widgets.Shape": {
      "kind": "class",
      "fqn": "widgets.Shape",
      "abstract": true,
      "interfaces": ["widgets.IDrawable"],
      "properties": [
        { "name": "label", "type": { "primitive": "string" }, "immutable": true },
        { "name": "tags", "type": { "collection": { "kind": "array", "elementtype": { "primitive": "string" } } }, "optional": true }
      ],
      "methods": [
        {
          "name": "scale",
          "returns": { "type": { "fqn": "widgets.Shape" } },
          "parameters": [ { "name": "factor", "type": { "primitive": "number" } } ]
        },
        { "name": "reset" }
      ]
    },
    "widgets.IDrawable": {
      "kind": "interface",
      "fqn": "widgets.IDrawable",
      "methods": [ { "name": "draw", "static": false } ]
    },
    "widgets.Fill": {
      "kind": "enum",
      "fqn": "widgets.Fill",
      "members": [ { "name": "SOLID" }, { "name": "NONE" } ]
    }
  }
}"#;

#[test]
fn test_assembly_name_of() {
    assert_eq!(assembly_name_of("pkg.Dog"), "pkg");
    assert_eq!(assembly_name_of("pkg.sub.Dog"), "pkg");
    assert_eq!(assembly_name_of("pkg"), "pkg");
    assert_eq!(assembly_name_of(""), "");
}

#[test]
fn test_parse_assembly_json() {
    let assembly = Assembly::from_json_str(WIDGETS).expect("valid assembly");
    assert_eq!(assembly.name, "widgets");
    assert_eq!(assembly.version.as_deref(), Some("1.2.0"));

    let kinds: Vec<_> = assembly.types.values().map(TypeDef::kind).collect();
    assert_eq!(
        kinds,
        vec![TypeKind::Class, TypeKind::Interface, TypeKind::Enum],
        "declaration order is preserved"
    );

    let shape = assembly
        .get("widgets.Shape")
        .and_then(TypeDef::as_class)
        .expect("Shape is a class");
    assert!(shape.is_abstract);
    assert_eq!(shape.base, None);
    assert_eq!(shape.interfaces, vec!["widgets.IDrawable".to_string()]);
    assert!(shape.properties[0].immutable);
    assert!(!shape.properties[0].optional);
    assert!(shape.properties[1].optional);
    assert_eq!(
        shape.properties[1].type_ref,
        TypeReference::array(TypeReference::primitive(PrimitiveType::String))
    );

    let scale = &shape.methods[0];
    assert_eq!(scale.return_type(), Some(&TypeReference::named("widgets.Shape")));
    assert_eq!(scale.parameters.len(), 1);
    assert!(!scale.parameters[0].variadic);
    assert_eq!(shape.methods[1].return_type(), None, "no returns means void");

    match assembly.get("widgets.Fill") {
        Some(TypeDef::Enum(fill)) => assert_eq!(fill.members.len(), 2),
        other => panic!("expected enum, got {other:?}"),
    }
}

#[test]
fn test_unknown_kind_is_rejected() {
    let text = r#"{ "name": "x", "types": { "x.T": { "kind": "struct", "fqn": "x.T" } } }"#;
    assert!(Assembly::from_json_str(text).is_err());
}

#[test]
fn test_json_round_trip_preserves_assembly() {
    let assembly = Assembly::from_json_str(WIDGETS).expect("valid assembly");
    let text = assembly.to_json_string().expect("serializes");
    assert!(!text.contains("\"static\""), "false flags are omitted");
    let reparsed = Assembly::from_json_str(&text).expect("reparses");
    assert_eq!(assembly, reparsed);
}

#[test]
fn test_member_lookup_prefers_properties() {
    let mut class = class("pkg.Thing", None, &[]);
    class.properties.push(Property {
        name: "value".into(),
        type_ref: TypeReference::primitive(PrimitiveType::Number),
        immutable: false,
        is_static: false,
        optional: false,
        is_abstract: false,
    });
    class.methods.push(Method {
        name: "value".into(),
        returns: None,
        parameters: Vec::new(),
        is_static: true,
        is_abstract: false,
    });
    class.methods.push(Method {
        name: "run".into(),
        returns: None,
        parameters: Vec::new(),
        is_static: false,
        is_abstract: false,
    });
    let def = TypeDef::from(class);

    let value = def.member("value").expect("declared");
    assert_eq!(value.kind_name(), "property");
    assert!(!value.is_static());
    assert_eq!(def.member("run").map(Member::kind_name), Some("method"));
    assert!(def.member("missing").is_none());

    let names: Vec<_> = def.members().map(Member::name).collect();
    assert_eq!(names, vec!["value", "value", "run"]);
}

#[test]
fn test_type_def_accessors() {
    let assembly = zoo();
    let puppy = assembly.get("pkg.Puppy").expect("declared");
    assert_eq!(puppy.kind(), TypeKind::Class);
    assert_eq!(puppy.base(), Some("pkg.Dog"));

    let dog_like = assembly.get("pkg.IDogLike").expect("declared");
    assert_eq!(dog_like.base(), None);
    assert_eq!(dog_like.interfaces().len(), 2);
    assert!(dog_like.as_interface().is_some());
    assert!(dog_like.as_class().is_none());

    let color = TypeDef::from(enumeration("pkg.Color"));
    assert!(color.interfaces().is_empty());
    assert_eq!(color.members().count(), 0);
    assert_eq!(TypeKind::Interface.to_string(), "interface");
}

#[test]
fn test_insert_replaces_by_fqn() {
    let mut assembly = Assembly::new("pkg").with_type(interface("pkg.IThing", &[]));
    let previous = assembly.insert(class("pkg.IThing", None, &[]).into());
    assert_eq!(previous.map(|d| d.kind()), Some(TypeKind::Interface));
    assert_eq!(assembly.types.len(), 1);
    assert_eq!(assembly.get("pkg.IThing").map(TypeDef::kind), Some(TypeKind::Class));
}

#[test]
fn test_dependency_closure_find() {
    let mut closure: DependencyClosure = [Assembly::new("a"), Assembly::new("b")]
        .into_iter()
        .collect();
    closure.push(Assembly::new("a").with_type(class("a.Shadowed", None, &[])));

    assert_eq!(closure.len(), 3);
    assert!(!closure.is_empty());
    assert!(closure.find("b").is_some());
    assert!(closure.find("c").is_none());
    // First match wins.
    assert!(closure.find("a").is_some_and(|a| a.types.is_empty()));
    assert_eq!((&closure).into_iter().count(), closure.iter().count());
}
