//! Override checking over whole assemblies.

use covary_checker::{CheckResult, OverridePolicy, check_assembly};
use covary_common::{DiagnosticCategory, diagnostic_codes};
use covary_solver::{
    Assembly, ClassType, DependencyClosure, InterfaceType, Method, Parameter, PrimitiveType,
    Property, ReturnValue, TypeReference,
};

// =============================================================================
// Builders
// =============================================================================

fn class(fqn: &str, base: Option<&str>, interfaces: &[&str]) -> ClassType {
    ClassType {
        fqn: fqn.into(),
        base: base.map(Into::into),
        interfaces: interfaces.iter().map(|i| i.to_string()).collect(),
        is_abstract: false,
        properties: Vec::new(),
        methods: Vec::new(),
    }
}

fn interface(fqn: &str, interfaces: &[&str]) -> InterfaceType {
    InterfaceType {
        fqn: fqn.into(),
        interfaces: interfaces.iter().map(|i| i.to_string()).collect(),
        properties: Vec::new(),
        methods: Vec::new(),
    }
}

fn named(fqn: &str) -> TypeReference {
    TypeReference::named(fqn)
}

fn string() -> TypeReference {
    TypeReference::primitive(PrimitiveType::String)
}

fn property(name: &str, type_ref: TypeReference, immutable: bool) -> Property {
    Property {
        name: name.into(),
        type_ref,
        immutable,
        is_static: false,
        optional: false,
        is_abstract: false,
    }
}

fn method(name: &str, returns: Option<TypeReference>, params: &[(&str, TypeReference)]) -> Method {
    Method {
        name: name.into(),
        returns: returns.map(|type_ref| ReturnValue {
            type_ref,
            optional: false,
        }),
        parameters: params
            .iter()
            .map(|(name, type_ref)| Parameter {
                name: (*name).into(),
                type_ref: type_ref.clone(),
                optional: false,
                variadic: false,
            })
            .collect(),
        is_static: false,
        is_abstract: false,
    }
}

/// `Animal <- Dog`, `Animal <- Cat`, `IAnimal`, `DogImpl : IAnimal`.
fn animals() -> Assembly {
    Assembly::new("pkg")
        .with_type(class("pkg.Animal", None, &[]))
        .with_type(class("pkg.Dog", Some("pkg.Animal"), &[]))
        .with_type(class("pkg.Cat", Some("pkg.Animal"), &[]))
        .with_type(interface("pkg.IAnimal", &[]))
        .with_type(class("pkg.DogImpl", None, &["pkg.IAnimal"]))
}

fn check(assembly: &Assembly) -> CheckResult {
    check_assembly(assembly, &DependencyClosure::new(), OverridePolicy::default())
}

fn codes(result: &CheckResult) -> Vec<u32> {
    result.diagnostics.iter().map(|d| d.code).collect()
}

// =============================================================================
// Base-class overrides
// =============================================================================

#[test]
fn test_covariant_return_override_is_recorded() {
    let mut base = class("pkg.Shelter", None, &[]);
    base.methods.push(method("adopt", Some(named("pkg.Animal")), &[]));
    let mut derived = class("pkg.DogShelter", Some("pkg.Shelter"), &[]);
    derived.methods.push(method("adopt", Some(named("pkg.Dog")), &[]));

    let assembly = animals().with_type(base).with_type(derived);
    let result = check(&assembly);

    assert!(!result.has_errors(), "{:?}", result.diagnostics);
    assert_eq!(result.overrides.len(), 1);
    let info = &result.overrides[0];
    assert_eq!(info.type_fqn, "pkg.DogShelter");
    assert_eq!(info.member, "adopt");
    assert_eq!(info.overrides, "pkg.Shelter");
    assert!(info.covariant);
}

#[test]
fn test_identical_override_is_not_covariant() {
    let mut base = class("pkg.Shelter", None, &[]);
    base.methods.push(method("name", Some(string()), &[("id", string())]));
    let mut derived = class("pkg.DogShelter", Some("pkg.Shelter"), &[]);
    derived.methods.push(method("name", Some(string()), &[("key", string())]));

    let result = check(&animals().with_type(base).with_type(derived));
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.overrides.len(), 1);
    assert!(!result.overrides[0].covariant, "parameter names may change");
}

#[test]
fn test_nearest_base_declaration_wins() {
    let mut top = class("pkg.Top", None, &[]);
    top.methods.push(method("pet", Some(named("pkg.Animal")), &[]));
    let mut mid = class("pkg.Mid", Some("pkg.Top"), &[]);
    mid.methods.push(method("pet", Some(named("pkg.Dog")), &[]));
    let mut leaf = class("pkg.Leaf", Some("pkg.Mid"), &[]);
    leaf.methods.push(method("pet", Some(named("pkg.Dog")), &[]));

    let result = check(&animals().with_type(top).with_type(mid).with_type(leaf));
    assert!(result.diagnostics.is_empty());
    let leaf_info = result
        .overrides
        .iter()
        .find(|o| o.type_fqn == "pkg.Leaf")
        .expect("leaf override recorded");
    assert_eq!(leaf_info.overrides, "pkg.Mid");
    assert!(!leaf_info.covariant);
}

#[test]
fn test_immutable_property_may_narrow_mutable_may_not() {
    let mut base = class("pkg.Owner", None, &[]);
    base.properties.push(property("pet", named("pkg.Animal"), true));
    base.properties.push(property("friend", named("pkg.Animal"), false));
    let mut derived = class("pkg.DogOwner", Some("pkg.Owner"), &[]);
    derived.properties.push(property("pet", named("pkg.Dog"), true));
    derived.properties.push(property("friend", named("pkg.Dog"), false));

    let result = check(&animals().with_type(base).with_type(derived));
    assert_eq!(codes(&result), vec![diagnostic_codes::PROPERTY_TYPE_NOT_COMPATIBLE]);

    let diag = &result.diagnostics[0];
    assert_eq!(diag.location, "pkg.DogOwner#friend");
    assert_eq!(
        diag.message_text,
        "Property type 'pkg.Dog' of 'pkg.DogOwner#friend' is not a valid override of type \
         'pkg.Animal' declared by 'pkg.Owner#friend'."
    );
    let related = &diag.related_information[0];
    assert_eq!(related.location, "pkg.Owner#friend");
    assert_eq!(related.code, diagnostic_codes::OVERRIDDEN_DECLARATION_IS_HERE);
    assert_eq!(related.category, DiagnosticCategory::Message);

    assert_eq!(result.overrides.len(), 1);
    assert_eq!(result.overrides[0].member, "pet");
    assert!(result.overrides[0].covariant);
}

#[test]
fn test_rejected_narrowing_carries_engine_reasons() {
    let mut base = class("pkg.Owner", None, &[]);
    base.properties.push(property("pets", TypeReference::array(named("pkg.Dog")), true));
    let mut derived = class("pkg.CatOwner", Some("pkg.Owner"), &[]);
    derived.properties.push(property("pets", TypeReference::array(named("pkg.Cat")), true));

    let result = check(&animals().with_type(base).with_type(derived));
    assert_eq!(codes(&result), vec![diagnostic_codes::PROPERTY_TYPE_NOT_COMPATIBLE]);
    let reasons: Vec<&str> = result.diagnostics[0]
        .related_information
        .iter()
        .skip(1)
        .map(|r| r.message_text.as_str())
        .collect();
    assert_eq!(
        reasons,
        vec![
            "array element type 'pkg.Cat' cannot narrow 'pkg.Dog'",
            "class 'pkg.Cat' does not extend 'pkg.Dog'",
        ]
    );
}

#[test]
fn test_map_property_cannot_narrow() {
    let mut base = class("pkg.Owner", None, &[]);
    base.properties.push(property("byName", TypeReference::map(named("pkg.Animal")), true));
    let mut derived = class("pkg.DogOwner", Some("pkg.Owner"), &[]);
    derived.properties.push(property("byName", TypeReference::map(named("pkg.Dog")), true));

    let result = check(&animals().with_type(base).with_type(derived));
    assert_eq!(codes(&result), vec![diagnostic_codes::PROPERTY_TYPE_NOT_COMPATIBLE]);
}

#[test]
fn test_property_modifier_changes() {
    let mut base = class("pkg.Owner", None, &[]);
    base.properties.push(property("name", string(), true));
    let mut optional = property("nick", string(), true);
    optional.optional = true;
    base.properties.push(optional);

    let mut derived = class("pkg.Other", Some("pkg.Owner"), &[]);
    derived.properties.push(property("name", string(), false));
    derived.properties.push(property("nick", string(), true));

    let result = check(&animals().with_type(base).with_type(derived));
    assert_eq!(
        codes(&result),
        vec![
            diagnostic_codes::PROPERTY_MUTABILITY_CHANGED,
            diagnostic_codes::PROPERTY_OPTIONALITY_CHANGED,
        ]
    );
    assert!(result.overrides.is_empty());
}

#[test]
fn test_static_member_must_match_exactly() {
    let mut base = class("pkg.Registry", None, &[]);
    let mut create = method("create", Some(named("pkg.Animal")), &[]);
    create.is_static = true;
    base.methods.push(create);
    base.methods.push(method("lookup", Some(named("pkg.Animal")), &[]));

    let mut derived = class("pkg.DogRegistry", Some("pkg.Registry"), &[]);
    let mut narrowed = method("create", Some(named("pkg.Dog")), &[]);
    narrowed.is_static = true;
    derived.methods.push(narrowed);
    let mut now_static = method("lookup", Some(named("pkg.Animal")), &[]);
    now_static.is_static = true;
    derived.methods.push(now_static);

    let result = check(&animals().with_type(base).with_type(derived));
    assert_eq!(
        codes(&result),
        vec![
            diagnostic_codes::RETURN_TYPE_NOT_COMPATIBLE,
            diagnostic_codes::STATIC_MODIFIER_CHANGED,
        ]
    );
}

#[test]
fn test_member_kind_change() {
    let mut base = class("pkg.Base", None, &[]);
    base.properties.push(property("size", string(), true));
    let mut derived = class("pkg.Derived", Some("pkg.Base"), &[]);
    derived.methods.push(method("size", Some(string()), &[]));

    let result = check(&animals().with_type(base).with_type(derived));
    assert_eq!(codes(&result), vec![diagnostic_codes::MEMBER_KIND_CHANGED]);
    assert_eq!(
        result.diagnostics[0].message_text,
        "'pkg.Derived#size' is declared as a method, but overrides 'pkg.Base#size' which is \
         declared as a property."
    );
}

#[test]
fn test_parameters_are_invariant() {
    let mut base = class("pkg.Vet", None, &[]);
    base.methods.push(method("treat", None, &[("patient", named("pkg.Animal"))]));
    base.methods.push(method("feed", None, &[("patient", named("pkg.Animal"))]));
    let mut derived = class("pkg.DogVet", Some("pkg.Vet"), &[]);
    derived.methods.push(method("treat", None, &[("patient", named("pkg.Dog"))]));
    derived.methods.push(method(
        "feed",
        None,
        &[("patient", named("pkg.Animal")), ("amount", string())],
    ));

    let result = check(&animals().with_type(base).with_type(derived));
    assert_eq!(
        codes(&result),
        vec![
            diagnostic_codes::PARAMETER_TYPE_CHANGED,
            diagnostic_codes::PARAMETER_COUNT_CHANGED,
        ]
    );
    assert_eq!(
        result.diagnostics[1].message_text,
        "'pkg.DogVet#feed' declares 2 parameter(s), but overridden method 'pkg.Vet#feed' declares 1."
    );
}

#[test]
fn test_parameter_flags_must_match() {
    let mut base = class("pkg.Vet", None, &[]);
    base.methods.push(method("treat", None, &[("patients", named("pkg.Animal"))]));
    let mut derived = class("pkg.DogVet", Some("pkg.Vet"), &[]);
    let mut treat = method("treat", None, &[("patients", named("pkg.Animal"))]);
    treat.parameters[0].optional = true;
    treat.parameters[0].variadic = true;
    derived.methods.push(treat);

    let result = check(&animals().with_type(base).with_type(derived));
    assert_eq!(
        codes(&result),
        vec![
            diagnostic_codes::PARAMETER_OPTIONALITY_CHANGED,
            diagnostic_codes::PARAMETER_VARIADIC_CHANGED,
        ]
    );
}

#[test]
fn test_void_and_optional_returns() {
    let mut base = class("pkg.Base", None, &[]);
    base.methods.push(method("run", None, &[]));
    base.methods.push(method("label", Some(string()), &[]));
    let mut derived = class("pkg.Derived", Some("pkg.Base"), &[]);
    derived.methods.push(method("run", Some(string()), &[]));
    let mut label = method("label", Some(string()), &[]);
    if let Some(ret) = label.returns.as_mut() {
        ret.optional = true;
    }
    derived.methods.push(label);

    let result = check(&animals().with_type(base).with_type(derived));
    assert_eq!(
        codes(&result),
        vec![
            diagnostic_codes::RETURN_TYPE_NOT_COMPATIBLE,
            diagnostic_codes::RETURN_OPTIONALITY_CHANGED,
        ]
    );
    assert_eq!(
        result.diagnostics[0].message_text,
        "Return type 'string' of 'pkg.Derived#run' is not a valid override of return type 'void' \
         declared by 'pkg.Base#run'."
    );
}

// =============================================================================
// Interface overrides
// =============================================================================

fn zoo_keeper() -> Assembly {
    let mut keeper = interface("pkg.IKeeper", &[]);
    keeper.methods.push(method("favorite", Some(named("pkg.IAnimal")), &[]));
    let mut impl_class = class("pkg.Keeper", None, &["pkg.IKeeper"]);
    impl_class.methods.push(method("favorite", Some(named("pkg.DogImpl")), &[]));
    let mut sub_keeper = interface("pkg.IDogKeeper", &["pkg.IKeeper"]);
    sub_keeper.methods.push(method("favorite", Some(named("pkg.DogImpl")), &[]));
    animals()
        .with_type(keeper)
        .with_type(impl_class)
        .with_type(sub_keeper)
}

#[test]
fn test_interface_covariance_rejected_by_default() {
    let result = check(&zoo_keeper());
    assert_eq!(
        codes(&result),
        vec![
            diagnostic_codes::RETURN_TYPE_NOT_COMPATIBLE,
            diagnostic_codes::RETURN_TYPE_NOT_COMPATIBLE,
        ]
    );
    let locations: Vec<_> = result.diagnostics.iter().map(|d| d.location.as_str()).collect();
    assert_eq!(locations, vec!["pkg.Keeper#favorite", "pkg.IDogKeeper#favorite"]);
    // The engine would have allowed it, so there is no reason beyond the
    // pointer at the overridden declaration.
    assert_eq!(result.diagnostics[0].related_information.len(), 1);
}

#[test]
fn test_interface_covariance_flag() {
    let assembly = zoo_keeper();
    let policy = OverridePolicy::new().with_allow_interface_covariance(true);
    let result = check_assembly(&assembly, &DependencyClosure::new(), policy);

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.overrides.len(), 2);
    assert!(result.overrides.iter().all(|o| o.covariant && o.overrides == "pkg.IKeeper"));
}

#[test]
fn test_class_checked_against_interfaces_of_its_bases() {
    let mut named_iface = interface("pkg.INamed", &[]);
    named_iface.properties.push(property("name", string(), true));
    let base = class("pkg.Base", None, &["pkg.INamed"]);
    let mut derived = class("pkg.Derived", Some("pkg.Base"), &[]);
    derived.properties.push(property("name", named("pkg.Dog"), true));

    let result = check(&animals().with_type(named_iface).with_type(base).with_type(derived));
    assert_eq!(codes(&result), vec![diagnostic_codes::PROPERTY_TYPE_NOT_COMPATIBLE]);
    assert_eq!(
        result.diagnostics[0].related_information[0].location,
        "pkg.INamed#name"
    );
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_base_from_dependency_closure() {
    let mut remote = class("lib.Repository", None, &[]);
    remote.methods.push(method("find", Some(named("lib.Entity")), &[]));
    let dependency = Assembly::new("lib")
        .with_type(remote)
        .with_type(class("lib.Entity", None, &[]))
        .with_type(class("lib.User", Some("lib.Entity"), &[]));
    let closure: DependencyClosure = std::iter::once(dependency).collect();

    let mut local = class("app.Users", Some("lib.Repository"), &[]);
    local.methods.push(method("find", Some(named("lib.User")), &[]));
    let assembly = Assembly::new("app").with_type(local);

    let result = check_assembly(&assembly, &closure, OverridePolicy::default());
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.overrides.len(), 1);
    assert!(result.overrides[0].covariant);
}

#[test]
fn test_unresolved_references_are_reported() {
    let mut orphan = class("pkg.Orphan", Some("pkg.Missing"), &["ext.IThing"]);
    orphan.properties.push(property("parent", named("ext.Node"), true));
    orphan.methods.push(method(
        "link",
        Some(TypeReference::array(named("ext.Node"))),
        &[("other", named("ext.Node"))],
    ));

    let result = check(&animals().with_type(orphan));
    let messages: Vec<_> = result.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "pkg.Orphan - error CV5012: Type 'ext.IThing' referenced by 'pkg.Orphan' could not be \
             resolved in the assembly or its dependencies.",
            "pkg.Orphan - error CV5012: Type 'pkg.Missing' referenced by 'pkg.Orphan' could not \
             be resolved in the assembly or its dependencies.",
            "pkg.Orphan#parent - error CV5012: Type 'ext.Node' referenced by 'pkg.Orphan#parent' \
             could not be resolved in the assembly or its dependencies.",
            "pkg.Orphan#link - error CV5012: Type 'ext.Node' referenced by 'pkg.Orphan#link' \
             could not be resolved in the assembly or its dependencies.",
        ]
    );
}

#[test]
fn test_inheritance_cycle_is_reported_and_terminates() {
    let mut a = class("pkg.LoopA", Some("pkg.LoopB"), &[]);
    a.methods.push(method("spin", Some(named("pkg.Dog")), &[]));
    let mut b = class("pkg.LoopB", Some("pkg.LoopA"), &[]);
    b.methods.push(method("spin", Some(named("pkg.Animal")), &[]));

    let result = check(&animals().with_type(a).with_type(b));
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| d.code == diagnostic_codes::INHERITANCE_CYCLE && d.location == "pkg.LoopA")
    );
}

#[test]
fn test_long_base_chain_is_checked_without_cycle_errors() {
    let mut assembly = animals();
    let mut root = class("pkg.Deep0", None, &[]);
    root.properties.push(property("pet", named("pkg.Animal"), true));
    assembly.insert(root.into());
    for i in 1..300 {
        let base = format!("pkg.Deep{}", i - 1);
        assembly.insert(class(&format!("pkg.Deep{i}"), Some(base.as_str()), &[]).into());
    }
    let mut leaf = class("pkg.DeepLeaf", Some("pkg.Deep299"), &[]);
    leaf.properties.push(property("pet", named("pkg.Dog"), true));
    assembly.insert(leaf.into());

    let result = check(&assembly);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.overrides.len(), 1);
    assert_eq!(result.overrides[0].type_fqn, "pkg.DeepLeaf");
    assert_eq!(result.overrides[0].overrides, "pkg.Deep0");
    assert!(result.overrides[0].covariant);
}

#[test]
fn test_walk_limit_is_reported_apart_from_cycles() {
    let mut assembly = animals();
    assembly.insert(interface("pkg.J0", &[]).into());
    for i in 1..300 {
        let parent = format!("pkg.J{}", i - 1);
        assembly.insert(interface(&format!("pkg.J{i}"), &[parent.as_str()]).into());
    }

    let result = check(&assembly);
    assert!(result.has_errors());
    assert!(
        result
            .diagnostics
            .iter()
            .all(|d| d.code == diagnostic_codes::INHERITANCE_WALK_LIMIT_EXCEEDED)
    );
    let deepest = result
        .diagnostics
        .iter()
        .find(|d| d.location == "pkg.J299")
        .expect("deepest interface reported");
    assert_eq!(
        deepest.message_text,
        "The inheritance graph of 'pkg.J299' is nested too deeply to check beyond 'pkg.J43'."
    );
}

// =============================================================================
// Interchange input
// =============================================================================

const PETS_JSON: &str = r#"{
  "name": "pets",
  "types": {
    "pets.Animal": { "kind": "class", "fqn": "pets.Animal" },
    "pets.Dog": { "kind": "class", "fqn": "pets.Dog", "base": "pets.Animal" },
    "pets.Shelter": {
      "kind": "class",
      "fqn": "pets.Shelter",
      "properties": [
        { "name": "newest", "type": { "fqn": "pets.Animal" }, "immutable": true }
      ],
      "methods": [
        { "name": "all", "returns": { "type": { "collection": { "kind": "array", "elementtype": { "fqn": "pets.Animal" } } } } }
      ]
    },
    "pets.Kennel": {
      "kind": "class",
      "fqn": "pets.Kennel",
      "base": "pets.Shelter",
      "properties": [
        { "name": "newest", "type": { "fqn": "pets.Dog" }, "immutable": true }
      ],
      "methods": [
        { "name": "all", "returns": { "type": { "collection": { "kind": "map", "elementtype": { "fqn": "pets.Dog" } } } } }
      ]
    },
    "pets.Size": { "kind": "enum", "fqn": "pets.Size", "members": [ { "name": "SMALL" } ] }
  }
}"#;

#[test]
fn test_check_parsed_assembly() {
    let assembly = Assembly::from_json_str(PETS_JSON).expect("valid interchange file");
    let result = check(&assembly);

    assert_eq!(codes(&result), vec![diagnostic_codes::RETURN_TYPE_NOT_COMPATIBLE]);
    assert_eq!(
        result.diagnostics[0].message_text,
        "Return type 'map<pets.Dog>' of 'pets.Kennel#all' is not a valid override of return type \
         'array<pets.Animal>' declared by 'pets.Shelter#all'."
    );
    assert_eq!(result.overrides.len(), 1);
    assert_eq!(result.overrides[0].member, "newest");

    let json = serde_json::to_value(&result).expect("serializes");
    assert_eq!(json["overrides"][0]["typeFqn"], "pets.Kennel");
}

#[test]
fn test_results_follow_declaration_order() {
    let mut assembly = animals();
    for i in 0..32 {
        let mut derived = class(&format!("pkg.Owner{i}"), Some("pkg.Base"), &[]);
        derived.properties.push(property("pet", named("pkg.Cat"), true));
        assembly.insert(derived.into());
    }
    let mut base = class("pkg.Base", None, &[]);
    base.properties.push(property("pet", named("pkg.Dog"), true));
    assembly.insert(base.into());

    let first = check(&assembly);
    let locations: Vec<_> = first.diagnostics.iter().map(|d| d.location.clone()).collect();
    let expected: Vec<_> = (0..32).map(|i| format!("pkg.Owner{i}#pet")).collect();
    assert_eq!(locations, expected);

    let second = check(&assembly);
    assert_eq!(first.diagnostics, second.diagnostics);
}
