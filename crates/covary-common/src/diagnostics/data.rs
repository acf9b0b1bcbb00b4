use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_messages {
    pub const MEMBER_KIND_CHANGED: &str =
        "'{0}' is declared as a {1}, but overrides '{2}' which is declared as a {3}.";
    pub const STATIC_MODIFIER_CHANGED: &str =
        "'{0}' changes the static modifier of overridden member '{1}'.";
    pub const PROPERTY_OPTIONALITY_CHANGED: &str =
        "'{0}' changes the optionality of overridden property '{1}'.";
    pub const PROPERTY_MUTABILITY_CHANGED: &str =
        "'{0}' changes the mutability of overridden property '{1}'.";
    pub const PROPERTY_TYPE_NOT_COMPATIBLE: &str =
        "Property type '{0}' of '{1}' is not a valid override of type '{2}' declared by '{3}'.";
    pub const PARAMETER_COUNT_CHANGED: &str =
        "'{0}' declares {1} parameter(s), but overridden method '{2}' declares {3}.";
    pub const PARAMETER_TYPE_CHANGED: &str =
        "Parameter '{0}' of '{1}' has type '{2}', but the overridden method '{3}' declares type '{4}'.";
    pub const PARAMETER_OPTIONALITY_CHANGED: &str =
        "Parameter '{0}' of '{1}' changes optionality from the overridden method '{2}'.";
    pub const PARAMETER_VARIADIC_CHANGED: &str =
        "Parameter '{0}' of '{1}' changes variadic-ness from the overridden method '{2}'.";
    pub const RETURN_TYPE_NOT_COMPATIBLE: &str =
        "Return type '{0}' of '{1}' is not a valid override of return type '{2}' declared by '{3}'.";
    pub const RETURN_OPTIONALITY_CHANGED: &str =
        "'{0}' changes the optionality of the return value of overridden method '{1}'.";
    pub const UNRESOLVED_TYPE_REFERENCE: &str =
        "Type '{0}' referenced by '{1}' could not be resolved in the assembly or its dependencies.";
    pub const INHERITANCE_CYCLE: &str =
        "The inheritance graph of '{0}' contains a cycle through '{1}'.";
    pub const INHERITANCE_WALK_LIMIT_EXCEEDED: &str =
        "The inheritance graph of '{0}' is nested too deeply to check beyond '{1}'.";
    pub const OVERRIDDEN_DECLARATION_IS_HERE: &str = "'{0}' is declared here.";
}

pub mod diagnostic_codes {
    pub const MEMBER_KIND_CHANGED: u32 = 5001;
    pub const STATIC_MODIFIER_CHANGED: u32 = 5002;
    pub const PROPERTY_OPTIONALITY_CHANGED: u32 = 5003;
    pub const PROPERTY_MUTABILITY_CHANGED: u32 = 5004;
    pub const PROPERTY_TYPE_NOT_COMPATIBLE: u32 = 5005;
    pub const PARAMETER_COUNT_CHANGED: u32 = 5006;
    pub const PARAMETER_TYPE_CHANGED: u32 = 5007;
    pub const PARAMETER_OPTIONALITY_CHANGED: u32 = 5008;
    pub const PARAMETER_VARIADIC_CHANGED: u32 = 5009;
    pub const RETURN_TYPE_NOT_COMPATIBLE: u32 = 5010;
    pub const RETURN_OPTIONALITY_CHANGED: u32 = 5011;
    pub const UNRESOLVED_TYPE_REFERENCE: u32 = 5012;
    pub const INHERITANCE_CYCLE: u32 = 5013;
    pub const INHERITANCE_WALK_LIMIT_EXCEEDED: u32 = 5014;
    pub const OVERRIDDEN_DECLARATION_IS_HERE: u32 = 5100;
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::MEMBER_KIND_CHANGED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::MEMBER_KIND_CHANGED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::STATIC_MODIFIER_CHANGED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::STATIC_MODIFIER_CHANGED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::PROPERTY_OPTIONALITY_CHANGED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::PROPERTY_OPTIONALITY_CHANGED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::PROPERTY_MUTABILITY_CHANGED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::PROPERTY_MUTABILITY_CHANGED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::PROPERTY_TYPE_NOT_COMPATIBLE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::PROPERTY_TYPE_NOT_COMPATIBLE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::PARAMETER_COUNT_CHANGED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::PARAMETER_COUNT_CHANGED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::PARAMETER_TYPE_CHANGED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::PARAMETER_TYPE_CHANGED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::PARAMETER_OPTIONALITY_CHANGED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::PARAMETER_OPTIONALITY_CHANGED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::PARAMETER_VARIADIC_CHANGED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::PARAMETER_VARIADIC_CHANGED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::RETURN_TYPE_NOT_COMPATIBLE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::RETURN_TYPE_NOT_COMPATIBLE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::RETURN_OPTIONALITY_CHANGED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::RETURN_OPTIONALITY_CHANGED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_TYPE_REFERENCE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::UNRESOLVED_TYPE_REFERENCE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::INHERITANCE_CYCLE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::INHERITANCE_CYCLE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::INHERITANCE_WALK_LIMIT_EXCEEDED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::INHERITANCE_WALK_LIMIT_EXCEEDED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::OVERRIDDEN_DECLARATION_IS_HERE,
        category: DiagnosticCategory::Message,
        message: diagnostic_messages::OVERRIDDEN_DECLARATION_IS_HERE,
    },
];
