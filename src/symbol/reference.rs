use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of usage site being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Invocation of a method or constructor
    MethodCall,

    /// Read of a field or enum constant
    FieldRead,

    /// Mention of a class as a type (local, parameter, instanceof, annotation)
    ClassReference,

    /// Enum constant used as a switch/when case label
    EnumSwitchCase,

    /// Exception type in a catch clause (single or multi-catch)
    ExceptionCatch,

    /// Cast to a type, explicit or compiler-inserted
    Cast,

    /// Supertype in an extends/implements clause
    SuperType,

    /// Method declaration overriding an inherited member
    MethodOverride,

    /// Resource XML element
    XmlTag,

    /// Resource XML attribute
    XmlAttribute,
}

impl SymbolKind {
    /// Kinds that only fail at runtime when the referencing code actually
    /// executes, so a preceding version check makes them safe.
    pub fn is_executable(&self) -> bool {
        matches!(
            self,
            SymbolKind::MethodCall
                | SymbolKind::FieldRead
                | SymbolKind::EnumSwitchCase
                | SymbolKind::Cast
        )
    }

    /// Kinds resolved when the enclosing class is loaded and verified.
    /// A runtime version check in method bodies cannot protect these.
    pub fn is_class_load_sensitive(&self) -> bool {
        matches!(
            self,
            SymbolKind::ExceptionCatch | SymbolKind::SuperType | SymbolKind::MethodOverride
        )
    }

    /// Kinds that are inert on older platform versions rather than crashing
    pub fn is_passive(&self) -> bool {
        matches!(self, SymbolKind::XmlTag | SymbolKind::XmlAttribute)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SymbolKind::MethodCall => "call",
            SymbolKind::FieldRead => "field",
            SymbolKind::ClassReference => "class",
            SymbolKind::EnumSwitchCase => "enum constant",
            SymbolKind::ExceptionCatch => "exception",
            SymbolKind::Cast => "cast",
            SymbolKind::SuperType => "supertype",
            SymbolKind::MethodOverride => "override",
            SymbolKind::XmlTag => "element",
            SymbolKind::XmlAttribute => "attribute",
        }
    }
}

/// Structured payload for usage sites that need more than a name to check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferenceDetail {
    #[default]
    None,

    /// Multi-catch clause. `compiled_supertype` is the nearest common
    /// supertype the compiler substitutes in the generated dispatch when it
    /// differs from the declared disjuncts.
    MultiCatch {
        disjuncts: Vec<String>,
        compiled_supertype: Option<String>,
    },

    /// Cast site; `explicit` is false for compiler-inserted widening
    /// conversions, which are checked identically.
    Cast { from_type: String, explicit: bool },

    /// Declaration of an interface method with a body, or a static
    /// interface method.
    InterfaceMethod { has_body: bool, is_static: bool },

    /// Use of the repeatable-annotation container mechanism itself
    RepeatableAnnotation,

    /// For-each over a concrete collection view whose type is newer than
    /// the interface it is iterated through.
    IteratedView { view_type: String },

    /// Field read where the value is copied into the call site at compile
    /// time instead of resolved dynamically.
    ConstantField { inlined: bool },
}

/// Location in source or resource files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A single pre-resolved usage of a platform symbol.
///
/// Created once per usage site by the external source/XML walker and
/// consumed once by the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolReference {
    /// Kind of usage
    pub kind: SymbolKind,

    /// Fully qualified symbol. Members use `declaring.Type#member`
    /// notation, classes their dotted name, XML symbols the attribute or
    /// tag name.
    pub qualified_name: String,

    /// Declaring type as statically resolved, when it differs from the
    /// owner embedded in `qualified_name`. For XML attributes this holds
    /// the enclosing tag.
    pub declaring_type: Option<String>,

    /// Usage site
    pub location: Location,

    /// Kind-specific payload
    pub detail: ReferenceDetail,
}

impl SymbolReference {
    pub fn new(kind: SymbolKind, qualified_name: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            qualified_name: qualified_name.into(),
            declaring_type: None,
            location,
            detail: ReferenceDetail::None,
        }
    }

    pub fn with_declaring_type(mut self, declaring_type: impl Into<String>) -> Self {
        self.declaring_type = Some(declaring_type.into());
        self
    }

    pub fn with_detail(mut self, detail: ReferenceDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Split a `Owner#member` qualified name into its parts
    pub fn owner_and_member(&self) -> Option<(&str, &str)> {
        self.qualified_name
            .split_once('#')
            .map(|(owner, member)| (owner, member))
    }

    /// Owner type to resolve the member against: the statically resolved
    /// declaring type when present, else the owner from the qualified name.
    pub fn resolution_owner(&self) -> Option<&str> {
        if let Some(declaring) = &self.declaring_type {
            return Some(declaring.as_str());
        }
        self.owner_and_member().map(|(owner, _)| owner)
    }

    /// Short display form for messages
    pub fn display(&self) -> String {
        format!("{} {}", self.kind.display_name(), self.qualified_name)
    }
}
