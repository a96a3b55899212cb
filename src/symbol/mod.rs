mod reference;
pub mod scope;

pub use reference::{Location, ReferenceDetail, SymbolKind, SymbolReference};
pub use scope::{ScopeFrame, ScopeId, ScopeKind, ScopeTree};

/// Platform API level. Level 1 is the floor every symbol is assumed to
/// satisfy when the version table has no entry for it.
pub type ApiLevel = u32;
