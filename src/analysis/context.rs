//! Effective version context at one usage site.
//!
//! Built fresh per site by composing the project floor with annotation
//! floors and guard narrowing from the enclosing scope chain, outermost
//! first. Floors only ever rise along the chain; the two floors differ in
//! what they are allowed to count.

use crate::symbol::ApiLevel;

/// Version guarantees at a usage site.
///
/// `surface_floor` is what the class loader guarantees: project minSdk
/// raised by requirement annotations on enclosing declarations.
/// `flow_floor` additionally counts runtime guard checks, so it is what the
/// current program point guarantees when it executes. Class-load-sensitive
/// references must be judged against the surface floor because they are
/// resolved before any guard runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveContext {
    min_sdk: ApiLevel,
    target_sdk: ApiLevel,
    surface_floor: ApiLevel,
    flow_floor: ApiLevel,
    max_guaranteed: Option<ApiLevel>,
}

impl EffectiveContext {
    pub fn new(min_sdk: ApiLevel, target_sdk: ApiLevel) -> Self {
        Self {
            min_sdk,
            target_sdk,
            surface_floor: min_sdk,
            flow_floor: min_sdk,
            max_guaranteed: None,
        }
    }

    /// Raise the declaration-derived floor. Values below the current floor
    /// are kept as-is; redundancy is reported separately, never an error.
    pub fn with_annotation_floor(mut self, level: ApiLevel) -> Self {
        self.surface_floor = self.surface_floor.max(level);
        self.flow_floor = self.flow_floor.max(self.surface_floor);
        self
    }

    /// Raise the control-flow floor established by a guard
    pub fn with_guard_floor(mut self, level: ApiLevel) -> Self {
        self.flow_floor = self.flow_floor.max(level);
        self
    }

    /// Record the exact version proven by an equality guard
    pub fn with_max_guaranteed(mut self, level: ApiLevel) -> Self {
        self.max_guaranteed = Some(level);
        self
    }

    pub fn min_sdk(&self) -> ApiLevel {
        self.min_sdk
    }

    pub fn target_sdk(&self) -> ApiLevel {
        self.target_sdk
    }

    pub fn surface_floor(&self) -> ApiLevel {
        self.surface_floor
    }

    pub fn flow_floor(&self) -> ApiLevel {
        self.flow_floor
    }

    pub fn max_guaranteed(&self) -> Option<ApiLevel> {
        self.max_guaranteed
    }
}
