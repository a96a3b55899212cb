//! Lexical scope tree for one translation unit.
//!
//! The external walker builds the tree once per file; the analysis walks
//! each usage site's chain of enclosing frames, innermost first. Frames are
//! arena-indexed so chain walks are index chasing, not AST re-traversal.

use crate::analysis::annotations::VersionAnnotation;
use crate::analysis::guards::GuardScope;
use crate::symbol::Location;

/// Index of a frame in a [`ScopeTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) usize);

/// What a scope frame represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    File,
    Class,
    Method,
    /// Field declaration; suppressions here cover only the initializer
    FieldInitializer,
    Lambda,
    AnonymousClass,
    /// One arm of a version-guard conditional, or the code after it
    GuardBranch,
}

impl ScopeKind {
    /// Frames that represent a declaration annotations can attach to
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            ScopeKind::File
                | ScopeKind::Class
                | ScopeKind::Method
                | ScopeKind::FieldInitializer
                | ScopeKind::AnonymousClass
        )
    }
}

/// One lexical scope
#[derive(Debug, Clone)]
pub struct ScopeFrame {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,

    /// Version-constraint annotations attached to this declaration
    pub annotations: Vec<VersionAnnotation>,

    /// Issue ids suppressed for everything lexically inside this frame
    pub suppressions: Vec<String>,

    /// Guard data when `kind` is [`ScopeKind::GuardBranch`]
    pub guard: Option<GuardScope>,

    /// Location of the declaration or guard, for advisory reporting
    pub location: Option<Location>,
}

impl ScopeFrame {
    fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            annotations: Vec::new(),
            suppressions: Vec::new(),
            guard: None,
            location: None,
        }
    }
}

/// Arena of scope frames for one translation unit
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    frames: Vec<ScopeFrame>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root frame (normally the file scope)
    pub fn root(&mut self, kind: ScopeKind) -> ScopeId {
        self.frames.push(ScopeFrame::new(None, kind));
        ScopeId(self.frames.len() - 1)
    }

    /// Add a child frame under `parent`
    pub fn child(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        debug_assert!(parent.0 < self.frames.len());
        self.frames.push(ScopeFrame::new(Some(parent), kind));
        ScopeId(self.frames.len() - 1)
    }

    pub fn frame(&self, id: ScopeId) -> &ScopeFrame {
        &self.frames[id.0]
    }

    pub fn annotate(&mut self, id: ScopeId, annotation: VersionAnnotation) {
        self.frames[id.0].annotations.push(annotation);
    }

    pub fn suppress(&mut self, id: ScopeId, issue_id: impl Into<String>) {
        self.frames[id.0].suppressions.push(issue_id.into());
    }

    pub fn set_guard(&mut self, id: ScopeId, guard: GuardScope) {
        self.frames[id.0].guard = Some(guard);
    }

    pub fn set_location(&mut self, id: ScopeId, location: Location) {
        self.frames[id.0].location = Some(location);
    }

    /// All frames with their ids, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &ScopeFrame)> {
        self.frames.iter().enumerate().map(|(i, f)| (ScopeId(i), f))
    }

    /// Chain of frames from `id` to the root, innermost first
    pub fn chain(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            chain.push(cur);
            current = self.frames[cur.0].parent;
        }
        chain
    }

    /// Chain of frames from the root down to `id`, outermost first.
    /// This is the order floors compose in: outer scopes first, each inner
    /// frame only able to raise what the outer ones established.
    pub fn chain_outside_in(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut chain = self.chain(id);
        chain.reverse();
        chain
    }

    /// Whether `inner` is `outer` or lexically nested inside it
    pub fn is_within(&self, inner: ScopeId, outer: ScopeId) -> bool {
        let mut current = Some(inner);
        while let Some(cur) = current {
            if cur == outer {
                return true;
            }
            current = self.frames[cur.0].parent;
        }
        false
    }
}
