//! Scope and binding tracker.
//!
//! A stack machine driven by the parser's structural descent: entering a
//! function, block, class or catch clause pushes a frame, leaving it pops
//! one. Frames live in an arena (`Vec<Scope>`) and refer to their parent by
//! index, so a frame stays queryable after it leaves the active chain -
//! private-name resolution needs that for references that bubble out of
//! nested classes.

use std::collections::HashMap;

use core_types::{JsError, SourceBuffer, Span};

use crate::ast::BindingKind;
use crate::error::semantic_error;

/// What kind of function scope is being entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Plain function
    Normal,
    /// Generator function
    Generator,
    /// Async function
    Async,
    /// Async generator
    AsyncGenerator,
    /// Arrow function
    Arrow,
}

/// Scope frame kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The program root
    Global,
    /// Function body (parameters included)
    Function(FunctionKind),
    /// Block, switch body, loop body
    Block,
    /// Class body (owns the private-name table)
    Class,
    /// Catch clause; the parameter and the handler body share this frame so
    /// that `catch (e) { let e }` conflicts
    Catch,
    /// With statement body
    With,
}

/// Metadata recorded for one declared name.
#[derive(Debug, Clone)]
pub struct Binding {
    /// How the name was declared
    pub kind: BindingKind,
    /// Declaration site
    pub span: Span,
    /// False for `const` and import bindings
    pub mutable: bool,
}

/// What a private name was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateMemberKind {
    /// Field declaration
    Field,
    /// Method declaration
    Method,
    /// Getter
    Getter,
    /// Setter
    Setter,
}

#[derive(Debug, Clone)]
struct PrivateMember {
    kind: PrivateMemberKind,
    is_static: bool,
}

/// One scope frame.
#[derive(Debug)]
pub struct Scope {
    kind: ScopeKind,
    parent: Option<usize>,
    /// Ordered-insertion mapping of declared names
    bindings: Vec<(String, Binding)>,
    /// Private names declared by this class frame
    private_names: HashMap<String, Vec<PrivateMember>>,
    /// Private references waiting for this class frame to close
    pending_private_refs: Vec<(String, Span)>,
}

impl Scope {
    fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
    }

    fn insert(&mut self, name: &str, binding: Binding) {
        self.bindings.push((name.to_string(), binding));
    }
}

/// The tracker: an arena of scope frames plus the active frame index and
/// the module-level export tables.
pub struct ScopeTracker {
    scopes: Vec<Scope>,
    current: usize,
    /// External export name -> first declaration site
    exported_names: Vec<(String, Span)>,
    /// `export { name }` references to check once the program is parsed
    pending_export_refs: Vec<(String, Span)>,
}

impl ScopeTracker {
    /// Create a tracker with the global frame active.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                kind: ScopeKind::Global,
                parent: None,
                bindings: Vec::new(),
                private_names: HashMap::new(),
                pending_private_refs: Vec::new(),
            }],
            current: 0,
            exported_names: Vec::new(),
            pending_export_refs: Vec::new(),
        }
    }

    /// Push a frame; returns its arena index.
    pub fn enter(&mut self, kind: ScopeKind) -> usize {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            kind,
            parent: Some(self.current),
            bindings: Vec::new(),
            private_names: HashMap::new(),
            pending_private_refs: Vec::new(),
        });
        self.current = id;
        id
    }

    /// Pop the active frame. Closing a class frame resolves the private
    /// references queued on it: names the class declares are discharged,
    /// the rest bubble to the next enclosing class frame, and a reference
    /// with no enclosing class left raises the resolution error at the
    /// reference's span.
    pub fn exit(&mut self, source: &SourceBuffer) -> Result<(), JsError> {
        let frame = &self.scopes[self.current];
        let parent = frame.parent.unwrap_or(0);
        if frame.kind == ScopeKind::Class {
            let pending = std::mem::take(&mut self.scopes[self.current].pending_private_refs);
            for (name, span) in pending {
                if self.scopes[self.current].private_names.contains_key(&name) {
                    continue;
                }
                match self.enclosing_class_of(parent) {
                    Some(outer) => {
                        self.scopes[outer].pending_private_refs.push((name, span));
                    }
                    None => {
                        return Err(semantic_error(
                            source,
                            span.start,
                            format!("Private field `#{}` must be declared in an enclosing class", name),
                        ));
                    }
                }
            }
        }
        self.current = parent;
        Ok(())
    }

    /// Kind of the active frame.
    pub fn current_kind(&self) -> ScopeKind {
        self.scopes[self.current].kind
    }

    /// Arena index of the active frame, for [`ScopeTracker::reset_to`].
    pub fn mark(&self) -> usize {
        self.current
    }

    /// Rewind the active frame to a previously captured [`ScopeTracker::mark`].
    /// Frames entered since stay in the arena but leave the active chain;
    /// used when a speculative parse is abandoned.
    pub fn reset_to(&mut self, mark: usize) {
        self.current = mark;
    }

    /// Declare a name in the appropriate frame, enforcing the language's
    /// redeclaration rules. `strict` relaxes/blocks the sloppy-mode
    /// function-redeclaration allowance.
    pub fn declare(
        &mut self,
        source: &SourceBuffer,
        name: &str,
        kind: BindingKind,
        span: Span,
        strict: bool,
    ) -> Result<(), JsError> {
        match kind {
            BindingKind::Var => self.declare_var(source, name, span),
            BindingKind::Function if self.is_var_level() => {
                // Function declarations at function/script top level are
                // var-scoped and may be repeated.
                self.check_no_lexical_conflict(source, name, self.current, span)?;
                self.scopes[self.current].insert(
                    name,
                    Binding {
                        kind,
                        span,
                        mutable: true,
                    },
                );
                Ok(())
            }
            _ => self.declare_lexical(source, name, kind, span, strict),
        }
    }

    /// Declare a parameter. Duplicate parameters are legal only in sloppy
    /// simple lists; the parser passes the verdict in.
    pub fn declare_param(
        &mut self,
        source: &SourceBuffer,
        name: &str,
        span: Span,
        allow_duplicates: bool,
    ) -> Result<(), JsError> {
        if !allow_duplicates {
            if let Some(existing) = self.scopes[self.current].get(name) {
                if existing.kind == BindingKind::Param {
                    return Err(already_declared(source, name, span));
                }
            }
        }
        self.scopes[self.current].insert(
            name,
            Binding {
                kind: BindingKind::Param,
                span,
                mutable: true,
            },
        );
        Ok(())
    }

    fn declare_lexical(
        &mut self,
        source: &SourceBuffer,
        name: &str,
        kind: BindingKind,
        span: Span,
        strict: bool,
    ) -> Result<(), JsError> {
        if let Some(existing) = self.scopes[self.current].get(name) {
            // Annex-B allowance: repeated function declarations in the
            // same sloppy-mode block
            let both_functions =
                existing.kind == BindingKind::Function && kind == BindingKind::Function;
            if !(both_functions && !strict) {
                return Err(already_declared(source, name, span));
            }
        }
        let mutable = !matches!(kind, BindingKind::Const | BindingKind::Import);
        self.scopes[self.current].insert(
            name,
            Binding {
                kind,
                span,
                mutable,
            },
        );
        Ok(())
    }

    /// `var` hoists to the nearest function/global frame; every frame
    /// crossed on the way (and the target itself) must not hold a
    /// conflicting lexical binding.
    fn declare_var(
        &mut self,
        source: &SourceBuffer,
        name: &str,
        span: Span,
    ) -> Result<(), JsError> {
        let mut index = self.current;
        loop {
            self.check_no_lexical_conflict(source, name, index, span)?;
            let scope = &self.scopes[index];
            if matches!(scope.kind, ScopeKind::Global | ScopeKind::Function(_)) {
                break;
            }
            index = scope.parent.unwrap_or(0);
        }
        self.scopes[index].insert(
            name,
            Binding {
                kind: BindingKind::Var,
                span,
                mutable: true,
            },
        );
        Ok(())
    }

    fn check_no_lexical_conflict(
        &self,
        source: &SourceBuffer,
        name: &str,
        scope_index: usize,
        span: Span,
    ) -> Result<(), JsError> {
        if let Some(existing) = self.scopes[scope_index].get(name) {
            if matches!(
                existing.kind,
                BindingKind::Let | BindingKind::Const | BindingKind::Class | BindingKind::Import
            ) {
                return Err(already_declared(source, name, span));
            }
        }
        Ok(())
    }

    fn is_var_level(&self) -> bool {
        matches!(
            self.scopes[self.current].kind,
            ScopeKind::Global | ScopeKind::Function(_)
        )
    }

    /// True if any name is declared in the active frame chain.
    pub fn is_declared(&self, name: &str) -> bool {
        let mut index = Some(self.current);
        while let Some(i) = index {
            if self.scopes[i].get(name).is_some() {
                return true;
            }
            index = self.scopes[i].parent;
        }
        false
    }

    // ----- private names ----------------------------------------------

    /// Declare a private class member on the active class frame.
    ///
    /// A name may appear once, except that a getter and a setter with
    /// matching static-ness merge into one accessor pair. A `static #a`
    /// and an instance `#a` always conflict.
    pub fn declare_private(
        &mut self,
        source: &SourceBuffer,
        name: &str,
        kind: PrivateMemberKind,
        is_static: bool,
        span: Span,
    ) -> Result<(), JsError> {
        debug_assert_eq!(self.scopes[self.current].kind, ScopeKind::Class);
        let members = self.scopes[self.current]
            .private_names
            .entry(name.to_string())
            .or_default();
        let compatible = match kind {
            PrivateMemberKind::Getter => {
                members.len() == 1
                    && members[0].kind == PrivateMemberKind::Setter
                    && members[0].is_static == is_static
            }
            PrivateMemberKind::Setter => {
                members.len() == 1
                    && members[0].kind == PrivateMemberKind::Getter
                    && members[0].is_static == is_static
            }
            _ => false,
        };
        if !members.is_empty() && !compatible {
            return Err(semantic_error(
                source,
                span.start,
                format!("Identifier `#{}` has already been declared", name),
            ));
        }
        members.push(PrivateMember { kind, is_static });
        Ok(())
    }

    /// Record a private-field reference (`obj.#x`, `#x in obj`). With no
    /// enclosing class at all this fails immediately; otherwise the
    /// reference waits on the innermost class frame, since the declaration
    /// may still come later in that class body.
    pub fn reference_private(
        &mut self,
        source: &SourceBuffer,
        name: &str,
        span: Span,
    ) -> Result<(), JsError> {
        match self.enclosing_class_of(self.current) {
            Some(class_index) => {
                self.scopes[class_index]
                    .pending_private_refs
                    .push((name.to_string(), span));
                Ok(())
            }
            None => Err(semantic_error(
                source,
                span.start,
                format!("Private field `#{}` must be declared in an enclosing class", name),
            )),
        }
    }

    /// Nearest class frame at or above `start`, following parent links.
    fn enclosing_class_of(&self, start: usize) -> Option<usize> {
        let mut index = Some(start);
        while let Some(i) = index {
            if self.scopes[i].kind == ScopeKind::Class {
                return Some(i);
            }
            index = self.scopes[i].parent;
        }
        None
    }

    // ----- exports ----------------------------------------------------

    /// Record an external export name; the same name twice is an error at
    /// the second site.
    pub fn add_export(
        &mut self,
        source: &SourceBuffer,
        name: &str,
        span: Span,
    ) -> Result<(), JsError> {
        if self.exported_names.iter().any(|(n, _)| n == name) {
            return Err(semantic_error(
                source,
                span.start,
                format!("Duplicate export `{}`", name),
            ));
        }
        self.exported_names.push((name.to_string(), span));
        Ok(())
    }

    /// Defer an `export { name }` local-name check to end of program (the
    /// declaration may appear later in the source).
    pub fn reference_export_local(&mut self, name: &str, span: Span) {
        self.pending_export_refs.push((name.to_string(), span));
    }

    /// End-of-program checks: every `export { name }` clause must name a
    /// top-level binding.
    pub fn finish(&mut self, source: &SourceBuffer) -> Result<(), JsError> {
        debug_assert_eq!(self.current, 0);
        for (name, span) in &self.pending_export_refs {
            if self.scopes[0].get(name).is_none() {
                return Err(semantic_error(
                    source,
                    span.start,
                    format!("Export `{}` is not defined", name),
                ));
            }
        }
        Ok(())
    }
}

impl Default for ScopeTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn already_declared(source: &SourceBuffer, name: &str, span: Span) -> JsError {
    semantic_error(
        source,
        span.start,
        format!("Identifier `{}` has already been declared", name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf() -> SourceBuffer {
        SourceBuffer::new("test.js", "x".repeat(200))
    }

    #[test]
    fn test_duplicate_let_conflicts() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes
            .declare(&source, "x", BindingKind::Let, Span::new(0, 1), false)
            .unwrap();
        let err = scopes
            .declare(&source, "x", BindingKind::Let, Span::new(10, 11), false)
            .unwrap_err();
        assert_eq!(err.message, "Identifier `x` has already been declared");
        assert_eq!(err.position.offset, 10);
    }

    #[test]
    fn test_var_redeclaration_is_fine() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes
            .declare(&source, "x", BindingKind::Var, Span::new(0, 1), false)
            .unwrap();
        scopes
            .declare(&source, "x", BindingKind::Var, Span::new(5, 6), false)
            .unwrap();
    }

    #[test]
    fn test_var_hoists_past_block_and_conflicts_with_let() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes
            .declare(&source, "x", BindingKind::Let, Span::new(0, 1), false)
            .unwrap();
        scopes.enter(ScopeKind::Block);
        let err = scopes
            .declare(&source, "x", BindingKind::Var, Span::new(8, 9), false)
            .unwrap_err();
        assert_eq!(err.message, "Identifier `x` has already been declared");
    }

    #[test]
    fn test_var_in_function_shadows_outer_let() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes
            .declare(&source, "x", BindingKind::Let, Span::new(0, 1), false)
            .unwrap();
        scopes.enter(ScopeKind::Function(FunctionKind::Normal));
        scopes
            .declare(&source, "x", BindingKind::Var, Span::new(8, 9), false)
            .unwrap();
    }

    #[test]
    fn test_param_then_let_conflicts() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes.enter(ScopeKind::Function(FunctionKind::Normal));
        scopes
            .declare_param(&source, "a", Span::new(0, 1), true)
            .unwrap();
        let err = scopes
            .declare(&source, "a", BindingKind::Let, Span::new(4, 5), false)
            .unwrap_err();
        assert_eq!(err.message, "Identifier `a` has already been declared");
    }

    #[test]
    fn test_duplicate_private_field() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes.enter(ScopeKind::Class);
        scopes
            .declare_private(&source, "a", PrivateMemberKind::Field, false, Span::new(10, 12))
            .unwrap();
        let err = scopes
            .declare_private(&source, "a", PrivateMemberKind::Field, false, Span::new(14, 16))
            .unwrap_err();
        assert_eq!(err.message, "Identifier `#a` has already been declared");
        assert_eq!(err.position.offset, 14);
    }

    #[test]
    fn test_getter_setter_pair_merges() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes.enter(ScopeKind::Class);
        scopes
            .declare_private(&source, "a", PrivateMemberKind::Getter, false, Span::new(0, 2))
            .unwrap();
        scopes
            .declare_private(&source, "a", PrivateMemberKind::Setter, false, Span::new(5, 7))
            .unwrap();
    }

    #[test]
    fn test_getter_setter_static_mismatch_conflicts() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes.enter(ScopeKind::Class);
        scopes
            .declare_private(&source, "a", PrivateMemberKind::Getter, true, Span::new(0, 2))
            .unwrap();
        let err = scopes
            .declare_private(&source, "a", PrivateMemberKind::Setter, false, Span::new(5, 7))
            .unwrap_err();
        assert_eq!(err.message, "Identifier `#a` has already been declared");
    }

    #[test]
    fn test_private_reference_without_class_fails_immediately() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        let err = scopes
            .reference_private(&source, "aaa", Span::new(4, 8))
            .unwrap_err();
        assert_eq!(
            err.message,
            "Private field `#aaa` must be declared in an enclosing class"
        );
        assert_eq!(err.position.offset, 4);
    }

    #[test]
    fn test_private_reference_resolves_to_later_declaration() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes.enter(ScopeKind::Class);
        scopes.enter(ScopeKind::Function(FunctionKind::Normal));
        scopes
            .reference_private(&source, "x", Span::new(20, 22))
            .unwrap();
        scopes.exit(&source).unwrap();
        scopes
            .declare_private(&source, "x", PrivateMemberKind::Field, false, Span::new(30, 32))
            .unwrap();
        scopes.exit(&source).unwrap();
    }

    #[test]
    fn test_private_reference_bubbles_to_outer_class() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes.enter(ScopeKind::Class);
        scopes
            .declare_private(&source, "outer", PrivateMemberKind::Field, false, Span::new(0, 2))
            .unwrap();
        scopes.enter(ScopeKind::Class);
        scopes
            .reference_private(&source, "outer", Span::new(10, 12))
            .unwrap();
        scopes.exit(&source).unwrap();
        scopes.exit(&source).unwrap();
    }

    #[test]
    fn test_unresolved_private_reference_errors_at_ref_span() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes.enter(ScopeKind::Class);
        scopes
            .reference_private(&source, "nope", Span::new(12, 17))
            .unwrap();
        let err = scopes.exit(&source).unwrap_err();
        assert_eq!(
            err.message,
            "Private field `#nope` must be declared in an enclosing class"
        );
        assert_eq!(err.position.offset, 12);
    }

    #[test]
    fn test_duplicate_export() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes.add_export(&source, "a", Span::new(0, 1)).unwrap();
        let err = scopes.add_export(&source, "a", Span::new(9, 10)).unwrap_err();
        assert_eq!(err.message, "Duplicate export `a`");
        assert_eq!(err.position.offset, 9);
    }

    #[test]
    fn test_export_of_undeclared_name() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes.reference_export_local("encrypt", Span::new(9, 16));
        let err = scopes.finish(&source).unwrap_err();
        assert_eq!(err.message, "Export `encrypt` is not defined");
    }

    #[test]
    fn test_export_of_declared_name() {
        let source = buf();
        let mut scopes = ScopeTracker::new();
        scopes
            .declare(&source, "encrypt", BindingKind::Function, Span::new(0, 7), false)
            .unwrap();
        scopes.reference_export_local("encrypt", Span::new(20, 27));
        scopes.finish(&source).unwrap();
    }
}
