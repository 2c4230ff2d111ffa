use std::collections::HashMap;

use crate::script::ast::{DeclKind, ForInit, Stmt};
use crate::script::error::ScriptError;
use crate::script::value::Value;

/// Index of a scope inside the [`Environment`] arena.
///
/// Closures hold a `ScopeId` instead of a reference-counted scope, so no
/// reference cycles form between functions and the scopes that contain them.
/// Every scope is freed when the environment is dropped at the end of a run.
pub type ScopeId = usize;

#[derive(Debug)]
struct Binding {
    value: Value,
    constant: bool,
}

#[derive(Debug)]
struct Scope {
    variables: HashMap<String, Binding>,
    parent: Option<ScopeId>,
    /// Function and program scopes receive `var` declarations.
    function_boundary: bool,
}

#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub const GLOBAL: ScopeId = 0;

    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope {
                variables: HashMap::new(),
                parent: None,
                function_boundary: true,
            }],
        }
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Drops every scope created after the first `len`. The global scope is
    /// never dropped.
    pub fn truncate(&mut self, len: usize) {
        self.scopes.truncate(len.max(1));
    }

    pub fn push_scope(&mut self, parent: ScopeId, function_boundary: bool) -> ScopeId {
        self.scopes.push(Scope {
            variables: HashMap::new(),
            parent: Some(parent),
            function_boundary,
        });
        self.scopes.len() - 1
    }

    fn function_scope_of(&self, mut scope: ScopeId) -> ScopeId {
        while !self.scopes[scope].function_boundary {
            match self.scopes[scope].parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        scope
    }

    fn resolve(&self, mut scope: ScopeId, name: &str) -> Option<ScopeId> {
        loop {
            if self.scopes[scope].variables.contains_key(name) {
                return Some(scope);
            }
            scope = self.scopes[scope].parent?;
        }
    }

    /// Declares a binding. `var` may be redeclared freely and keeps its old
    /// value when redeclared without an initializer; `let`/`const` may not be
    /// redeclared in the same scope.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        kind: DeclKind,
        name: &str,
        value: Option<Value>,
    ) -> Result<(), ScriptError> {
        match kind {
            DeclKind::Var => {
                let target = self.function_scope_of(scope);
                let variables = &mut self.scopes[target].variables;
                if let Some(binding) = variables.get_mut(name) {
                    if let Some(value) = value {
                        if binding.constant {
                            return Err(already_declared(name));
                        }
                        binding.value = value;
                    }
                    return Ok(());
                }
                variables.insert(
                    name.to_string(),
                    Binding {
                        value: value.unwrap_or(Value::Undefined),
                        constant: false,
                    },
                );
                Ok(())
            }
            DeclKind::Let | DeclKind::Const => {
                let variables = &mut self.scopes[scope].variables;
                if variables.contains_key(name) {
                    return Err(already_declared(name));
                }
                variables.insert(
                    name.to_string(),
                    Binding {
                        value: value.unwrap_or(Value::Undefined),
                        constant: kind == DeclKind::Const,
                    },
                );
                Ok(())
            }
        }
    }

    /// Binds a function declaration or parameter, replacing any prior binding.
    pub fn define(&mut self, scope: ScopeId, name: &str, value: Value) {
        self.scopes[scope].variables.insert(
            name.to_string(),
            Binding {
                value,
                constant: false,
            },
        );
    }

    pub fn get(&self, scope: ScopeId, name: &str) -> Option<Value> {
        let owner = self.resolve(scope, name)?;
        self.scopes[owner]
            .variables
            .get(name)
            .map(|binding| binding.value.clone())
    }

    /// Assigns to an existing binding, or creates a global one when the name
    /// is undeclared (sloppy-mode semantics the lesson snippets rely on).
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<(), ScriptError> {
        let owner = self.resolve(scope, name).unwrap_or(Self::GLOBAL);
        let binding = self.scopes[owner]
            .variables
            .entry(name.to_string())
            .or_insert(Binding {
                value: Value::Undefined,
                constant: false,
            });
        if binding.constant {
            return Err(ScriptError::type_error("Assignment to constant variable."));
        }
        binding.value = value;
        Ok(())
    }

    /// Pre-declares every `var` in `body` (without descending into nested
    /// functions) so reads before the declaration yield `undefined`.
    pub fn hoist_vars(&mut self, scope: ScopeId, body: &[Stmt]) {
        let mut names = Vec::new();
        collect_var_names(body, &mut names);
        for name in names {
            // `var` declarations without a value never fail
            let _ = self.declare(scope, DeclKind::Var, &name, None);
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn already_declared(name: &str) -> ScriptError {
    ScriptError::syntax(format!("Identifier '{}' has already been declared", name))
}

fn collect_var_names(body: &[Stmt], names: &mut Vec<String>) {
    for stmt in body {
        collect_from_stmt(stmt, names);
    }
}

fn collect_from_stmt(stmt: &Stmt, names: &mut Vec<String>) {
    match stmt {
        Stmt::Decl(DeclKind::Var, declarators) => {
            names.extend(declarators.iter().map(|(name, _)| name.clone()));
        }
        Stmt::Block(body) => collect_var_names(body, names),
        Stmt::If(_, consequent, alternate) => {
            collect_from_stmt(consequent, names);
            if let Some(alternate) = alternate {
                collect_from_stmt(alternate, names);
            }
        }
        Stmt::While(_, body) | Stmt::DoWhile(body, _) => collect_from_stmt(body, names),
        Stmt::For { init, body, .. } => {
            if let Some(ForInit::Decl(DeclKind::Var, declarators)) = init {
                names.extend(declarators.iter().map(|(name, _)| name.clone()));
            }
            collect_from_stmt(body, names);
        }
        Stmt::ForEach {
            decl, name, body, ..
        } => {
            if *decl == Some(DeclKind::Var) {
                names.push(name.clone());
            }
            collect_from_stmt(body, names);
        }
        _ => {}
    }
}
