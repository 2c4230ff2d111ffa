//! Tree-walking evaluator for parsed scripts.

use std::rc::Rc;

use crate::script::ast::{
    BinaryOp, Expr, ForInit, FunctionBody, FunctionDef, LogicalOp, Stmt, TemplateSegment, UnaryOp,
};
use crate::script::builtins;
use crate::script::capture::OutputAccumulator;
use crate::script::environment::{Environment, ScopeId};
use crate::script::error::ScriptError;
use crate::script::parser::parse_program;
use crate::script::value::{Closure, Value};

/// Largest index an array assignment may grow an array to.
const MAX_ARRAY_INDEX: usize = 1_000_000;

/// Deepest script recursion the engine supports, whatever the configured limit.
pub const MAX_CALL_DEPTH: usize = 1_000;

/// Resource limits for a single sandboxed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Statement and expression evaluations allowed before the run is aborted.
    pub max_steps: u64,
    pub max_call_depth: usize,
    pub max_output_lines: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_steps: 1_000_000,
            max_call_depth: 100,
            max_output_lines: 10_000,
        }
    }
}

/// Parses and runs `source`, returning the accumulator with every captured line.
///
/// Output captured before a failure is discarded with the accumulator; the
/// caller only ever sees the error.
pub fn execute(
    source: &str,
    output: OutputAccumulator,
    limits: &Limits,
) -> Result<OutputAccumulator, ScriptError> {
    let program = parse_program(source)?;
    let mut interpreter = Interpreter::new(output, *limits);
    interpreter.run_program(&program)?;
    Ok(interpreter.into_output())
}

enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

pub struct Interpreter {
    env: Environment,
    output: OutputAccumulator,
    limits: Limits,
    steps: u64,
    call_depth: usize,
    /// Bumped whenever a closure captures a scope; scopes created while it
    /// stays unchanged can be reclaimed when their block exits.
    closures_created: u64,
    rng_state: u64,
}

impl Interpreter {
    pub fn new(output: OutputAccumulator, limits: Limits) -> Self {
        let mut env = Environment::new();
        builtins::install(&mut env);
        Interpreter {
            env,
            output,
            limits,
            steps: 0,
            call_depth: 0,
            closures_created: 0,
            rng_state: 0x2545_F491_4F6C_DD1D,
        }
    }

    pub fn into_output(self) -> OutputAccumulator {
        self.output
    }

    pub fn output_mut(&mut self) -> &mut OutputAccumulator {
        &mut self.output
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Deterministic xorshift generator backing `Math.random`, so runs are
    /// reproducible.
    pub fn next_random(&mut self) -> f64 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Runs a whole program. The program body behaves like a function body:
    /// a top-level `return` ends the run early.
    pub fn run_program(&mut self, program: &[Stmt]) -> Result<(), ScriptError> {
        self.env.hoist_vars(Environment::GLOBAL, program);
        match self.exec_block(program, Environment::GLOBAL)? {
            Flow::Break => Err(ScriptError::syntax("Illegal break statement")),
            Flow::Continue => Err(ScriptError::syntax("Illegal continue statement")),
            Flow::Normal | Flow::Return(_) => Ok(()),
        }
    }

    fn tick(&mut self) -> Result<(), ScriptError> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(ScriptError::limit(format!(
                "Execution step limit exceeded ({} steps); possible infinite loop",
                self.limits.max_steps
            )));
        }
        Ok(())
    }

    fn make_closure(&mut self, def: &Rc<FunctionDef>, scope: ScopeId) -> Value {
        self.closures_created += 1;
        Value::Function(Rc::new(Closure {
            def: Rc::clone(def),
            scope,
        }))
    }

    /// Runs `f` in a fresh child scope and reclaims the scopes it created
    /// when no closure could have captured them.
    fn scoped<T>(
        &mut self,
        parent: ScopeId,
        function_boundary: bool,
        f: impl FnOnce(&mut Self, ScopeId) -> Result<T, ScriptError>,
    ) -> Result<T, ScriptError> {
        let mark = self.env.scope_count();
        let closures_before = self.closures_created;
        let scope = self.env.push_scope(parent, function_boundary);
        let result = f(self, scope);
        if self.closures_created == closures_before {
            self.env.truncate(mark);
        }
        result
    }

    // --- Statements ---

    fn exec_block(&mut self, body: &[Stmt], scope: ScopeId) -> Result<Flow, ScriptError> {
        for stmt in body {
            if let Stmt::Function(def) = stmt {
                if let Some(name) = &def.name {
                    let closure = self.make_closure(def, scope);
                    self.env.define(scope, name, closure);
                }
            }
        }
        for stmt in body {
            match self.exec(stmt, scope)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt, scope: ScopeId) -> Result<Flow, ScriptError> {
        self.tick()?;
        match stmt {
            Stmt::Decl(kind, declarators) => {
                for (name, init) in declarators {
                    let value = match init {
                        Some(expr) => Some(self.eval(expr, scope)?),
                        None => None,
                    };
                    self.env.declare(scope, *kind, name, value)?;
                }
                Ok(Flow::Normal)
            }
            Stmt::Function(_) | Stmt::Empty => Ok(Flow::Normal),
            Stmt::Expr(expr) => {
                self.eval(expr, scope)?;
                Ok(Flow::Normal)
            }
            Stmt::Block(body) => self.scoped(scope, false, |this, inner| this.exec_block(body, inner)),
            Stmt::If(test, consequent, alternate) => {
                if self.eval(test, scope)?.is_truthy() {
                    self.exec(consequent, scope)
                } else if let Some(alternate) = alternate {
                    self.exec(alternate, scope)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(test, body) => {
                while self.eval(test, scope)?.is_truthy() {
                    match self.exec(body, scope)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::DoWhile(body, test) => {
                loop {
                    match self.exec(body, scope)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if !self.eval(test, scope)?.is_truthy() {
                        break;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => self.scoped(scope, false, |this, inner| {
                match init {
                    Some(ForInit::Decl(kind, declarators)) => {
                        for (name, value) in declarators {
                            let value = match value {
                                Some(expr) => Some(this.eval(expr, inner)?),
                                None => None,
                            };
                            this.env.declare(inner, *kind, name, value)?;
                        }
                    }
                    Some(ForInit::Expr(expr)) => {
                        this.eval(expr, inner)?;
                    }
                    None => {}
                }
                loop {
                    if let Some(test) = test {
                        if !this.eval(test, inner)?.is_truthy() {
                            break;
                        }
                    }
                    match this.exec(body, inner)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if let Some(update) = update {
                        this.eval(update, inner)?;
                    }
                }
                Ok(Flow::Normal)
            }),
            Stmt::ForEach {
                decl,
                name,
                of,
                iterable,
                body,
            } => {
                let collection = self.eval(iterable, scope)?;
                let items = self.iteration_items(&collection, *of, iterable)?;
                for item in items {
                    let flow = self.scoped(scope, false, |this, inner| {
                        match decl {
                            Some(kind) => this.env.declare(inner, *kind, name, Some(item))?,
                            None => this.env.assign(scope, name, item)?,
                        }
                        this.exec(body, inner)
                    })?;
                    match flow {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::Undefined,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break => Ok(Flow::Break),
            Stmt::Continue => Ok(Flow::Continue),
        }
    }

    fn iteration_items(
        &self,
        collection: &Value,
        of: bool,
        source: &Expr,
    ) -> Result<Vec<Value>, ScriptError> {
        let items = match (collection, of) {
            (Value::Array(items), true) => items.borrow().clone(),
            (Value::Array(items), false) => (0..items.borrow().len())
                .map(|i| Value::str(i.to_string()))
                .collect(),
            (Value::Str(s), true) => s.chars().map(|c| Value::str(c.to_string())).collect(),
            (Value::Str(s), false) => (0..s.chars().count())
                .map(|i| Value::str(i.to_string()))
                .collect(),
            (Value::Object(props), false) => props
                .borrow()
                .iter()
                .map(|(key, _)| Value::str(key.clone()))
                .collect(),
            // Primitives and nullish values enumerate nothing.
            (_, false) => Vec::new(),
            (_, true) => {
                return Err(ScriptError::type_error(format!(
                    "{} is not iterable",
                    describe(source)
                )))
            }
        };
        Ok(items)
    }

    // --- Expressions ---

    fn eval(&mut self, expr: &Expr, scope: ScopeId) -> Result<Value, ScriptError> {
        self.tick()?;
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Undefined => Ok(Value::Undefined),
            Expr::Template(segments) => {
                let mut text = String::new();
                for segment in segments {
                    match segment {
                        TemplateSegment::Text(t) => text.push_str(t),
                        TemplateSegment::Expr(e) => text.push_str(&self.eval(e, scope)?.to_display()),
                    }
                }
                Ok(Value::Str(text))
            }
            Expr::Ident(name) => self
                .env
                .get(scope, name)
                .ok_or_else(|| ScriptError::not_defined(name)),
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval(element, scope)?);
                }
                Ok(Value::array(items))
            }
            Expr::Object(properties) => {
                let mut props: Vec<(String, Value)> = Vec::with_capacity(properties.len());
                for (key, value) in properties {
                    let value = self.eval(value, scope)?;
                    match props.iter_mut().find(|(k, _)| k == key) {
                        Some(existing) => existing.1 = value,
                        None => props.push((key.clone(), value)),
                    }
                }
                Ok(Value::object(props))
            }
            Expr::Function(def) => Ok(self.make_closure(def, scope)),
            Expr::Unary(op, operand) => {
                if let (UnaryOp::TypeOf, Expr::Ident(name)) = (op, operand.as_ref()) {
                    let kind = self
                        .env
                        .get(scope, name)
                        .map(|v| v.type_of())
                        .unwrap_or("undefined");
                    return Ok(Value::str(kind));
                }
                let value = self.eval(operand, scope)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Neg => Value::Number(-value.to_number()),
                    UnaryOp::Plus => Value::Number(value.to_number()),
                    UnaryOp::TypeOf => Value::str(value.type_of()),
                })
            }
            Expr::Binary(op, left, right) => {
                let left = self.eval(left, scope)?;
                let right = self.eval(right, scope)?;
                Ok(binary_op(*op, &left, &right))
            }
            Expr::Logical(op, left, right) => {
                let left = self.eval(left, scope)?;
                let short_circuit = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::Nullish => !left.is_nullish(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval(right, scope)
                }
            }
            Expr::Conditional(test, consequent, alternate) => {
                if self.eval(test, scope)?.is_truthy() {
                    self.eval(consequent, scope)
                } else {
                    self.eval(alternate, scope)
                }
            }
            Expr::Assign(op, target, value) => {
                let new_value = match op {
                    Some(op) => {
                        let current = self.eval(target, scope)?;
                        let rhs = self.eval(value, scope)?;
                        binary_op(*op, &current, &rhs)
                    }
                    None => self.eval(value, scope)?,
                };
                self.assign_to(target, new_value.clone(), scope)?;
                Ok(new_value)
            }
            Expr::Update {
                increment,
                prefix,
                target,
            } => {
                let old = self.eval(target, scope)?.to_number();
                let new = if *increment { old + 1.0 } else { old - 1.0 };
                self.assign_to(target, Value::Number(new), scope)?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }
            Expr::Member(object, property) => {
                let object = self.eval(object, scope)?;
                get_property(&object, property)
            }
            Expr::Index(object, index) => {
                let object = self.eval(object, scope)?;
                let index = self.eval(index, scope)?;
                get_index(&object, &index)
            }
            Expr::Call(callee, args) => {
                let function = self.eval(callee, scope)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, scope)?);
                }
                if !function.is_callable() {
                    return Err(ScriptError::type_error(format!(
                        "{} is not a function",
                        describe(callee)
                    )));
                }
                self.call_value(&function, values)
            }
        }
    }

    fn assign_to(&mut self, target: &Expr, value: Value, scope: ScopeId) -> Result<(), ScriptError> {
        match target {
            Expr::Ident(name) => self.env.assign(scope, name, value),
            Expr::Member(object, property) => {
                let object = self.eval(object, scope)?;
                set_property(&object, property, value)
            }
            Expr::Index(object, index) => {
                let object = self.eval(object, scope)?;
                let index = self.eval(index, scope)?;
                set_index(&object, &index, value)
            }
            _ => Err(ScriptError::syntax("Invalid left-hand side in assignment")),
        }
    }

    /// Invokes a script closure or a native function.
    pub fn call_value(&mut self, function: &Value, args: Vec<Value>) -> Result<Value, ScriptError> {
        match function {
            Value::Native(native) => (native.func)(self, &native.receiver, args),
            Value::Function(closure) => self.call_closure(closure, args),
            other => Err(ScriptError::type_error(format!(
                "{} is not a function",
                other.to_display()
            ))),
        }
    }

    fn call_closure(&mut self, closure: &Rc<Closure>, args: Vec<Value>) -> Result<Value, ScriptError> {
        if self.call_depth >= self.limits.max_call_depth.min(MAX_CALL_DEPTH) {
            return Err(ScriptError::range("Maximum call stack size exceeded"));
        }
        self.call_depth += 1;
        let def = Rc::clone(&closure.def);
        let result = self.scoped(closure.scope, true, |this, scope| {
            let mut args = args.into_iter();
            for param in &def.params {
                let value = args.next().unwrap_or(Value::Undefined);
                this.env.define(scope, param, value);
            }
            match &def.body {
                FunctionBody::Expr(expr) => this.eval(expr, scope),
                FunctionBody::Block(body) => {
                    this.env.hoist_vars(scope, body);
                    match this.exec_block(body, scope)? {
                        Flow::Return(value) => Ok(value),
                        Flow::Normal => Ok(Value::Undefined),
                        Flow::Break => Err(ScriptError::syntax("Illegal break statement")),
                        Flow::Continue => Err(ScriptError::syntax("Illegal continue statement")),
                    }
                }
            }
        });
        self.call_depth -= 1;
        result
    }
}

/// Source-like name of an expression for error messages (`console.foo`).
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Member(object, property) => format!("{}.{}", describe(object), property),
        Expr::Index(object, _) => format!("{}[...]", describe(object)),
        Expr::Call(callee, _) => format!("{}(...)", describe(callee)),
        Expr::Number(n) => crate::script::value::format_number(*n),
        Expr::Str(s) => format!("\"{}\"", s),
        _ => "expression".to_string(),
    }
}

fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> Value {
    let concatenates = |v: &Value| matches!(v, Value::Str(_) | Value::Array(_) | Value::Object(_));
    match op {
        BinaryOp::Add if concatenates(left) || concatenates(right) => {
            Value::Str(format!("{}{}", left.to_display(), right.to_display()))
        }
        BinaryOp::Add => Value::Number(left.to_number() + right.to_number()),
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Pow => Value::Number(left.to_number().powf(right.to_number())),
        BinaryOp::Eq => Value::Bool(left.loose_equals(right)),
        BinaryOp::NotEq => Value::Bool(!left.loose_equals(right)),
        BinaryOp::StrictEq => Value::Bool(left.strict_equals(right)),
        BinaryOp::StrictNotEq => Value::Bool(!left.strict_equals(right)),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
            let ordering = match (left, right) {
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => left.to_number().partial_cmp(&right.to_number()),
            };
            let result = match ordering {
                None => false,
                Some(ordering) => match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::Gt => ordering.is_gt(),
                    BinaryOp::LtEq => ordering.is_le(),
                    _ => ordering.is_ge(),
                },
            };
            Value::Bool(result)
        }
    }
}

fn array_index(index: &Value) -> Option<usize> {
    match index {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
        Value::Str(s) => s.parse::<usize>().ok(),
        _ => None,
    }
}

pub fn get_property(object: &Value, property: &str) -> Result<Value, ScriptError> {
    match object {
        Value::Undefined | Value::Null => Err(ScriptError::type_error(format!(
            "Cannot read properties of {} (reading '{}')",
            object.to_display(),
            property
        ))),
        Value::Str(s) if property == "length" => Ok(Value::Number(s.chars().count() as f64)),
        Value::Str(_) => Ok(builtins::string_method(property)
            .map(|(name, func)| Value::bound_native(name, object.clone(), func))
            .unwrap_or(Value::Undefined)),
        Value::Array(items) if property == "length" => Ok(Value::Number(items.borrow().len() as f64)),
        Value::Array(items) => match property.parse::<usize>() {
            Ok(i) => Ok(items.borrow().get(i).cloned().unwrap_or(Value::Undefined)),
            Err(_) => Ok(builtins::array_method(property)
                .map(|(name, func)| Value::bound_native(name, object.clone(), func))
                .unwrap_or(Value::Undefined)),
        },
        Value::Number(_) => Ok(builtins::number_method(property)
            .map(|(name, func)| Value::bound_native(name, object.clone(), func))
            .unwrap_or(Value::Undefined)),
        Value::Object(props) => Ok(props
            .borrow()
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.clone())
            .unwrap_or(Value::Undefined)),
        Value::Bool(_) | Value::Function(_) | Value::Native(_) => Ok(Value::Undefined),
    }
}

fn get_index(object: &Value, index: &Value) -> Result<Value, ScriptError> {
    match (object, array_index(index)) {
        (Value::Array(items), Some(i)) => Ok(items.borrow().get(i).cloned().unwrap_or(Value::Undefined)),
        (Value::Str(s), Some(i)) => Ok(s
            .chars()
            .nth(i)
            .map(|c| Value::str(c.to_string()))
            .unwrap_or(Value::Undefined)),
        _ => get_property(object, &index.to_display()),
    }
}

fn set_property(object: &Value, property: &str, value: Value) -> Result<(), ScriptError> {
    match object {
        Value::Undefined | Value::Null => Err(ScriptError::type_error(format!(
            "Cannot set properties of {} (setting '{}')",
            object.to_display(),
            property
        ))),
        Value::Object(props) => {
            let mut props = props.borrow_mut();
            match props.iter_mut().find(|(key, _)| key == property) {
                Some(existing) => existing.1 = value,
                None => props.push((property.to_string(), value)),
            }
            Ok(())
        }
        Value::Array(items) if property == "length" => {
            let len = array_index(&value)
                .filter(|len| *len <= MAX_ARRAY_INDEX)
                .ok_or_else(|| ScriptError::range("Invalid array length"))?;
            items.borrow_mut().resize(len, Value::Undefined);
            Ok(())
        }
        Value::Array(_) => match property.parse::<usize>() {
            Ok(i) => set_index(object, &Value::Number(i as f64), value),
            Err(_) => Ok(()),
        },
        // Primitives silently ignore property writes.
        _ => Ok(()),
    }
}

fn set_index(object: &Value, index: &Value, value: Value) -> Result<(), ScriptError> {
    match (object, array_index(index)) {
        (Value::Array(items), Some(i)) => {
            if i > MAX_ARRAY_INDEX {
                return Err(ScriptError::range("Invalid array length"));
            }
            let mut items = items.borrow_mut();
            if i >= items.len() {
                items.resize(i + 1, Value::Undefined);
            }
            items[i] = value;
            Ok(())
        }
        _ => set_property(object, &index.to_display(), value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> Result<String, ScriptError> {
        execute(source, OutputAccumulator::new(), &Limits::default()).map(|out| out.into_text())
    }

    #[test]
    fn test_console_log_captures() {
        assert_eq!(run("console.log('hi')").unwrap(), "hi");
        assert_eq!(run("console.log('a', 1, true)").unwrap(), "a 1 true");
    }

    #[test]
    fn test_arithmetic_and_concatenation() {
        assert_eq!(run("console.log(1 + 2 * 3, '1' + 2, 7 % 4, 2 ** 10)").unwrap(), "7 12 3 1024");
    }

    #[test]
    fn test_loops() {
        let out = run("for (let i = 0; i < 3; i++) { console.log(i) }").unwrap();
        assert_eq!(out, "0\n1\n2");
        let out = run("var n = 0; while (true) { n++; if (n > 4) break; } console.log(n)").unwrap();
        assert_eq!(out, "5");
        let out = run("for (const x of [1, 2]) console.log(x * 10)").unwrap();
        assert_eq!(out, "10\n20");
    }

    #[test]
    fn test_functions_and_closures() {
        let source = "
            function makeCounter() {
                let count = 0
                return () => ++count
            }
            const next = makeCounter()
            next(); next()
            console.log(next())
        ";
        assert_eq!(run(source).unwrap(), "3");
    }

    #[test]
    fn test_function_hoisting() {
        assert_eq!(run("console.log(square(4)); function square(x) { return x * x }").unwrap(), "16");
    }

    #[test]
    fn test_var_hoisting_reads_undefined() {
        assert_eq!(run("console.log(v); var v = 1").unwrap(), "undefined");
    }

    #[test]
    fn test_reference_error() {
        let err = run("console.log(missing)").unwrap_err();
        assert_eq!(err.message, "missing is not defined");
    }

    #[test]
    fn test_not_a_function() {
        let err = run("console.foo('x')").unwrap_err();
        assert_eq!(err.message, "console.foo is not a function");
    }

    #[test]
    fn test_reading_from_undefined() {
        let err = run("let u; u.name").unwrap_err();
        assert_eq!(err.message, "Cannot read properties of undefined (reading 'name')");
    }

    #[test]
    fn test_template_literal() {
        assert_eq!(run("const n = 'Ann'; console.log(`Hi ${n}, ${1 + 1}`)").unwrap(), "Hi Ann, 2");
    }

    #[test]
    fn test_step_limit_stops_infinite_loop() {
        let limits = Limits {
            max_steps: 1_000,
            ..Limits::default()
        };
        let err = execute("while (true) {}", OutputAccumulator::new(), &limits).unwrap_err();
        assert_eq!(err.kind, crate::script::ErrorKind::Limit);
    }

    #[test]
    fn test_call_depth_limit() {
        let err = run("function f() { return f() } f()").unwrap_err();
        assert_eq!(err.message, "Maximum call stack size exceeded");
    }

    #[test]
    fn test_top_level_return_ends_run() {
        assert_eq!(run("console.log(1); return; console.log(2)").unwrap(), "1");
    }

    #[test]
    fn test_objects_and_arrays_are_shared() {
        let source = "const a = []; const b = a; b.push(1, 2); const o = {n: 1}; o.n += 1; console.log(a, o.n, a.length)";
        assert_eq!(run(source).unwrap(), "[1,2] 2 2");
    }

    #[test]
    fn test_block_scopes_are_reclaimed() {
        let mut interpreter = Interpreter::new(OutputAccumulator::new(), Limits::default());
        let program = parse_program("for (let i = 0; i < 50; i++) { let x = i }").unwrap();
        interpreter.run_program(&program).unwrap();
        assert_eq!(interpreter.env.scope_count(), 1);
    }
}
