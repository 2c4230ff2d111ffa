//! Globals and prototype methods available to sandboxed scripts.
//!
//! Only pure computation is exposed: no timers, no I/O, no module loading.
//! `console.*` writes to the run's output accumulator.

use std::sync::LazyLock;

use regex::Regex;

use crate::script::environment::{Environment, ScopeId};
use crate::script::error::ScriptError;
use crate::script::interpreter::Interpreter;
use crate::script::value::{format_number, ArrayRef, NativeFn, Value};

/// Longest numeric prefix accepted by `parseFloat`.
static RE_FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid float regex")
});

/// Upper bound on strings built by `repeat`.
const MAX_REPEAT_LEN: usize = 1_000_000;

type Result<T> = std::result::Result<T, ScriptError>;

pub fn install(env: &mut Environment) {
    let global: ScopeId = Environment::GLOBAL;

    let console = Value::object(
        ["log", "info", "warn", "error", "debug"]
            .into_iter()
            .map(|name| (name.to_string(), Value::native("log", console_log)))
            .collect(),
    );
    env.define(global, "console", console);

    let math = Value::object(vec![
        ("PI".to_string(), Value::Number(std::f64::consts::PI)),
        ("E".to_string(), Value::Number(std::f64::consts::E)),
        math_fn("floor", math_floor),
        math_fn("ceil", math_ceil),
        math_fn("round", math_round),
        math_fn("trunc", math_trunc),
        math_fn("abs", math_abs),
        math_fn("sqrt", math_sqrt),
        math_fn("sign", math_sign),
        math_fn("pow", math_pow),
        math_fn("max", math_max),
        math_fn("min", math_min),
        math_fn("random", math_random),
    ]);
    env.define(global, "Math", math);

    env.define(
        global,
        "JSON",
        Value::object(vec![(
            "stringify".to_string(),
            Value::native("stringify", json_stringify),
        )]),
    );
    env.define(
        global,
        "Array",
        Value::object(vec![(
            "isArray".to_string(),
            Value::native("isArray", array_is_array),
        )]),
    );
    env.define(
        global,
        "Object",
        Value::object(vec![
            ("keys".to_string(), Value::native("keys", object_keys)),
            ("values".to_string(), Value::native("values", object_values)),
        ]),
    );

    env.define(global, "String", Value::native("String", global_string));
    env.define(global, "Number", Value::native("Number", global_number));
    env.define(global, "Boolean", Value::native("Boolean", global_boolean));
    env.define(global, "parseInt", Value::native("parseInt", parse_int));
    env.define(global, "parseFloat", Value::native("parseFloat", parse_float));
    env.define(global, "isNaN", Value::native("isNaN", is_nan));
    env.define(global, "NaN", Value::Number(f64::NAN));
    env.define(global, "Infinity", Value::Number(f64::INFINITY));
}

fn math_fn(name: &'static str, func: NativeFn) -> (String, Value) {
    (name.to_string(), Value::native(name, func))
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

fn number_arg(args: &[Value], index: usize) -> f64 {
    arg(args, index).to_number()
}

/// Resolves a possibly negative relative index against `len`, the way
/// `slice` treats its arguments.
fn relative_index(value: &Value, len: usize, default: usize) -> usize {
    if matches!(value, Value::Undefined) {
        return default;
    }
    let n = value.to_number();
    if n.is_nan() {
        return 0;
    }
    let n = n.trunc();
    if n < 0.0 {
        (len as f64 + n).max(0.0) as usize
    } else {
        (n as usize).min(len)
    }
}

// --- console ---

fn console_log(interp: &mut Interpreter, _this: &Value, args: Vec<Value>) -> Result<Value> {
    interp.output_mut().record(&args)?;
    Ok(Value::Undefined)
}

// --- Math ---

fn math_floor(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(number_arg(&args, 0).floor()))
}

fn math_ceil(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(number_arg(&args, 0).ceil()))
}

fn math_round(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    // Halves round toward positive infinity.
    Ok(Value::Number((number_arg(&args, 0) + 0.5).floor()))
}

fn math_trunc(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(number_arg(&args, 0).trunc()))
}

fn math_abs(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(number_arg(&args, 0).abs()))
}

fn math_sqrt(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(number_arg(&args, 0).sqrt()))
}

fn math_sign(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    let n = number_arg(&args, 0);
    Ok(Value::Number(if n == 0.0 || n.is_nan() { n } else { n.signum() }))
}

fn math_pow(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(number_arg(&args, 0).powf(number_arg(&args, 1))))
}

fn math_max(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    let mut result = f64::NEG_INFINITY;
    for value in &args {
        let n = value.to_number();
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        result = result.max(n);
    }
    Ok(Value::Number(result))
}

fn math_min(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    let mut result = f64::INFINITY;
    for value in &args {
        let n = value.to_number();
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        result = result.min(n);
    }
    Ok(Value::Number(result))
}

fn math_random(interp: &mut Interpreter, _: &Value, _: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(interp.next_random()))
}

// --- Globals ---

fn json_stringify(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(arg(&args, 0)
        .to_json()?
        .map(Value::Str)
        .unwrap_or(Value::Undefined))
}

fn array_is_array(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Bool(matches!(arg(&args, 0), Value::Array(_))))
}

fn object_keys(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    let keys = match arg(&args, 0) {
        Value::Object(props) => props
            .borrow()
            .iter()
            .map(|(k, _)| Value::str(k.clone()))
            .collect(),
        Value::Array(items) => (0..items.borrow().len())
            .map(|i| Value::str(i.to_string()))
            .collect(),
        Value::Undefined | Value::Null => {
            return Err(ScriptError::type_error(
                "Cannot convert undefined or null to object",
            ))
        }
        _ => Vec::new(),
    };
    Ok(Value::array(keys))
}

fn object_values(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    let values = match arg(&args, 0) {
        Value::Object(props) => props.borrow().iter().map(|(_, v)| v.clone()).collect(),
        Value::Array(items) => items.borrow().clone(),
        Value::Undefined | Value::Null => {
            return Err(ScriptError::type_error(
                "Cannot convert undefined or null to object",
            ))
        }
        _ => Vec::new(),
    };
    Ok(Value::array(values))
}

fn global_string(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Str(match args.first() {
        Some(value) => value.to_display(),
        None => String::new(),
    }))
}

fn global_number(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Number(match args.first() {
        Some(value) => value.to_number(),
        None => 0.0,
    }))
}

fn global_boolean(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Bool(arg(&args, 0).is_truthy()))
}

fn parse_int(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    let text = arg(&args, 0).to_display();
    let mut text = text.trim();
    let negative = text.starts_with('-');
    if negative || text.starts_with('+') {
        text = &text[1..];
    }

    let mut radix = match arg(&args, 1) {
        Value::Undefined => 10,
        value => value.to_number() as u32,
    };
    if (radix == 16 || radix == 10) && (text.starts_with("0x") || text.starts_with("0X")) {
        radix = 16;
        text = &text[2..];
    }
    if !(2..=36).contains(&radix) {
        return Ok(Value::Number(f64::NAN));
    }

    let digits: String = text.chars().take_while(|c| c.is_digit(radix)).collect();
    if digits.is_empty() {
        return Ok(Value::Number(f64::NAN));
    }
    let magnitude = digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0f64, |acc, d| acc * radix as f64 + d as f64);
    Ok(Value::Number(if negative { -magnitude } else { magnitude }))
}

fn parse_float(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    let text = arg(&args, 0).to_display();
    let n = RE_FLOAT_PREFIX
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN);
    Ok(Value::Number(n))
}

fn is_nan(_: &mut Interpreter, _: &Value, args: Vec<Value>) -> Result<Value> {
    Ok(Value::Bool(number_arg(&args, 0).is_nan()))
}

// --- String methods ---

pub fn string_method(name: &str) -> Option<(&'static str, NativeFn)> {
    let method: (&'static str, NativeFn) = match name {
        "toUpperCase" => ("toUpperCase", str_to_upper),
        "toLowerCase" => ("toLowerCase", str_to_lower),
        "trim" => ("trim", str_trim),
        "includes" => ("includes", str_includes),
        "indexOf" => ("indexOf", str_index_of),
        "startsWith" => ("startsWith", str_starts_with),
        "endsWith" => ("endsWith", str_ends_with),
        "slice" => ("slice", str_slice),
        "split" => ("split", str_split),
        "charAt" => ("charAt", str_char_at),
        "repeat" => ("repeat", str_repeat),
        "replace" => ("replace", str_replace),
        "toString" => ("toString", str_to_string),
        _ => return None,
    };
    Some(method)
}

fn receiver_str(this: &Value) -> String {
    this.to_display()
}

fn str_to_upper(_: &mut Interpreter, this: &Value, _: Vec<Value>) -> Result<Value> {
    Ok(Value::Str(receiver_str(this).to_uppercase()))
}

fn str_to_lower(_: &mut Interpreter, this: &Value, _: Vec<Value>) -> Result<Value> {
    Ok(Value::Str(receiver_str(this).to_lowercase()))
}

fn str_trim(_: &mut Interpreter, this: &Value, _: Vec<Value>) -> Result<Value> {
    Ok(Value::str(receiver_str(this).trim()))
}

fn str_to_string(_: &mut Interpreter, this: &Value, _: Vec<Value>) -> Result<Value> {
    Ok(Value::Str(receiver_str(this)))
}

fn str_includes(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let needle = arg(&args, 0).to_display();
    Ok(Value::Bool(receiver_str(this).contains(&needle)))
}

fn str_index_of(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let haystack = receiver_str(this);
    let needle = arg(&args, 0).to_display();
    let index = haystack
        .find(&needle)
        .map(|byte| haystack[..byte].chars().count() as f64)
        .unwrap_or(-1.0);
    Ok(Value::Number(index))
}

fn str_starts_with(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let prefix = arg(&args, 0).to_display();
    Ok(Value::Bool(receiver_str(this).starts_with(&prefix)))
}

fn str_ends_with(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let suffix = arg(&args, 0).to_display();
    Ok(Value::Bool(receiver_str(this).ends_with(&suffix)))
}

fn str_slice(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let chars: Vec<char> = receiver_str(this).chars().collect();
    let start = relative_index(&arg(&args, 0), chars.len(), 0);
    let end = relative_index(&arg(&args, 1), chars.len(), chars.len());
    let text = if start < end {
        chars[start..end].iter().collect()
    } else {
        String::new()
    };
    Ok(Value::Str(text))
}

fn str_split(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let text = receiver_str(this);
    let parts = match arg(&args, 0) {
        Value::Undefined => vec![Value::Str(text)],
        separator => {
            let separator = separator.to_display();
            if separator.is_empty() {
                text.chars().map(|c| Value::str(c.to_string())).collect()
            } else {
                text.split(separator.as_str()).map(Value::str).collect()
            }
        }
    };
    Ok(Value::array(parts))
}

fn str_char_at(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let index = number_arg(&args, 0);
    let index = if index.is_nan() { 0 } else { index as usize };
    Ok(Value::Str(
        receiver_str(this)
            .chars()
            .nth(index)
            .map(|c| c.to_string())
            .unwrap_or_default(),
    ))
}

fn str_repeat(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let text = receiver_str(this);
    let count = number_arg(&args, 0);
    if count < 0.0 || count.is_infinite() {
        return Err(ScriptError::range(format!(
            "Invalid count value: {}",
            format_number(count)
        )));
    }
    let count = if count.is_nan() { 0 } else { count as usize };
    if text.len().saturating_mul(count) > MAX_REPEAT_LEN {
        return Err(ScriptError::range("Invalid string length"));
    }
    Ok(Value::Str(text.repeat(count)))
}

fn str_replace(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let pattern = arg(&args, 0).to_display();
    let replacement = arg(&args, 1).to_display();
    Ok(Value::Str(receiver_str(this).replacen(&pattern, &replacement, 1)))
}

// --- Number methods ---

pub fn number_method(name: &str) -> Option<(&'static str, NativeFn)> {
    match name {
        "toFixed" => Some(("toFixed", num_to_fixed)),
        "toString" => Some(("toString", num_to_string)),
        _ => None,
    }
}

fn num_to_fixed(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let digits = match arg(&args, 0) {
        Value::Undefined => 0.0,
        value => value.to_number(),
    };
    if !(0.0..=100.0).contains(&digits) {
        return Err(ScriptError::range(
            "toFixed() digits argument must be between 0 and 100",
        ));
    }
    Ok(Value::Str(format!(
        "{:.*}",
        digits as usize,
        this.to_number()
    )))
}

fn num_to_string(_: &mut Interpreter, this: &Value, _: Vec<Value>) -> Result<Value> {
    Ok(Value::Str(this.to_display()))
}

// --- Array methods ---

pub fn array_method(name: &str) -> Option<(&'static str, NativeFn)> {
    let method: (&'static str, NativeFn) = match name {
        "push" => ("push", arr_push),
        "pop" => ("pop", arr_pop),
        "shift" => ("shift", arr_shift),
        "unshift" => ("unshift", arr_unshift),
        "join" => ("join", arr_join),
        "includes" => ("includes", arr_includes),
        "indexOf" => ("indexOf", arr_index_of),
        "slice" => ("slice", arr_slice),
        "concat" => ("concat", arr_concat),
        "reverse" => ("reverse", arr_reverse),
        "map" => ("map", arr_map),
        "filter" => ("filter", arr_filter),
        "forEach" => ("forEach", arr_for_each),
        "reduce" => ("reduce", arr_reduce),
        "toString" => ("toString", arr_to_string),
        _ => return None,
    };
    Some(method)
}

fn receiver_array(this: &Value) -> Result<ArrayRef> {
    match this {
        Value::Array(items) => Ok(items.clone()),
        other => Err(ScriptError::type_error(format!(
            "{} is not an array",
            other.to_display()
        ))),
    }
}

fn callback_arg(args: &[Value]) -> Result<Value> {
    let callback = arg(args, 0);
    if !callback.is_callable() {
        return Err(ScriptError::type_error(format!(
            "{} is not a function",
            callback.to_display()
        )));
    }
    Ok(callback)
}

fn arr_push(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let items = receiver_array(this)?;
    let mut items = items.borrow_mut();
    items.extend(args);
    Ok(Value::Number(items.len() as f64))
}

fn arr_pop(_: &mut Interpreter, this: &Value, _: Vec<Value>) -> Result<Value> {
    let items = receiver_array(this)?;
    let popped = items.borrow_mut().pop();
    Ok(popped.unwrap_or(Value::Undefined))
}

fn arr_shift(_: &mut Interpreter, this: &Value, _: Vec<Value>) -> Result<Value> {
    let items = receiver_array(this)?;
    let mut items = items.borrow_mut();
    if items.is_empty() {
        return Ok(Value::Undefined);
    }
    Ok(items.remove(0))
}

fn arr_unshift(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let items = receiver_array(this)?;
    let mut items = items.borrow_mut();
    items.splice(0..0, args);
    Ok(Value::Number(items.len() as f64))
}

fn arr_join(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let items = receiver_array(this)?;
    let separator = match arg(&args, 0) {
        Value::Undefined => ",".to_string(),
        value => value.to_display(),
    };
    let joined = items
        .borrow()
        .iter()
        .map(|v| if v.is_nullish() { String::new() } else { v.to_display() })
        .collect::<Vec<_>>()
        .join(&separator);
    Ok(Value::Str(joined))
}

fn arr_to_string(_: &mut Interpreter, this: &Value, _: Vec<Value>) -> Result<Value> {
    Ok(Value::Str(this.to_display()))
}

fn arr_includes(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let items = receiver_array(this)?;
    let needle = arg(&args, 0);
    let found = items.borrow().iter().any(|item| {
        item.strict_equals(&needle)
            || matches!((item, &needle), (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan())
    });
    Ok(Value::Bool(found))
}

fn arr_index_of(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let items = receiver_array(this)?;
    let needle = arg(&args, 0);
    let index = items
        .borrow()
        .iter()
        .position(|item| item.strict_equals(&needle))
        .map(|i| i as f64)
        .unwrap_or(-1.0);
    Ok(Value::Number(index))
}

fn arr_slice(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let items = receiver_array(this)?;
    let items = items.borrow();
    let start = relative_index(&arg(&args, 0), items.len(), 0);
    let end = relative_index(&arg(&args, 1), items.len(), items.len());
    let slice = if start < end {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    Ok(Value::array(slice))
}

fn arr_concat(_: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let mut result = receiver_array(this)?.borrow().clone();
    for value in args {
        match value {
            Value::Array(other) => result.extend(other.borrow().iter().cloned()),
            other => result.push(other),
        }
    }
    Ok(Value::array(result))
}

fn arr_reverse(_: &mut Interpreter, this: &Value, _: Vec<Value>) -> Result<Value> {
    receiver_array(this)?.borrow_mut().reverse();
    Ok(this.clone())
}

/// Snapshot of the receiver so callbacks may mutate the array while it is
/// being iterated.
fn snapshot(this: &Value) -> Result<Vec<Value>> {
    Ok(receiver_array(this)?.borrow().clone())
}

fn arr_map(interp: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let callback = callback_arg(&args)?;
    let mut mapped = Vec::new();
    for (i, item) in snapshot(this)?.into_iter().enumerate() {
        mapped.push(interp.call_value(&callback, vec![item, Value::Number(i as f64), this.clone()])?);
    }
    Ok(Value::array(mapped))
}

fn arr_filter(interp: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let callback = callback_arg(&args)?;
    let mut kept = Vec::new();
    for (i, item) in snapshot(this)?.into_iter().enumerate() {
        let keep = interp
            .call_value(&callback, vec![item.clone(), Value::Number(i as f64), this.clone()])?
            .is_truthy();
        if keep {
            kept.push(item);
        }
    }
    Ok(Value::array(kept))
}

fn arr_for_each(interp: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let callback = callback_arg(&args)?;
    for (i, item) in snapshot(this)?.into_iter().enumerate() {
        interp.call_value(&callback, vec![item, Value::Number(i as f64), this.clone()])?;
    }
    Ok(Value::Undefined)
}

fn arr_reduce(interp: &mut Interpreter, this: &Value, args: Vec<Value>) -> Result<Value> {
    let callback = callback_arg(&args)?;
    let items = snapshot(this)?;
    let mut iter = items.into_iter().enumerate();
    let mut accumulator = match args.get(1) {
        Some(initial) => initial.clone(),
        None => match iter.next() {
            Some((_, first)) => first,
            None => {
                return Err(ScriptError::type_error(
                    "Reduce of empty array with no initial value",
                ))
            }
        },
    };
    for (i, item) in iter {
        accumulator = interp.call_value(
            &callback,
            vec![accumulator, item, Value::Number(i as f64), this.clone()],
        )?;
    }
    Ok(accumulator)
}

#[cfg(test)]
mod tests {
    use crate::script::capture::OutputAccumulator;
    use crate::script::interpreter::{execute, Limits};

    fn run(source: &str) -> String {
        execute(source, OutputAccumulator::new(), &Limits::default())
            .unwrap()
            .into_text()
    }

    #[test]
    fn test_math() {
        assert_eq!(run("console.log(Math.floor(2.7), Math.max(1, 9, 3), Math.round(2.5))"), "2 9 3");
    }

    #[test]
    fn test_random_is_deterministic() {
        let first = run("console.log(Math.random())");
        let second = run("console.log(Math.random())");
        assert_eq!(first, second);
    }

    #[test]
    fn test_string_methods() {
        assert_eq!(
            run("const s = ' Hello '; console.log(s.trim().toUpperCase(), s.length, 'abc'.slice(-2))"),
            "HELLO 7 bc"
        );
        assert_eq!(run("console.log('a,b,c'.split(',').length)"), "3");
    }

    #[test]
    fn test_array_higher_order_methods() {
        assert_eq!(
            run("const xs = [1, 2, 3, 4]; console.log(xs.map(x => x * 2).filter(x => x > 4).join('-'))"),
            "6-8"
        );
        assert_eq!(run("console.log([1, 2, 3].reduce((a, b) => a + b, 0))"), "6");
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(run("console.log(parseInt('42px'), parseFloat('3.5kg'), parseInt('x'))"), "42 3.5 NaN");
        assert_eq!(run("console.log(parseInt('ff', 16), Number('12'), String(5) + 1)"), "255 12 51");
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(run("console.log((3.14159).toFixed(2))"), "3.14");
    }

    #[test]
    fn test_json_stringify() {
        assert_eq!(
            run("console.log(JSON.stringify({a: [1, 'x']}))"),
            r#"{"a":[1,"x"]}"#
        );
        assert_eq!(run("console.log({a: [1, 'x']})"), "{a:[1,x]}");
        assert_eq!(run("const j = JSON.stringify({a: 1}); console.log(j.length)"), "7");
    }
}
