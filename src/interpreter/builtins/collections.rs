use crate::interpreter::{
    builtins::core::BuiltinCall,
    evaluator::core::{Context, EvalResult},
    value::core::Value,
};

/// `vec::push(p, x)`: appends `x` to the vector stored behind pointer `p`.
///
/// The vector is changed in its heap slot, so every pointer to that slot
/// sees the new element.
pub fn push(ctx: &mut Context, mut call: BuiltinCall) -> EvalResult<Value> {
    let Some(item) = call.args.pop() else {
        return Err(call.invalid("missing element").into());
    };
    let Value::Ptr(handle) = call.arg(0)? else {
        return Err(call.invalid(format!("expected ptr, found {}", call.arg(0)?.kind())).into());
    };
    match ctx.heap.get_mut(*handle, call.pos)? {
        Value::Vec(items) => {
            items.push(item);
            Ok(Value::Unit)
        },
        other => {
            let kind = other.kind();
            Err(call.invalid(format!("pointer targets {kind}, not vec")).into())
        },
    }
}

/// `vec::nth(v, i)`: the element at index `i`.
pub fn vec_nth(_ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    let Value::Vec(items) = call.arg(0)? else {
        return Err(call.invalid(format!("expected vec, found {}", call.arg(0)?.kind())).into());
    };
    let index = call.index(1, items.len())?;
    Ok(items[index].clone())
}

/// `str::nth(s, i)`: the `i`th character of `s`.
pub fn str_nth(_ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    let Value::Str(s) = call.arg(0)? else {
        return Err(call.invalid(format!("expected str, found {}", call.arg(0)?.kind())).into());
    };
    let len = s.chars().count();
    let index = call.index(1, len)?;
    s.chars()
     .nth(index)
     .map(Value::Char)
     .ok_or_else(|| call.invalid("index inside a character").into())
}

/// `len(c)`: characters in a string, elements in a vector or array.
pub fn len(_ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    let count = match call.arg(0)? {
        Value::Str(s) => s.chars().count(),
        Value::Vec(items) | Value::Arr(items) => items.len(),
        other => return Err(call.invalid(format!("expected str, vec or arr, found {}", other.kind())).into()),
    };
    let count = i32::try_from(count).map_err(|_| call.invalid("length does not fit in i32"))?;
    Ok(Value::from(count))
}
