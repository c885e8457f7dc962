use crate::{
    error::RuntimeError,
    interpreter::{
        builtins::core::BuiltinCall,
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

/// `ptr::new(x)`: moves a copy of `x` into a new heap slot.
pub fn alloc(ctx: &mut Context, mut call: BuiltinCall) -> EvalResult<Value> {
    let Some(value) = call.args.pop() else {
        return Err(call.invalid("missing value").into());
    };
    Ok(Value::Ptr(ctx.heap.alloc(value)))
}

/// `ptr::deref(p)`: a copy of the value behind `p`.
pub fn deref(ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    let Value::Ptr(handle) = call.arg(0)? else {
        return Err(call.invalid(format!("expected ptr, found {}", call.arg(0)?.kind())).into());
    };
    Ok(ctx.heap.get(*handle, call.pos)?.clone())
}

/// `ptr::free(p)`: releases the slot behind `p`.
pub fn free(ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    let Value::Ptr(handle) = call.arg(0)? else {
        return Err(call.invalid(format!("expected ptr, found {}", call.arg(0)?.kind())).into());
    };
    ctx.heap.free(*handle, call.pos)?;
    Ok(Value::Unit)
}

/// `ref::new(x)`: a read-only reference to the binding `x`.
///
/// The evaluator already resolved the argument to its cell.
pub fn reference(_ctx: &mut Context, mut call: BuiltinCall) -> EvalResult<Value> {
    match call.args.pop() {
        Some(reference @ Value::Ref(_)) => Ok(reference),
        _ => Err(call.invalid("expected a variable").into()),
    }
}

/// `ref::deref(r)`: the current value of the referenced binding.
pub fn read_reference(ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    let Value::Ref(reference) = call.arg(0)? else {
        return Err(call.invalid(format!("expected ref, found {}", call.arg(0)?.kind())).into());
    };
    let value = ctx.env
                   .get(reference.cell)
                   .cloned()
                   .ok_or_else(|| RuntimeError::DanglingReference { name: reference.name.clone(),
                                                                    pos:  call.pos, })?;
    Ok(value)
}
