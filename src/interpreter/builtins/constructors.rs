use crate::{
    interpreter::{
        builtins::core::BuiltinCall,
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
    types::Type,
};

/// `i32::new()`, `str::new()` and the other primitive constructors.
///
/// The type comes from the path prefix, so one function serves every
/// primitive.
pub fn primitive(_ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    let prefix = call.name.trim_end_matches("::new");
    let value = Type::primitive(prefix).and_then(|ty| Value::default_for(&ty))
                                       .ok_or_else(|| call.invalid("not a primitive constructor"))?;
    Ok(value)
}

/// `vec::new<<T>>()`: an empty vector.
#[allow(clippy::unnecessary_wraps)]
pub fn vector(_ctx: &mut Context, _call: BuiltinCall) -> EvalResult<Value> {
    Ok(Value::Vec(Vec::new()))
}

/// `arr::new<<A>>()`: an array of type `A` filled with default values.
pub fn array(_ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    let ty = call.type_arg(0)?;
    if !matches!(ty, Type::Arr(..)) {
        return Err(call.invalid(format!("expected an array type, found `{ty}`")).into());
    }
    Context::default_value(ty, call.pos)
}
