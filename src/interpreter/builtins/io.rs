use crate::interpreter::{
    builtins::core::BuiltinCall,
    evaluator::core::{Context, EvalResult, Unwind},
    value::core::Value,
};

/// `type(x)`: the static type of `x` in source syntax.
pub fn type_name(_ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    Ok(Value::Str(call.type_arg(0)?.to_string()))
}

/// `in()`: one line from the host input.
pub fn read_line(ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    Ok(Value::Str(ctx.host.read_line(call.pos)?))
}

/// `quit(code)`: stops the program immediately.
///
/// No scope is finalised on the way out. The code defaults to 0.
pub fn quit(_ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    let code = match call.args.first() {
        Some(value) => value.as_int(call.name, call.pos)?,
        None => 0,
    };
    let code = i32::try_from(code).map_err(|_| call.invalid(format!("exit code {code} does not fit in i32")))?;
    tracing::debug!(code, "quit requested");
    Err(Unwind::Quit(code))
}
