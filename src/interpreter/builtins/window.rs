use crate::{
    error::RuntimeError,
    interpreter::{
        builtins::core::BuiltinCall,
        evaluator::core::{Context, EvalResult},
        runtime::window::WindowError,
        value::core::Value,
    },
};

fn window_error(err: &WindowError, call: &BuiltinCall) -> RuntimeError {
    RuntimeError::Window { details: err.to_string(),
                           pos:     call.pos, }
}

/// `init_window(title)`.
pub fn init_window(ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    let Value::Str(title) = call.arg(0)? else {
        return Err(call.invalid(format!("expected str, found {}", call.arg(0)?.kind())).into());
    };
    ctx.host
       .window
       .init_window(title)
       .map_err(|e| window_error(&e, &call))?;
    Ok(Value::Unit)
}

/// `draw_window()`.
pub fn draw_window(ctx: &mut Context, call: BuiltinCall) -> EvalResult<Value> {
    ctx.host.window.draw_window().map_err(|e| window_error(&e, &call))?;
    Ok(Value::Unit)
}

/// `is_window_open()`.
#[allow(clippy::unnecessary_wraps)]
pub fn is_window_open(ctx: &mut Context, _call: BuiltinCall) -> EvalResult<Value> {
    Ok(Value::Bool(ctx.host.window.is_window_open()))
}
