//! Console output builtins.

use crate::error::RuntimeError;
use crate::runtime::function::CallContext;
use crate::runtime::value::Value;

/// print - writes its arguments, space-separated, as one line of output
pub fn print(ctx: &mut CallContext, args: &[Value]) -> Result<Value, RuntimeError> {
    let output: Vec<String> = args.iter().map(|v| format!("{}", v)).collect();
    ctx.write_line(output.join(" "));
    Ok(Value::Null)
}
