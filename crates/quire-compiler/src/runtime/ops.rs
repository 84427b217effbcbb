//! Reference semantics of the runtime operations over boxed values.

use super::abi::RuntimeOp;
use super::function::CallContext;
use super::value::Value;
use crate::error::RuntimeError;

/// Applies a binary arithmetic or comparison operation.
pub fn binary(op: RuntimeOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    if op == RuntimeOp::Eq {
        return Ok(Value::Bool(left == right));
    }

    let (a, b) = match (left.as_int(), right.as_int()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(RuntimeError::TypeError(format!(
                "cannot apply {} to {} and {}",
                op,
                left.type_name(),
                right.type_name()
            )));
        }
    };

    let result = match op {
        RuntimeOp::Add => a.checked_add(b).ok_or(RuntimeError::Overflow("Add"))?,
        RuntimeOp::Sub => a.checked_sub(b).ok_or(RuntimeError::Overflow("Sub"))?,
        RuntimeOp::Mul => a.checked_mul(b).ok_or(RuntimeError::Overflow("Mul"))?,
        RuntimeOp::Div => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a.checked_div(b).ok_or(RuntimeError::Overflow("Div"))?
        }
        RuntimeOp::Rem => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a.checked_rem(b).ok_or(RuntimeError::Overflow("Rem"))?
        }
        RuntimeOp::Lt => return Ok(Value::Bool(a < b)),
        RuntimeOp::Eq | RuntimeOp::ToBool | RuntimeOp::Call => {
            return Err(RuntimeError::Malformed(format!("{} is not a binary operation", op)));
        }
    };
    Ok(Value::Int(result))
}

/// Coerces a value to a truth value.
pub fn to_bool(value: &Value) -> bool {
    value.to_bool()
}

/// Invokes `callee` with `args`.
pub fn call(ctx: &mut CallContext, callee: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
    match callee {
        Value::Native(native) => native.call(ctx, args),
        other => Err(RuntimeError::NotCallable(other.to_string())),
    }
}
