use syntax::ast::{BinaryOp, UnaryOp};

use super::*;

impl Interp {
  pub(super) fn binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, Control> {
    match op {
      // `+` concatenates strings; everything else is 32-bit integer
      // arithmetic, wrapping like the two's-complement ints it models.
      BinaryOp::Add => match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(b))),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        _ => Err(Error::ty("Operands must be two numbers or two strings.").into()),
      },
      BinaryOp::Sub => int_op(lhs, rhs, |a, b| Ok(Value::Int(a.wrapping_sub(b)))),
      BinaryOp::Mul => int_op(lhs, rhs, |a, b| Ok(Value::Int(a.wrapping_mul(b)))),
      BinaryOp::Div => int_op(lhs, rhs, |a, b| {
        if b == 0 {
          Err(Error::ty("Division by zero."))
        } else {
          Ok(Value::Int(a.wrapping_div(b)))
        }
      }),
      BinaryOp::Less => int_op(lhs, rhs, |a, b| Ok(Value::Bool(a < b))),
      BinaryOp::LessEq => int_op(lhs, rhs, |a, b| Ok(Value::Bool(a <= b))),
      BinaryOp::More => int_op(lhs, rhs, |a, b| Ok(Value::Bool(a > b))),
      BinaryOp::MoreEq => int_op(lhs, rhs, |a, b| Ok(Value::Bool(a >= b))),
      BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
      BinaryOp::Neq => Ok(Value::Bool(lhs != rhs)),
    }
  }

  pub(super) fn unary(&mut self, op: UnaryOp, rhs: Value) -> Result<Value, Control> {
    match op {
      UnaryOp::Not => Ok(Value::Bool(!rhs.truthy())),
      UnaryOp::Neg => match rhs {
        Value::Int(v) => Ok(Value::Int(v.wrapping_neg())),
        _ => Err(Error::ty("Operand must be a number.").into()),
      },
    }
  }
}

fn int_op(
  lhs: Value,
  rhs: Value,
  f: impl FnOnce(i32, i32) -> Result<Value, Error>,
) -> Result<Value, Control> {
  match (lhs, rhs) {
    (Value::Int(a), Value::Int(b)) => Ok(f(a, b)?),
    _ => Err(Error::ty("Operands must be numbers.").into()),
  }
}
