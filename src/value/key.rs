use std::fmt;
use std::sync::Arc;

use super::{write_unescaped, Value};
use crate::error::Error;

/// The hashable subset of [`Value`], used as map keys.
///
/// Keys compare structurally, so two separately-built tuples with the
/// same contents address the same entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
  Int(i32),
  Bool(bool),
  Str(String),
  Atom(Arc<str>),
  Tuple(Vec<Key>),
}

impl Key {
  pub fn from_value(value: &Value) -> Result<Key, Error> {
    match value {
      Value::Int(v) => Ok(Key::Int(*v)),
      Value::Bool(v) => Ok(Key::Bool(*v)),
      Value::Str(v) => Ok(Key::Str(v.clone())),
      Value::Atom(v) => Ok(Key::Atom(v.clone())),
      Value::Tuple(items) => Ok(Key::Tuple(
        items.iter().map(Key::from_value).collect::<Result<_, _>>()?,
      )),
      _ => Err(Error::ty(
        "Map keys must be ints, strings, bools, atoms, or tuples.",
      )),
    }
  }

  pub fn to_value(&self) -> Value {
    match self {
      Key::Int(v) => Value::Int(*v),
      Key::Bool(v) => Value::Bool(*v),
      Key::Str(v) => Value::Str(v.clone()),
      Key::Atom(v) => Value::Atom(v.clone()),
      Key::Tuple(items) => Value::Tuple(items.iter().map(Key::to_value).collect()),
    }
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Key::Int(v) => write!(f, "{v}"),
      Key::Bool(v) => write!(f, "{v}"),
      Key::Str(v) => write_unescaped(f, v),
      Key::Atom(name) => write!(f, "@{name}"),
      Key::Tuple(items) => {
        write!(f, "{{")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{item}")?;
        }
        write!(f, "}}")
      }
    }
  }
}
