//! The runtime value model.
//!
//! A closed tagged union. Copy, retain, release, equality and
//! stringification all dispatch on the variant tag:
//!
//! - value kinds (int, string, bool, atom, tuple, list, map, struct)
//!   duplicate on every assignment,
//! - class instances live on the heap and alias through [`ClassRef`]
//!   handles under reference counting,
//! - functions and pointers alias their scope by construction.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use syntax::ast::FuncDef;

use crate::error::Error;
use crate::heap::{Addr, Heap};
use crate::scope::ScopeRef;

pub use self::key::Key;

mod key;

#[derive(Clone, Debug)]
pub enum Value {
  Null,
  Int(i32),
  Bool(bool),
  Str(String),
  Atom(Arc<str>),
  Tuple(Vec<Value>),
  List(Vec<Value>),
  Map(Map),
  Struct(StructValue),
  Instance(ClassRef),
  Func(FuncValue),
  Native(NativeFn),
  Pointer(Pointer),
}

/// An unordered association with structurally-compared keys. Entries
/// keep insertion order, which makes printing deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map {
  entries: IndexMap<Key, Value>,
}

impl Map {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
    self.entries.insert(key, value)
  }

  pub fn get(&self, key: &Key) -> Option<&Value> {
    self.entries.get(key)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
    self.entries.iter()
  }

  pub fn values(&self) -> impl Iterator<Item = &Value> {
    self.entries.values()
  }
}

/// A named aggregate with value semantics. Also the payload stored
/// behind every class instance.
#[derive(Clone, Debug, PartialEq)]
pub struct StructValue {
  pub type_name: Arc<str>,
  pub fields: IndexMap<String, Value>,
}

/// An aliasing handle to a heap-allocated class instance.
#[derive(Clone, Debug)]
pub struct ClassRef {
  pub addr: Addr,
  pub type_name: Arc<str>,
}

/// A first-class function: a shared definition plus the scope its
/// captures (and for declarations, its definition site) live in.
#[derive(Clone)]
pub struct FuncValue {
  pub def: Arc<FuncDef>,
  pub scope: ScopeRef,
}

/// An aliasing handle to a named binding in a specific scope.
#[derive(Clone)]
pub struct Pointer {
  pub scope: ScopeRef,
  pub name: String,
}

pub(crate) type NativeImpl =
  fn(&mut crate::interp::Interp, Vec<Value>) -> Result<Value, crate::error::Control>;

/// A host-provided callable.
#[derive(Clone, Copy)]
pub struct NativeFn {
  pub name: &'static str,
  pub arity: usize,
  pub(crate) call: NativeImpl,
}

impl Value {
  /// The duplicate stored whenever a value enters a new owner.
  ///
  /// Value kinds deep-copy their contents; atoms, functions, natives
  /// and pointers keep their aliasing contract; a class reference
  /// yields a second handle to the same address (counted when it is
  /// stored somewhere).
  pub fn copy(&self) -> Value {
    self.clone()
  }

  /// Count every class reference reachable from this value.
  pub fn retain(&self, heap: &Heap) -> Result<(), Error> {
    match self {
      Value::Instance(r) => heap.retain(r.addr),
      Value::Tuple(items) | Value::List(items) => {
        for item in items {
          item.retain(heap)?;
        }
        Ok(())
      }
      Value::Map(map) => {
        for value in map.values() {
          value.retain(heap)?;
        }
        Ok(())
      }
      Value::Struct(s) => {
        for value in s.fields.values() {
          value.retain(heap)?;
        }
        Ok(())
      }
      _ => Ok(()),
    }
  }

  /// Undo one [`Value::retain`].
  pub fn release(&self, heap: &Heap) -> Result<(), Error> {
    match self {
      Value::Instance(r) => heap.release(r.addr),
      Value::Tuple(items) | Value::List(items) => {
        for item in items {
          item.release(heap)?;
        }
        Ok(())
      }
      Value::Map(map) => {
        for value in map.values() {
          value.release(heap)?;
        }
        Ok(())
      }
      Value::Struct(s) => {
        for value in s.fields.values() {
          value.release(heap)?;
        }
        Ok(())
      }
      _ => Ok(()),
    }
  }

  /// Only `false` and `0` are falsey.
  pub fn truthy(&self) -> bool {
    !matches!(self, Value::Bool(false) | Value::Int(0))
  }

  /// The type tag locked into a binding at definition time.
  ///
  /// Everything outside the primitive and named-aggregate kinds
  /// shares the `unknown` bucket.
  pub fn type_tag(&self) -> &str {
    match self {
      Value::Int(_) => "int",
      Value::Str(_) => "string",
      Value::Bool(_) => "bool",
      Value::Struct(s) => s.type_name.as_ref(),
      Value::Instance(r) => r.type_name.as_ref(),
      _ => "unknown",
    }
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Null, Value::Null) => true,
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::Atom(a), Value::Atom(b)) => a == b,
      (Value::Tuple(a), Value::Tuple(b)) => a == b,
      (Value::List(a), Value::List(b)) => a == b,
      (Value::Map(a), Value::Map(b)) => a == b,
      (Value::Struct(a), Value::Struct(b)) => a == b,
      // Instances compare by identity, not contents.
      (Value::Instance(a), Value::Instance(b)) => a.addr == b.addr,
      (Value::Func(a), Value::Func(b)) => {
        Arc::ptr_eq(&a.def, &b.def) && Arc::ptr_eq(&a.scope, &b.scope)
      }
      (Value::Native(a), Value::Native(b)) => a.name == b.name,
      (Value::Pointer(a), Value::Pointer(b)) => {
        Arc::ptr_eq(&a.scope, &b.scope) && a.name == b.name
      }
      _ => false,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => write!(f, "null"),
      Value::Int(v) => write!(f, "{v}"),
      Value::Bool(v) => write!(f, "{v}"),
      Value::Str(v) => write_unescaped(f, v),
      Value::Atom(name) => write!(f, "@{name}"),
      Value::Tuple(items) => {
        write!(f, "{{")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{item}")?;
        }
        write!(f, "}}")
      }
      Value::List(items) => {
        write!(f, "[")?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{item}")?;
        }
        write!(f, "]")
      }
      Value::Map(map) => {
        write!(f, "#{{")?;
        for (i, (key, value)) in map.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{key} => {value}")?;
        }
        write!(f, "}}")
      }
      Value::Struct(s) => {
        if s.fields.is_empty() {
          return write!(f, "{} {{}}", s.type_name);
        }
        write!(f, "{} {{ ", s.type_name)?;
        for (i, (name, value)) in s.fields.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{name}: {value}")?;
        }
        write!(f, " }}")
      }
      Value::Instance(r) => write!(f, "<{} instance>", r.type_name),
      Value::Func(func) => match &func.def.name {
        Some(name) => write!(f, "<fn {name}>"),
        None => write!(f, "<lambda>"),
      },
      Value::Native(native) => write!(f, "<native fn {}>", native.name),
      Value::Pointer(p) => write!(f, "<pointer {}>", p.name),
    }
  }
}

/// `\n` and `\t` are the two escape sequences the engine understands,
/// and they are interpreted at print time, not at lex time.
fn write_unescaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      write!(f, "{c}")?;
      continue;
    }
    match chars.next() {
      Some('n') => writeln!(f)?,
      Some('t') => write!(f, "\t")?,
      Some(other) => write!(f, "\\{other}")?,
      None => write!(f, "\\")?,
    }
  }
  Ok(())
}

impl fmt::Debug for FuncValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.def.name {
      Some(name) => write!(f, "<fn {name}>"),
      None => write!(f, "<lambda>"),
    }
  }
}

impl fmt::Debug for NativeFn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<native fn {}>", self.name)
  }
}

impl fmt::Debug for Pointer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<pointer {}>", self.name)
  }
}
