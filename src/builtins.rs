//! Native functions registered into every root scope.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{Control, Error};
use crate::heap::Heap;
use crate::interp::Interp;
use crate::scope::ScopeRef;
use crate::value::{NativeFn, Value};

static NATIVES: &[NativeFn] = &[
  NativeFn {
    name: "time",
    arity: 0,
    call: time,
  },
  NativeFn {
    name: "len",
    arity: 1,
    call: len,
  },
  NativeFn {
    name: "push",
    arity: 2,
    call: push,
  },
  NativeFn {
    name: "get",
    arity: 2,
    call: get,
  },
  NativeFn {
    name: "sleep",
    arity: 1,
    call: sleep,
  },
  NativeFn {
    name: "spawn",
    arity: 1,
    call: spawn,
  },
];

pub(crate) fn register(scope: &ScopeRef, heap: &Heap) {
  for native in NATIVES {
    scope
      .define(heap, native.name, &Value::Native(*native), false)
      .expect("retaining a native is a no-op");
  }
}

/// Current Unix time in seconds.
fn time(_interp: &mut Interp, _args: Vec<Value>) -> Result<Value, Control> {
  let secs = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs() as i32)
    .unwrap_or(0);
  Ok(Value::Int(secs))
}

fn len(_interp: &mut Interp, mut args: Vec<Value>) -> Result<Value, Control> {
  match args.pop() {
    Some(Value::List(items)) => Ok(Value::Int(items.len() as i32)),
    _ => Err(Error::ty("Argument to 'len' must be a list.").into()),
  }
}

/// Appends a copy of the item and hands the grown list back; lists
/// have value semantics, so the caller stores the result.
fn push(_interp: &mut Interp, args: Vec<Value>) -> Result<Value, Control> {
  let mut args = args.into_iter();
  match (args.next(), args.next()) {
    (Some(Value::List(mut items)), Some(item)) => {
      items.push(item.copy());
      Ok(Value::List(items))
    }
    _ => Err(Error::ty("First argument to 'push' must be a list.").into()),
  }
}

fn get(_interp: &mut Interp, args: Vec<Value>) -> Result<Value, Control> {
  let mut args = args.into_iter();
  match (args.next(), args.next()) {
    (Some(Value::List(items)), Some(Value::Int(index))) => {
      if index < 0 || index as usize >= items.len() {
        return Err(Error::index("Index out of bounds.").into());
      }
      Ok(items[index as usize].clone())
    }
    _ => Err(Error::ty("'get' expects a list and an int.").into()),
  }
}

/// Blocks the calling evaluator's thread.
fn sleep(_interp: &mut Interp, mut args: Vec<Value>) -> Result<Value, Control> {
  match args.pop() {
    Some(Value::Int(ms)) if ms >= 0 => {
      std::thread::sleep(Duration::from_millis(ms as u64));
      Ok(Value::Null)
    }
    _ => Err(Error::ty("Argument to 'sleep' must be a non-negative int.").into()),
  }
}

/// Runs a function value on a new detached host thread. The task's
/// evaluator shares the heap and type tables; its scope graph is the
/// closure's own capture chain. Errors end the task, not the process.
fn spawn(interp: &mut Interp, mut args: Vec<Value>) -> Result<Value, Control> {
  let Some(Value::Func(func)) = args.pop() else {
    return Err(Error::ty("Argument to 'spawn' must be a function.").into());
  };
  let shared = interp.shared.clone();
  let out = interp.out.clone();
  std::thread::spawn(move || {
    let scope = func.scope.clone();
    let mut task = Interp::new(shared, out, scope);
    if let Err(Control::Error(e)) = task.call_function(&func, Vec::new()) {
      eprintln!("{e}");
    }
    if let Err(e) = task.drain() {
      eprintln!("{e}");
    }
  });
  Ok(Value::Null)
}
