use std::sync::Arc;

use super::*;
use crate::error::ErrorKind;
use crate::value::StructValue;

fn fixture() -> (Heap, ScopeRef) {
  (Heap::new(), Scope::root())
}

#[test]
fn define_and_get() {
  let (heap, scope) = fixture();
  scope.define(&heap, "x", &Value::Int(10), false).unwrap();
  assert_eq!(scope.get("x").unwrap(), Value::Int(10));
  assert_eq!(
    scope.get("y").unwrap_err().to_string(),
    "Undefined variable 'y'."
  );
}

#[test]
fn get_walks_outward() {
  let (heap, root) = fixture();
  root.define(&heap, "x", &Value::Int(1), false).unwrap();
  let inner = Scope::child(&root);
  assert_eq!(inner.get("x").unwrap(), Value::Int(1));

  // Shadowing at the inner level leaves the outer binding alone.
  inner.define(&heap, "x", &Value::Int(2), false).unwrap();
  assert_eq!(inner.get("x").unwrap(), Value::Int(2));
  assert_eq!(root.get("x").unwrap(), Value::Int(1));
}

#[test]
fn assign_respects_mutability() {
  let (heap, scope) = fixture();
  scope.define(&heap, "x", &Value::Int(1), false).unwrap();
  let err = scope.assign(&heap, "x", &Value::Int(2)).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Immutable);
  // The binding is unchanged.
  assert_eq!(scope.get("x").unwrap(), Value::Int(1));
}

#[test]
fn assign_respects_type_lock() {
  let (heap, scope) = fixture();
  scope.define(&heap, "x", &Value::Int(1), true).unwrap();
  let err = scope
    .assign(&heap, "x", &Value::Str(String::from("s")))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Type);
  assert_eq!(scope.get("x").unwrap(), Value::Int(1));

  scope.assign(&heap, "x", &Value::Int(5)).unwrap();
  assert_eq!(scope.get("x").unwrap(), Value::Int(5));
}

#[test]
fn unknown_tagged_values_share_a_bucket() {
  let (heap, scope) = fixture();
  scope
    .define(&heap, "x", &Value::Tuple(vec![Value::Int(1)]), true)
    .unwrap();
  // Tuples and lists both infer as `unknown`.
  scope
    .assign(&heap, "x", &Value::List(vec![Value::Int(2)]))
    .unwrap();
  assert_eq!(scope.get("x").unwrap(), Value::List(vec![Value::Int(2)]));
}

#[test]
fn assign_walks_to_the_owning_scope() {
  let (heap, root) = fixture();
  root.define(&heap, "x", &Value::Int(1), true).unwrap();
  let inner = Scope::child(&root);
  inner.assign(&heap, "x", &Value::Int(7)).unwrap();
  assert_eq!(root.get("x").unwrap(), Value::Int(7));
}

#[test]
fn resolve_returns_the_owner() {
  let (heap, root) = fixture();
  root.define(&heap, "x", &Value::Int(1), false).unwrap();
  let inner = Scope::child(&root);
  let owner = inner.resolve("x").unwrap();
  assert!(Arc::ptr_eq(&owner, &root));
  assert!(inner.resolve("nope").is_none());
}

#[test]
fn redefinition_at_the_same_level_is_allowed() {
  let (heap, scope) = fixture();
  scope.define(&heap, "x", &Value::Int(1), false).unwrap();
  scope
    .define(&heap, "x", &Value::Str(String::from("s")), true)
    .unwrap();
  // A fresh binding, fresh tag and fresh mutability.
  scope
    .assign(&heap, "x", &Value::Str(String::from("t")))
    .unwrap();
}

#[test]
fn exports_snapshot_direct_bindings_only() {
  let (heap, root) = fixture();
  root.define(&heap, "hidden", &Value::Int(1), false).unwrap();
  let module = Scope::child(&root);
  module.define(&heap, "a", &Value::Int(2), false).unwrap();
  module.define(&heap, "b", &Value::Int(3), false).unwrap();

  let exports = module.exports();
  let names: Vec<&str> = exports.iter().map(|(n, _)| n.as_str()).collect();
  assert_eq!(names, ["a", "b"]);
}

#[test]
fn destroy_releases_locals_and_breaks_pointers() {
  let (heap, scope) = fixture();
  let addr = heap.allocate(StructValue {
    type_name: Arc::from("Box"),
    fields: indexmap::IndexMap::new(),
  });
  let instance = Value::Instance(crate::value::ClassRef {
    addr,
    type_name: Arc::from("Box"),
  });
  scope.define(&heap, "b", &instance, false).unwrap();
  assert_eq!(heap.live(), 1);

  scope.destroy(&heap).unwrap();
  assert_eq!(heap.live(), 0);
  assert_eq!(
    scope.get_local("b").unwrap_err().to_string(),
    "Undefined variable 'b'."
  );
}
