use std::sync::Arc;

use indexmap::IndexMap;

use super::*;
use crate::error::ErrorKind;
use crate::value::{ClassRef, Value};

fn payload(name: &str) -> StructValue {
  StructValue {
    type_name: Arc::from(name),
    fields: IndexMap::new(),
  }
}

#[test]
fn allocate_starts_at_zero_and_first_retain_counts() {
  let heap = Heap::new();
  let addr = heap.allocate(payload("Box"));
  assert_eq!(heap.live(), 1);

  heap.retain(addr).unwrap();
  heap.release(addr).unwrap();
  assert_eq!(heap.live(), 0);
  assert_eq!(
    heap.dereference(addr).unwrap_err().to_string(),
    "Segmentation Fault."
  );
}

#[test]
fn addresses_are_unique() {
  let heap = Heap::new();
  let a = heap.allocate(payload("A"));
  let b = heap.allocate(payload("B"));
  assert_ne!(a, b);
  assert_eq!(heap.dereference(a).unwrap().type_name.as_ref(), "A");
  assert_eq!(heap.dereference(b).unwrap().type_name.as_ref(), "B");
}

#[test]
fn release_below_zero_is_an_underflow() {
  let heap = Heap::new();
  let addr = heap.allocate(payload("Box"));
  let err = heap.release(addr).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Memory);
  assert_eq!(err.to_string(), "Ref count underflow.");
}

#[test]
fn free_releases_fields_recursively() {
  let heap = Heap::new();
  let inner_addr = heap.allocate(payload("Inner"));
  heap.retain(inner_addr).unwrap();

  let mut fields = IndexMap::new();
  fields.insert(
    String::from("inner"),
    Value::Instance(ClassRef {
      addr: inner_addr,
      type_name: Arc::from("Inner"),
    }),
  );
  let outer_addr = heap.allocate(StructValue {
    type_name: Arc::from("Outer"),
    fields,
  });
  heap.retain(outer_addr).unwrap();
  assert_eq!(heap.live(), 2);

  // Freeing the outer object drops the only other count on the inner
  // one, so both go.
  heap.release(outer_addr).unwrap();
  assert_eq!(heap.live(), 0);
}

#[test]
fn stats_balance() {
  let heap = Heap::new();
  let addr = heap.allocate(payload("Box"));
  heap.retain(addr).unwrap();
  heap.retain(addr).unwrap();
  heap.release(addr).unwrap();
  heap.release(addr).unwrap();

  let stats = heap.stats();
  assert_eq!(stats.retains, 2);
  assert_eq!(stats.releases, 2);
  assert_eq!(stats.live, 0);
}

#[test]
fn read_and_update_fields() {
  let heap = Heap::new();
  let mut fields = IndexMap::new();
  fields.insert(String::from("v"), Value::Int(5));
  let addr = heap.allocate(StructValue {
    type_name: Arc::from("Box"),
    fields,
  });

  assert_eq!(heap.read_field(addr, "v").unwrap(), Value::Int(5));
  assert_eq!(
    heap.read_field(addr, "w").unwrap_err().to_string(),
    "Undefined property 'w'."
  );

  let old = heap
    .update(addr, |payload| {
      Ok(std::mem::replace(
        payload.fields.get_mut("v").expect("field exists"),
        Value::Int(9),
      ))
    })
    .unwrap();
  assert_eq!(old, Value::Int(5));
  assert_eq!(heap.read_field(addr, "v").unwrap(), Value::Int(9));
}

#[test]
fn concurrent_retain_release_frees_exactly_once() {
  let heap = Arc::new(Heap::new());
  let addr = heap.allocate(payload("Box"));
  heap.retain(addr).unwrap();

  let mut handles = Vec::new();
  for _ in 0..8 {
    let heap = heap.clone();
    handles.push(std::thread::spawn(move || {
      for _ in 0..1000 {
        heap.retain(addr).unwrap();
        heap.release(addr).unwrap();
      }
    }));
  }
  for handle in handles {
    handle.join().unwrap();
  }

  assert_eq!(heap.live(), 1);
  heap.release(addr).unwrap();
  assert_eq!(heap.live(), 0);

  let stats = heap.stats();
  assert_eq!(stats.retains, stats.releases);
}
