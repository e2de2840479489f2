//! The shared object store for class instances.
//!
//! Every class instance lives here, keyed by an opaque random
//! address, with an atomic reference count. All evaluators in a
//! process share one heap; retain and release are safe under
//! concurrent use and exactly one thread observes the 0-crossing
//! that frees an object.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::Error;
use crate::value::StructValue;

pub type Addr = u64;

pub struct Heap {
  objects: DashMap<Addr, HeapObject>,
  retains: AtomicU64,
  releases: AtomicU64,
}

struct HeapObject {
  payload: StructValue,
  rc: AtomicI64,
}

/// Process-lifetime counters, inspectable by tests: a program that
/// does not deliberately leak ends with `retains == releases` and
/// `live == 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapStats {
  pub retains: u64,
  pub releases: u64,
  pub live: usize,
}

impl Heap {
  pub fn new() -> Self {
    Heap {
      objects: DashMap::new(),
      retains: AtomicU64::new(0),
      releases: AtomicU64::new(0),
    }
  }

  /// Insert a payload under a fresh address with a count of zero.
  ///
  /// Zero is deliberate: the caller wraps the address in a class
  /// reference, and the first retain happens when that reference is
  /// stored into a binding. An unstored instance is a (tracked) leak.
  pub fn allocate(&self, payload: StructValue) -> Addr {
    let mut payload = Some(payload);
    loop {
      let addr: Addr = rand::random();
      match self.objects.entry(addr) {
        Entry::Occupied(_) => continue,
        Entry::Vacant(slot) => {
          slot.insert(HeapObject {
            payload: payload.take().expect("address drawn twice"),
            rc: AtomicI64::new(0),
          });
          return addr;
        }
      }
    }
  }

  /// Clone the payload out. Fails when the address has been freed.
  pub fn dereference(&self, addr: Addr) -> Result<StructValue, Error> {
    match self.objects.get(&addr) {
      Some(object) => Ok(object.payload.clone()),
      None => Err(segfault()),
    }
  }

  /// Clone a single field out of the payload.
  pub fn read_field(&self, addr: Addr, name: &str) -> Result<crate::value::Value, Error> {
    let object = self.objects.get(&addr).ok_or_else(segfault)?;
    match object.payload.fields.get(name) {
      Some(value) => Ok(value.clone()),
      None => Err(Error::name(format!("Undefined property '{name}'."))),
    }
  }

  /// Run `f` over the mutable payload. Used for field writes and for
  /// writes into struct values nested inside an instance field. The
  /// caller retains the new value before calling and releases the old
  /// one after; `f` must not touch the heap, because the entry guard
  /// is held while it runs.
  pub(crate) fn update<R>(
    &self,
    addr: Addr,
    f: impl FnOnce(&mut StructValue) -> Result<R, Error>,
  ) -> Result<R, Error> {
    let mut object = self.objects.get_mut(&addr).ok_or_else(segfault)?;
    f(&mut object.payload)
  }

  pub fn retain(&self, addr: Addr) -> Result<(), Error> {
    let object = self.objects.get(&addr).ok_or_else(segfault)?;
    object.rc.fetch_add(1, Ordering::SeqCst);
    self.retains.fetch_add(1, Ordering::Relaxed);
    Ok(())
  }

  /// Drop one count; the thread that takes the count to zero removes
  /// the object and releases its fields.
  pub fn release(&self, addr: Addr) -> Result<(), Error> {
    let previous = {
      let object = self.objects.get(&addr).ok_or_else(segfault)?;
      object.rc.fetch_sub(1, Ordering::SeqCst)
    };
    self.releases.fetch_add(1, Ordering::Relaxed);
    if previous < 1 {
      return Err(Error::memory("Ref count underflow."));
    }
    if previous == 1 {
      self.free(addr)?;
    }
    Ok(())
  }

  fn free(&self, addr: Addr) -> Result<(), Error> {
    // Remove first so the recursive release below never runs inside
    // a map guard.
    let Some((_, object)) = self.objects.remove(&addr) else {
      return Err(segfault());
    };
    for value in object.payload.fields.values() {
      value.release(self)?;
    }
    Ok(())
  }

  /// Number of live objects, counted leaks included.
  pub fn live(&self) -> usize {
    self.objects.len()
  }

  pub fn stats(&self) -> HeapStats {
    HeapStats {
      retains: self.retains.load(Ordering::Relaxed),
      releases: self.releases.load(Ordering::Relaxed),
      live: self.objects.len(),
    }
  }
}

impl Default for Heap {
  fn default() -> Self {
    Self::new()
  }
}

fn segfault() -> Error {
  Error::memory("Segmentation Fault.")
}

#[cfg(test)]
mod tests;
