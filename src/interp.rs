//! The tree-walking evaluator.
//!
//! One `Interp` per thread of execution. All of them share the heap,
//! the type-definition table, the method table and the output sink;
//! each carries its own current scope and a statement-scoped pool of
//! temporaries that keeps call results alive until the statement that
//! produced them completes.

use std::io::Write;
use std::mem;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::Mutex;
use syntax::ast::{self, Expr, Stmt, TypeKind};

use crate::error::{Control, Error};
use crate::heap::Heap;
use crate::module::SourceProvider;
use crate::scope::{Scope, ScopeRef};
use crate::value::{ClassRef, FuncValue, Key, Map, NativeFn, Pointer, StructValue, Value};

mod binop;
mod call;
mod place;

pub(crate) type Output = Arc<Mutex<Box<dyn Write + Send>>>;

/// State shared by every evaluator in the engine, across threads.
/// The type and method tables only ever grow during a run.
pub(crate) struct Shared {
  pub(crate) heap: Heap,
  pub(crate) types: DashMap<String, TypeDef>,
  pub(crate) methods: DashMap<String, IndexMap<String, Arc<ast::FuncDef>>>,
  pub(crate) provider: Box<dyn SourceProvider>,
}

#[derive(Clone)]
pub(crate) struct TypeDef {
  pub(crate) kind: TypeKind,
  pub(crate) fields: Vec<String>,
}

pub(crate) struct Interp {
  pub(crate) shared: Arc<Shared>,
  pub(crate) out: Output,
  scope: ScopeRef,
  /// Release pool for values that must outlive their producing
  /// subexpression (call results, in-flight returns). Drained at
  /// statement boundaries, down to `floor`.
  temps: Vec<Value>,
  /// Pool index below which entries belong to an enclosing call frame
  /// whose expression is still in progress.
  floor: usize,
}

impl Interp {
  pub(crate) fn new(shared: Arc<Shared>, out: Output, scope: ScopeRef) -> Interp {
    Interp {
      shared,
      out,
      scope,
      temps: Vec::new(),
      floor: 0,
    }
  }

  /// Execute a top-level statement sequence. The first error aborts
  /// the rest of the sequence.
  pub(crate) fn run(&mut self, stmts: &[Stmt]) -> Result<(), Error> {
    for stmt in stmts {
      match self.execute(stmt) {
        Ok(()) => self.drain()?,
        Err(Control::Error(e)) => {
          let _ = self.drain();
          return Err(e);
        }
        Err(Control::Return(_)) => {
          let _ = self.drain();
          return Err(Error::ty("Cannot return from top-level code."));
        }
      }
    }
    Ok(())
  }

  /// Release pooled temporaries of the current frame.
  pub(crate) fn drain(&mut self) -> Result<(), Error> {
    while self.temps.len() > self.floor {
      if let Some(value) = self.temps.pop() {
        value.release(&self.shared.heap)?;
      }
    }
    Ok(())
  }

  fn execute(&mut self, stmt: &Stmt) -> Result<(), Control> {
    match stmt {
      Stmt::Let(l) => {
        let value = self.eval(&l.init)?;
        self
          .scope
          .define(&self.shared.heap, l.name.clone(), &value, l.mutable)?;
        Ok(())
      }
      Stmt::TypeDecl(decl) => {
        self.shared.types.insert(
          decl.name.clone(),
          TypeDef {
            kind: decl.kind,
            fields: decl.fields.clone(),
          },
        );
        Ok(())
      }
      Stmt::Impl(im) => {
        let mut table = self.shared.methods.entry(im.type_name.clone()).or_default();
        for method in &im.methods {
          if let Some(name) = &method.name {
            table.insert(name.clone(), method.clone());
          }
        }
        Ok(())
      }
      Stmt::Func(def) => {
        let func = Value::Func(FuncValue {
          def: def.clone(),
          scope: self.scope.clone(),
        });
        let name = def.name.clone().unwrap_or_default();
        self.scope.define(&self.shared.heap, name, &func, false)?;
        Ok(())
      }
      Stmt::Return(r) => {
        let value = match &r.value {
          Some(expr) => self.eval(expr)?,
          None => Value::Null,
        };
        // Park a count in the pool so the value survives the frame
        // teardown it is about to unwind through.
        value.retain(&self.shared.heap)?;
        self.temps.push(value.clone());
        Err(Control::Return(value))
      }
      Stmt::If(i) => {
        if self.eval(&i.cond)?.truthy() {
          self.execute(&i.then)
        } else if let Some(otherwise) = &i.otherwise {
          self.execute(otherwise)
        } else {
          Ok(())
        }
      }
      Stmt::While(w) => {
        while self.eval(&w.cond)?.truthy() {
          self.execute(&w.body)?;
          self.drain()?;
        }
        Ok(())
      }
      Stmt::Block(stmts) => self.execute_block(stmts),
      Stmt::Print(expr) => {
        let value = self.eval(expr)?;
        let mut out = self.out.lock();
        let _ = writeln!(out, "{value}");
        Ok(())
      }
      Stmt::Delete(_) => {
        eprintln!("Manual delete command ignored in ARC mode.");
        Ok(())
      }
      Stmt::Import(im) => self.import(im),
      Stmt::Expr(expr) => {
        self.eval(expr)?;
        Ok(())
      }
    }
  }

  /// A block runs in a fresh child scope which is torn down on exit,
  /// releasing every local.
  fn execute_block(&mut self, stmts: &[Stmt]) -> Result<(), Control> {
    let scope = Scope::child(&self.scope);
    let prev = mem::replace(&mut self.scope, scope);

    let mut outcome = Ok(());
    for stmt in stmts {
      match self.execute(stmt) {
        Ok(()) => {
          if let Err(e) = self.drain() {
            outcome = Err(e.into());
            break;
          }
        }
        Err(c) => {
          outcome = Err(c);
          break;
        }
      }
    }

    let scope = mem::replace(&mut self.scope, prev);
    if let Err(e) = scope.destroy(&self.shared.heap) {
      if outcome.is_ok() {
        outcome = Err(e.into());
      }
    }
    outcome
  }

  pub(crate) fn eval(&mut self, expr: &Expr) -> Result<Value, Control> {
    match expr {
      Expr::Int(v) => Ok(Value::Int(*v)),
      Expr::Str(v) => Ok(Value::Str(v.clone())),
      Expr::Atom(name) => Ok(Value::Atom(Arc::from(name.as_str()))),
      Expr::Variable(name) => Ok(self.scope.get(name)?),
      Expr::This => Ok(self.scope.get("this")?),
      Expr::Grouping(inner) => self.eval(inner),
      Expr::Assign(a) => {
        let value = self.eval(&a.value)?;
        self.scope.assign(&self.shared.heap, &a.name, &value)?;
        Ok(value)
      }
      Expr::Binary(b) => {
        let lhs = self.eval(&b.lhs)?;
        let rhs = self.eval(&b.rhs)?;
        self.binary(b.op, lhs, rhs)
      }
      Expr::Unary(u) => {
        let rhs = self.eval(&u.rhs)?;
        self.unary(u.op, rhs)
      }
      Expr::Get(g) => self.get_field(g),
      Expr::Set(s) => self.set_field(s),
      Expr::Call(c) => self.eval_call(c),
      Expr::New(n) => self.eval_new(n),
      Expr::List(elems) => {
        let mut items = Vec::with_capacity(elems.len());
        for elem in elems {
          items.push(self.eval(elem)?);
        }
        Ok(Value::List(items))
      }
      Expr::Tuple(elems) => {
        let mut items = Vec::with_capacity(elems.len());
        for elem in elems {
          items.push(self.eval(elem)?);
        }
        Ok(Value::Tuple(items))
      }
      Expr::Map(entries) => {
        let mut map = Map::new();
        for (key, value) in entries {
          let key = Key::from_value(&self.eval(key)?)?;
          let value = self.eval(value)?;
          map.insert(key, value);
        }
        Ok(Value::Map(map))
      }
      Expr::Lambda(l) => self.eval_lambda(l),
      Expr::AddressOf(name) => {
        let scope = self
          .scope
          .resolve(name)
          .ok_or_else(|| Error::name(format!("Undefined variable '{name}'.")))?;
        Ok(Value::Pointer(Pointer {
          scope,
          name: name.clone(),
        }))
      }
      Expr::Deref(inner) => {
        let value = self.eval(inner)?;
        match value {
          Value::Pointer(p) => Ok(p.scope.get_local(&p.name)?),
          _ => Err(Error::ty("Can only dereference pointers.").into()),
        }
      }
      Expr::PointerSet(ps) => {
        let target = self.eval(&ps.target)?;
        let Value::Pointer(p) = target else {
          return Err(Error::ty("Can only dereference pointers.").into());
        };
        let value = self.eval(&ps.value)?;
        // Writes through a pointer respect the binding's mutability
        // and type tag exactly like a direct assignment.
        p.scope.assign_local(&self.shared.heap, &p.name, &value)?;
        Ok(value)
      }
    }
  }

  fn get_field(&mut self, g: &ast::Get) -> Result<Value, Control> {
    let obj = self.eval(&g.obj)?;
    match obj {
      Value::Struct(s) => match s.fields.get(&g.name) {
        Some(value) => Ok(value.clone()),
        None => Err(Error::name(format!("Undefined property '{}'.", g.name)).into()),
      },
      Value::Instance(r) => Ok(self.shared.heap.read_field(r.addr, &g.name)?),
      _ => Err(Error::ty("Only structs and class instances have properties.").into()),
    }
  }

  fn eval_new(&mut self, n: &ast::New) -> Result<Value, Control> {
    let ty = match self.shared.types.get(&n.type_name) {
      Some(ty) => ty.value().clone(),
      None => return Err(Error::name(format!("Undefined type '{}'.", n.type_name)).into()),
    };
    if n.args.len() != ty.fields.len() {
      return Err(
        Error::ty(format!(
          "Type '{}' expects {} fields.",
          n.type_name,
          ty.fields.len()
        ))
        .into(),
      );
    }

    let mut fields = IndexMap::with_capacity(ty.fields.len());
    for (name, arg) in ty.fields.iter().zip(&n.args) {
      fields.insert(name.clone(), self.eval(arg)?);
    }
    let payload = StructValue {
      type_name: Arc::from(n.type_name.as_str()),
      fields,
    };

    match ty.kind {
      TypeKind::Struct => Ok(Value::Struct(payload)),
      TypeKind::Class => {
        // Payload fields carry a count each: the recursive release on
        // free expects it.
        for value in payload.fields.values() {
          value.retain(&self.shared.heap)?;
        }
        let addr = self.shared.heap.allocate(payload);
        Ok(Value::Instance(ClassRef {
          addr,
          type_name: Arc::from(n.type_name.as_str()),
        }))
      }
    }
  }

  fn eval_lambda(&mut self, l: &ast::Lambda) -> Result<Value, Control> {
    let captures = Scope::child(&self.scope);
    for capture in &l.captures {
      match capture {
        ast::Capture::Value(name) => {
          let value = self.scope.get(name)?;
          captures.define(&self.shared.heap, name.clone(), &value, false)?;
        }
        ast::Capture::Address(name) => {
          let scope = self
            .scope
            .resolve(name)
            .ok_or_else(|| Error::name(format!("Undefined variable '{name}'.")))?;
          let pointer = Value::Pointer(Pointer {
            scope,
            name: name.clone(),
          });
          captures.define(&self.shared.heap, name.clone(), &pointer, false)?;
        }
      }
    }
    Ok(Value::Func(FuncValue {
      def: l.def.clone(),
      scope: captures,
    }))
  }

  fn import(&mut self, im: &ast::Import) -> Result<(), Control> {
    let source = self
      .shared
      .provider
      .read_source(&im.path)
      .map_err(|e| Error::import(format!("Could not import module '{}': {e}", im.path)))?;
    let stmts = syntax::parse(&source).map_err(|errors| {
      let reason = errors
        .first()
        .map(|e| e.to_string())
        .unwrap_or_else(|| String::from("syntax error"));
      Error::import(format!("Could not import module '{}': {reason}", im.path))
    })?;

    let module_root = Scope::root();
    crate::builtins::register(&module_root, &self.shared.heap);
    let module_scope = Scope::child(&module_root);

    let prev = mem::replace(&mut self.scope, module_scope.clone());
    let floor = mem::replace(&mut self.floor, self.temps.len());
    let mut outcome = Ok(());
    for stmt in &stmts {
      match self.execute(stmt) {
        Ok(()) => {
          if let Err(e) = self.drain() {
            outcome = Err(Control::Error(e));
            break;
          }
        }
        Err(Control::Return(_)) => {
          outcome = Err(Error::ty("Cannot return from top-level code.").into());
          break;
        }
        Err(c) => {
          outcome = Err(c);
          break;
        }
      }
    }
    if let Err(e) = self.drain() {
      if outcome.is_ok() {
        outcome = Err(e.into());
      }
    }
    self.floor = floor;
    self.scope = prev;
    outcome?;

    // The module frame stays alive: exported closures resolve their
    // module-level helpers through it.
    let mut fields = IndexMap::new();
    for (name, value) in module_scope.exports() {
      fields.insert(name, value);
    }
    let module = Value::Struct(StructValue {
      type_name: Arc::from("Module"),
      fields,
    });
    self
      .scope
      .define(&self.shared.heap, im.alias.clone(), &module, false)?;
    Ok(())
  }
}
