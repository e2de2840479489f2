//! Statement and expression trees.
//!
//! The trees are fully owned: function bodies are shared behind
//! [`Arc`] because declarations, method tables and closure values all
//! hold the same definition, possibly from multiple threads.

use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
  Let(Box<Let>),
  TypeDecl(Box<TypeDecl>),
  Impl(Box<Impl>),
  Func(Arc<FuncDef>),
  Return(Box<Return>),
  If(Box<If>),
  While(Box<While>),
  Block(Vec<Stmt>),
  Print(Box<Expr>),
  Delete(String),
  Import(Box<Import>),
  Expr(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Let {
  pub name: String,
  pub init: Expr,
  pub mutable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
  Struct,
  Class,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeDecl {
  pub name: String,
  pub kind: TypeKind,
  /// Field names in declaration order. Field type annotations are
  /// part of the surface syntax only.
  pub fields: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Impl {
  pub type_name: String,
  pub methods: Vec<Arc<FuncDef>>,
}

#[derive(Debug, PartialEq)]
pub struct FuncDef {
  /// `None` for lambdas.
  pub name: Option<String>,
  pub params: Vec<String>,
  pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Return {
  pub value: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct If {
  pub cond: Expr,
  pub then: Stmt,
  pub otherwise: Option<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct While {
  pub cond: Expr,
  pub body: Stmt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Import {
  pub path: String,
  pub alias: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
  Int(i32),
  Str(String),
  Atom(String),
  Variable(String),
  This,
  Assign(Box<Assign>),
  Binary(Box<Binary>),
  Unary(Box<Unary>),
  Grouping(Box<Expr>),
  Get(Box<Get>),
  Set(Box<Set>),
  Call(Box<Call>),
  New(Box<New>),
  List(Vec<Expr>),
  Tuple(Vec<Expr>),
  Map(Vec<(Expr, Expr)>),
  Lambda(Box<Lambda>),
  AddressOf(String),
  Deref(Box<Expr>),
  PointerSet(Box<PointerSet>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Assign {
  pub name: String,
  pub value: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Eq,
  Neq,
  Less,
  LessEq,
  More,
  MoreEq,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Binary {
  pub op: BinaryOp,
  pub lhs: Expr,
  pub rhs: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
  Not,
  Neg,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Unary {
  pub op: UnaryOp,
  pub rhs: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Get {
  pub obj: Expr,
  pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Set {
  pub obj: Expr,
  pub name: String,
  pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
  pub callee: Expr,
  pub args: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct New {
  pub type_name: String,
  pub args: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Capture {
  /// `x` — a copied snapshot of the binding's value.
  Value(String),
  /// `*x` — a pointer into the defining scope.
  Address(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lambda {
  pub captures: Vec<Capture>,
  pub def: Arc<FuncDef>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerSet {
  pub target: Expr,
  pub value: Expr,
}

pub fn let_stmt(name: String, init: Expr, mutable: bool) -> Stmt {
  Stmt::Let(Box::new(Let {
    name,
    init,
    mutable,
  }))
}

pub fn type_decl_stmt(name: String, kind: TypeKind, fields: Vec<String>) -> Stmt {
  Stmt::TypeDecl(Box::new(TypeDecl { name, kind, fields }))
}

pub fn impl_stmt(type_name: String, methods: Vec<Arc<FuncDef>>) -> Stmt {
  Stmt::Impl(Box::new(Impl { type_name, methods }))
}

pub fn return_stmt(value: Option<Expr>) -> Stmt {
  Stmt::Return(Box::new(Return { value }))
}

pub fn if_stmt(cond: Expr, then: Stmt, otherwise: Option<Stmt>) -> Stmt {
  Stmt::If(Box::new(If {
    cond,
    then,
    otherwise,
  }))
}

pub fn while_stmt(cond: Expr, body: Stmt) -> Stmt {
  Stmt::While(Box::new(While { cond, body }))
}

pub fn print_stmt(value: Expr) -> Stmt {
  Stmt::Print(Box::new(value))
}

pub fn import_stmt(path: String, alias: String) -> Stmt {
  Stmt::Import(Box::new(Import { path, alias }))
}

pub fn expr_stmt(value: Expr) -> Stmt {
  Stmt::Expr(Box::new(value))
}

pub fn expr_binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
  Expr::Binary(Box::new(Binary { op, lhs, rhs }))
}

pub fn expr_unary(op: UnaryOp, rhs: Expr) -> Expr {
  Expr::Unary(Box::new(Unary { op, rhs }))
}

pub fn expr_get(obj: Expr, name: String) -> Expr {
  Expr::Get(Box::new(Get { obj, name }))
}

pub fn expr_call(callee: Expr, args: Vec<Expr>) -> Expr {
  Expr::Call(Box::new(Call { callee, args }))
}

pub fn expr_new(type_name: String, args: Vec<Expr>) -> Expr {
  Expr::New(Box::new(New { type_name, args }))
}

pub fn expr_lambda(captures: Vec<Capture>, def: Arc<FuncDef>) -> Expr {
  Expr::Lambda(Box::new(Lambda { captures, def }))
}

pub fn expr_deref(inner: Expr) -> Expr {
  Expr::Deref(Box::new(inner))
}

/// Rewrite `target = value` into the matching assignment node.
///
/// Returns `None` when `target` is not a valid assignment target.
pub fn assign(target: Expr, value: Expr) -> Option<Expr> {
  match target {
    Expr::Variable(name) => Some(Expr::Assign(Box::new(Assign { name, value }))),
    Expr::Get(get) => {
      let Get { obj, name } = *get;
      Some(Expr::Set(Box::new(Set { obj, name, value })))
    }
    Expr::Deref(target) => Some(Expr::PointerSet(Box::new(PointerSet {
      target: *target,
      value,
    }))),
    _ => None,
  }
}
