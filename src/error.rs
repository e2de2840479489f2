use beef::lean::Cow;

use crate::value::Value;

/// A runtime error: one diagnostic line, classified by kind.
#[derive(Clone, Debug)]
pub struct Error {
  kind: ErrorKind,
  message: Cow<'static, str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
  /// Undefined variable, property, type or method.
  Name,
  /// Wrong operand types, argument counts, type-tag mismatches,
  /// calling a non-callable.
  Type,
  /// Dangling heap address or refcount underflow. Both are symptoms
  /// of an engine bug, but they surface like any other runtime error.
  Memory,
  /// I/O failure during module load.
  Import,
  /// Out-of-bounds list access.
  Index,
  /// Assignment to an immutable binding.
  Immutable,
}

impl Error {
  pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
    Error {
      kind,
      message: message.into(),
    }
  }

  pub fn name(message: impl Into<Cow<'static, str>>) -> Self {
    Error::new(ErrorKind::Name, message)
  }

  pub fn ty(message: impl Into<Cow<'static, str>>) -> Self {
    Error::new(ErrorKind::Type, message)
  }

  pub fn memory(message: impl Into<Cow<'static, str>>) -> Self {
    Error::new(ErrorKind::Memory, message)
  }

  pub fn import(message: impl Into<Cow<'static, str>>) -> Self {
    Error::new(ErrorKind::Import, message)
  }

  pub fn index(message: impl Into<Cow<'static, str>>) -> Self {
    Error::new(ErrorKind::Index, message)
  }

  pub fn immutable(message: impl Into<Cow<'static, str>>) -> Self {
    Error::new(ErrorKind::Immutable, message)
  }

  pub fn kind(&self) -> ErrorKind {
    self.kind
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.message)
  }
}

/// Non-local control flow signal.
///
/// `return` is not an error: it unwinds the tree walk until the
/// nearest call frame consumes it. Everything else that unwinds is an
/// [`Error`].
pub(crate) enum Control {
  Return(Value),
  Error(Error),
}

impl From<Error> for Control {
  fn from(value: Error) -> Self {
    Self::Error(value)
  }
}
