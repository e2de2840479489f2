use beef::lean::Cow;

pub mod ast;
pub mod lexer;
pub mod parser;

pub use parser::parse;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug)]
pub struct Error {
  pub message: Cow<'static, str>,
  pub line: u32,
}

impl Error {
  pub fn new(message: impl Into<Cow<'static, str>>, line: u32) -> Self {
    let message = message.into();
    Error { message, line }
  }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let Error { message, line } = self;
    write!(f, "[line {line}] error: {message}")
  }
}
