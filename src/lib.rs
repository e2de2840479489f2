//! Tako: an indentation-based scripting language with deterministic
//! reference counting.
//!
//! The pipeline is conventional: source bytes run through the lexer
//! and parser in the `tako_syntax` crate, and the resulting statement
//! trees are executed by a tree-walking evaluator against a root
//! scope, a shared reference-counted heap and shared type/method
//! tables. `spawn` launches further evaluators on host threads over
//! the same heap and tables.
//!
//! ```
//! let buffer = tako::TestSink::new();
//! let mut engine = tako::Engine::builder().output(buffer.clone()).build();
//! engine.eval("print 1 + 2").unwrap();
//! assert_eq!(buffer.take(), "3\n");
//! ```

use std::io::Write;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

mod builtins;
mod error;
mod heap;
mod interp;
mod module;
mod scope;
mod value;

pub use error::{Error, ErrorKind};
pub use heap::{Addr, Heap, HeapStats};
pub use module::{FsProvider, SourceProvider};
pub use scope::{Scope, ScopeRef};
pub use value::{ClassRef, FuncValue, Key, Map, NativeFn, Pointer, StructValue, Value};

use interp::{Interp, Output, Shared};

pub type Result<T, E = EvalError> = std::result::Result<T, E>;

/// Why an [`Engine::eval`] call did not finish.
#[derive(Debug)]
pub enum EvalError {
  /// Lexer/parser diagnostics; the program never ran.
  Syntax(Vec<syntax::Error>),
  /// A runtime error aborted the statement sequence.
  Runtime(Error),
}

impl std::error::Error for EvalError {}

impl std::fmt::Display for EvalError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      EvalError::Syntax(errors) => {
        for (i, e) in errors.iter().enumerate() {
          if i > 0 {
            writeln!(f)?;
          }
          write!(f, "{e}")?;
        }
        Ok(())
      }
      EvalError::Runtime(e) => write!(f, "{e}"),
    }
  }
}

/// The engine: shared runtime state plus a persistent root scope.
///
/// Repeated [`Engine::eval`] calls see earlier top-level bindings,
/// types and methods.
pub struct Engine {
  shared: Arc<Shared>,
  root: ScopeRef,
  out: Output,
}

impl Engine {
  pub fn new() -> Engine {
    Engine::builder().build()
  }

  pub fn builder() -> EngineBuilder {
    EngineBuilder::default()
  }

  pub fn eval(&mut self, src: &str) -> Result<(), EvalError> {
    let stmts = syntax::parse(src).map_err(EvalError::Syntax)?;
    let mut interp = Interp::new(self.shared.clone(), self.out.clone(), self.root.clone());
    interp.run(&stmts).map_err(EvalError::Runtime)
  }

  /// Retain/release totals and the live object count, for leak
  /// accounting.
  pub fn heap_stats(&self) -> HeapStats {
    self.shared.heap.stats()
  }
}

impl Default for Engine {
  fn default() -> Self {
    Self::new()
  }
}

#[derive(Default)]
pub struct EngineBuilder {
  output: Option<Box<dyn Write + Send>>,
  provider: Option<Box<dyn SourceProvider>>,
}

impl EngineBuilder {
  /// Where `print` writes. Defaults to stdout. Spawned tasks share
  /// the sink with the evaluator that spawned them.
  pub fn output(mut self, output: impl Write + Send + 'static) -> Self {
    self.output = Some(Box::new(output));
    self
  }

  /// Where `import` reads module source from. Defaults to the
  /// filesystem, relative to the working directory.
  pub fn provider(mut self, provider: impl SourceProvider + 'static) -> Self {
    self.provider = Some(Box::new(provider));
    self
  }

  pub fn build(self) -> Engine {
    let shared = Arc::new(Shared {
      heap: Heap::new(),
      types: DashMap::new(),
      methods: DashMap::new(),
      provider: self.provider.unwrap_or_else(|| Box::new(FsProvider)),
    });
    let out: Output = Arc::new(Mutex::new(
      self.output.unwrap_or_else(|| Box::new(std::io::stdout())),
    ));
    let root = Scope::root();
    builtins::register(&root, &shared.heap);
    Engine { shared, root, out }
  }
}

/// A cloneable in-memory sink for capturing program output in tests
/// and examples.
#[derive(Clone, Default)]
pub struct TestSink(Arc<Mutex<Vec<u8>>>);

impl TestSink {
  pub fn new() -> TestSink {
    TestSink::default()
  }

  /// Everything printed so far, leaving the buffer in place.
  pub fn contents(&self) -> String {
    String::from_utf8_lossy(&self.0.lock()).into_owned()
  }

  /// Everything printed so far, emptying the buffer.
  pub fn take(&self) -> String {
    String::from_utf8_lossy(&std::mem::take(&mut *self.0.lock())).into_owned()
  }
}

impl Write for TestSink {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    self.0.lock().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}
