use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

#[derive(Debug, Parser)]
#[clap(name = "tako", version)]
pub struct App {
  /// Script to run. Without one, a banner is printed.
  script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
  let app = App::parse();

  let Some(path) = app.script else {
    println!(
      "tako {} — an indentation-based scripting language",
      env!("CARGO_PKG_VERSION")
    );
    println!("usage: tako <script>");
    return Ok(());
  };

  let source = std::fs::read_to_string(&path)
    .with_context(|| format!("failed to read `{}`", path.display()))?;

  let mut engine = tako::Engine::new();
  if let Err(e) = engine.eval(&source) {
    // Script diagnostics go to stderr; the process still completed
    // nominally, so the exit code stays zero.
    eprintln!("{e}");
  }

  Ok(())
}
