/// Run a program and compare everything it printed against the
/// expected output.
#[macro_export]
macro_rules! check {
  ($name:ident, $input:literal, $expected:expr) => {
    #[test]
    fn $name() {
      let input = indoc::indoc!($input);
      let buffer = tako::TestSink::new();
      let mut engine = tako::Engine::builder().output(buffer.clone()).build();
      if let Err(e) = engine.eval(input) {
        panic!("eval failed with `{e}`\n\n# Input:\n{input}");
      }
      assert_eq!(buffer.contents(), $expected, "\n# Input:\n{input}");
    }
  };
}

/// Run a program and expect it to abort with exactly this diagnostic.
#[macro_export]
macro_rules! check_error {
  ($name:ident, $input:literal, $message:expr) => {
    #[test]
    fn $name() {
      let input = indoc::indoc!($input);
      let buffer = tako::TestSink::new();
      let mut engine = tako::Engine::builder().output(buffer.clone()).build();
      match engine.eval(input) {
        Ok(()) => panic!("expected an error\n\n# Input:\n{input}"),
        Err(e) => assert_eq!(e.to_string(), $message, "\n# Input:\n{input}"),
      }
    }
  };
}
