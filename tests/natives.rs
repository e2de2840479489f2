#[path = "common/common.rs"]
#[macro_use]
mod common;

use indoc::indoc;
use tako::{Engine, TestSink};

check! {
  len_and_get,
  r#"
    let l = [10, 20, 30]
    print len(l)
    print get(l, 0)
    print get(l, 2)
  "#,
  "3\n10\n30\n"
}

check! {
  push_returns_the_grown_list,
  r#"
    let l = [1, 2]
    let grown = push(l, 3)
    print l
    print grown
  "#,
  "[1, 2]\n[1, 2, 3]\n"
}

check! {
  pushed_item_lands_at_the_old_length,
  r#"
    let l = [1, 2]
    print get(push(l, 42), len(l))
  "#,
  "42\n"
}

check! {
  push_builds_lists_incrementally,
  r#"
    let mutable l = []
    let mutable i = 0
    while i < 4:
        l = push(l, i * i)
        i = i + 1
    print l
  "#,
  "[0, 1, 4, 9]\n"
}

check! {
  empty_list_has_length_zero,
  r#"
    print len([])
  "#,
  "0\n"
}

check_error! {
  get_is_bounds_checked,
  r#"
    get([1, 2], 2)
  "#,
  "Index out of bounds."
}

check_error! {
  get_rejects_negative_indexes,
  r#"
    get([1, 2], -1)
  "#,
  "Index out of bounds."
}

check_error! {
  len_requires_a_list,
  r#"
    len(5)
  "#,
  "Argument to 'len' must be a list."
}

check_error! {
  push_requires_a_list,
  r#"
    push(5, 1)
  "#,
  "First argument to 'push' must be a list."
}

check_error! {
  native_arity_is_checked,
  r#"
    len([1], [2])
  "#,
  "Function 'len' expects 1 args."
}

check_error! {
  spawn_requires_a_function,
  r#"
    spawn(5)
  "#,
  "Argument to 'spawn' must be a function."
}

check_error! {
  sleep_rejects_negative_durations,
  r#"
    sleep(-1)
  "#,
  "Argument to 'sleep' must be a non-negative int."
}

#[test]
fn time_returns_a_plausible_unix_stamp() {
  let buffer = TestSink::new();
  let mut engine = Engine::builder().output(buffer.clone()).build();
  engine.eval("print time()").unwrap();

  let stamp: i64 = buffer.contents().trim().parse().expect("an integer");
  // Some time after 2020 and within the reach of a 32-bit int.
  assert!(stamp > 1_577_836_800);
  assert!(stamp <= i32::MAX as i64);
}

#[test]
fn sleep_blocks_for_roughly_the_requested_time() {
  let mut engine = Engine::builder().output(TestSink::new()).build();
  let start = std::time::Instant::now();
  engine.eval("sleep(50)").unwrap();
  assert!(start.elapsed() >= std::time::Duration::from_millis(50));
}

#[test]
fn pushed_instances_are_counted() {
  let mut engine = Engine::builder().output(TestSink::new()).build();
  engine
    .eval(indoc! {r#"
      type Box = class { v: int }
      sum():
          let b = new Box(3)
          let l = push([], b)
          return get(l, 0).v
      print sum()
    "#})
    .unwrap();

  let stats = engine.heap_stats();
  assert_eq!(stats.live, 0);
  assert_eq!(stats.retains, stats.releases);
}
