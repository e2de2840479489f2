#[path = "common/common.rs"]
#[macro_use]
mod common;

check! {
  arithmetic_and_let,
  r#"
    let x = 10
    let mutable y = 20
    y = y + x
    print y
  "#,
  "30\n"
}

check! {
  precedence_and_grouping,
  r#"
    print 1 + 2 * 3
    print (1 + 2) * 3
  "#,
  "7\n9\n"
}

check! {
  division_truncates_toward_zero,
  r#"
    print 7 / 2
    print -7 / 2
  "#,
  "3\n-3\n"
}

check! {
  string_concatenation,
  r#"
    print "foo" + "bar"
  "#,
  "foobar\n"
}

check! {
  print_time_escapes,
  r#"
    print "a\nb\tc"
  "#,
  "a\nb\tc\n"
}

check! {
  comparisons_and_equality,
  r#"
    print 1 < 2
    print 2 <= 1
    print 3 == 3
    print 3 != 3
    print "a" == "a"
    print 1 == "1"
  "#,
  "true\nfalse\ntrue\nfalse\ntrue\nfalse\n"
}

check! {
  unary_operators,
  r#"
    print -5 + 10
    print !0
    print !1
  "#,
  "5\ntrue\nfalse\n"
}

check! {
  truthiness,
  r#"
    if 0:
        print 1
    else:
        print 2
    if []:
        print 3
    if "":
        print 4
  "#,
  "2\n3\n4\n"
}

check! {
  erlang_flavored_literals,
  r#"
    print {@ok, 200, "OK"}
    print #{@a => 1, @b => 2}
  "#,
  "{@ok, 200, OK}\n#{@a => 1, @b => 2}\n"
}

check! {
  atoms_compare_by_name,
  r#"
    print @ok == @ok
    print @ok == @error
  "#,
  "true\nfalse\n"
}

check! {
  tuples_compare_by_value,
  r#"
    print {1, @two} == {1, @two}
    print {1, 2} == {2, 1}
  "#,
  "true\nfalse\n"
}

check! {
  list_and_empty_literals,
  r#"
    print [1, 2, 3]
    print {}
    print #{}
  "#,
  "[1, 2, 3]\n{}\n#{}\n"
}

check! {
  map_keys_are_structural,
  r#"
    let m = #{{@k, 1} => "first", @plain => 2}
    print m
  "#,
  "#{{@k, 1} => first, @plain => 2}\n"
}

check! {
  integer_arithmetic_wraps,
  r#"
    print 2147483647 + 1
  "#,
  "-2147483648\n"
}
