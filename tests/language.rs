use obstruct::{
    Captured, Config,
    error::{CheckError, Error, NameError, RuntimeError, TypeError},
    run_captured,
};

fn run(src: &str) -> Captured {
    run_captured(src, "", &Config::default())
}

fn in_main(body: &str) -> String {
    format!("fn main(args: vec<<str>>) {{\n{body}\n}}")
}

fn assert_success(src: &str) {
    let captured = run(src);
    if let Err(e) = captured.result {
        panic!("Script failed: {e}\n{src}");
    }
}

fn assert_failure(src: &str) -> Error {
    match run(src).result {
        Ok(code) => panic!("Script succeeded with code {code} but was expected to fail\n{src}"),
        Err(e) => e,
    }
}

fn assert_output(src: &str, expected: &str) {
    let captured = run(src);
    if let Err(e) = &captured.result {
        panic!("Script failed: {e}\n{src}");
    }
    assert_eq!(captured.stdout, expected, "{src}");
}

#[test]
fn add_example_prints_fifteen() {
    let src = "fn add(a: i32, b: i32) -> i32 { a + b }
               fn main(args: vec<<str>>) { # r = $$ add(10, 5); ? r == 15 { $ \"ok\"; } }";
    assert_output(src, "15\nok");
}

#[test]
fn declarations_and_printing() {
    assert_output(&in_main("# x = 1 + 2; $$ x;"), "3\n");
    assert_output(&in_main("# x: i64 = 7 * 9; $ x; $ ' '; $$ type(x);"), "63 i64\n");
    assert_output(&in_main("# s = \"tab\\there\"; $$ s;"), "tab\there\n");
    assert_output(&in_main("# f = 1.5 * 2.0; $$ f;"), "3.0\n");
}

#[test]
fn mutable_bindings_can_be_reassigned() {
    assert_output(&in_main("#@ x = 1; x = x + 1; $$ x;"), "2\n");
    let err = assert_failure(&in_main("# x = 1; x = 2;"));
    assert!(matches!(err, Error::Check(CheckError::Type(TypeError::ImmutableAssignment { .. }))),
            "{err:?}");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn first_true_branch_wins() {
    let chain = "? x < 3 { $$ \"small\"; } ~? x < 10 { $$ \"medium\"; } ~? x < 100 { $$ \"also\"; } ~ { $$ \"large\"; }";
    assert_output(&in_main(&format!("# x = 1; {chain}")), "small\n");
    assert_output(&in_main(&format!("# x = 5; {chain}")), "medium\n");
    assert_output(&in_main(&format!("# x = 500; {chain}")), "large\n");
    assert_output(&in_main("? false { $$ 1; } ~? false { $$ 2; }"), "");
}

#[test]
fn chains_and_blocks_are_expressions() {
    assert_output(&in_main("# v = ? 2 < 3 { 7 } ~ { 11 }; $$ v;"), "7\n");
    assert_output(&in_main("# v = { # a = 1; # b = 2; a + b }; $$ v;"), "3\n");
    assert_output(&in_main("# u = { 1 + 1; }; $$ u;"), "()\n");
}

#[test]
fn deleted_names_are_rejected() {
    let err = assert_failure(&in_main("# x = 1; del x; $$ x;"));
    assert!(matches!(err, Error::Check(CheckError::Name(NameError::Deleted { .. }))), "{err:?}");
    assert_failure(&in_main("# x = 1; del x; del x;"));
    assert_failure(&in_main("del y;"));
}

#[test]
fn undefined_names_are_rejected() {
    let err = assert_failure(&in_main("$$ foo;"));
    assert!(matches!(err, Error::Check(CheckError::Name(NameError::Undefined { .. }))), "{err:?}");
}

#[test]
fn heap_pointers_are_generation_checked() {
    assert_output(&in_main("# p = ptr::new(5); $$ ptr::deref(p); ptr::free(p);"), "5\n");

    let err = assert_failure(&in_main("# p = ptr::new(5); ptr::free(p); $$ ptr::deref(p);"));
    assert!(matches!(err, Error::Runtime(RuntimeError::UseAfterFree { .. })), "{err:?}");
    assert_eq!(err.exit_code(), 1);

    let err = assert_failure(&in_main("# p = ptr::new(5); # q = p; ptr::free(p); ptr::free(q);"));
    assert!(matches!(err, Error::Runtime(RuntimeError::DoubleFree { .. })), "{err:?}");
}

#[test]
fn push_through_a_pointer_is_visible_through_aliases() {
    let src = in_main("# p = ptr::new(vec::new<<i32>>());
                       # q = p;
                       vec::push(p, 1);
                       vec::push(q, 2);
                       $$ ptr::deref(p);
                       $$ len(ptr::deref(q));");
    assert_output(&src, "[1, 2]\n2\n");
}

#[test]
fn len_counts_characters_and_elements() {
    assert_output(&in_main("$$ len(\"héllo\"); $$ len([1, 2, 3]); $$ len(vec::new<<bool>>());"), "5\n3\n0\n");
    let err = assert_failure(&in_main("$$ len(5);"));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn invalid_operands_are_rejected_statically() {
    let err = assert_failure(&in_main("$$ \"a\" * \"b\";"));
    assert!(matches!(err, Error::Check(CheckError::Type(TypeError::InvalidOperands { .. }))), "{err:?}");
    assert_failure(&in_main("$$ 1 + true;"));
    assert_failure(&in_main("$$ 1i8 + 1i16;"));
    assert_failure(&in_main("$$ !3;"));
}

#[test]
fn integers_wrap_at_their_width() {
    assert_output(&in_main("# x: i32 = 2147483647; $$ x + 1;"), "-2147483648\n");
    assert_output(&in_main("# x = 200i16 * 200i16; $$ x;"), "-25536\n");
    assert_output(&in_main("# m: i8 = -128; $$ m - 1i8;"), "127\n");
    assert_output(&in_main("$$ 2 ^ 31;"), "-2147483648\n");
}

#[test]
fn arithmetic_errors_happen_at_runtime() {
    let err = assert_failure(&in_main("# zero = 0; $$ 1 / zero;"));
    assert!(matches!(err, Error::Runtime(RuntimeError::DivisionByZero { .. })), "{err:?}");
    assert_failure(&in_main("# zero = 0.0; $$ 1.0 % zero;"));
    assert_failure(&in_main("# e = -1; $$ 2 ^ e;"));
}

#[test]
fn literals_must_fit_their_width() {
    assert_failure(&in_main("# x: i8 = 300;"));
    assert_success(&in_main("# x: i8 = -128;"));
    assert_failure(&in_main("# x = 300i8;"));
}

#[test]
fn for_ranges_exclude_the_end() {
    assert_output(&in_main("for i in 0..5 { $ i; }"), "01234");
    assert_output(&in_main("#@ sum = 0; for i in 1..5 { sum = sum + i; } $$ sum;"), "10\n");
    assert_output(&in_main("for i in 5..5 { $ i; }"), "");
}

#[test]
fn while_loops_run_until_false() {
    assert_output(&in_main("#@ n = 1; $? n < 100 { n = n * 3; } $$ n;"), "243\n");
}

#[test]
fn ret_leaves_the_function_early() {
    let src = "fn sign(x: i32) -> i32 { ? x < 0 { ret -1; } ? x == 0 { ret 0; } 1 }
               fn main(args: vec<<str>>) { $$ sign(-4); $$ sign(0); $$ sign(9); }";
    assert_output(src, "-1\n0\n1\n");
}

#[test]
fn wrong_arity_is_rejected() {
    assert_failure("fn f(x: i32, y: i32) -> i32 { x + y } fn main(args: vec<<str>>) { f(3); }");
}

#[test]
fn builtins_cannot_be_redefined() {
    assert_failure("fn len(x: i32) -> i32 { x } fn main(args: vec<<str>>) { }");
    assert_failure(&in_main("# len = 3;"));
}

#[test]
fn main_is_required() {
    let err = assert_failure("fn helper() { }");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn generics_are_inferred_and_explicit() {
    let src = "fn first<<T>>(v: vec<<T>>, fallback: T) -> T { ? len(v) > 0 { v[0] } ~ { fallback } }
               fn main(args: vec<<str>>) {
                   # p = ptr::new(vec::new<<str>>());
                   vec::push(p, \"a\");
                   $$ first(ptr::deref(p), \"none\");
                   $$ first<<i64>>(vec::new<<i64>>(), 9);
                   $$ type(first<<i64>>(vec::new(), 9));
               }";
    assert_output(src, "a\n9\ni64\n");
}

#[test]
fn ambiguous_generics_are_rejected() {
    let err = assert_failure(&in_main("# v = vec::new();"));
    assert!(matches!(err, Error::Check(CheckError::Type(TypeError::AmbiguousGeneric { .. }))), "{err:?}");
}

#[test]
fn type_names_use_source_syntax() {
    assert_output(&in_main("$$ type(1); $$ type([1, 2]); $$ type(ptr::new('c')); $$ type(args);"),
                  "i32\narr<<i32, 2>>\nptr<<char>>\nvec<<str>>\n");
}

#[test]
fn references_read_the_current_value() {
    let src = in_main("#@ x = 1; # r = ref::new(x); x = 5; $$ ref::deref(r);");
    assert_output(&src, "5\n");
    assert_failure(&in_main("# r = ref::new(1 + 2);"));
}

#[test]
fn arrays_have_defaults() {
    assert_output(&in_main("# a = arr::new<<arr<<i8, 3>>>>(); $$ a;"), "[0, 0, 0]\n");
    assert_output(&in_main("# a: arr<<bool, 2>>; $$ a;"), "[false, false]\n");
    assert_output(&in_main("$$ i64::new(); $$ str::new() == \"\";"), "0\ntrue\n");
}

#[test]
fn indexing_is_bounds_checked() {
    let config = Config::default().with_args(vec!["prog".into()]);
    let captured = run_captured(&in_main("# a = [10, 20, 30]; $$ a[2]; $$ vec::nth(args, 0);"), "", &config);
    assert_eq!(captured.stdout, "30\nprog\n");
    assert_eq!(run(&in_main("# a = [10, 20, 30]; $$ a[3];")).exit_code(), 1);
    assert_eq!(run(&in_main("$$ vec::nth(args, 0);")).exit_code(), 1);
    assert_eq!(run(&in_main("$$ str::nth(\"abc\", 5);")).exit_code(), 1);
}

#[test]
fn quit_stops_immediately() {
    let captured = run(&in_main("$$ 1; quit(3); $$ 2;"));
    assert_eq!(captured.stdout, "1\n");
    assert_eq!(captured.exit_code(), 3);
    assert_eq!(run(&in_main("quit();")).exit_code(), 0);
}

#[test]
fn main_return_value_becomes_the_exit_code() {
    assert_eq!(run("fn main(args: vec<<str>>) -> i32 { 4 }").exit_code(), 4);
    assert_eq!(run("fn main(args: vec<<str>>) { }").exit_code(), 0);
}

#[test]
fn input_is_read_line_by_line() {
    let src = in_main("# a = in(); # b = in(); # c = in(); $$ a + \"|\" + b + \"|\" + c;");
    let captured = run_captured(&src, "one\r\ntwo\n", &Config::default());
    assert_eq!(captured.stdout, "one|two|\n");
}

#[test]
fn headless_window_closes_after_its_frame_limit() {
    let src = in_main("init_window(\"demo\"); #@ frames = 0; $? is_window_open() { draw_window(); frames = frames + 1; } $$ frames;");
    let captured = run_captured(&src, "", &Config::default().with_frame_limit(Some(4)));
    assert_eq!(captured.stdout, "4\n");

    let err = assert_failure(&in_main("draw_window();"));
    assert!(matches!(err, Error::Runtime(RuntimeError::Window { .. })), "{err:?}");
}

#[test]
fn lambdas_capture_their_scope() {
    let src = in_main("#@ count = 0;
                       # tick = lam() -> i32 { count = count + 1; count };
                       tick(); tick();
                       $$ tick();");
    assert_output(&src, "3\n");
    assert_failure(&in_main("# count = 0; # tick = lam() { count = count + 1; };"));
}

#[test]
fn lambdas_do_not_outlive_their_defining_call() {
    let src = "fn mk() -> fn() -> i32 { # y = 4; lam() -> i32 { y } }
               fn main(args: vec<<str>>) { # f = mk(); $$ f(); }";
    let err = assert_failure(src);
    assert!(matches!(err, Error::Runtime(RuntimeError::ExpiredClosure { .. })), "{err:?}");
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn oversized_array_defaults_fail_at_runtime() {
    let err = assert_failure(&in_main("# a = arr::new<<arr<<i32, 100000000000>>>>();"));
    assert!(matches!(err, Error::Runtime(RuntimeError::AllocationFailed { .. })), "{err:?}");
    assert_eq!(err.exit_code(), 1);

    let err = assert_failure(&in_main("# a: arr<<arr<<bool, 100000>>, 100000>>;"));
    assert!(matches!(err, Error::Runtime(RuntimeError::AllocationFailed { .. })), "{err:?}");
    assert_success(&in_main("# a: arr<<arr<<i8, 100>>, 100>>;"));
}

#[test]
fn runaway_recursion_is_a_runtime_error() {
    let src = "fn f(n: i32) -> i32 { ? n == 0 { 0 } ~ { 1 + f(n - 1) } }
               fn main(args: vec<<str>>) { $$ f(20000); }";
    let err = assert_failure(src);
    assert!(matches!(err, Error::Runtime(RuntimeError::StackOverflow { .. })), "{err:?}");
    assert_eq!(err.exit_code(), 1);

    let src = "fn f(n: i32) -> i32 { ? n == 0 { 0 } ~ { 1 + f(n - 1) } }
               fn main(args: vec<<str>>) { $$ f(5000); }";
    assert_output(src, "5000\n");
}

#[test]
fn check_only_does_not_run() {
    let captured = run_captured(&in_main("$$ 1;"), "", &Config::default().with_check_only(true));
    assert_eq!(captured.stdout, "");
    assert_eq!(captured.exit_code(), 0);
}

#[test]
fn lex_and_parse_errors_are_static() {
    assert_eq!(run(&in_main("# s = \"open;")).exit_code(), 2);
    assert_eq!(run(&in_main("# x = 1 +;")).exit_code(), 2);
    assert_eq!(run(&in_main("# x = `;")).exit_code(), 2);
}
