use obstruct::{Config, run_captured};
use proptest::prelude::*;

fn output(body: &str) -> String {
    let source = format!("fn main(args: vec<<str>>) {{ {body} }}");
    let captured = run_captured(&source, "", &Config::default());
    if let Err(e) = &captured.result {
        panic!("{e}\n{source}");
    }
    captured.stdout
}

proptest! {
    #[test]
    fn i32_arithmetic_wraps_like_twos_complement(a: i32, b: i32) {
        let body = format!("# a: i32 = {a}; # b: i32 = {b}; $$ a + b; $$ a - b; $$ a * b;");
        let expected = format!("{}\n{}\n{}\n", a.wrapping_add(b), a.wrapping_sub(b), a.wrapping_mul(b));
        prop_assert_eq!(output(&body), expected);
    }

    #[test]
    fn i8_arithmetic_wraps_like_twos_complement(a: i8, b: i8) {
        let body = format!("# a: i8 = {a}; # b: i8 = {b}; $$ a + b; $$ a * b;");
        let expected = format!("{}\n{}\n", a.wrapping_add(b), a.wrapping_mul(b));
        prop_assert_eq!(output(&body), expected);
    }

    #[test]
    fn division_truncates_toward_zero(a in (i64::MIN + 1)..=i64::MAX,
                                      b in ((i64::MIN + 1)..=i64::MAX).prop_filter("non-zero", |b| *b != 0)) {
        let body = format!("# a: i64 = {a}; # b: i64 = {b}; $$ a / b; $$ a % b;");
        let expected = format!("{}\n{}\n", a.wrapping_div(b), a.wrapping_rem(b));
        prop_assert_eq!(output(&body), expected);
    }

    #[test]
    fn for_visits_the_half_open_range_in_order(start in -20i32..20, end in -20i32..20) {
        let body = format!("for i in {start}..{end} {{ $$ i; }}");
        let expected: String = (start..end).map(|i| format!("{i}\n")).collect();
        prop_assert_eq!(output(&body), expected);
    }
}
