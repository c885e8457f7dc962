use crate::types::IntWidth;

/// Reduces `value` to the two's-complement range of `width`.
///
/// Arithmetic on narrow integers is carried out in `i64` and then wrapped, so
/// every width overflows the way the matching machine integer would.
///
/// ## Example
/// ```
/// use obstruct::{types::IntWidth, util::num::wrap};
///
/// assert_eq!(wrap(IntWidth::I8, 128), -128);
/// assert_eq!(wrap(IntWidth::I16, -32769), 32767);
/// assert_eq!(wrap(IntWidth::I64, 5), 5);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn wrap(width: IntWidth, value: i64) -> i64 {
    match width {
        IntWidth::I8 => value as i8 as i64,
        IntWidth::I16 => value as i16 as i64,
        IntWidth::I32 => value as i32 as i64,
        IntWidth::I64 => value,
    }
}

/// Raises `base` to `exponent`, wrapping on overflow.
///
/// The result is exact modulo 2^64, so wrapping it again with [`wrap`] gives
/// the correct result for any narrower width.
///
/// ## Example
/// ```
/// use obstruct::util::num::wrapping_pow;
///
/// assert_eq!(wrapping_pow(3, 4), 81);
/// assert_eq!(wrapping_pow(2, 64), 0);
/// assert_eq!(wrapping_pow(-1, u64::MAX), -1);
/// ```
#[must_use]
pub const fn wrapping_pow(base: i64, exponent: u64) -> i64 {
    let mut result: i64 = 1;
    let mut base = base;
    let mut exponent = exponent;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exponent >>= 1;
    }
    result
}

/// Converts the integer returned by `main` into a process exit code by
/// keeping its low 32 bits.
///
/// ## Example
/// ```
/// use obstruct::util::num::exit_code;
///
/// assert_eq!(exit_code(7), 7);
/// assert_eq!(exit_code(1 << 32), 0);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn exit_code(value: i64) -> i32 {
    value as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_is_identity_inside_the_range() {
        for width in [IntWidth::I8, IntWidth::I16, IntWidth::I32, IntWidth::I64] {
            assert_eq!(wrap(width, width.max()), width.max());
            assert_eq!(wrap(width, width.min()), width.min());
        }
    }

    #[test]
    fn wrap_crosses_the_boundary() {
        assert_eq!(wrap(IntWidth::I32, i64::from(i32::MAX) + 1), i64::from(i32::MIN));
        assert_eq!(wrap(IntWidth::I8, -129), 127);
    }

    #[test]
    fn pow_matches_repeated_multiplication() {
        let mut expected: i64 = 1;
        for exponent in 0..20 {
            assert_eq!(wrapping_pow(7, exponent), expected);
            expected = expected.wrapping_mul(7);
        }
    }
}
