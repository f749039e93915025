//! Pluggable text-to-number conversion strategies
//!
//! Every numeric field token goes through a [`Converter`]. Two strategies
//! ship with the crate:
//!
//! - [`StdConverter`]: locale independent `str::parse`, always available
//! - [`FastConverter`]: SIMD integer and Eisel-Lemire float parsing via
//!   `atoi_simd` and `fast-float2` (feature `fast-parse`)
//!
//! Both accept and reject exactly the same tokens, so swapping one for the
//! other only changes throughput.

/// Conversion contract from a field token to a number
///
/// Implementations must be total: `None` for any token that is not a
/// complete lexical representation of the number (no surrounding spaces, no
/// trailing garbage).
pub trait Converter {
    fn parse_i64(&self, token: &str) -> Option<i64>;

    fn parse_u64(&self, token: &str) -> Option<u64>;

    fn parse_f64(&self, token: &str) -> Option<f64>;

    fn parse_f32(&self, token: &str) -> Option<f32>;
}

/// Default conversion through `str::parse`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConverter;

impl Converter for StdConverter {
    fn parse_i64(&self, token: &str) -> Option<i64> {
        token.parse().ok()
    }

    fn parse_u64(&self, token: &str) -> Option<u64> {
        token.parse().ok()
    }

    fn parse_f64(&self, token: &str) -> Option<f64> {
        token.parse().ok()
    }

    fn parse_f32(&self, token: &str) -> Option<f32> {
        token.parse().ok()
    }
}

/// High-throughput conversion backed by `atoi_simd` and `fast-float2`
///
/// The fast path handles the common shapes; whatever it rejects is handed to
/// [`StdConverter`], so a token the fast parsers are stricter about (an
/// explicit `+` sign, very long zero padding) still yields the same answer.
#[cfg(feature = "fast-parse")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FastConverter;

#[cfg(feature = "fast-parse")]
impl Converter for FastConverter {
    fn parse_i64(&self, token: &str) -> Option<i64> {
        let fast: Option<i64> = atoi_simd::parse::<_, false, false>(token.as_bytes()).ok();
        fast.or_else(|| StdConverter.parse_i64(token))
    }

    fn parse_u64(&self, token: &str) -> Option<u64> {
        let fast: Option<u64> = atoi_simd::parse::<_, false, false>(token.as_bytes()).ok();
        fast.or_else(|| StdConverter.parse_u64(token))
    }

    fn parse_f64(&self, token: &str) -> Option<f64> {
        let fast: Option<f64> = fast_float2::parse(token).ok();
        fast.or_else(|| StdConverter.parse_f64(token))
    }

    fn parse_f32(&self, token: &str) -> Option<f32> {
        let fast: Option<f32> = fast_float2::parse(token).ok();
        fast.or_else(|| StdConverter.parse_f32(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTEGER_TOKENS: &[&str] = &[
        "0", "42", "-42", "+7", "007", "", "-", "+", "1.5", " 1", "1 ", "abc", "12a",
        "9223372036854775807", "9223372036854775808", "-9223372036854775808",
        "-0", "0x10", "000000000000000000000042", "+-1",
    ];

    const FLOAT_TOKENS: &[&str] = &[
        "15.000000", "-0.5", ".5", "5.", "1e3", "1E-3", "+2.5", "inf", "-inf", "NaN", "",
        "abc", "1.2.3", " 1.0", "1.0x", "e5", "+inf", "1e+", "-0.0", "0x10",
    ];

    #[test]
    fn test_std_integers() {
        let conv = StdConverter;
        assert_eq!(conv.parse_i64("-42"), Some(-42));
        assert_eq!(conv.parse_i64("+7"), Some(7));
        assert_eq!(conv.parse_i64("4 2"), None);
        assert_eq!(conv.parse_u64("-1"), None);
        assert_eq!(conv.parse_u64("18446744073709551615"), Some(u64::MAX));
    }

    #[test]
    fn test_std_floats() {
        let conv = StdConverter;
        assert_eq!(conv.parse_f64("15.000000"), Some(15.0));
        assert_eq!(conv.parse_f64("37.8"), Some(37.8));
        assert_eq!(conv.parse_f64("x"), None);
        assert_eq!(conv.parse_f32("0.25"), Some(0.25));
    }

    #[test]
    fn test_std_rejects_every_invalid_sample() {
        let conv = StdConverter;
        for token in ["", "abc", "12a", " 1"] {
            assert_eq!(conv.parse_i64(token), None, "token {:?}", token);
        }
        for token in ["", "abc", "1.2.3", "1.0x"] {
            assert_eq!(conv.parse_f64(token), None, "token {:?}", token);
        }
    }

    #[cfg(feature = "fast-parse")]
    #[test]
    fn test_fast_matches_std_on_integers() {
        for token in INTEGER_TOKENS {
            assert_eq!(
                FastConverter.parse_i64(token),
                StdConverter.parse_i64(token),
                "token {:?}",
                token
            );
            assert_eq!(
                FastConverter.parse_u64(token),
                StdConverter.parse_u64(token),
                "token {:?}",
                token
            );
        }
    }

    #[cfg(feature = "fast-parse")]
    #[test]
    fn test_fast_matches_std_on_floats() {
        for token in FLOAT_TOKENS {
            let fast = FastConverter.parse_f64(token);
            let std = StdConverter.parse_f64(token);
            match (fast, std) {
                (Some(a), Some(b)) if a.is_nan() => assert!(b.is_nan(), "token {:?}", token),
                (a, b) => assert_eq!(a, b, "token {:?}", token),
            }
        }
    }

    #[test]
    fn test_sample_tables_are_parsable_by_std() {
        // Keeps the shared samples meaningful without the fast-parse feature
        assert!(INTEGER_TOKENS.iter().any(|t| StdConverter.parse_i64(t).is_some()));
        assert!(FLOAT_TOKENS.iter().any(|t| StdConverter.parse_f64(t).is_some()));
    }
}
