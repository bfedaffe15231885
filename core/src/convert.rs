//! Token-to-value conversions.
//!
//! Integers accept a trailing size unit (`4k`, `2M`, `1g`) and are narrowed
//! to `i32` only when the scaled value fits. Floats follow the lenient
//! leading-prefix rules of C's `atof`, independent of locale.

/// Multiplier for a size-unit suffix character.
///
/// Unrecognized characters (digits included) scale by 1.
///
/// # Examples
///
/// ```
/// use clargs_core::size_multiplier;
///
/// assert_eq!(size_multiplier('k'), 1 << 10);
/// assert_eq!(size_multiplier('G'), 1 << 30);
/// assert_eq!(size_multiplier('7'), 1);
/// ```
pub fn size_multiplier(c: char) -> i64 {
    match c {
        'b' | 'B' => 1,
        'k' | 'K' => 1 << 10,
        'm' | 'M' => 1 << 20,
        'g' | 'G' => 1 << 30,
        _ => 1,
    }
}

/// Parses the leading base-10 integer of `token`.
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit. A token with no digits yields 0 and out-of-range values
/// saturate at the `i64` bounds.
///
/// # Examples
///
/// ```
/// use clargs_core::parse_leading_int;
///
/// assert_eq!(parse_leading_int("  42abc"), 42);
/// assert_eq!(parse_leading_int("-7k"), -7);
/// assert_eq!(parse_leading_int("k"), 0);
/// ```
pub fn parse_leading_int(token: &str) -> i64 {
    let s = token.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        value = match value
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) })
        {
            Some(v) => v,
            None if negative => return i64::MIN,
            None => return i64::MAX,
        };
    }
    value
}

/// A scaled integer that does not fit in the destination type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    /// The exact scaled value.
    pub scaled: i128,
}

impl std::fmt::Display for Overflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "integer overflow ({})", self.scaled)
    }
}

/// Converts an integer token with an optional size-unit suffix.
///
/// The unit is taken from the token's final character. The scaled value is
/// computed exactly and must survive narrowing to `i32`.
///
/// # Examples
///
/// ```
/// use clargs_core::scale_int;
///
/// assert_eq!(scale_int("4k"), Ok(4096));
/// assert_eq!(scale_int("2M"), Ok(2_097_152));
/// assert_eq!(scale_int("1g"), Ok(1_073_741_824));
/// assert_eq!(scale_int("10"), Ok(10));
/// assert!(scale_int("2g").is_err());
/// ```
pub fn scale_int(token: &str) -> Result<i32, Overflow> {
    let multiplier = token.chars().last().map_or(1, size_multiplier);
    let scaled = i128::from(parse_leading_int(token)) * i128::from(multiplier);
    i32::try_from(scaled).map_err(|_| Overflow { scaled })
}

/// Parses the longest leading decimal floating-point literal of `token`.
///
/// Accepts an optional sign, digits with an optional fraction and an
/// optional exponent, plus `inf`/`infinity`/`nan`. Yields 0.0 when no
/// literal is present.
///
/// # Examples
///
/// ```
/// use clargs_core::parse_leading_float;
///
/// assert_eq!(parse_leading_float("2.5"), 2.5);
/// assert_eq!(parse_leading_float(" 1e3xyz"), 1000.0);
/// assert_eq!(parse_leading_float("-.5"), -0.5);
/// assert_eq!(parse_leading_float("abc"), 0.0);
/// ```
pub fn parse_leading_float(token: &str) -> f64 {
    let s = token.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let rest = s[end..].to_ascii_lowercase();
    for word in ["infinity", "inf", "nan"] {
        if rest.starts_with(word) {
            return s[..end + word.len()].parse().unwrap_or(0.0);
        }
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut mantissa_digits = int_digits;
    if bytes.get(end) == Some(&b'.') {
        let frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
            mantissa_digits += frac_digits;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Interprets the default token of a presence-only argument.
///
/// # Examples
///
/// ```
/// use clargs_core::parse_presence;
///
/// assert!(parse_presence("on"));
/// assert!(!parse_presence("0"));
/// ```
pub fn parse_presence(token: &str) -> bool {
    match token.to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => false,
        _ => true,
    }
}
