//! The `an+b` microsyntax of the `:nth-*` pseudo-classes.
//!
//! [Selectors Level 3 § 6.6.5.2](https://www.w3.org/TR/selectors-3/#nth-child-pseudo)

use core::fmt;

/// A parsed `an+b` formula.
///
/// "The `:nth-child(an+b)` pseudo-class notation represents an element that
/// has an+b-1 siblings before it in the document tree, for any positive
/// integer or zero value of n."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnPlusB {
    /// Step between matching positions (may be zero or negative).
    pub a: i64,
    /// Offset of the first matching position.
    pub b: i64,
}

impl AnPlusB {
    /// `0n+1`: the first position only. `:first-child` and friends use this.
    pub const FIRST: Self = Self::new(0, 1);

    /// Create a formula.
    #[must_use]
    pub const fn new(a: i64, b: i64) -> Self {
        Self { a, b }
    }

    /// Parse the argument of an `:nth-*` pseudo-class.
    ///
    /// Accepts `odd`, `even`, a bare integer, and the `an+b` pattern (with
    /// `a` optional, signed, or omitted as in `n`, `-n`, `+n`). Whitespace is
    /// ignored and the keywords are case-insensitive. Returns `None` for
    /// anything else; the caller treats that as "never matches".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let expr: String = raw
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match expr.as_str() {
            "" => return None,
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }

        let Some(n_pos) = expr.find('n') else {
            return parse_signed_integer(&expr).map(|b| Self::new(0, b));
        };
        if expr.matches('n').count() != 1 {
            return None;
        }

        let (a_part, rest) = expr.split_at(n_pos);
        let b_part = &rest[1..];

        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            _ => parse_signed_integer(a_part)?,
        };

        if b_part.is_empty() {
            return Some(Self::new(a, 0));
        }

        let (sign, digits) = if let Some(digits) = b_part.strip_prefix('+') {
            (1, digits)
        } else if let Some(digits) = b_part.strip_prefix('-') {
            (-1, digits)
        } else {
            return None;
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let b = digits.parse::<i64>().ok()?;
        Some(Self::new(a, sign * b))
    }

    /// Whether the 1-based `position` is one of `a*n + b` for some `n >= 0`.
    ///
    /// With `a == 0` that is `position == b`; otherwise `(position - b) / a`
    /// must be a non-negative integer.
    #[must_use]
    pub fn matches(self, position: i64) -> bool {
        if self.a == 0 {
            return position == self.b;
        }
        let Some(offset) = position.checked_sub(self.b) else {
            return false;
        };
        match (offset.checked_rem(self.a), offset.checked_div(self.a)) {
            (Some(0), Some(n)) => n >= 0,
            _ => false,
        }
    }
}

impl fmt::Display for AnPlusB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.a {
            0 => return write!(f, "{}", self.b),
            1 => write!(f, "n")?,
            -1 => write!(f, "-n")?,
            a => write!(f, "{a}n")?,
        }
        match self.b {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{b}"),
            b => write!(f, "{b}"),
        }
    }
}

fn parse_signed_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
