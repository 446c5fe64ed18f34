//! Currency mask/unmask for the amount field.
//!
//! Display text uses locale punctuation (`1.234,56`); the canonical value is a
//! plain `f64` rounded to cents.

use serde::{Deserialize, Serialize};

/// Converts between the canonical amount and its display text.
pub trait CurrencyCodec {
    /// Two-decimal locale text. Total over `f64`.
    fn format(&self, value: f64) -> String;

    /// Best-effort parse of user text. Total over `&str`, never negative.
    fn unmask(&self, text: &str) -> f64;
}

/// What a blurred amount that unmasks to zero means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroAmountPolicy {
    /// Zero counts as "not entered" and fails the required-amount rule.
    #[default]
    TreatAsEmpty,
    /// Zero is a real price (free items).
    AllowZero,
}

/// Chars the amount input accepts while typing.
pub fn is_mask_char(c: char) -> bool {
    c.is_ascii_digit() || c == ',' || c == '.'
}

/// Drops every char that cannot appear in masked currency text.
pub fn strip_to_mask_chars(raw: &str) -> String {
    raw.chars().filter(|c| is_mask_char(*c)).collect()
}

/// Brazilian real punctuation: `,` for decimals, `.` for thousands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrlCodec {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for BrlCodec {
    fn default() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: '.',
        }
    }
}

impl BrlCodec {
    /// Splits masked text into (integer digits, fraction digits).
    ///
    /// The last decimal separator wins. Without one, a single grouping
    /// separator followed by one or two trailing digits is read as the
    /// decimal point (`10.5`), anything else is grouping (`1.234`).
    fn split_parts(&self, text: &str) -> (String, String) {
        let digits = |s: &str| s.chars().filter(|c| c.is_ascii_digit()).collect::<String>();

        if let Some(pos) = text.rfind(self.decimal_separator) {
            let after = &text[pos + self.decimal_separator.len_utf8()..];
            return (digits(&text[..pos]), digits(after));
        }

        let groups: Vec<&str> = text.split(self.grouping_separator).collect();
        if groups.len() == 2 {
            let tail = groups[1];
            if (1..=2).contains(&tail.len()) && tail.chars().all(|c| c.is_ascii_digit()) {
                return (digits(groups[0]), tail.to_string());
            }
        }

        (digits(text), String::new())
    }
}

impl CurrencyCodec for BrlCodec {
    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return format!("0{}00", self.decimal_separator);
        }

        let fixed = format!("{:.2}", value.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.grouping_separator);
            }
            grouped.push(c);
        }

        // no "-0,00"
        let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
        format!("{sign}{grouped}{}{frac_part}", self.decimal_separator)
    }

    fn unmask(&self, text: &str) -> f64 {
        let masked = strip_to_mask_chars(text);
        let (int_digits, frac_digits) = self.split_parts(&masked);
        if int_digits.is_empty() && frac_digits.is_empty() {
            return 0.0;
        }

        let int_digits = if int_digits.is_empty() { "0" } else { int_digits.as_str() };

        match round_digits_to_cents(int_digits, &frac_digits).parse::<f64>() {
            Ok(v) if v.is_finite() => round_cents(v),
            _ => 0.0,
        }
    }
}

/// Rounds a decimal given as digit strings to two places, half away from
/// zero, without going through binary floating point.
fn round_digits_to_cents(int_digits: &str, frac_digits: &str) -> String {
    let mut digits: Vec<u8> = int_digits
        .bytes()
        .chain(frac_digits.bytes().chain(std::iter::repeat(b'0')).take(2))
        .collect();

    if frac_digits.as_bytes().get(2).is_some_and(|d| *d >= b'5') {
        let mut carried = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carried = false;
                break;
            }
        }
        if carried {
            digits.insert(0, b'1');
        }
    }

    let text: String = digits.iter().map(|d| char::from(*d)).collect();
    let (int_part, cents) = text.split_at(text.len() - 2);
    format!("{int_part}.{cents}")
}

/// Snaps to the cent the display text shows, so formatting the result and
/// reading it back lands on the same value.
pub fn round_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}
