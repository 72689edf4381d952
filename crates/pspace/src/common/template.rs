//! printf-style command and datafile templates, e.g. `simulate -J %g -o %s`.
use std::fmt::{Display, Formatter};

use crate::common::error::PspaceError;
use crate::common::expr::{Value, float_repr};

const FLAG_CHARS: &str = "-+ 0#";
const CONVERSION_CHARS: &str = "diufFeEgGsrxXoc";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alternate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conversion {
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    kind: char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Conversion(Conversion),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

fn template_error<T>(message: impl Into<String>) -> crate::Result<T> {
    Err(PspaceError::TemplateError(message.into()))
}

impl Template {
    pub fn parse(source: &str) -> crate::Result<Self> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }

            let mut flags = Flags::default();
            while let Some(&flag) = chars.peek() {
                if !FLAG_CHARS.contains(flag) {
                    break;
                }
                match flag {
                    '-' => flags.left = true,
                    '+' => flags.plus = true,
                    ' ' => flags.space = true,
                    '0' => flags.zero = true,
                    _ => flags.alternate = true,
                }
                chars.next();
            }

            let mut width = None;
            while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                width = Some(width.unwrap_or(0) * 10 + digit as usize);
                chars.next();
            }

            let mut precision = None;
            if chars.peek() == Some(&'.') {
                chars.next();
                precision = Some(0);
                while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                    precision = precision.map(|p| p * 10 + digit as usize);
                    chars.next();
                }
            }

            // Length modifiers carry no meaning here
            while matches!(chars.peek(), Some('h' | 'l' | 'L')) {
                chars.next();
            }

            let kind = match chars.next() {
                Some(kind) if CONVERSION_CHARS.contains(kind) => kind,
                Some(kind) => {
                    return template_error(format!(
                        "unsupported format character '{kind}' in \"{source}\""
                    ));
                }
                None => return template_error(format!("incomplete format \"{source}\"")),
            };

            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Conversion(Conversion {
                flags,
                width,
                precision,
                kind,
            }));
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of values the template expects.
    pub fn arity(&self) -> usize {
        self.pieces
            .iter()
            .filter(|piece| matches!(piece, Piece::Conversion(_)))
            .count()
    }

    pub fn render(&self, values: &[Value]) -> crate::Result<String> {
        let arity = self.arity();
        if values.len() < arity {
            return template_error(format!(
                "not enough arguments for \"{}\" ({arity} expected, {} given)",
                self.source,
                values.len()
            ));
        }
        if values.len() > arity {
            return template_error(format!(
                "not all arguments converted in \"{}\" ({arity} expected, {} given)",
                self.source,
                values.len()
            ));
        }

        let mut output = String::with_capacity(self.source.len());
        let mut values = values.iter();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => output.push_str(text),
                Piece::Conversion(conversion) => {
                    if let Some(value) = values.next() {
                        output.push_str(&conversion.render(value)?);
                    }
                }
            }
        }
        Ok(output)
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl Conversion {
    fn render(&self, value: &Value) -> crate::Result<String> {
        match self.kind {
            's' | 'r' => {
                let text = if self.kind == 's' {
                    value.to_string()
                } else {
                    value.repr()
                };
                let text = match self.precision {
                    Some(precision) => text.chars().take(precision).collect(),
                    None => text,
                };
                Ok(self.pad("", "", &text, false))
            }
            'c' => {
                let c = match value {
                    Value::Int(code) => u32::try_from(*code).ok().and_then(char::from_u32),
                    Value::Str(text) if text.chars().count() == 1 => text.chars().next(),
                    _ => None,
                };
                match c {
                    Some(c) => Ok(self.pad("", "", &c.to_string(), false)),
                    None => template_error(format!("%c requires an int or a char, got {value}")),
                }
            }
            'd' | 'i' | 'u' => {
                let number = match value {
                    Value::Int(number) => *number,
                    Value::Float(number) if number.is_finite() => number.trunc() as i64,
                    _ => return self.number_required(value),
                };
                let mut digits = number.unsigned_abs().to_string();
                if let Some(precision) = self.precision {
                    while digits.len() < precision {
                        digits.insert(0, '0');
                    }
                }
                Ok(self.pad(self.sign(number < 0), "", &digits, true))
            }
            'x' | 'X' | 'o' => {
                let Value::Int(number) = value else {
                    return template_error(format!(
                        "%{} format: an integer is required, not {}",
                        self.kind,
                        value.type_name()
                    ));
                };
                let magnitude = number.unsigned_abs();
                let (digits, prefix) = match self.kind {
                    'x' => (format!("{magnitude:x}"), "0x"),
                    'X' => (format!("{magnitude:X}"), "0X"),
                    _ => (format!("{magnitude:o}"), "0o"),
                };
                let prefix = if self.flags.alternate { prefix } else { "" };
                Ok(self.pad(self.sign(*number < 0), prefix, &digits, true))
            }
            _ => {
                let Some(number) = value.as_f64() else {
                    return self.number_required(value);
                };
                let upper = self.kind.is_ascii_uppercase();
                let sign = self.sign(number.is_sign_negative() && !number.is_nan());
                if !number.is_finite() {
                    let text = if number.is_nan() { "nan" } else { "inf" };
                    let text = if upper {
                        text.to_uppercase()
                    } else {
                        text.to_string()
                    };
                    return Ok(self.pad(sign, "", &text, false));
                }
                let precision = self.precision.unwrap_or(6);
                let magnitude = number.abs();
                let body = match self.kind.to_ascii_lowercase() {
                    'f' => fixed_form(magnitude, precision, self.flags.alternate),
                    'e' => exponent_form(magnitude, precision, upper, self.flags.alternate),
                    _ => general_form(magnitude, precision, upper, self.flags.alternate),
                };
                Ok(self.pad(sign, "", &body, true))
            }
        }
    }

    fn number_required<T>(&self, value: &Value) -> crate::Result<T> {
        template_error(format!(
            "%{} format: a number is required, not {}",
            self.kind,
            value.type_name()
        ))
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.flags.plus {
            "+"
        } else if self.flags.space {
            " "
        } else {
            ""
        }
    }

    fn pad(&self, sign: &str, prefix: &str, body: &str, numeric: bool) -> String {
        let len = sign.len() + prefix.len() + body.chars().count();
        let fill = self.width.unwrap_or(0).saturating_sub(len);
        if self.flags.left {
            format!("{sign}{prefix}{body}{}", " ".repeat(fill))
        } else if self.flags.zero && numeric {
            format!("{sign}{prefix}{}{body}", "0".repeat(fill))
        } else {
            format!("{}{sign}{prefix}{body}", " ".repeat(fill))
        }
    }
}

fn fixed_form(value: f64, precision: usize, alternate: bool) -> String {
    let mut text = format!("{value:.precision$}");
    if alternate && precision == 0 {
        text.push('.');
    }
    text
}

fn split_exponent(text: &str) -> (&str, i32) {
    match text.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse().unwrap_or_default()),
        None => (text, 0),
    }
}

fn exponent_form(value: f64, precision: usize, upper: bool, alternate: bool) -> String {
    let text = format!("{value:.precision$e}");
    let (mantissa, exponent) = split_exponent(&text);
    let dot = if alternate && precision == 0 { "." } else { "" };
    join_exponent(mantissa, dot, exponent, upper)
}

fn join_exponent(mantissa: &str, dot: &str, exponent: i32, upper: bool) -> String {
    let e = if upper { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{dot}{e}{sign}{:02}", exponent.abs())
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn general_form(value: f64, precision: usize, upper: bool, alternate: bool) -> String {
    let precision = precision.max(1);
    let exponent = if value == 0.0 {
        0
    } else {
        split_exponent(&format!("{value:.*e}", precision - 1)).1
    };

    if (-4..precision as i32).contains(&exponent) {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        let text = format!("{value:.decimals$}");
        if alternate {
            if text.contains('.') { text } else { format!("{text}.") }
        } else {
            strip_zeros(&text).to_string()
        }
    } else {
        let text = format!("{value:.*e}", precision - 1);
        let (mantissa, exponent) = split_exponent(&text);
        if alternate {
            let dot = if mantissa.contains('.') { "" } else { "." };
            join_exponent(mantissa, dot, exponent, upper)
        } else {
            join_exponent(strip_zeros(mantissa), "", exponent, upper)
        }
    }
}

/// Formats a float the way `%g` does, used for compact parameter listings.
pub fn format_g(value: f64) -> String {
    if value.is_finite() {
        let body = general_form(value.abs(), 6, false, false);
        if value.is_sign_negative() && value != 0.0 {
            format!("-{body}")
        } else {
            body
        }
    } else {
        float_repr(value)
    }
}
