//! Expressions used in the `*_VALUES` lines of a configuration file.
//!
//! Every value of e.g. `CMD_EXEC_VALUES` is an expression that is evaluated
//! against a parameter set, for example `J`, `2*L+1`, `int(J/2)` or `FILE`.
use std::fmt::{Display, Formatter};

use nom::branch::alt;
use nom::bytes::complete::{tag, take_till};
use nom::character::complete::{
    alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of,
};
use nom::combinator::{map, map_res, opt, recognize};
use nom::multi::{many0, many0_count, separated_list0};
use nom::sequence::{delimited, pair, preceded, tuple};

use crate::common::error::PspaceError;
use crate::common::parser::{NomResult, consume_all};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            Value::Str(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }

    /// Representation with quoted strings, used by the `%r` conversion.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(value) => format!("'{value}'"),
            value => value.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => f.write_str(&float_repr(*value)),
            Value::Str(value) => f.write_str(value),
        }
    }
}

/// Shortest representation of a float that always shows it is a float,
/// e.g. `3.0`, `0.25`, `1e-05` or `1e+20`.
pub fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let formatted = format!("{value:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or_default();
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exponent.abs())
            }
            None => formatted,
        }
    } else {
        let formatted = format!("{value}");
        if formatted.contains('.') {
            formatted
        } else {
            format!("{formatted}.0")
        }
    }
}

/// Resolves names that occur in expressions.
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<Value>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Name(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

/// A parsed expression together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    expr: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> anyhow::Result<Self> {
        let expr = consume_all(p_expr, source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn evaluate(&self, scope: &dyn Scope) -> crate::Result<Value> {
        evaluate(&self.expr, scope).map_err(|error| {
            PspaceError::ExpressionError(format!("cannot evaluate `{}`: {error}", self.source))
        })
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

// Parser

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> NomResult<'a, O>
where
    F: FnMut(&'a str) -> NomResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn p_exponent(input: &str) -> NomResult<&str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

fn p_number(input: &str) -> NomResult<Value> {
    let number = recognize(alt((
        recognize(tuple((
            digit1,
            opt(pair(char('.'), digit0)),
            opt(p_exponent),
        ))),
        recognize(tuple((char('.'), digit1, opt(p_exponent)))),
    )));
    map_res(number, |text: &str| -> anyhow::Result<Value> {
        if text.contains(['.', 'e', 'E']) {
            Ok(Value::Float(text.parse()?))
        } else {
            Ok(Value::Int(text.parse()?))
        }
    })(input)
}

fn p_string(input: &str) -> NomResult<Value> {
    map(
        alt((
            delimited(char('\''), take_till(|c| c == '\''), char('\'')),
            delimited(char('"'), take_till(|c| c == '"'), char('"')),
        )),
        |value: &str| Value::Str(value.to_string()),
    )(input)
}

fn p_identifier(input: &str) -> NomResult<&str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn p_name_or_call(input: &str) -> NomResult<Expr> {
    let (input, name) = p_identifier(input)?;
    let (input, args) = opt(delimited(
        ws(char('(')),
        separated_list0(char(','), p_expr),
        char(')'),
    ))(input)?;
    let expr = match args {
        Some(args) => Expr::Call(name.to_string(), args),
        None => Expr::Name(name.to_string()),
    };
    Ok((input, expr))
}

fn p_atom(input: &str) -> NomResult<Expr> {
    ws(alt((
        map(p_number, Expr::Literal),
        map(p_string, Expr::Literal),
        p_name_or_call,
        delimited(char('('), p_expr, char(')')),
    )))(input)
}

fn p_power(input: &str) -> NomResult<Expr> {
    let (input, base) = p_atom(input)?;
    let (input, exponent) = opt(preceded(tag("**"), p_unary))(input)?;
    let expr = match exponent {
        Some(exponent) => Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)),
        None => base,
    };
    Ok((input, expr))
}

fn p_unary(input: &str) -> NomResult<Expr> {
    alt((
        map(preceded(ws(char('-')), p_unary), |expr| {
            Expr::Unary(UnaryOp::Neg, Box::new(expr))
        }),
        map(preceded(ws(char('+')), p_unary), |expr| {
            Expr::Unary(UnaryOp::Pos, Box::new(expr))
        }),
        p_power,
    ))(input)
}

fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    rest.into_iter().fold(first, |lhs, (op, rhs)| {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    })
}

fn p_term(input: &str) -> NomResult<Expr> {
    let operator = alt((
        map(tag("//"), |_| BinaryOp::FloorDiv),
        map(tag("*"), |_| BinaryOp::Mul),
        map(tag("/"), |_| BinaryOp::Div),
        map(tag("%"), |_| BinaryOp::Mod),
    ));
    let (input, first) = p_unary(input)?;
    let (input, rest) = many0(pair(operator, p_unary))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn p_expr(input: &str) -> NomResult<Expr> {
    let operator = alt((
        map(char('+'), |_| BinaryOp::Add),
        map(char('-'), |_| BinaryOp::Sub),
    ));
    let (input, first) = p_term(input)?;
    let (input, rest) = many0(pair(operator, p_term))(input)?;
    Ok((input, fold_binary(first, rest)))
}

// Evaluation

type EvalResult = Result<Value, String>;

fn evaluate(expr: &Expr, scope: &dyn Scope) -> EvalResult {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Name(name) => scope
            .lookup(name)
            .ok_or_else(|| format!("unknown name `{name}`")),
        Expr::Unary(op, operand) => {
            let value = evaluate(operand, scope)?;
            match (op, value) {
                (UnaryOp::Pos, value @ (Value::Int(_) | Value::Float(_))) => Ok(value),
                (UnaryOp::Neg, Value::Int(value)) => Ok(value
                    .checked_neg()
                    .map(Value::Int)
                    .unwrap_or(Value::Float(-(value as f64)))),
                (UnaryOp::Neg, Value::Float(value)) => Ok(Value::Float(-value)),
                (_, value) => Err(format!("bad operand type for unary operator: {}", value.type_name())),
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let lhs = evaluate(lhs, scope)?;
            let rhs = evaluate(rhs, scope)?;
            evaluate_binary(*op, lhs, rhs)
        }
        Expr::Call(name, args) => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            call_function(name, args)
        }
    }
}

/// `None` when the quotient does not fit into `i64` (or `rhs` is zero).
fn python_floor_div(lhs: i64, rhs: i64) -> Option<i64> {
    let quotient = lhs.checked_div(rhs)?;
    if lhs.checked_rem(rhs)? != 0 && ((lhs < 0) != (rhs < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

fn python_mod_int(lhs: i64, rhs: i64) -> Option<i64> {
    let remainder = lhs.checked_rem(rhs)?;
    if remainder != 0 && ((remainder < 0) != (rhs < 0)) {
        Some(remainder + rhs)
    } else {
        Some(remainder)
    }
}

fn python_mod_float(lhs: f64, rhs: f64) -> f64 {
    let remainder = lhs % rhs;
    if remainder != 0.0 && ((remainder < 0.0) != (rhs < 0.0)) {
        remainder + rhs
    } else {
        remainder
    }
}

fn evaluate_binary(op: BinaryOp, lhs: Value, rhs: Value) -> EvalResult {
    use Value::{Float, Int, Str};

    if let (BinaryOp::Add, Str(lhs), Str(rhs)) = (op, &lhs, &rhs) {
        return Ok(Str(format!("{lhs}{rhs}")));
    }

    let zero_division = || "division by zero".to_string();
    let overflow = || "integer overflow".to_string();

    if let (Int(a), Int(b)) = (&lhs, &rhs) {
        let (a, b) = (*a, *b);
        let checked = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div => None,
            BinaryOp::FloorDiv => {
                if b == 0 {
                    return Err(zero_division());
                }
                Some(python_floor_div(a, b).ok_or_else(overflow)?)
            }
            BinaryOp::Mod => {
                if b == 0 {
                    return Err(zero_division());
                }
                Some(python_mod_int(a, b).ok_or_else(overflow)?)
            }
            BinaryOp::Pow => u32::try_from(b).ok().and_then(|b| a.checked_pow(b)),
        };
        if let Some(value) = checked {
            return Ok(Int(value));
        }
    }

    let (a, b) = match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(format!(
                "unsupported operand types for {op:?}: {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ));
        }
    };
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(zero_division());
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(zero_division());
            }
            (a / b).floor()
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(zero_division());
            }
            python_mod_float(a, b)
        }
        BinaryOp::Pow => a.powf(b),
    };
    Ok(Float(value))
}

fn expect_number(function: &str, value: &Value) -> Result<f64, String> {
    value
        .as_f64()
        .ok_or_else(|| format!("{function}() expects a number, got {}", value.type_name()))
}

fn float_to_int(value: f64) -> Result<i64, String> {
    if value.is_finite() {
        Ok(value as i64)
    } else {
        Err(format!("cannot convert {} to integer", float_repr(value)))
    }
}

fn call_function(name: &str, args: Vec<Value>) -> EvalResult {
    match (name, args.as_slice()) {
        ("int", [Value::Int(value)]) => Ok(Value::Int(*value)),
        ("int", [Value::Float(value)]) => Ok(Value::Int(float_to_int(value.trunc())?)),
        ("int", [Value::Str(value)]) => value
            .trim()
            .parse()
            .map(Value::Int)
            .map_err(|_| format!("invalid literal for int(): '{value}'")),
        ("float", [Value::Str(value)]) => value
            .trim()
            .parse()
            .map(Value::Float)
            .map_err(|_| format!("could not convert string to float: '{value}'")),
        ("float", [value]) => Ok(Value::Float(expect_number(name, value)?)),
        ("round", [Value::Int(value)]) => Ok(Value::Int(*value)),
        ("round", [value]) => Ok(Value::Int(float_to_int(
            expect_number(name, value)?.round_ties_even(),
        )?)),
        ("round", [Value::Int(value), _]) => Ok(Value::Int(*value)),
        ("round", [value, Value::Int(digits)]) => {
            let factor = 10f64.powi(i32::try_from(*digits).map_err(|e| e.to_string())?);
            Ok(Value::Float(
                (expect_number(name, value)? * factor).round_ties_even() / factor,
            ))
        }
        ("abs", [Value::Int(value)]) => Ok(value
            .checked_abs()
            .map(Value::Int)
            .unwrap_or(Value::Float((*value as f64).abs()))),
        ("abs", [value]) => Ok(Value::Float(expect_number(name, value)?.abs())),
        ("min" | "max", [first, rest @ ..]) => {
            let mut best = first;
            let mut best_number = expect_number(name, first)?;
            for value in rest {
                let number = expect_number(name, value)?;
                let better = if name == "min" {
                    number < best_number
                } else {
                    number > best_number
                };
                if better {
                    best = value;
                    best_number = number;
                }
            }
            Ok(best.clone())
        }
        ("str", [value]) => Ok(Value::Str(value.to_string())),
        ("int" | "float" | "round" | "abs" | "min" | "max" | "str", _) => Err(format!(
            "{name}() called with wrong number or types of arguments ({})",
            args.len()
        )),
        _ => Err(format!("unknown function `{name}`")),
    }
}
