//! Arithmetic expression evaluator for the `calculate` tool.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := atom ('**' unary)?
//! atom    := number | name | name '(' args ')' | '(' expr ')'
//! ```
//!
//! `**` is right-associative and binds tighter than unary minus, so `-2**2`
//! is `-4`. `%` takes the sign of the divisor.

use std::f64::consts::{E, PI};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // exponent: 1e3, 2.5E-4
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid syntax: bad number '{text}'"))?;
                tokens.push(Token::Num(value));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Op("**"));
                i += 2;
            }
            '+' | '-' | '*' | '/' | '%' => {
                let op = match c {
                    '+' => "+",
                    '-' => "-",
                    '*' => "*",
                    '/' => "/",
                    _ => "%",
                };
                tokens.push(Token::Op(op));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            other => return Err(format!("Unsupported operator: {other}")),
        }
    }
    Ok(tokens)
}

/// Nesting limit for parentheses, unary signs and exponents.
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn eat_op(&mut self, ops: &[&str]) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut acc = self.term()?;
        while let Some(op) = self.eat_op(&["+", "-"]) {
            let rhs = self.term()?;
            acc = if op == "+" { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut acc = self.unary()?;
        while let Some(op) = self.eat_op(&["*", "/", "%"]) {
            let rhs = self.unary()?;
            acc = match op {
                "*" => acc * rhs,
                "/" if rhs == 0.0 => return Err("Division by zero".into()),
                "/" => acc / rhs,
                _ if rhs == 0.0 => return Err("Division by zero".into()),
                _ => acc - rhs * (acc / rhs).floor(),
            };
        }
        Ok(acc)
    }

    // Every recursive path passes through here.
    fn unary(&mut self) -> Result<f64, String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("Expression too deeply nested".into());
        }
        let value = match self.eat_op(&["+", "-"]) {
            Some("-") => self.unary().map(|v| -v),
            Some(_) => self.unary(),
            None => self.power(),
        };
        self.depth -= 1;
        value
    }

    fn power(&mut self) -> Result<f64, String> {
        let base = self.atom()?;
        if self.eat_op(&["**"]).is_some() {
            let exp = self.unary()?;
            if base == 0.0 && exp < 0.0 {
                return Err("Division by zero".into());
            }
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64, String> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let v = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(v),
                    _ => Err("Invalid syntax: expected ')'".into()),
                }
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let args = self.args()?;
                    call(&name, &args)
                } else {
                    match name.as_str() {
                        "pi" => Ok(PI),
                        "e" => Ok(E),
                        _ => Err(format!("Unknown variable: {name}")),
                    }
                }
            }
            Some(other) => Err(format!("Invalid syntax: unexpected {other:?}")),
            None => Err("Invalid syntax: unexpected end of expression".into()),
        }
    }

    fn args(&mut self) -> Result<Vec<f64>, String> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                _ => return Err("Invalid syntax: expected ',' or ')'".into()),
            }
        }
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64, String> {
    let one = |f: fn(f64) -> f64| match args {
        [x] => Ok(f(*x)),
        _ => Err(format!("{name}() takes exactly one argument ({} given)", args.len())),
    };
    match name {
        "sin" => one(f64::sin),
        "cos" => one(f64::cos),
        "tan" => one(f64::tan),
        "asin" => one(f64::asin),
        "acos" => one(f64::acos),
        "atan" => one(f64::atan),
        "sqrt" => one(f64::sqrt),
        "exp" => one(f64::exp),
        "abs" => one(f64::abs),
        "floor" => one(f64::floor),
        "ceil" => one(f64::ceil),
        "log10" => one(f64::log10),
        "log" => match args {
            [x] => Ok(x.ln()),
            [x, base] => Ok(x.ln() / base.ln()),
            _ => Err(format!("log() takes 1 or 2 arguments ({} given)", args.len())),
        },
        "pow" => match args {
            [x, y] => Ok(x.powf(*y)),
            _ => Err(format!("pow() takes exactly 2 arguments ({} given)", args.len())),
        },
        "round" => match args {
            [x] => Ok(round_half_even(*x)),
            [x, digits] => {
                let factor = 10f64.powi(*digits as i32);
                Ok(round_half_even(x * factor) / factor)
            }
            _ => Err(format!("round() takes 1 or 2 arguments ({} given)", args.len())),
        },
        _ => Err(format!("Unsupported function: {name}")),
    }
}

fn round_half_even(x: f64) -> f64 {
    let r = x.round();
    if (x - x.trunc()).abs() == 0.5 && r % 2.0 != 0.0 {
        r - x.signum()
    } else {
        r
    }
}

/// Evaluate `input`; errors are user-facing messages.
pub fn evaluate(input: &str) -> Result<f64, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("Invalid syntax: empty expression".into());
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err("Invalid syntax: unexpected trailing input".into());
    }
    if value.is_nan() {
        return Err("math domain error".into());
    }
    if value.is_infinite() {
        return Err("Numerical result out of range".into());
    }
    Ok(value)
}

/// JSON number for a result: integral values within f64's exact range become integers.
pub fn to_json_number(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        serde_json::Value::from(value as i64)
    } else {
        serde_json::Value::from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str) -> f64 {
        evaluate(s).unwrap()
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval("sqrt(16) + 5 * 2"), 14.0);
        assert_eq!(eval("2 ** 3 ** 2"), 512.0);
        assert_eq!(eval("-2 ** 2"), -4.0);
        assert_eq!(eval("(1 + 2) * -3"), -9.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("1.5e2 / 3"), 50.0);
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        assert_eq!(eval("7 % 3"), 1.0);
        assert_eq!(eval("-7 % 3"), 2.0);
        assert_eq!(eval("7 % -3"), -2.0);
    }

    #[test]
    fn functions_and_constants() {
        assert!((eval("sin(pi / 2)") - 1.0).abs() < 1e-12);
        assert!((eval("log(e)") - 1.0).abs() < 1e-12);
        assert_eq!(eval("log(8, 2)"), 3.0);
        assert_eq!(eval("pow(2, 10)"), 1024.0);
        assert_eq!(eval("round(2.5)"), 2.0);
        assert_eq!(eval("round(3.14159, 2)"), 3.14);
        assert_eq!(eval("abs(floor(-1.5))"), 2.0);
    }

    #[test]
    fn errors_are_reported() {
        assert_eq!(evaluate("1 / 0").unwrap_err(), "Division by zero");
        assert_eq!(evaluate("5 % 0").unwrap_err(), "Division by zero");
        assert_eq!(evaluate("x + 1").unwrap_err(), "Unknown variable: x");
        assert_eq!(
            evaluate("__import__(1)").unwrap_err(),
            "Unsupported function: __import__"
        );
        assert_eq!(evaluate("sqrt(-1)").unwrap_err(), "math domain error");
        assert!(evaluate("2 ^ 3").unwrap_err().contains("Unsupported operator"));
        assert!(evaluate("(1 + 2").unwrap_err().starts_with("Invalid syntax"));
        assert!(evaluate("").unwrap_err().starts_with("Invalid syntax"));
    }

    #[test]
    fn deep_nesting_is_an_error_not_a_crash() {
        let parens = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        assert_eq!(evaluate(&parens).unwrap_err(), "Expression too deeply nested");
        let signs = format!("{}1", "-".repeat(200_000));
        assert_eq!(evaluate(&signs).unwrap_err(), "Expression too deeply nested");
        let powers = format!("2{}", " ** 1".repeat(5_000));
        assert_eq!(evaluate(&powers).unwrap_err(), "Expression too deeply nested");
        assert_eq!(eval(&format!("{}1{}", "(".repeat(100), ")".repeat(100))), 1.0);
        assert_eq!(eval(&format!("{}1", "-".repeat(100))), 1.0);
    }

    #[test]
    fn integral_results_are_json_integers() {
        assert_eq!(to_json_number(14.0), serde_json::json!(14));
        assert_eq!(to_json_number(0.5), serde_json::json!(0.5));
    }
}
