//! Expression evaluation against a data row

use crate::data::{Datum, Value};
use crate::expr::ast::{BinaryOp, Expr, Function, UnaryOp};

impl Expr {
    /// Evaluate against a row
    ///
    /// Evaluation never fails: type mismatches yield `null` or `NaN` the
    /// way loosely typed expression languages do.
    pub fn eval(&self, datum: &Datum) -> Value {
        match self {
            Expr::Literal(value) => value.clone(),
            Expr::Field(name) => datum.get(name).cloned().unwrap_or_default(),
            Expr::Unary { op, operand } => {
                let value = operand.eval(datum);
                match op {
                    UnaryOp::Neg => number(value).map(|n| Value::Number(-n)).unwrap_or_default(),
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                }
            }
            Expr::Binary { op, left, right } => eval_binary(*op, left, right, datum),
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                if test.eval(datum).is_truthy() {
                    then.eval(datum)
                } else {
                    otherwise.eval(datum)
                }
            }
            Expr::Call { function, args } => {
                let args: Vec<Option<f64>> = args.iter().map(|a| number(a.eval(datum))).collect();
                call(*function, &args).map(Value::Number).unwrap_or_default()
            }
        }
    }
}

fn number(value: Value) -> Option<f64> {
    match value {
        Value::Null => None,
        other => other.as_number(),
    }
}

fn eval_binary(op: BinaryOp, left: &Expr, right: &Expr, datum: &Datum) -> Value {
    // Short-circuit operators return one of their operands
    match op {
        BinaryOp::And => {
            let l = left.eval(datum);
            return if l.is_truthy() { right.eval(datum) } else { l };
        }
        BinaryOp::Or => {
            let l = left.eval(datum);
            return if l.is_truthy() { l } else { right.eval(datum) };
        }
        _ => {}
    }

    let l = left.eval(datum);
    let r = right.eval(datum);

    match op {
        BinaryOp::Add => match (&l, &r) {
            (Value::String(a), b) => Value::String(format!("{}{}", a, b)),
            (a, Value::String(b)) => Value::String(format!("{}{}", a, b)),
            _ => arithmetic(l, r, |a, b| a + b),
        },
        BinaryOp::Sub => arithmetic(l, r, |a, b| a - b),
        BinaryOp::Mul => arithmetic(l, r, |a, b| a * b),
        BinaryOp::Div => arithmetic(l, r, |a, b| a / b),
        BinaryOp::Rem => arithmetic(l, r, |a, b| a % b),
        BinaryOp::Equal => Value::Bool(l == r),
        BinaryOp::NotEqual => Value::Bool(l != r),
        BinaryOp::Less => compare(&l, &r, |o| o.is_lt()),
        BinaryOp::LessOrEqual => compare(&l, &r, |o| o.is_le()),
        BinaryOp::Greater => compare(&l, &r, |o| o.is_gt()),
        BinaryOp::GreaterOrEqual => compare(&l, &r, |o| o.is_ge()),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn arithmetic(l: Value, r: Value, f: impl Fn(f64, f64) -> f64) -> Value {
    match (number(l), number(r)) {
        (Some(a), Some(b)) => Value::Number(f(a, b)),
        _ => Value::Null,
    }
}

fn compare(l: &Value, r: &Value, test: impl Fn(std::cmp::Ordering) -> bool) -> Value {
    let ordering = match (l, r) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (l.as_number(), r.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    Value::Bool(ordering.map(test).unwrap_or(false))
}

fn call(function: Function, args: &[Option<f64>]) -> Option<f64> {
    let arg = |i: usize| args.get(i).copied().flatten();
    Some(match function {
        Function::Abs => arg(0)?.abs(),
        Function::Ceil => arg(0)?.ceil(),
        Function::Exp => arg(0)?.exp(),
        Function::Floor => arg(0)?.floor(),
        Function::Log => arg(0)?.ln(),
        Function::Round => arg(0)?.round(),
        Function::Sqrt => arg(0)?.sqrt(),
        Function::Pow => arg(0)?.powf(arg(1)?),
        Function::Max => args
            .iter()
            .copied()
            .collect::<Option<Vec<f64>>>()?
            .into_iter()
            .reduce(f64::max)?,
        Function::Min => args
            .iter()
            .copied()
            .collect::<Option<Vec<f64>>>()?
            .into_iter()
            .reduce(f64::min)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::data::{Datum, Value};
    use crate::expr::parse;

    fn eval(source: &str, datum: &Datum) -> Value {
        parse(source).unwrap().eval(datum)
    }

    fn row() -> Datum {
        let mut datum = Datum::new();
        datum.insert("a".into(), Value::Number(4.0));
        datum.insert("name".into(), Value::String("gene".into()));
        datum
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("datum.a * 2 + 1", &row()), Value::Number(9.0));
        assert_eq!(eval("-datum.a", &row()), Value::Number(-4.0));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            eval("datum.name + '-' + datum.a", &row()),
            Value::String("gene-4".into())
        );
    }

    #[test]
    fn test_missing_field_is_null_and_propagates() {
        assert_eq!(eval("datum.missing", &row()), Value::Null);
        assert_eq!(eval("datum.missing * 2", &row()), Value::Null);
    }

    #[test]
    fn test_logic_returns_operands() {
        assert_eq!(eval("datum.missing || 7", &row()), Value::Number(7.0));
        assert_eq!(eval("!datum.a", &row()), Value::Bool(false));
        assert_eq!(eval("datum.a >= 4 && datum.a < 5", &row()), Value::Bool(true));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("max(1, datum.a, 3)", &row()), Value::Number(4.0));
        assert_eq!(eval("pow(2, 3)", &row()), Value::Number(8.0));
        assert_eq!(eval("sqrt(datum.name)", &row()), Value::Null);
    }
}
