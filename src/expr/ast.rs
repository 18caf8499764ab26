//! Syntax tree for channel expressions

use crate::data::Value;

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators, loosest binding last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

/// Built-in functions callable from expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Ceil,
    Exp,
    Floor,
    Log,
    Max,
    Min,
    Pow,
    Round,
    Sqrt,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Function> {
        Some(match name {
            "abs" => Function::Abs,
            "ceil" => Function::Ceil,
            "exp" => Function::Exp,
            "floor" => Function::Floor,
            "log" => Function::Log,
            "max" => Function::Max,
            "min" => Function::Min,
            "pow" => Function::Pow,
            "round" => Function::Round,
            "sqrt" => Function::Sqrt,
            _ => return None,
        })
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// `datum.field` or `datum["field"]`
    Field(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `test ? then : otherwise`
    Conditional {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// True when the expression never reads the row
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Literal(_) => true,
            Expr::Field(_) => false,
            Expr::Unary { operand, .. } => operand.is_constant(),
            Expr::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => test.is_constant() && then.is_constant() && otherwise.is_constant(),
            Expr::Call { args, .. } => args.iter().all(Expr::is_constant),
        }
    }

    /// Fields referenced anywhere in the expression, in order of first use
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Field(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Unary { operand, .. } => operand.collect_fields(out),
            Expr::Binary { left, right, .. } => {
                left.collect_fields(out);
                right.collect_fields(out);
            }
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                test.collect_fields(out);
                then.collect_fields(out);
                otherwise.collect_fields(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_fields(out);
                }
            }
        }
    }
}
