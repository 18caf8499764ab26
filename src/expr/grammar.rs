//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::data::Value;
use crate::error::ExprError;
use crate::expr::ast::*;
use crate::expr::lexer::{self, Token};

/// Parse an expression source string
pub fn parse(input: &str) -> Result<Expr, Vec<ExprError>> {
    let lex_errors: Vec<ExprError> = lexer::lex(input)
        .filter(|(tok, _)| tok.is_err())
        .map(|(_, span)| {
            let found = input[span.clone()].to_string();
            ExprError::unexpected_character(span, found)
        })
        .collect();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }

    let len = input.len();

    let token_iter = lexer::lex(input)
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
        .map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Left-fold a chain of same-precedence operations
fn fold_binary((first, rest): (Expr, Vec<(BinaryOp, Expr)>)) -> Expr {
    rest.into_iter().fold(first, |left, (op, right)| Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let literal = select! {
            Token::Number(n) => Expr::Literal(Value::Number(n)),
            Token::String(s) => Expr::Literal(Value::String(s)),
            Token::True => Expr::Literal(Value::Bool(true)),
            Token::False => Expr::Literal(Value::Bool(false)),
            Token::Null => Expr::Literal(Value::Null),
        };

        let identifier = select! {
            Token::Ident(s) => s,
        };

        let string_literal = select! {
            Token::String(s) => s,
        };

        // datum.field or datum["field with spaces"]
        let field = just(Token::Datum)
            .ignore_then(choice((
                just(Token::Dot).ignore_then(identifier.clone()),
                string_literal.delimited_by(just(Token::BracketOpen), just(Token::BracketClose)),
            )))
            .map(Expr::Field);

        let call = identifier
            .then(
                expr.clone()
                    .separated_by(just(Token::Comma))
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            )
            .try_map(|(name, args): (String, Vec<Expr>), span| {
                match Function::from_name(&name) {
                    Some(function) => Ok(Expr::Call { function, args }),
                    None => Err(Rich::custom(span, format!("Unknown function '{}'", name))),
                }
            });

        let atom = choice((
            literal,
            field,
            call,
            expr.clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ))
        .boxed();

        let unary = choice((
            just(Token::Minus).to(UnaryOp::Neg),
            just(Token::Bang).to(UnaryOp::Not),
        ))
        .repeated()
        .collect::<Vec<_>>()
        .then(atom)
        .map(|(ops, operand): (Vec<UnaryOp>, Expr)| {
            ops.into_iter().rev().fold(operand, |operand, op| Expr::Unary {
                op,
                operand: Box::new(operand),
            })
        })
        .boxed();

        let product = unary
            .clone()
            .then(
                choice((
                    just(Token::Star).to(BinaryOp::Mul),
                    just(Token::Slash).to(BinaryOp::Div),
                    just(Token::Percent).to(BinaryOp::Rem),
                ))
                .then(unary)
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(fold_binary)
            .boxed();

        let sum = product
            .clone()
            .then(
                choice((
                    just(Token::Plus).to(BinaryOp::Add),
                    just(Token::Minus).to(BinaryOp::Sub),
                ))
                .then(product)
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(fold_binary)
            .boxed();

        let comparison = sum
            .clone()
            .then(
                choice((
                    just(Token::LessOrEqual).to(BinaryOp::LessOrEqual),
                    just(Token::GreaterOrEqual).to(BinaryOp::GreaterOrEqual),
                    just(Token::Less).to(BinaryOp::Less),
                    just(Token::Greater).to(BinaryOp::Greater),
                ))
                .then(sum)
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(fold_binary)
            .boxed();

        let equality = comparison
            .clone()
            .then(
                choice((
                    just(Token::EqualEqual).to(BinaryOp::Equal),
                    just(Token::NotEqual).to(BinaryOp::NotEqual),
                ))
                .then(comparison)
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(fold_binary)
            .boxed();

        let conjunction = equality
            .clone()
            .then(
                just(Token::And)
                    .to(BinaryOp::And)
                    .then(equality)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(fold_binary)
            .boxed();

        let disjunction = conjunction
            .clone()
            .then(
                just(Token::Or)
                    .to(BinaryOp::Or)
                    .then(conjunction)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(fold_binary)
            .boxed();

        disjunction
            .then(
                just(Token::Question)
                    .ignore_then(expr.clone())
                    .then_ignore(just(Token::Colon))
                    .then(expr)
                    .or_not(),
            )
            .map(|(test, branches): (Expr, Option<(Expr, Expr)>)| match branches {
                Some((then, otherwise)) => Expr::Conditional {
                    test: Box::new(test),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                },
                None => test,
            })
            .boxed()
    })
}
