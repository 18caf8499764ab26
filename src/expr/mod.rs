//! Expression language for computed channel values
//!
//! Channel definitions may compute their value with an expression such as
//! `datum.end - datum.start`. Expressions that never touch `datum` are folded
//! into constants when the accessor is built.

pub mod ast;
mod eval;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::parse;
