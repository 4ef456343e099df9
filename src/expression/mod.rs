//! The template expression language.
//!
//! Embedded expressions and directive arguments are parsed once, at compile
//! time, into an [`Expr`] tree and evaluated by walking it against a
//! [`Scope`](crate::Scope) chain and the view model. Every observable read made
//! during evaluation goes through the runtime, so the binding being
//! established subscribes to exactly what the expression touched.

mod eval;
mod lexer;
mod parser;

use std::rc::Rc;

use strand_reactive::Value;
use thiserror::Error;

pub use eval::{Env, EvalError, Evaluator};
pub use parser::parse;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} at byte {offset}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Identifier(Rc<str>),
    /// `object.name`
    Member(Box<Expr>, Rc<str>),
    /// `object[index]`
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `test ? then : otherwise`
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}
