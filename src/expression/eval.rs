use std::{cmp::Ordering, rc::Rc};

use strand_reactive::{Model, Runtime, Value};
use thiserror::Error;

use super::{parse, BinaryOp, Expr, ParseError, UnaryOp};
use crate::scope::Scope;

/// What an expression is evaluated against: names resolve through `scope`
/// first, then the fields of `vm`. Observable reads are tracked on `runtime`.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    pub runtime: &'a Runtime,
    pub vm: &'a Model,
    pub scope: &'a Scope,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("`{0}` is not defined")]
    UnknownIdentifier(Rc<str>),

    #[error("cannot read `{0}` of null")]
    NotAnObject(Rc<str>),

    #[error("value is not callable")]
    NotCallable,

    #[error("invalid operands for `{0}`")]
    InvalidOperands(&'static str),

    #[error("expression is not assignable")]
    NotAssignable,
}

impl Env<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.scope
            .lookup(self.runtime, name)
            .or_else(|| self.vm.get(self.runtime, name))
    }
}

impl Expr {
    pub fn evaluate(&self, env: &Env<'_>) -> Result<Value, EvalError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Identifier(name) => env
                .lookup(name)
                .ok_or_else(|| EvalError::UnknownIdentifier(name.clone())),
            Expr::Member(object, name) => member(env, &object.evaluate(env)?, name),
            Expr::Index(object, key) => {
                let object = object.evaluate(env)?;
                index(env, &object, &key.evaluate(env)?)
            }
            Expr::Call(callee, args) => {
                let callee = callee.evaluate(env)?;
                let callback = callee.as_callback().ok_or(EvalError::NotCallable)?;
                let args = args
                    .iter()
                    .map(|arg| arg.evaluate(env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(callback.call(&args))
            }
            Expr::Unary(UnaryOp::Not, operand) => {
                Ok(Value::Bool(!operand.evaluate(env)?.is_truthy()))
            }
            Expr::Unary(UnaryOp::Neg, operand) => match operand.evaluate(env)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(EvalError::InvalidOperands("-")),
            },
            Expr::Binary(op, lhs, rhs) => {
                let lhs = lhs.evaluate(env)?;
                match op {
                    BinaryOp::And if !lhs.is_truthy() => Ok(lhs),
                    BinaryOp::Or if lhs.is_truthy() => Ok(lhs),
                    op => binary(*op, lhs, rhs.evaluate(env)?),
                }
            }
            Expr::Conditional(test, then, otherwise) => {
                if test.evaluate(env)?.is_truthy() {
                    then.evaluate(env)
                } else {
                    otherwise.evaluate(env)
                }
            }
        }
    }

    /// Write `value` to the place this expression names.
    ///
    /// Identifiers are written to the object layer or view model that defines
    /// them. Loop variables are read-only. The path leading to the place is
    /// read untracked.
    pub fn assign(&self, env: &Env<'_>, value: Value) -> Result<(), EvalError> {
        match self {
            Expr::Identifier(name) => match env.scope.owner(name) {
                Some(model) => {
                    model.set(name, value);
                    Ok(())
                }
                None if env.scope.defines(name) => Err(EvalError::NotAssignable),
                None => {
                    env.vm.set(name, value);
                    Ok(())
                }
            },
            Expr::Member(object, name) => {
                match env.runtime.untrack(|| object.evaluate(env))? {
                    Value::Object(model) => {
                        model.set(name, value);
                        Ok(())
                    }
                    Value::Null => Err(EvalError::NotAnObject(name.clone())),
                    _ => Err(EvalError::NotAssignable),
                }
            }
            Expr::Index(object, key) => {
                let (object, key) = env.runtime.untrack(|| {
                    Ok::<_, EvalError>((object.evaluate(env)?, key.evaluate(env)?))
                })?;
                match (object, key) {
                    (Value::List(list), Value::Number(n)) => {
                        let index = as_index(n).ok_or(EvalError::NotAssignable)?;
                        list.set(index, value);
                        Ok(())
                    }
                    (Value::Object(model), key) => {
                        model.set(&key.to_string(), value);
                        Ok(())
                    }
                    _ => Err(EvalError::NotAssignable),
                }
            }
            _ => Err(EvalError::NotAssignable),
        }
    }
}

fn member(env: &Env<'_>, object: &Value, name: &Rc<str>) -> Result<Value, EvalError> {
    match object {
        Value::Object(model) => Ok(model.get(env.runtime, name).unwrap_or_default()),
        Value::List(list) if &**name == "length" => Ok(list.len(env.runtime).into()),
        Value::String(s) if &**name == "length" => Ok(s.chars().count().into()),
        Value::Null => Err(EvalError::NotAnObject(name.clone())),
        _ => Ok(Value::Null),
    }
}

fn index(env: &Env<'_>, object: &Value, key: &Value) -> Result<Value, EvalError> {
    match (object, key) {
        (Value::List(list), Value::Number(n)) => Ok(as_index(*n)
            .and_then(|i| list.get(env.runtime, i))
            .unwrap_or_default()),
        (Value::String(s), Value::Number(n)) => Ok(as_index(*n)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::from(c.to_string()))
            .unwrap_or_default()),
        (object, key) => member(env, object, &key.to_string().into()),
    }
}

fn as_index(n: f64) -> Option<usize> {
    (n >= 0.0 && n.fract() == 0.0).then_some(n as usize)
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    let numbers = |f: fn(f64, f64) -> f64| match (&lhs, &rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
        _ => Err(EvalError::InvalidOperands(op.symbol())),
    };
    let compare = |f: fn(Ordering) -> bool| {
        let ordering = match (&lhs, &rhs) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => return Err(EvalError::InvalidOperands(op.symbol())),
        };
        Ok(Value::Bool(ordering.is_some_and(f)))
    };
    match op {
        BinaryOp::Or => Ok(if lhs.is_truthy() { lhs } else { rhs }),
        BinaryOp::And => Ok(if lhs.is_truthy() { rhs } else { lhs }),
        BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinaryOp::Ne => Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Lt => compare(Ordering::is_lt),
        BinaryOp::Le => compare(Ordering::is_le),
        BinaryOp::Gt => compare(Ordering::is_gt),
        BinaryOp::Ge => compare(Ordering::is_ge),
        BinaryOp::Add => match (&lhs, &rhs) {
            (Value::String(_), _) | (_, Value::String(_)) => Ok(format!("{lhs}{rhs}").into()),
            _ => numbers(|a, b| a + b),
        },
        BinaryOp::Sub => numbers(|a, b| a - b),
        BinaryOp::Mul => numbers(|a, b| a * b),
        BinaryOp::Div => numbers(|a, b| a / b),
        BinaryOp::Rem => numbers(|a, b| a % b),
    }
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "===",
            BinaryOp::Ne => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

/// A compiled embedded expression together with its source text.
///
/// Evaluation never fails outward: a malformed source or an evaluation error
/// yields `None`, the invalid result, which templates render as empty.
#[derive(Clone, Debug)]
pub struct Evaluator {
    source: Rc<str>,
    expr: Option<Rc<Expr>>,
}

impl Evaluator {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        Ok(Self {
            source: source.into(),
            expr: Some(Rc::new(parse(source)?)),
        })
    }

    /// Like [`Evaluator::new`], but a malformed source is reported and
    /// compiled to an evaluator that always yields the invalid result.
    pub fn lenient(source: &str) -> Self {
        Self::new(source).unwrap_or_else(|error| {
            tracing::warn!(source, %error, "invalid template expression");
            Self {
                source: source.into(),
                expr: None,
            }
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self) -> bool {
        self.expr.is_some()
    }

    pub fn evaluate(&self, env: &Env<'_>) -> Option<Value> {
        let expr = self.expr.as_ref()?;
        match expr.evaluate(env) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(source = %self.source, %error, "expression evaluation failed");
                None
            }
        }
    }

    pub fn assign(&self, env: &Env<'_>, value: Value) -> bool {
        let Some(expr) = &self.expr else {
            return false;
        };
        match expr.assign(env, value) {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(source = %self.source, %error, "assignment failed");
                false
            }
        }
    }
}
