use std::{fmt::Write as _, rc::Rc};

use regex::Regex;
use strand_reactive::Value;

use crate::expression::{Env, Evaluator};

#[derive(Debug)]
enum Segment {
    Literal(Rc<str>),
    Expression(Evaluator),
}

/// Where an interpolated string ends up. Booleans substitute differently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Substitution {
    /// `true` substitutes the expression's own source text.
    Attribute,
    /// `true` substitutes `true`.
    Text,
}

/// A literal template with embedded expressions, compiled once.
#[derive(Debug)]
pub(crate) struct Interpolation {
    segments: Vec<Segment>,
}

impl Interpolation {
    pub(crate) fn parse(pattern: &Regex, template: &str) -> Option<Self> {
        let mut segments = Vec::new();
        let mut last = 0;
        for captures in pattern.captures_iter(template) {
            let (Some(whole), Some(source)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(template[last..whole.start()].into()));
            }
            segments.push(Segment::Expression(Evaluator::lenient(
                source.as_str().trim(),
            )));
            last = whole.end();
        }
        if segments.is_empty() {
            return None;
        }
        if last < template.len() {
            segments.push(Segment::Literal(template[last..].into()));
        }
        Some(Self { segments })
    }

    /// The evaluator, if the template is exactly one expression.
    pub(crate) fn single(&self) -> Option<&Evaluator> {
        match self.segments.as_slice() {
            [Segment::Expression(evaluator)] => Some(evaluator),
            _ => None,
        }
    }

    /// Evaluate every expression and substitute its textual form.
    ///
    /// `false`, null, functions and invalid results substitute nothing.
    pub(crate) fn render(&self, env: &Env<'_>, substitution: Substitution) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Expression(evaluator) => match evaluator.evaluate(env) {
                    None
                    | Some(Value::Null)
                    | Some(Value::Bool(false))
                    | Some(Value::Function(_)) => {}
                    Some(Value::Bool(true)) => match substitution {
                        Substitution::Attribute => out.push_str(evaluator.source()),
                        Substitution::Text => out.push_str("true"),
                    },
                    Some(value) => {
                        let _ = write!(out, "{value}");
                    }
                },
            }
        }
        out
    }
}
