//! The step compiler.
//!
//! A template element compiles once into a [`StepList`]: its tag plus an
//! ordered list of steps, one per attribute and child in document order. The
//! same step list is replayed for every instantiation, each replay building a
//! fresh node and fresh bindings.

mod attribute;
mod child;
mod for_each;
mod interpolate;
mod text;
mod two_way;

use std::rc::Rc;

use regex::Regex;

use crate::{
    config::Config,
    error::Result,
    markup::{parse_template, Element, Node},
    render::RenderState,
};

pub(crate) use interpolate::{Interpolation, Substitution};

pub type Step = Box<dyn Fn(RenderState) -> RenderState>;

/// The compiled form of one template element.
#[derive(educe::Educe)]
#[educe(Debug)]
pub struct StepList {
    tag: Rc<str>,
    #[educe(Debug(ignore))]
    steps: Vec<Step>,
}

impl StepList {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub(crate) fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// Compiles markup into step lists under one [`Config`].
#[derive(Debug)]
pub struct Compiler {
    config: Config,
    pattern: Regex,
}

impl Compiler {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let pattern = Regex::new(&format!(
            "(?s){}(.*?){}",
            regex::escape(&config.open_tag),
            regex::escape(&config.close_tag)
        ))?;
        Ok(Self { config, pattern })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse `markup` and compile its root element.
    pub fn compile_str(&self, markup: &str) -> Result<Rc<StepList>> {
        self.compile(&parse_template(markup)?)
    }

    pub fn compile(&self, element: &Element) -> Result<Rc<StepList>> {
        let mut steps: Vec<Step> = Vec::new();
        let mut is_loop = false;

        for attr in &element.attributes {
            match self.config.directive(&attr.name) {
                Some("for") => {
                    is_loop = true;
                    steps.push(for_each::compile(self, attr, element)?);
                }
                Some("attr") => steps.push(attribute::toggle(self, attr)),
                Some("bind") => steps.push(two_way::compile(self, attr)?),
                Some(name) => steps.push(attribute::dynamic(self, name, &attr.value)),
                None => steps.push(attribute::plain(self, attr)),
            }
        }

        // A loop element's children are its item template, not content.
        if !is_loop {
            for child in &element.children {
                steps.push(match child {
                    Node::Text(content) => text::compile(self, content),
                    Node::Element(child) => child::compile(self.compile(child)?),
                });
            }
        }

        tracing::trace!(tag = %element.tag, steps = steps.len(), "compiled element");
        Ok(Rc::new(StepList {
            tag: element.tag.as_str().into(),
            steps,
        }))
    }

    /// Split `template` into literal and expression segments, or `None` if it
    /// contains no expression.
    pub(crate) fn interpolation(&self, template: &str) -> Option<Interpolation> {
        Interpolation::parse(&self.pattern, template)
    }

    /// The text between the delimiters of a directive argument. Arguments
    /// without delimiters are used as they are.
    pub(crate) fn strip_tags<'a>(&self, argument: &'a str) -> &'a str {
        let argument = argument.trim();
        let argument = argument
            .strip_prefix(self.config.open_tag.as_str())
            .unwrap_or(argument);
        argument
            .strip_suffix(self.config.close_tag.as_str())
            .unwrap_or(argument)
            .trim()
    }
}
