//! Selector Syntax
//!
//! A selector is written `name(argument?)`. Anything without parentheses
//! is a raw element reference.

use crate::error::{Result, TraitError};

/// Target of `sibling(...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiblingTarget {
    /// `sibling()`: the nearest preceding named sibling.
    Preceding,
    /// `sibling(x)`: the sibling named `x`.
    Named(String),
    /// `sibling(me())`: resolves to nothing.
    Me,
}

/// A parsed structural reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Me,
    Parent,
    Child(Option<String>),
    Sibling(SiblingTarget),
    Last,
    Screen,
    Strings,
    /// A plain element name, possibly partially qualified.
    Raw(String),
}

impl Selector {
    /// Parse selector text.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let bad = || TraitError::BadSelector(text.to_string());

        let Some(open) = text.find('(') else {
            if text.is_empty() || text.contains(')') {
                return Err(bad());
            }
            return Ok(Selector::Raw(text.to_string()));
        };
        let inner = text
            .get(open + 1..)
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(bad)?;
        let name = text.get(..open).unwrap_or_default().trim();
        let argument = unquote(inner.trim());

        let selector = match (name, argument) {
            ("me", None) => Selector::Me,
            ("parent", None) => Selector::Parent,
            ("last", None) => Selector::Last,
            ("screen", None) => Selector::Screen,
            ("strings", None) => Selector::Strings,
            ("child", argument) => Selector::Child(argument.map(str::to_string)),
            ("sibling", None) => Selector::Sibling(SiblingTarget::Preceding),
            ("sibling", Some(argument)) => match Selector::parse(argument) {
                Ok(Selector::Me) => Selector::Sibling(SiblingTarget::Me),
                Ok(Selector::Raw(sibling)) => Selector::Sibling(SiblingTarget::Named(sibling)),
                _ => return Err(bad()),
            },
            _ => return Err(bad()),
        };
        Ok(selector)
    }
}

/// Strip one pair of matching quotes; empty arguments become `None`.
fn unquote(argument: &str) -> Option<&str> {
    let argument = ['"', '\'']
        .iter()
        .find_map(|&quote| {
            argument
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(argument);
    (!argument.is_empty()).then_some(argument)
}
