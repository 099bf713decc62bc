//! Predicate: Boolean expressions over `DataInput`s
//!
//! A route's path, header and query-parameter conditions compile into one
//! [`Predicate`]. Header `invert_match` compiles to [`Predicate::Not`].

use crate::{DataInput, InputMatcher, MatchingData};
use std::fmt::Debug;

/// A single predicate: a [`DataInput`] paired with an [`InputMatcher`].
///
/// # INV: None → false
///
/// If the input returns [`MatchingData::None`], the predicate is `false`
/// regardless of the matcher. Wrapping in [`Predicate::Not`] is the only way
/// a missing value can satisfy a route.
pub struct SinglePredicate<Ctx> {
    input: Box<dyn DataInput<Ctx>>,
    matcher: Box<dyn InputMatcher>,
}

impl<Ctx> SinglePredicate<Ctx> {
    /// Create a new single predicate.
    #[must_use]
    pub fn new(input: Box<dyn DataInput<Ctx>>, matcher: Box<dyn InputMatcher>) -> Self {
        Self { input, matcher }
    }

    /// Evaluate this predicate against the given context.
    pub fn evaluate(&self, ctx: &Ctx) -> bool {
        match self.input.get(ctx) {
            MatchingData::None => false,
            data => self.matcher.matches(&data),
        }
    }
}

impl<Ctx> Debug for SinglePredicate<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinglePredicate")
            .field("input", &self.input)
            .field("matcher", &self.matcher)
            .finish()
    }
}

/// Composite predicate.
///
/// `And` short-circuits on the first `false`, in declaration order. Route
/// compilation relies on this: the path check runs first, then each header
/// matcher in the order written.
pub enum Predicate<Ctx> {
    /// A single predicate.
    Single(SinglePredicate<Ctx>),

    /// All predicates must match (logical AND).
    And(Vec<Predicate<Ctx>>),

    /// Inverts the inner predicate (logical NOT).
    Not(Box<Predicate<Ctx>>),
}

impl<Ctx> Predicate<Ctx> {
    /// Evaluate this predicate against the given context.
    pub fn evaluate(&self, ctx: &Ctx) -> bool {
        match self {
            Predicate::Single(p) => p.evaluate(ctx),
            Predicate::And(predicates) => predicates.iter().all(|p| p.evaluate(ctx)),
            Predicate::Not(p) => !p.evaluate(ctx),
        }
    }

    /// Compose predicates with AND semantics.
    ///
    /// - Empty → `catch_all`
    /// - Single → unwrapped
    /// - Multiple → `And(predicates)`
    #[must_use]
    pub fn from_all(mut predicates: Vec<Self>, catch_all: Self) -> Self {
        match predicates.len() {
            0 => catch_all,
            1 => predicates.pop().unwrap_or(catch_all),
            _ => Self::And(predicates),
        }
    }

    /// Wrap in `Not` when `invert` is set.
    #[must_use]
    pub fn inverted_if(self, invert: bool) -> Self {
        if invert {
            Self::Not(Box::new(self))
        } else {
            self
        }
    }
}

impl<Ctx> Debug for Predicate<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Single(p) => f.debug_tuple("Single").field(p).finish(),
            Predicate::And(ps) => f.debug_tuple("And").field(ps).finish(),
            Predicate::Not(p) => f.debug_tuple("Not").field(p).finish(),
        }
    }
}
