//! Rules
//!
//! Every calculator in this crate is a [`Rule`]: a value built once from its
//! rule-book section that maps one input to one verdict without side effects.

/// A deterministic rule evaluated against a single input.
pub trait Rule {
    /// What the rule is evaluated against
    type Input;

    /// What the rule produces
    type Output;

    /// Hard failures; soft problems are reported inside [`Rule::Output`]
    type Error;

    /// Evaluate the rule.
    ///
    /// # Errors
    ///
    /// Returns [`Rule::Error`] if the input cannot be evaluated at all.
    fn evaluate(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}
