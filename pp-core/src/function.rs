//! Functions that can be drawn as phase portraits.

use crate::{error::DomainError, special, sphere::ExtendedComplex};

/// A function on the Riemann sphere, sampled point by point.
///
/// Evaluation may fail with a `DomainError` at points where the function is undefined; such a
/// point is simply left out of the portrait. Evaluations must not depend on each other, since
/// points may be sampled in any order and from several threads.
pub trait PortraitFunction: Sync {
    /// Provides a descriptive name for this function, e.g. `zeta`.
    fn name(&self) -> &str;

    fn eval(&self, z: &ExtendedComplex) -> Result<ExtendedComplex, DomainError>;
}

/// A named closure.
pub struct FromFn<F> {
    name: String,
    f: F,
}

/// Wraps a closure as a `PortraitFunction`.
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FromFn<F>
where
    F: Fn(&ExtendedComplex) -> Result<ExtendedComplex, DomainError> + Sync,
{
    FromFn {
        name: name.into(),
        f,
    }
}

impl<F> PortraitFunction for FromFn<F>
where
    F: Fn(&ExtendedComplex) -> Result<ExtendedComplex, DomainError> + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn eval(&self, z: &ExtendedComplex) -> Result<ExtendedComplex, DomainError> {
        (self.f)(z)
    }
}

/// Function pointer for evaluating a builtin.
type EvalFn = fn(&ExtendedComplex) -> Result<ExtendedComplex, DomainError>;

const FUNCTIONS: &[(&'static str, EvalFn)] = &[
    ("identity", special::identity),
    ("inverse", special::inverse),
    ("exp", special::exp),
    ("log", special::ln),
    ("sqrt", special::sqrt),
    ("cos", special::cos),
    ("sin", special::sin),
    ("gamma", special::gamma),
    ("zeta", special::zeta),
];

/// One of the special functions shipped with the library.
#[derive(Copy, Clone, Debug)]
pub struct Builtin {
    name: &'static str,
    eval: EvalFn,
}

impl PortraitFunction for Builtin {
    fn name(&self) -> &str {
        self.name
    }

    fn eval(&self, z: &ExtendedComplex) -> Result<ExtendedComplex, DomainError> {
        (self.eval)(z)
    }
}

/// List the names of the builtin functions.
pub fn builtins() -> impl Iterator<Item = &'static str> {
    FUNCTIONS.iter().map(|(name, _)| *name)
}

/// Look up a builtin function by name.
pub fn builtin(name: &str) -> Option<Builtin> {
    // Linear scan, we don't have that many options:
    FUNCTIONS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|&(name, eval)| Builtin { name, eval })
}
