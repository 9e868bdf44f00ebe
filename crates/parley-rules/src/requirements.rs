//! Ordered requirement lists.
//!
//! Requirements are ANDed in declaration order and evaluation stops at the
//! first one that does not hold. The result names that requirement and
//! says why, so the actor learns exactly what blocked them.

use parley_types::{Fault, Requirement};

use crate::predicate::EvalContext;

/// The first requirement that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmet {
    /// Identity: declared id, `<index>:<kind>`, or `param:<name>`.
    pub requirement: String,
    /// Human-readable reason.
    pub reason: String,
}

impl Unmet {
    /// Build an unmet record.
    pub fn new(requirement: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            requirement: requirement.into(),
            reason: reason.into(),
        }
    }
}

impl From<Unmet> for Fault {
    fn from(unmet: Unmet) -> Self {
        Self::Requirement {
            requirement: unmet.requirement,
            reason: unmet.reason,
        }
    }
}

/// Identity reported for the requirement at `index`.
pub fn requirement_identity(index: usize, requirement: &Requirement) -> String {
    requirement
        .id
        .clone()
        .unwrap_or_else(|| format!("{index}:{}", requirement.check.kind_name()))
}

/// Check `requirements` in order.
///
/// # Errors
///
/// Returns the first requirement that does not hold. A declared `message`
/// replaces the generated reason.
pub fn check_requirements(ctx: &EvalContext<'_>, requirements: &[Requirement]) -> Result<(), Unmet> {
    for (index, requirement) in requirements.iter().enumerate() {
        if let Err(reason) = ctx.evaluate(&requirement.check) {
            return Err(Unmet {
                requirement: requirement_identity(index, requirement),
                reason: requirement.message.clone().unwrap_or(reason),
            });
        }
    }
    Ok(())
}
