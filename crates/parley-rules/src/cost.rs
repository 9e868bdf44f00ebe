//! Action point cost evaluation.
//!
//! Costs never fail: unreadable inputs fall back to the term's declared
//! fallback, and all arithmetic saturates.

use parley_types::{CostExpr, CostTerm, PropertyValue};

use crate::predicate::EvalContext;

/// Cost of an action for the context's actor and bindings.
pub fn evaluate_cost(ctx: &EvalContext<'_>, cost: &CostExpr) -> u32 {
    match cost {
        CostExpr::Fixed(points) => *points,
        CostExpr::Computed(term) => evaluate_term(ctx, term),
    }
}

fn evaluate_term(ctx: &EvalContext<'_>, term: &CostTerm) -> u32 {
    match term {
        CostTerm::Constant { value } => *value,
        CostTerm::Property {
            subject,
            key,
            fallback,
            base,
            multiplier,
        } => {
            let value = ctx
                .resolve(subject)
                .ok()
                .and_then(|entity| ctx.world.properties(&entity).and_then(|p| p.get(key)))
                .and_then(PropertyValue::as_int)
                .and_then(|v| u32::try_from(v).ok());
            value.map_or(*fallback, |v| base.saturating_add(multiplier.saturating_mul(v)))
        }
        CostTerm::Sum { terms } => terms
            .iter()
            .fold(0_u32, |total, t| total.saturating_add(evaluate_term(ctx, t))),
        CostTerm::Max { terms } => terms.iter().map(|t| evaluate_term(ctx, t)).max().unwrap_or(0),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parley_types::{ObjectId, PlayerId, Scenario};
    use parley_world::World;

    use super::*;
    use crate::binding::{Bindings, Bound};
    use crate::vocabulary::Vocabulary;

    const SCENARIO: &str = r"
rooms:
  - { id: hall, name: Hall }
players:
  - { id: alice, name: Alice, room: hall }
objects:
  - id: anvil
    name: anvil
    location: room:hall
    properties: { weight: 4 }
";

    fn cost(yaml: &str) -> u32 {
        let scenario: Scenario = serde_yml::from_str(SCENARIO).unwrap();
        let world = World::from_scenario(&scenario, 10).unwrap();
        let actor = PlayerId::new("alice");
        let vocabulary = Vocabulary::new();
        let mut bindings = Bindings::empty();
        bindings.insert("item", Bound::Object(ObjectId::new("anvil")));
        let ctx = EvalContext::new(&world, &actor, &bindings, &vocabulary);
        evaluate_cost(&ctx, &serde_yml::from_str(yaml).unwrap())
    }

    #[test]
    fn fixed_cost() {
        assert_eq!(cost("7"), 7);
    }

    #[test]
    fn property_scaled_cost() {
        assert_eq!(cost("from: property\nsubject: param:item\nkey: weight\nbase: 1\nmultiplier: 2"), 9);
    }

    #[test]
    fn missing_property_uses_fallback() {
        assert_eq!(cost("from: property\nsubject: param:item\nkey: volume\nfallback: 3"), 3);
        assert_eq!(cost("from: property\nsubject: param:nothing\nkey: weight\nfallback: 5"), 5);
    }

    #[test]
    fn combinators() {
        let yaml = r"
from: max
terms:
  - { from: constant, value: 2 }
  - from: sum
    terms:
      - { from: constant, value: 1 }
      - { from: constant, value: 4 }
";
        assert_eq!(cost(yaml), 5);
    }
}
