//! Binding invocation arguments to world entities.
//!
//! Binding runs before any requirement. Object and player arguments are
//! resolved against the actor's surroundings; exit arguments keep their raw
//! text because deciding whether an exit exists is a predicate's job.

use std::collections::BTreeMap;

use parley_types::{
    ActionDefinition, Invocation, ObjectId, ObjectScope, ParamKind, ParamSpec, PlayerId,
};
use parley_world::World;

use crate::requirements::Unmet;

/// What one parameter resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    /// An object.
    Object(ObjectId),
    /// A player.
    Player(PlayerId),
    /// An exit name, unresolved.
    Exit(String),
    /// Free text.
    Text(String),
}

/// Parameter name to bound value, plus the raw argument text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, Bound>,
    raw: Vec<String>,
}

impl Bindings {
    /// No parameters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Bound> {
        self.values.get(name)
    }

    /// Bound parameters ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bound)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Raw argument text in positional order.
    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    /// Bind a value directly.
    pub fn insert(&mut self, name: impl Into<String>, value: Bound) {
        self.values.insert(name.into(), value);
    }
}

/// Resolve every argument of `invocation` for `actor`.
///
/// # Errors
///
/// Returns an [`Unmet`] with identity `param:<name>` for the first argument
/// that names nothing reachable.
pub fn bind(
    world: &World,
    actor: &PlayerId,
    definition: &ActionDefinition,
    invocation: &Invocation,
) -> Result<Bindings, Unmet> {
    let mut bindings = Bindings {
        values: BTreeMap::new(),
        raw: invocation.args.clone(),
    };
    for (spec, arg) in definition.params.iter().zip(&invocation.args) {
        let value = match spec.kind {
            ParamKind::Text => Bound::Text(arg.clone()),
            ParamKind::Exit => Bound::Exit(arg.clone()),
            ParamKind::Player => Bound::Player(find_player(world, spec, arg)?),
            ParamKind::Object => Bound::Object(find_object(world, actor, spec, arg)?),
        };
        bindings.values.insert(spec.name.clone(), value);
    }
    if let Some(missing) = definition
        .params
        .iter()
        .skip(invocation.args.len())
        .find(|p| !p.optional)
    {
        return Err(Unmet::new(
            format!("param:{}", missing.name),
            format!("missing argument '{}'", missing.name),
        ));
    }
    Ok(bindings)
}

fn find_player(world: &World, spec: &ParamSpec, arg: &str) -> Result<PlayerId, Unmet> {
    world
        .players()
        .filter(|p| p.is_active())
        .find(|p| p.id.as_str().eq_ignore_ascii_case(arg) || p.name.eq_ignore_ascii_case(arg))
        .map(|p| p.id.clone())
        .ok_or_else(|| {
            Unmet::new(
                format!("param:{}", spec.name),
                format!("there is no one called '{arg}'"),
            )
        })
}

fn find_object(
    world: &World,
    actor: &PlayerId,
    spec: &ParamSpec,
    arg: &str,
) -> Result<ObjectId, Unmet> {
    let not_found = |reason: String| Unmet::new(format!("param:{}", spec.name), reason);
    let Some(player) = world.player(actor) else {
        return Err(not_found(format!("unknown actor {actor}")));
    };
    let in_room = || {
        world
            .room(player.room())
            .and_then(|r| r.contents().iter().find(|id| matches(world, id, arg)).cloned())
    };
    let carried = || player.inventory().iter().find(|id| matches(world, id, arg)).cloned();

    let found = match spec.scope {
        ObjectScope::Room => in_room(),
        ObjectScope::Inventory => carried(),
        ObjectScope::Nearby => in_room().or_else(carried),
        ObjectScope::Anywhere => world.objects().find(|o| o.answers_to(arg)).map(|o| o.id.clone()),
    };
    found.ok_or_else(|| {
        not_found(match spec.scope {
            ObjectScope::Inventory => format!("you are not carrying '{arg}'"),
            ObjectScope::Anywhere => format!("there is no '{arg}'"),
            ObjectScope::Room | ObjectScope::Nearby => format!("you see no '{arg}' here"),
        })
    })
}

fn matches(world: &World, id: &ObjectId, arg: &str) -> bool {
    world.object(id).is_some_and(|o| o.answers_to(arg))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parley_types::Scenario;

    use super::*;

    const SCENARIO: &str = r"
rooms:
  - { id: hall, name: Hall }
  - { id: study, name: Study }
players:
  - { id: alice, name: Alice, room: hall }
  - { id: bob, name: Bob, room: study }
objects:
  - id: lamp
    name: brass lamp
    aliases: [lamp]
    location: room:hall
  - id: key
    name: key
    location: inventory:alice
  - id: book
    name: book
    location: room:study
actions:
  - verb: take
    params: [{ name: item, kind: object, scope: room }]
  - verb: drop
    params: [{ name: item, kind: object, scope: inventory }]
  - verb: tell
    params: [{ name: who, kind: player }, { name: message }]
";

    fn setup() -> (World, Scenario) {
        let scenario: Scenario = serde_yml::from_str(SCENARIO).unwrap();
        (World::from_scenario(&scenario, 10).unwrap(), scenario)
    }

    fn invocation(verb: &str, args: &[&str]) -> Invocation {
        Invocation {
            verb: verb.into(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
            line: 1,
            raw: String::new(),
        }
    }

    fn definition<'s>(scenario: &'s Scenario, verb: &str) -> &'s ActionDefinition {
        scenario.actions.iter().find(|a| a.verb.as_str() == verb).unwrap()
    }

    #[test]
    fn objects_resolve_by_name_or_alias_within_scope() {
        let (world, scenario) = setup();
        let alice = PlayerId::new("alice");
        let take = definition(&scenario, "take");
        let bindings = bind(&world, &alice, take, &invocation("take", &["LAMP"])).unwrap();
        assert_eq!(bindings.get("item"), Some(&Bound::Object(ObjectId::new("lamp"))));

        let unmet = bind(&world, &alice, take, &invocation("take", &["key"])).unwrap_err();
        assert_eq!(unmet.requirement, "param:item");

        let drop = definition(&scenario, "drop");
        assert!(bind(&world, &alice, drop, &invocation("drop", &["key"])).is_ok());
        let unmet = bind(&world, &alice, drop, &invocation("drop", &["book"])).unwrap_err();
        assert_eq!(unmet.reason, "you are not carrying 'book'");
    }

    #[test]
    fn players_resolve_anywhere_by_name() {
        let (world, scenario) = setup();
        let tell = definition(&scenario, "tell");
        let bindings = bind(
            &world,
            &PlayerId::new("alice"),
            tell,
            &invocation("tell", &["bob", "hello there"]),
        )
        .unwrap();
        assert_eq!(bindings.get("who"), Some(&Bound::Player(PlayerId::new("bob"))));
        assert_eq!(bindings.get("message"), Some(&Bound::Text("hello there".to_owned())));
        assert_eq!(bindings.raw().len(), 2);
    }
}
