//! Narrative text rendering via `minijinja`.
//!
//! Event and feedback templates see:
//!
//! - `actor`, `actor_id` -- the acting player's name and id
//! - `room` -- name of the actor's current room
//! - `args` -- raw invocation arguments
//! - `params` -- display name of every bound parameter, also exposed at the
//!   top level when the name does not clash with the keys above

use std::collections::BTreeMap;

use minijinja::{Environment, Value};
use parley_types::PlayerId;
use parley_world::World;
use tracing::warn;

use crate::binding::{Bindings, Bound};

const RESERVED: [&str; 4] = ["actor", "actor_id", "room", "args"];

/// Renders content templates against the current world.
pub struct TextRenderer {
    env: Environment<'static>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRenderer {
    /// Renderer with the default `minijinja` environment.
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Render `template` for `actor`.
    ///
    /// A template error is logged and the raw template text is returned.
    pub fn render(&self, template: &str, world: &World, actor: &PlayerId, bindings: &Bindings) -> String {
        if !template.contains("{{") && !template.contains("{%") {
            return template.to_owned();
        }
        let context = build_context(world, actor, bindings);
        match self.env.render_str(template, context) {
            Ok(text) => text,
            Err(e) => {
                warn!(actor = %actor, error = %e, "template rendering failed, using raw text");
                template.to_owned()
            }
        }
    }
}

fn build_context(world: &World, actor: &PlayerId, bindings: &Bindings) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();
    let player = world.player(actor);
    context.insert(
        "actor".to_owned(),
        Value::from(player.map_or_else(|| actor.to_string(), |p| p.name.clone())),
    );
    context.insert("actor_id".to_owned(), Value::from(actor.to_string()));
    let room = player
        .and_then(|p| world.room(p.room()))
        .map(|r| r.name.clone())
        .unwrap_or_default();
    context.insert("room".to_owned(), Value::from(room));
    context.insert("args".to_owned(), Value::from(bindings.raw().to_vec()));

    let mut params = BTreeMap::new();
    for (name, bound) in bindings.iter() {
        let display = match bound {
            Bound::Object(id) => world.object(id).map_or_else(|| id.to_string(), |o| o.name.clone()),
            Bound::Player(id) => world.player(id).map_or_else(|| id.to_string(), |p| p.name.clone()),
            Bound::Exit(text) | Bound::Text(text) => text.clone(),
        };
        if !RESERVED.contains(&name) {
            context.insert(name.to_owned(), Value::from(display.clone()));
        }
        params.insert(name.to_owned(), display);
    }
    context.insert("params".to_owned(), Value::from_serialize(&params));
    context
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parley_types::{ObjectId, Scenario};

    use super::*;

    const SCENARIO: &str = r"
rooms:
  - { id: hall, name: Great Hall }
players:
  - { id: alice, name: Alice, room: hall }
objects:
  - id: lamp
    name: brass lamp
    location: room:hall
";

    fn setup() -> (World, Bindings) {
        let scenario: Scenario = serde_yml::from_str(SCENARIO).unwrap();
        let world = World::from_scenario(&scenario, 10).unwrap();
        let mut bindings = Bindings::empty();
        bindings.insert("item", Bound::Object(ObjectId::new("lamp")));
        (world, bindings)
    }

    #[test]
    fn renders_actor_room_and_params() {
        let (world, bindings) = setup();
        let text = TextRenderer::new().render(
            "{{ actor }} picks up the {{ item }} in the {{ room }}.",
            &world,
            &PlayerId::new("alice"),
            &bindings,
        );
        assert_eq!(text, "Alice picks up the brass lamp in the Great Hall.");
    }

    #[test]
    fn broken_template_falls_back_to_raw_text() {
        let (world, bindings) = setup();
        let raw = "{{ actor ";
        let text = TextRenderer::new().render(raw, &world, &PlayerId::new("alice"), &bindings);
        assert_eq!(text, raw);
    }
}
