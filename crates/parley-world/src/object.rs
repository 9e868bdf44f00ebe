//! Game objects.

use parley_types::{ObjectId, ObjectTemplate, Portability, PropertyBag};

/// An object instance. Its location lives in the world's location index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameObject {
    /// Object id.
    pub id: ObjectId,
    /// Display name.
    pub name: String,
    /// Alternative names for argument matching.
    pub aliases: Vec<String>,
    /// Description.
    pub description: String,
    /// Bulk counted against carrying capacity.
    pub size: u32,
    /// Pick-up constraint.
    pub portability: Portability,
    /// Mutable properties.
    pub properties: PropertyBag,
}

impl GameObject {
    /// Instantiate from a template.
    pub fn from_template(template: &ObjectTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            aliases: template.aliases.clone(),
            description: template.description.clone(),
            size: template.size,
            portability: template.portability.clone(),
            properties: template.properties.clone(),
        }
    }

    /// Whether `word` names this object by id, name or alias, ignoring case.
    pub fn answers_to(&self, word: &str) -> bool {
        self.id.as_str().eq_ignore_ascii_case(word)
            || self.name.eq_ignore_ascii_case(word)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(word))
    }
}
