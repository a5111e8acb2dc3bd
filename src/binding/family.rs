//! Attribute Families (v0.1)
//!
//! A family is one kind of element state a template can bind: id, class,
//! text content, form value, checked state. Each family maps to exactly one
//! element property and one write convention through a fixed capability
//! table. Family order is fixed; it is the order bindings are discovered in.

use serde::Serialize;
use serde_json::Value;

use crate::config::BinderConfig;
use crate::dom::{Document, NodeId, Property};
use crate::util::{display_value, is_truthy};

/// How a family's value reaches the element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    /// Written as a markup attribute; falsy values remove the attribute
    Attribute,
    /// Written as a property; falsy values become the empty string
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Id,
    Class,
    Text,
    Value,
    Checked,
}

/// One row of the capability table
#[derive(Debug, Clone, Copy)]
pub struct Capability {
    pub family: Family,
    /// Marker attribute suffix (`data-tpl-<suffix>`)
    pub suffix: &'static str,
    pub property: Property,
    pub backing: Backing,
}

static CAPABILITIES: [Capability; 5] = [
    Capability {
        family: Family::Id,
        suffix: "id",
        property: Property::Id,
        backing: Backing::Attribute,
    },
    Capability {
        family: Family::Class,
        suffix: "class",
        property: Property::ClassName,
        backing: Backing::Property,
    },
    Capability {
        family: Family::Text,
        suffix: "text",
        property: Property::InnerHtml,
        backing: Backing::Property,
    },
    Capability {
        family: Family::Value,
        suffix: "value",
        property: Property::Value,
        backing: Backing::Attribute,
    },
    Capability {
        family: Family::Checked,
        suffix: "checked",
        property: Property::Checked,
        backing: Backing::Attribute,
    },
];

impl Family {
    /// Discovery order
    pub const ALL: [Family; 5] = [
        Family::Id,
        Family::Class,
        Family::Text,
        Family::Value,
        Family::Checked,
    ];

    pub fn capability(self) -> &'static Capability {
        &CAPABILITIES[self as usize]
    }

    pub fn suffix(self) -> &'static str {
        self.capability().suffix
    }

    pub fn property(self) -> Property {
        self.capability().property
    }

    pub fn backing(self) -> Backing {
        self.capability().backing
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.suffix() == suffix)
    }

    /// Markup attribute read when looking for a placeholder
    pub fn source_attribute(self) -> Option<&'static str> {
        self.property().attribute_name()
    }

    /// Write `value` to `node` following this family's convention.
    ///
    /// `None` (absent key) behaves like any falsy value.
    pub fn write(self, document: &mut Document, node: NodeId, value: Option<&Value>) {
        let capability = self.capability();
        let truthy = value.is_some_and(is_truthy);

        match capability.backing {
            Backing::Property => {
                let text = match value {
                    Some(value) if truthy => display_value(value),
                    _ => String::new(),
                };
                document.set_property(node, capability.property, &text);
            }
            Backing::Attribute => {
                let name = capability
                    .property
                    .attribute_name()
                    .unwrap_or(capability.suffix);
                match value {
                    Some(value) if truthy => {
                        document.set_attribute(node, name, &display_value(value));
                    }
                    _ => {
                        document.remove_attribute(node, name);
                    }
                }
                // Live state follows the markup attribute after a store write
                if let Some(element) = document.element_mut(node) {
                    element.reset_live(capability.property);
                }
            }
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Marker attribute names resolved once from a config
#[derive(Debug, Clone)]
pub struct Markers {
    unique: String,
    families: [String; 5],
}

impl Markers {
    pub fn new(config: &BinderConfig) -> Self {
        Self {
            unique: config.unique_attribute(),
            families: Family::ALL.map(|family| config.marker_attribute(family)),
        }
    }

    /// Attribute carrying the binder id
    pub fn unique(&self) -> &str {
        &self.unique
    }

    pub fn marker(&self, family: Family) -> &str {
        &self.families[family as usize]
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new(&BinderConfig::default())
    }
}
