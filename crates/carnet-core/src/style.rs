use crate::types::EntryVariant;
use serde::{Deserialize, Serialize};

/// Presentation of one entry variant in the graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeConfig {
    pub icon: String,
    pub color: String,
    /// Start and end stops of the node fill.
    pub gradient: (String, String),
    pub label: String,
}

/// Styling capability supplied by the host, so the renderer never decides
/// colours on its own.
pub trait TypeConfigProvider {
    fn type_config(&self, variant: EntryVariant) -> TypeConfig;
}

impl<F> TypeConfigProvider for F
where
    F: Fn(EntryVariant) -> TypeConfig,
{
    fn type_config(&self, variant: EntryVariant) -> TypeConfig {
        self(variant)
    }
}

/// The journal's stock palette.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeConfig;

impl TypeConfigProvider for DefaultTypeConfig {
    fn type_config(&self, variant: EntryVariant) -> TypeConfig {
        let (icon, color, from, to) = match variant {
            EntryVariant::Grace => ("✨", "#f59e0b", "#fde68a", "#f59e0b"),
            EntryVariant::Prayer => ("🙏", "#6366f1", "#c7d2fe", "#6366f1"),
            EntryVariant::Scripture => ("📖", "#10b981", "#a7f3d0", "#10b981"),
            EntryVariant::Word => ("🕊️", "#0ea5e9", "#bae6fd", "#0ea5e9"),
            EntryVariant::Encounter => ("🤝", "#ec4899", "#fbcfe8", "#ec4899"),
        };
        TypeConfig {
            icon: icon.to_string(),
            color: color.to_string(),
            gradient: (from.to_string(), to.to_string()),
            label: variant.label().to_string(),
        }
    }
}
