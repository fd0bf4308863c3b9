use serde::Serialize;

/// Model id used when a creation request doesn't name one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// A selectable model, as shown in the new-session form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The fixed model catalog, in display order.
pub const MODEL_OPTIONS: &[ModelOption] = &[
    ModelOption {
        id: "claude-haiku-4-5",
        name: "Claude Haiku 4.5",
        description: "Fast and efficient",
    },
    ModelOption {
        id: "claude-sonnet-4-5",
        name: "Claude Sonnet 4.5",
        description: "Balanced performance",
    },
    ModelOption {
        id: "claude-opus-4-5",
        name: "Claude Opus 4.5",
        description: "Most capable",
    },
];

/// Look up a model by id.
pub fn find_model(id: &str) -> Option<&'static ModelOption> {
    MODEL_OPTIONS.iter().find(|m| m.id == id)
}

pub fn is_valid_model(id: &str) -> bool {
    find_model(id).is_some()
}
