use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Debug, Default, PartialEq, Eq)]
/// Status line shown next to a roulette.
pub struct DisplayText {
    /// The text content to render.
    pub content: String,
}

impl DisplayText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Replace the content, returning `true` if it changed.
    pub fn set_content(&mut self, new_content: &str) -> bool {
        if self.content == new_content {
            return false;
        }
        self.content.clear();
        self.content.push_str(new_content);
        true
    }
}
