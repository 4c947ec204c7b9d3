use serde::{Deserialize, Serialize};

use kagura_module_api::{InputState, Vec2, Vec4};

use crate::game::Game;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Checks if a point is inside the rectangle.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonAction {
    StartGame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub rect: Rect,
    pub text: String,
    pub action: ButtonAction,
}

impl Button {
    /// Rough centering: the text renderer owns real metrics.
    pub fn label_position(&self) -> Vec2 {
        Vec2::new(
            self.rect.x + self.rect.width / 2.0 - self.text.len() as f32 * 6.0,
            self.rect.y + self.rect.height / 2.0 - 8.0,
        )
    }
}

const LABEL_COLOR: Vec4 = Vec4 {
    x: 1.0,
    y: 1.0,
    z: 1.0,
    w: 1.0,
};
const LABEL_FONT_SIZE: f32 = 24.0;

/// Button interaction and label drawing for the current frame. A state
/// change triggered by a click is queued and applied after iteration.
pub fn ui_system(game: &mut Game, input: &InputState) {
    let mut clicked = None;
    for button in game.buttons() {
        if input.mouse_clicked && button.rect.contains(input.mouse_pos) {
            clicked = Some(button.action.clone());
        }
    }

    let labels: Vec<(String, Vec2)> = game
        .buttons()
        .iter()
        .map(|b| (b.text.clone(), b.label_position()))
        .collect();
    for (text, position) in labels {
        game.queue_text(text, position, LABEL_FONT_SIZE, LABEL_COLOR);
    }

    if let Some(action) = clicked {
        match action {
            ButtonAction::StartGame => game.start_game(),
        }
    }
}
