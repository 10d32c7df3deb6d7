use std::time::Duration;

use thiserror::Error;

use super::input::{ActionStates, InputAction};

/// Tile-type codes shared between world authoring and the renderer palette.
pub const TILE_FLOOR: u8 = 0;
pub const TILE_WALL: u8 = 1;
pub const TILE_PILLAR: u8 = 2;
pub const TILE_DOOR: u8 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    End(Ending),
}

/// Row-major tile grid. `tile_at` is bounds-checked; construction rejects a
/// tile buffer whose length does not match the declared dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileGridError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}

impl TileGrid {
    pub fn new(width: u32, height: u32, tiles: Vec<u8>) -> Result<Self, TileGridError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TileGridError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<u8> {
        self.index_of(x, y)
            .and_then(|index| self.tiles.get(index).copied())
    }
}

/// Per-tick input delivered to the scene. Movement directions are held state;
/// everything else is a pressed edge that fires for exactly one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
    interact_pressed: bool,
    attack_pressed: bool,
    continue_pressed: bool,
    choice_pressed: Option<u8>,
    inventory_toggle_pressed: bool,
    quests_toggle_pressed: bool,
    mute_toggle_pressed: bool,
    close_all_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        actions: ActionStates,
        interact_pressed: bool,
        attack_pressed: bool,
        continue_pressed: bool,
        choice_pressed: Option<u8>,
        inventory_toggle_pressed: bool,
        quests_toggle_pressed: bool,
        mute_toggle_pressed: bool,
        close_all_pressed: bool,
    ) -> Self {
        Self {
            actions,
            interact_pressed,
            attack_pressed,
            continue_pressed,
            choice_pressed,
            inventory_toggle_pressed,
            quests_toggle_pressed,
            mute_toggle_pressed,
            close_all_pressed,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_interact_pressed(mut self, pressed: bool) -> Self {
        self.interact_pressed = pressed;
        self
    }

    pub fn with_attack_pressed(mut self, pressed: bool) -> Self {
        self.attack_pressed = pressed;
        self
    }

    pub fn with_continue_pressed(mut self, pressed: bool) -> Self {
        self.continue_pressed = pressed;
        self
    }

    pub fn with_choice_pressed(mut self, choice: Option<u8>) -> Self {
        self.choice_pressed = choice;
        self
    }

    pub fn with_inventory_toggle_pressed(mut self, pressed: bool) -> Self {
        self.inventory_toggle_pressed = pressed;
        self
    }

    pub fn with_quests_toggle_pressed(mut self, pressed: bool) -> Self {
        self.quests_toggle_pressed = pressed;
        self
    }

    pub fn with_mute_toggle_pressed(mut self, pressed: bool) -> Self {
        self.mute_toggle_pressed = pressed;
        self
    }

    pub fn with_close_all_pressed(mut self, pressed: bool) -> Self {
        self.close_all_pressed = pressed;
        self
    }

    pub fn interact_pressed(&self) -> bool {
        self.interact_pressed
    }

    pub fn attack_pressed(&self) -> bool {
        self.attack_pressed
    }

    pub fn continue_pressed(&self) -> bool {
        self.continue_pressed
    }

    pub fn choice_pressed(&self) -> Option<u8> {
        self.choice_pressed
    }

    pub fn inventory_toggle_pressed(&self) -> bool {
        self.inventory_toggle_pressed
    }

    pub fn quests_toggle_pressed(&self) -> bool {
        self.quests_toggle_pressed
    }

    pub fn mute_toggle_pressed(&self) -> bool {
        self.mute_toggle_pressed
    }

    pub fn close_all_pressed(&self) -> bool {
        self.close_all_pressed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpriteKind {
    Player { facing: Facing, moving: bool },
    Npc,
    Item,
    Portal,
    Enemy {
        aggro: bool,
        aggro_radius: f32,
        health_fraction: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteView {
    pub kind: SpriteKind,
    pub position: Vec2,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudView {
    pub location: String,
    pub active_quests: usize,
    pub inventory_count: usize,
    pub health: u32,
    pub max_health: u32,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogBoxView {
    pub speaker: String,
    pub text: String,
    pub choices: Vec<String>,
    pub continue_hint: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizBoxView {
    pub question: String,
    pub answers: Vec<String>,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestEntryView {
    pub title: String,
    pub description: String,
    pub objectives: Vec<String>,
    pub progress: u32,
    pub required: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryEntryView {
    pub name: String,
    pub description: String,
}

/// Read-only per-frame snapshot handed to the renderer. The renderer must
/// never mutate simulation state; everything it needs is captured here.
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    pub map_name: &'a str,
    pub background: [u8; 4],
    pub grid: &'a TileGrid,
    pub tile_size: f32,
    pub camera: Vec2,
    pub sprites: Vec<SpriteView>,
    pub prompt: Option<String>,
    pub hud: HudView,
    pub dialog: Option<DialogBoxView>,
    pub quiz: Option<QuizBoxView>,
    pub notification: Option<String>,
    pub inventory_panel: Option<Vec<InventoryEntryView>>,
    pub quest_panel: Option<Vec<QuestEntryView>>,
}

pub trait Scene {
    fn load(&mut self);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        now: Duration,
        input: &InputSnapshot,
    ) -> SceneCommand;
    fn frame_view(&self) -> FrameView<'_>;
    fn window_title(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_grid_rejects_invalid_tile_count() {
        let err = TileGrid::new(2, 2, vec![0, 1, 2]).expect_err("err");
        assert_eq!(
            err,
            TileGridError::TileCountMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn tile_grid_indexing_and_bounds() {
        let grid = TileGrid::new(2, 2, vec![10, 11, 12, 13]).expect("grid");
        assert_eq!(grid.index_of(0, 0), Some(0));
        assert_eq!(grid.index_of(1, 1), Some(3));
        assert_eq!(grid.tile_at(0, 0), Some(10));
        assert_eq!(grid.tile_at(1, 1), Some(13));
        assert_eq!(grid.index_of(2, 0), None);
        assert_eq!(grid.index_of(0, 2), None);
        assert_eq!(grid.tile_at(2, 2), None);
    }

    #[test]
    fn snapshot_edges_default_to_released() {
        let snapshot = InputSnapshot::empty();
        assert!(!snapshot.interact_pressed());
        assert!(!snapshot.attack_pressed());
        assert!(!snapshot.continue_pressed());
        assert_eq!(snapshot.choice_pressed(), None);
        assert!(!snapshot.close_all_pressed());
    }

    #[test]
    fn snapshot_builder_round_trips_fields() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_interact_pressed(true)
            .with_choice_pressed(Some(2));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveRight));
        assert!(snapshot.interact_pressed());
        assert_eq!(snapshot.choice_pressed(), Some(2));
    }
}
