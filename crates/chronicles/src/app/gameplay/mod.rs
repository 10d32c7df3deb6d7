use std::collections::HashMap;
use std::time::Duration;

use engine::{
    DialogBoxView, Ending, Facing, FrameView, HudView, InputAction, InputSnapshot,
    InventoryEntryView, QuestEntryView, QuizBoxView, Scene, SceneCommand, SpriteKind, SpriteView,
    TileGrid, TileGridError, Vec2, TILE_DOOR, TILE_FLOOR, TILE_PILLAR, TILE_WALL,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

const PLAYER_SPEED_UNITS_PER_SECOND: f32 = 180.0;
const PLAYER_MAX_HEALTH: u32 = 100;
const PLAYER_ATTACK_RANGE_UNITS: f32 = 60.0;
const PLAYER_ATTACK_DAMAGE: u32 = 25;
const ENEMY_CONTACT_DAMAGE: u32 = 10;
const ENEMY_KILL_SCORE: u32 = 100;
const NPC_INTERACT_RADIUS_UNITS: f32 = 60.0;
const ITEM_INTERACT_RADIUS_UNITS: f32 = 50.0;
const PORTAL_INTERACT_RADIUS_UNITS: f32 = 50.0;
const INTERACT_DEBOUNCE: Duration = Duration::from_millis(500);
const FOOTSTEP_INTERVAL: Duration = Duration::from_millis(300);
const QUIZ_RETRY_LOCKOUT: Duration = Duration::from_millis(1500);
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);
const ENEMY_ATTACK_COOLDOWN: Duration = Duration::from_secs(1);
const DIALOG_NARRATION_RATE: f32 = 0.95;
const DIALOG_NARRATION_PITCH: f32 = 1.1;

include!("types.rs");
include!("content.rs");
include!("world.rs");
include!("ledger.rs");
include!("util.rs");
include!("systems.rs");
include!("scene_state.rs");
include!("scene_impl.rs");

pub(crate) fn build_scene() -> Result<GameScene, ContentError> {
    let world = load_world()?;
    Ok(GameScene::new(
        world,
        Box::new(LogAudioSink::default()),
        StdRng::from_entropy(),
    ))
}
