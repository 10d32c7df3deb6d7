mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod view;

pub use input::InputAction;
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{world_to_screen_px, Renderer, Viewport};
pub use view::{
    DialogBoxView, Ending, Facing, FrameView, HudView, InputSnapshot, InventoryEntryView,
    QuestEntryView, QuizBoxView, Scene, SceneCommand, SpriteKind, SpriteView, TileGrid,
    TileGridError, Vec2, TILE_DOOR, TILE_FLOOR, TILE_PILLAR, TILE_WALL,
};
