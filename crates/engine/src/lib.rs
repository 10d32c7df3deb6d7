pub mod app;

pub use app::{
    run_app, run_app_with_metrics, world_to_screen_px, AppError, DialogBoxView, Ending, Facing,
    FrameView, HudView, InputAction, InputSnapshot, InventoryEntryView, LoopConfig,
    LoopMetricsSnapshot, MetricsHandle, QuestEntryView, QuizBoxView, Renderer, Scene, SceneCommand,
    SpriteKind, SpriteView, TileGrid, TileGridError, Vec2, Viewport, TILE_DOOR, TILE_FLOOR,
    TILE_PILLAR, TILE_WALL,
};
