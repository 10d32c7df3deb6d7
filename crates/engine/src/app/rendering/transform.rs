use crate::app::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// World space is screen-like (y grows downward, one unit = one pixel); the
/// camera point lands on the viewport center.
pub fn world_to_screen_px(world: Vec2, camera: Vec2, viewport: Viewport) -> (i32, i32) {
    let x = world.x - camera.x + viewport.width as f32 * 0.5;
    let y = world.y - camera.y + viewport.height as f32 * 0.5;
    (x.round() as i32, y.round() as i32)
}
