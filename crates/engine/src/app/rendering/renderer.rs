use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{Facing, FrameView, SpriteKind, SpriteView, Vec2};
use crate::app::{TILE_DOOR, TILE_FLOOR, TILE_PILLAR, TILE_WALL};

use super::text::{
    draw_filled_rect, draw_rect_outline, draw_text, text_width_px, wrap_text, GLYPH_ADVANCE,
    LINE_ADVANCE, TEXT_SCALE,
};
use super::transform::{world_to_screen_px, Viewport};

const TILE_FLOOR_COLOR: [u8; 4] = [52, 73, 94, 255];
const TILE_WALL_COLOR: [u8; 4] = [127, 140, 141, 255];
const TILE_PILLAR_COLOR: [u8; 4] = [192, 57, 43, 255];
const TILE_DOOR_COLOR: [u8; 4] = [139, 69, 19, 255];
const TILE_UNKNOWN_COLOR: [u8; 4] = [68, 74, 62, 255];
const GRID_LINE_COLOR: [u8; 4] = [44, 62, 80, 255];

const PLAYER_COLOR: [u8; 4] = [231, 76, 60, 255];
const NPC_COLOR: [u8; 4] = [52, 152, 219, 255];
const ITEM_COLOR: [u8; 4] = [241, 196, 15, 255];
const PORTAL_COLOR: [u8; 4] = [155, 89, 182, 255];
const ENEMY_COLOR: [u8; 4] = [120, 40, 31, 255];
const ENEMY_AGGRO_RING_COLOR: [u8; 4] = [230, 126, 34, 255];
const FACING_TICK_COLOR: [u8; 4] = [44, 62, 80, 255];
const LABEL_COLOR: [u8; 4] = [244, 248, 252, 255];

const PLAYER_HALF_SIZE_PX: i32 = 12;
const NPC_HALF_SIZE_PX: i32 = 14;
const ITEM_HALF_SIZE_PX: i32 = 8;
const PORTAL_HALF_SIZE_PX: i32 = 10;
const ENEMY_HALF_SIZE_PX: i32 = 13;
const FACING_TICK_OFFSET_PX: i32 = 10;
const FACING_TICK_HALF_SIZE_PX: i32 = 3;
const LABEL_RAISE_PX: i32 = 8;
const HEALTH_BAR_RAISE_PX: i32 = 6;
const HEALTH_BAR_HEIGHT_PX: i32 = 3;
const HEALTH_BAR_BG_COLOR: [u8; 4] = [30, 30, 30, 255];
const HEALTH_BAR_FILL_COLOR: [u8; 4] = [46, 204, 113, 255];

const PANEL_BG_COLOR: [u8; 4] = [10, 12, 16, 235];
const PANEL_BORDER_COLOR: [u8; 4] = [92, 106, 126, 255];
const TEXT_PRIMARY_COLOR: [u8; 4] = [244, 248, 252, 255];
const TEXT_DIM_COLOR: [u8; 4] = [176, 198, 220, 255];
const TEXT_DONE_COLOR: [u8; 4] = [120, 220, 140, 255];
const PANEL_INSET_X: i32 = 4 * TEXT_SCALE;
const PANEL_INSET_Y: i32 = 3 * TEXT_SCALE;

const DIALOG_BOX_MARGIN_PX: i32 = 12;
const SIDE_PANEL_WIDTH_PX: i32 = 240;
const MAX_PANEL_ROWS: usize = 14;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);
        let pixels = Self::build_pixels(Arc::clone(&window), width, height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport { width, height },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render_frame(&mut self, view: &FrameView<'_>) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let viewport = self.viewport;
        let width = viewport.width;
        let height = viewport.height;
        let frame = self.pixels.frame_mut();

        clear_frame(frame, view.background);
        draw_tiles(frame, width, height, view, viewport);
        draw_sprites(frame, width, height, view, viewport);
        draw_hud(frame, width, height, view);
        if let Some(prompt) = &view.prompt {
            draw_prompt(frame, width, height, prompt);
        }
        let mut side_panel_top = DIALOG_BOX_MARGIN_PX;
        if let Some(entries) = &view.inventory_panel {
            let rows: Vec<(String, [u8; 4])> = entries
                .iter()
                .map(|entry| (entry.name.clone(), TEXT_PRIMARY_COLOR))
                .collect();
            side_panel_top =
                draw_side_panel(frame, width, height, side_panel_top, "EKWIPUNEK", &rows);
        }
        if let Some(entries) = &view.quest_panel {
            let wrap_chars =
                ((SIDE_PANEL_WIDTH_PX - PANEL_INSET_X * 2) / GLYPH_ADVANCE).max(8) as usize;
            let mut rows: Vec<(String, [u8; 4])> = Vec::new();
            for entry in entries {
                let title_color = if entry.completed {
                    TEXT_DONE_COLOR
                } else {
                    TEXT_PRIMARY_COLOR
                };
                rows.push((
                    format!("{} {}/{}", entry.title, entry.progress, entry.required),
                    title_color,
                ));
                for line in wrap_text(&entry.description, wrap_chars) {
                    rows.push((line, TEXT_DIM_COLOR));
                }
                for objective in &entry.objectives {
                    rows.push((format!("- {objective}"), TEXT_DIM_COLOR));
                }
            }
            draw_side_panel(frame, width, height, side_panel_top, "QUESTY", &rows);
        }
        if let Some(dialog) = &view.dialog {
            draw_dialog_box(frame, width, height, dialog);
        }
        if let Some(quiz) = &view.quiz {
            draw_quiz_box(frame, width, height, quiz);
        }
        if let Some(notification) = &view.notification {
            draw_notification(frame, width, height, notification);
        }

        self.pixels.render()
    }
}

fn clear_frame(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

fn tile_color(code: u8) -> [u8; 4] {
    match code {
        TILE_FLOOR => TILE_FLOOR_COLOR,
        TILE_WALL => TILE_WALL_COLOR,
        TILE_PILLAR => TILE_PILLAR_COLOR,
        TILE_DOOR => TILE_DOOR_COLOR,
        _ => TILE_UNKNOWN_COLOR,
    }
}

fn draw_tiles(frame: &mut [u8], width: u32, height: u32, view: &FrameView<'_>, viewport: Viewport) {
    let tile_size = view.tile_size.max(1.0);
    let tile_px = tile_size.round() as i32;

    for tile_y in 0..view.grid.height() {
        for tile_x in 0..view.grid.width() {
            let Some(code) = view.grid.tile_at(tile_x, tile_y) else {
                continue;
            };
            let world = Vec2 {
                x: tile_x as f32 * tile_size,
                y: tile_y as f32 * tile_size,
            };
            let (x, y) = world_to_screen_px(world, view.camera, viewport);
            if x + tile_px < 0 || y + tile_px < 0 || x >= width as i32 || y >= height as i32 {
                continue;
            }
            draw_filled_rect(frame, width, height, x, y, tile_px, tile_px, tile_color(code));
            if code == TILE_FLOOR {
                draw_rect_outline(frame, width, height, x, y, tile_px, tile_px, GRID_LINE_COLOR);
            }
        }
    }
}

fn draw_sprites(
    frame: &mut [u8],
    width: u32,
    height: u32,
    view: &FrameView<'_>,
    viewport: Viewport,
) {
    // Player is drawn last so it stays on top of overlapping markers.
    for sprite in view
        .sprites
        .iter()
        .filter(|sprite| !matches!(sprite.kind, SpriteKind::Player { .. }))
    {
        draw_sprite(frame, width, height, sprite, view.camera, viewport);
    }
    for sprite in view
        .sprites
        .iter()
        .filter(|sprite| matches!(sprite.kind, SpriteKind::Player { .. }))
    {
        draw_sprite(frame, width, height, sprite, view.camera, viewport);
    }
}

fn draw_sprite(
    frame: &mut [u8],
    width: u32,
    height: u32,
    sprite: &SpriteView,
    camera: Vec2,
    viewport: Viewport,
) {
    let (cx, cy) = world_to_screen_px(sprite.position, camera, viewport);
    let (half, color) = match &sprite.kind {
        SpriteKind::Player { .. } => (PLAYER_HALF_SIZE_PX, PLAYER_COLOR),
        SpriteKind::Npc => (NPC_HALF_SIZE_PX, NPC_COLOR),
        SpriteKind::Item => (ITEM_HALF_SIZE_PX, ITEM_COLOR),
        SpriteKind::Portal => (PORTAL_HALF_SIZE_PX, PORTAL_COLOR),
        SpriteKind::Enemy { .. } => (ENEMY_HALF_SIZE_PX, ENEMY_COLOR),
    };

    if let SpriteKind::Enemy {
        aggro: true,
        aggro_radius,
        ..
    } = sprite.kind
    {
        let ring = aggro_radius.round() as i32;
        draw_rect_outline(
            frame,
            width,
            height,
            cx - ring,
            cy - ring,
            ring * 2,
            ring * 2,
            ENEMY_AGGRO_RING_COLOR,
        );
    }

    draw_filled_rect(
        frame,
        width,
        height,
        cx - half,
        cy - half,
        half * 2,
        half * 2,
        color,
    );

    if let SpriteKind::Enemy {
        health_fraction, ..
    } = sprite.kind
    {
        let bar_width = half * 2;
        let filled = (bar_width as f32 * health_fraction.clamp(0.0, 1.0)).round() as i32;
        let bar_y = cy - half - HEALTH_BAR_RAISE_PX;
        draw_filled_rect(
            frame,
            width,
            height,
            cx - half,
            bar_y,
            bar_width,
            HEALTH_BAR_HEIGHT_PX,
            HEALTH_BAR_BG_COLOR,
        );
        draw_filled_rect(
            frame,
            width,
            height,
            cx - half,
            bar_y,
            filled,
            HEALTH_BAR_HEIGHT_PX,
            HEALTH_BAR_FILL_COLOR,
        );
    }

    if let SpriteKind::Player { facing, .. } = sprite.kind {
        let (dx, dy) = match facing {
            Facing::Up => (0, -FACING_TICK_OFFSET_PX),
            Facing::Down => (0, FACING_TICK_OFFSET_PX),
            Facing::Left => (-FACING_TICK_OFFSET_PX, 0),
            Facing::Right => (FACING_TICK_OFFSET_PX, 0),
        };
        draw_filled_rect(
            frame,
            width,
            height,
            cx + dx - FACING_TICK_HALF_SIZE_PX,
            cy + dy - FACING_TICK_HALF_SIZE_PX,
            FACING_TICK_HALF_SIZE_PX * 2,
            FACING_TICK_HALF_SIZE_PX * 2,
            FACING_TICK_COLOR,
        );
    }

    if let Some(label) = &sprite.label {
        let label_x = cx - text_width_px(label) / 2;
        let label_y = cy - half - LABEL_RAISE_PX - LINE_ADVANCE;
        draw_text(frame, width, height, label_x, label_y, label, LABEL_COLOR);
    }
}

fn draw_hud(frame: &mut [u8], width: u32, height: u32, view: &FrameView<'_>) {
    let hud = &view.hud;
    let lines = [
        hud.location.clone(),
        format!(
            "HP {}/{}  PTS {}  Q {}  INV {}",
            hud.health, hud.max_health, hud.score, hud.active_quests, hud.inventory_count
        ),
    ];
    let longest = lines
        .iter()
        .map(|line| text_width_px(line))
        .max()
        .unwrap_or(0);
    let panel_width = longest + PANEL_INSET_X * 2;
    let panel_height = lines.len() as i32 * LINE_ADVANCE + PANEL_INSET_Y * 2;
    draw_panel(frame, width, height, DIALOG_BOX_MARGIN_PX, DIALOG_BOX_MARGIN_PX, panel_width, panel_height);

    let mut y = DIALOG_BOX_MARGIN_PX + PANEL_INSET_Y;
    for line in &lines {
        draw_text(
            frame,
            width,
            height,
            DIALOG_BOX_MARGIN_PX + PANEL_INSET_X,
            y,
            line,
            TEXT_PRIMARY_COLOR,
        );
        y += LINE_ADVANCE;
    }
}

fn draw_prompt(frame: &mut [u8], width: u32, height: u32, prompt: &str) {
    let text_width = text_width_px(prompt);
    let x = (width as i32 - text_width) / 2;
    let y = height as i32 - LINE_ADVANCE * 2;
    draw_panel(
        frame,
        width,
        height,
        x - PANEL_INSET_X,
        y - PANEL_INSET_Y,
        text_width + PANEL_INSET_X * 2,
        LINE_ADVANCE + PANEL_INSET_Y * 2,
    );
    draw_text(frame, width, height, x, y, prompt, TEXT_PRIMARY_COLOR);
}

fn draw_notification(frame: &mut [u8], width: u32, height: u32, notification: &str) {
    let text_width = text_width_px(notification);
    let x = (width as i32 - text_width) / 2;
    let y = LINE_ADVANCE * 3;
    draw_panel(
        frame,
        width,
        height,
        x - PANEL_INSET_X,
        y - PANEL_INSET_Y,
        text_width + PANEL_INSET_X * 2,
        LINE_ADVANCE + PANEL_INSET_Y * 2,
    );
    draw_text(frame, width, height, x, y, notification, TEXT_PRIMARY_COLOR);
}

fn draw_dialog_box(
    frame: &mut [u8],
    width: u32,
    height: u32,
    dialog: &crate::app::DialogBoxView,
) {
    let box_width = width as i32 - DIALOG_BOX_MARGIN_PX * 2;
    let wrap_chars = ((box_width - PANEL_INSET_X * 2) / GLYPH_ADVANCE).max(8) as usize;
    let text_lines = wrap_text(&dialog.text, wrap_chars);

    let mut lines: Vec<(String, [u8; 4])> = Vec::new();
    lines.push((dialog.speaker.clone(), TEXT_DIM_COLOR));
    for line in text_lines {
        lines.push((line, TEXT_PRIMARY_COLOR));
    }
    for (index, choice) in dialog.choices.iter().enumerate() {
        lines.push((format!("{}) {}", index + 1, choice), TEXT_DIM_COLOR));
    }
    if dialog.continue_hint {
        lines.push(("ENTER >".to_string(), TEXT_DIM_COLOR));
    }

    let box_height = lines.len() as i32 * LINE_ADVANCE + PANEL_INSET_Y * 2;
    let x = DIALOG_BOX_MARGIN_PX;
    let y = height as i32 - box_height - DIALOG_BOX_MARGIN_PX;
    draw_panel(frame, width, height, x, y, box_width, box_height);

    let mut line_y = y + PANEL_INSET_Y;
    for (line, color) in &lines {
        draw_text(frame, width, height, x + PANEL_INSET_X, line_y, line, *color);
        line_y += LINE_ADVANCE;
    }
}

fn draw_quiz_box(frame: &mut [u8], width: u32, height: u32, quiz: &crate::app::QuizBoxView) {
    let box_width = width as i32 * 3 / 4;
    let wrap_chars = ((box_width - PANEL_INSET_X * 2) / GLYPH_ADVANCE).max(8) as usize;
    let question_lines = wrap_text(&quiz.question, wrap_chars);

    let answer_color = if quiz.locked {
        TEXT_DIM_COLOR
    } else {
        TEXT_PRIMARY_COLOR
    };
    let mut lines: Vec<(String, [u8; 4])> = Vec::new();
    for line in question_lines {
        lines.push((line, TEXT_PRIMARY_COLOR));
    }
    lines.push((String::new(), TEXT_PRIMARY_COLOR));
    for (index, answer) in quiz.answers.iter().enumerate() {
        lines.push((format!("{}) {}", index + 1, answer), answer_color));
    }

    let box_height = lines.len() as i32 * LINE_ADVANCE + PANEL_INSET_Y * 2;
    let x = (width as i32 - box_width) / 2;
    let y = (height as i32 - box_height) / 2;
    draw_panel(frame, width, height, x, y, box_width, box_height);

    let mut line_y = y + PANEL_INSET_Y;
    for (line, color) in &lines {
        draw_text(frame, width, height, x + PANEL_INSET_X, line_y, line, *color);
        line_y += LINE_ADVANCE;
    }
}

/// Draws a right-hand list panel at `top` and returns the y just below it, so
/// stacked panels never overlap.
fn draw_side_panel(
    frame: &mut [u8],
    width: u32,
    height: u32,
    top: i32,
    title: &str,
    rows: &[(String, [u8; 4])],
) -> i32 {
    let x = width as i32 - SIDE_PANEL_WIDTH_PX - DIALOG_BOX_MARGIN_PX;
    let y = top;
    let visible_rows = rows.len().min(MAX_PANEL_ROWS);
    let panel_height = (visible_rows as i32 + 1) * LINE_ADVANCE + PANEL_INSET_Y * 2;
    draw_panel(frame, width, height, x, y, SIDE_PANEL_WIDTH_PX, panel_height);

    let mut line_y = y + PANEL_INSET_Y;
    draw_text(
        frame,
        width,
        height,
        x + PANEL_INSET_X,
        line_y,
        title,
        TEXT_DIM_COLOR,
    );
    line_y += LINE_ADVANCE;
    for (row, color) in rows.iter().take(visible_rows) {
        draw_text(frame, width, height, x + PANEL_INSET_X, line_y, row, *color);
        line_y += LINE_ADVANCE;
    }
    y + panel_height + DIALOG_BOX_MARGIN_PX
}

fn draw_panel(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    panel_width: i32,
    panel_height: i32,
) {
    draw_filled_rect(frame, width, height, x, y, panel_width, panel_height, PANEL_BG_COLOR);
    draw_rect_outline(
        frame,
        width,
        height,
        x,
        y,
        panel_width,
        panel_height,
        PANEL_BORDER_COLOR,
    );
}
