/// Continuous coordinates → tile lookup. Anything outside the grid blocks,
/// as do wall and pillar tiles; floor and door tiles do not.
fn is_blocked(map: &GameMap, tile_size: f32, x: f32, y: f32) -> bool {
    let tile_x = (x / tile_size).floor();
    let tile_y = (y / tile_size).floor();
    if tile_x < 0.0 || tile_y < 0.0 {
        return true;
    }
    let Some(code) = map.grid.tile_at(tile_x as u32, tile_y as u32) else {
        return true;
    };
    match TileKind::from_code(code) {
        Some(kind) => kind.blocks_movement(),
        None => true,
    }
}

/// Strictly-under-radius Euclidean test; proximity scans take the first
/// match in iteration order rather than the nearest.
fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy < radius * radius
}

/// Held movement keys → per-tick displacement and facing. Diagonals are
/// normalized to unit length so diagonal speed equals axis speed. Facing
/// follows the dominant axis; on an exact tie the vertical axis wins.
fn movement_delta(
    input: &InputSnapshot,
    fixed_dt_seconds: f32,
    speed: f32,
) -> Option<(Vec2, Direction)> {
    let mut x = 0.0f32;
    let mut y = 0.0f32;

    if input.is_down(InputAction::MoveRight) {
        x += 1.0;
    }
    if input.is_down(InputAction::MoveLeft) {
        x -= 1.0;
    }
    if input.is_down(InputAction::MoveDown) {
        y += 1.0;
    }
    if input.is_down(InputAction::MoveUp) {
        y -= 1.0;
    }

    let len_sq = x * x + y * y;
    if len_sq <= 0.0 {
        return None;
    }
    let inv_len = len_sq.sqrt().recip();
    x *= inv_len;
    y *= inv_len;

    let direction = if x.abs() > y.abs() {
        if x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if y > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    };

    Some((
        Vec2 {
            x: x * speed * fixed_dt_seconds,
            y: y * speed * fixed_dt_seconds,
        },
        direction,
    ))
}

fn step_toward(current: Vec2, target: Vec2, speed: f32, fixed_dt_seconds: f32) -> Vec2 {
    let dx = target.x - current.x;
    let dy = target.y - current.y;
    let distance_sq = dx * dx + dy * dy;
    if distance_sq <= 0.0 {
        return current;
    }
    let distance = distance_sq.sqrt();
    let max_step = speed * fixed_dt_seconds;
    if max_step >= distance {
        return target;
    }
    let inv_distance = distance.recip();
    Vec2 {
        x: current.x + dx * inv_distance * max_step,
        y: current.y + dy * inv_distance * max_step,
    }
}
