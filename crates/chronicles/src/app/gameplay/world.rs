/// Resolved world content. Entities live in flat vectors and reference each
/// other by index; string ids survive only for logging and content lookups.
#[derive(Debug)]
pub(crate) struct WorldModel {
    tile_size: f32,
    start_map: usize,
    start_position: Vec2,
    maps: Vec<GameMap>,
    npcs: Vec<Npc>,
    items: Vec<Item>,
    portals: Vec<Portal>,
    enemies: Vec<Enemy>,
    quests: Vec<Quest>,
}

#[derive(Debug)]
struct GameMap {
    id: String,
    name: String,
    background: [u8; 4],
    grid: TileGrid,
}

#[derive(Debug)]
struct Npc {
    id: String,
    name: String,
    map: usize,
    position: Vec2,
    dialogs: Vec<DialogStage>,
    second_dialogs: Vec<DialogStage>,
    ending_dialogs: Vec<DialogStage>,
    quizzes: Vec<Quiz>,
    is_final: bool,
    talked_to: bool,
    interacted: bool,
    quizzes_done: u8,
    ending_shown: bool,
}

impl Npc {
    fn all_quizzes_passed(&self) -> bool {
        !self.quizzes.is_empty() && self.quizzes_done as usize >= self.quizzes.len()
    }

    fn label(&self) -> String {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or(self.name.as_str())
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DialogStage {
    text: String,
    next: Option<usize>,
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq)]
struct Choice {
    text: String,
    action: DialogAction,
}

#[derive(Debug, Clone, PartialEq)]
struct Quiz {
    question: String,
    answers: Vec<String>,
    correct: usize,
}

#[derive(Debug)]
struct Item {
    id: String,
    name: String,
    description: String,
    map: usize,
    position: Vec2,
    collected: bool,
}

#[derive(Debug)]
struct Portal {
    map: usize,
    position: Vec2,
    to_map: usize,
    to_position: Vec2,
    visited: bool,
}

#[derive(Debug)]
struct Enemy {
    id: String,
    name: String,
    map: usize,
    position: Vec2,
    npc: usize,
    health: u32,
    max_health: u32,
    speed: f32,
    aggro_radius: f32,
    attack_range: f32,
    aggro: bool,
    last_attack_at: Option<Duration>,
}

impl Enemy {
    fn alive(&self) -> bool {
        self.health > 0
    }
}

#[derive(Debug)]
struct Player {
    position: Vec2,
    direction: Direction,
    moving: bool,
    health: u32,
    speed: f32,
    score: u32,
}

impl Player {
    fn new(position: Vec2) -> Self {
        Self {
            position,
            direction: Direction::Down,
            moving: false,
            health: PLAYER_MAX_HEALTH,
            speed: PLAYER_SPEED_UNITS_PER_SECOND,
            score: 0,
        }
    }
}

fn generate_layout(layout: MapLayout, width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tiles = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            tiles.push(layout_tile(layout, width, height, x, y, &mut rng).code());
        }
    }
    tiles
}

fn layout_tile(
    layout: MapLayout,
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    rng: &mut StdRng,
) -> TileKind {
    let border = y == 0 || y == height - 1 || x == 0 || x == width - 1;
    if border {
        return TileKind::Wall;
    }
    match layout {
        MapLayout::SchoolCorridor => {
            // Two classroom walls with door gaps into the side rooms.
            if (x == 8 || x == 16) && (y == 9 || y == 10) {
                TileKind::Door
            } else if (x == 8 || x == 16) && y > 3 && y < 16 {
                TileKind::Wall
            } else {
                TileKind::Floor
            }
        }
        MapLayout::PillarField => {
            if (x % 5 == 0 || y % 5 == 0) && rng.gen_bool(0.3) {
                TileKind::Pillar
            } else {
                TileKind::Floor
            }
        }
        MapLayout::KeepWall => {
            if x == 12 && (y < 8 || y > 12) {
                TileKind::Wall
            } else {
                TileKind::Floor
            }
        }
        MapLayout::OpenHall => TileKind::Floor,
        MapLayout::Barricades => {
            if (x == 6 || x == 18) && y > 5 && y < 14 {
                TileKind::Wall
            } else {
                TileKind::Floor
            }
        }
    }
}
