#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn to_facing(self) -> Facing {
        match self {
            Direction::Up => Facing::Up,
            Direction::Down => Facing::Down,
            Direction::Left => Facing::Left,
            Direction::Right => Facing::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileKind {
    Floor,
    Wall,
    Pillar,
    Door,
}

impl TileKind {
    fn code(self) -> u8 {
        match self {
            TileKind::Floor => TILE_FLOOR,
            TileKind::Wall => TILE_WALL,
            TileKind::Pillar => TILE_PILLAR,
            TileKind::Door => TILE_DOOR,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            TILE_FLOOR => Some(TileKind::Floor),
            TILE_WALL => Some(TileKind::Wall),
            TILE_PILLAR => Some(TileKind::Pillar),
            TILE_DOOR => Some(TileKind::Door),
            _ => None,
        }
    }

    fn blocks_movement(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Pillar)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SoundCue {
    Step,
    Pickup,
    Portal,
    Notify,
    QuestComplete,
    QuizSuccess,
    QuizFailure,
    Attack,
    EnemyDown,
}

impl SoundCue {
    fn token(self) -> &'static str {
        match self {
            SoundCue::Step => "step",
            SoundCue::Pickup => "pickup",
            SoundCue::Portal => "portal",
            SoundCue::Notify => "notify",
            SoundCue::QuestComplete => "quest_complete",
            SoundCue::QuizSuccess => "quiz_success",
            SoundCue::QuizFailure => "quiz_failure",
            SoundCue::Attack => "attack",
            SoundCue::EnemyDown => "enemy_down",
        }
    }
}

/// Fire-and-forget audio collaborator. Calls must never block the tick; a new
/// narration supersedes any narration still playing.
pub(crate) trait AudioSink {
    fn play(&mut self, cue: SoundCue);
    fn narrate(&mut self, text: &str, rate: f32, pitch: f32);
    fn stop_narration(&mut self);
    fn set_muted(&mut self, muted: bool);
}

/// Shipped sink: audio synthesis and speech are external collaborators, so
/// the binary only records what would have played.
#[derive(Debug, Default)]
pub(crate) struct LogAudioSink {
    muted: bool,
}

impl AudioSink for LogAudioSink {
    fn play(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        debug!(cue = cue.token(), "sound_cue");
    }

    fn narrate(&mut self, text: &str, rate: f32, pitch: f32) {
        if self.muted {
            return;
        }
        debug!(rate, pitch, text, "narration");
    }

    fn stop_narration(&mut self) {
        debug!("narration_cancelled");
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        debug!(muted, "audio_mute");
    }
}

/// Action token carried by a dialog choice. Consumed exhaustively by
/// `GameScene::apply_dialog_action`; content validation guarantees every
/// authored token deserializes into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum DialogAction {
    AcceptMainQuest,
    Skeptical,
    ExplainPendrive,
    FunnyBaptism,
    AcceptNapoleonQuest,
    WaterlooJoke,
    AcceptJuliusQuest,
    JuliusBrutusJoke,
    AcceptDavinciQuest,
    DavinciSafety,
    ConvinceSobieski,
    SobieskiRecon,
    AcceptMarieQuest,
    MarieSafety,
}

#[derive(Debug, Clone, PartialEq)]
struct DialogBox {
    speaker: String,
    text: String,
    choices: Vec<String>,
    continue_hint: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct QuizBox {
    question: String,
    answers: Vec<String>,
    locked: bool,
}

/// Presenter state buffer. The simulation mutates it through these methods
/// only and the renderer reads it back through the frame view, which keeps
/// the core free of any concrete UI toolkit.
#[derive(Debug, Default)]
struct UiState {
    dialog: Option<DialogBox>,
    quiz: Option<QuizBox>,
    notification: Option<(String, Duration)>,
    inventory_open: bool,
    quests_open: bool,
}

impl UiState {
    fn show_dialog(&mut self, dialog: DialogBox) {
        self.dialog = Some(dialog);
    }

    fn hide_dialog(&mut self) {
        self.dialog = None;
    }

    fn show_quiz(&mut self, quiz: QuizBox) {
        self.quiz = Some(quiz);
    }

    fn hide_quiz(&mut self) {
        self.quiz = None;
    }

    fn set_quiz_locked(&mut self, locked: bool) {
        if let Some(quiz) = &mut self.quiz {
            quiz.locked = locked;
        }
    }

    fn show_notification(&mut self, text: String, now: Duration) {
        self.notification = Some((text, now));
    }

    fn expire_notification(&mut self, now: Duration, ttl: Duration) {
        if let Some((_, shown_at)) = self.notification {
            if now.saturating_sub(shown_at) >= ttl {
                self.notification = None;
            }
        }
    }

    fn toggle_inventory(&mut self) {
        self.inventory_open = !self.inventory_open;
    }

    fn toggle_quests(&mut self) {
        self.quests_open = !self.quests_open;
    }

    fn close_panels(&mut self) {
        self.inventory_open = false;
        self.quests_open = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogTier {
    Primary,
    Secondary,
    Ending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogCloseReason {
    Completed,
    Cancelled,
}

/// At most one dialog session exists system-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DialogSession {
    npc: usize,
    tier: DialogTier,
    stage: usize,
}

/// At most one quiz session exists system-wide. `order` maps displayed answer
/// slots back to authored indices so correctness never depends on shuffling.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QuizSession {
    npc: usize,
    quiz_index: usize,
    order: Vec<usize>,
    locked_until: Option<Duration>,
}
