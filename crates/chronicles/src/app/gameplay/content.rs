const WORLD_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/world.json"));

const MAX_QUIZZES_PER_NPC: usize = 2;
const MAX_CHOICES_PER_STAGE: usize = 4;
const MIN_QUIZ_ANSWERS: usize = 2;
const MAX_QUIZ_ANSWERS: usize = 4;

#[derive(Debug, serde::Deserialize)]
struct WorldSpec {
    tile_size: f32,
    start: StartSpec,
    maps: Vec<MapSpec>,
    npcs: Vec<NpcSpec>,
    items: Vec<ItemSpec>,
    portals: Vec<PortalSpec>,
    enemies: Vec<EnemySpec>,
    quests: Vec<QuestSpec>,
}

#[derive(Debug, serde::Deserialize)]
struct StartSpec {
    map: String,
    x: f32,
    y: f32,
}

#[derive(Debug, serde::Deserialize)]
struct MapSpec {
    id: String,
    name: String,
    width: u32,
    height: u32,
    background: [u8; 3],
    layout: MapLayout,
    #[serde(default)]
    seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum MapLayout {
    SchoolCorridor,
    PillarField,
    KeepWall,
    OpenHall,
    Barricades,
}

#[derive(Debug, serde::Deserialize)]
struct NpcSpec {
    id: String,
    name: String,
    map: String,
    x: f32,
    y: f32,
    dialogs: Vec<DialogStageSpec>,
    #[serde(default)]
    second_dialogs: Vec<DialogStageSpec>,
    #[serde(default)]
    ending_dialogs: Vec<DialogStageSpec>,
    #[serde(default)]
    quizzes: Vec<QuizSpec>,
    #[serde(default)]
    final_npc: bool,
}

#[derive(Debug, serde::Deserialize)]
struct DialogStageSpec {
    text: String,
    #[serde(default)]
    next: Option<usize>,
    #[serde(default)]
    choices: Vec<ChoiceSpec>,
}

#[derive(Debug, serde::Deserialize)]
struct ChoiceSpec {
    text: String,
    action: DialogAction,
}

#[derive(Debug, serde::Deserialize)]
struct QuizSpec {
    question: String,
    answers: Vec<String>,
    correct: usize,
}

#[derive(Debug, serde::Deserialize)]
struct ItemSpec {
    id: String,
    name: String,
    description: String,
    map: String,
    x: f32,
    y: f32,
}

#[derive(Debug, serde::Deserialize)]
struct PortalSpec {
    map: String,
    x: f32,
    y: f32,
    to_map: String,
    to_x: f32,
    to_y: f32,
}

#[derive(Debug, serde::Deserialize)]
struct EnemySpec {
    id: String,
    name: String,
    map: String,
    x: f32,
    y: f32,
    npc: String,
    max_health: u32,
    speed: f32,
    aggro_radius: f32,
    attack_range: f32,
}

#[derive(Debug, serde::Deserialize)]
struct QuestSpec {
    id: String,
    title: String,
    description: String,
    #[serde(default)]
    objectives: Vec<String>,
    required: u32,
    kind: QuestKindSpec,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum QuestKindSpec {
    Talk {
        #[serde(default)]
        era: Option<String>,
    },
    Quiz {
        era: String,
    },
    Fight {
        era: String,
    },
    Items {
        items: Vec<String>,
    },
    Explore,
    Meta {
        of: Vec<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ContentError {
    #[error("failed to parse world json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("map '{id}' has invalid dimensions {width}x{height}")]
    InvalidMapDimensions { id: String, width: u32, height: u32 },
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{kind} '{id}' references unknown map '{map}'")]
    UnknownMap {
        kind: &'static str,
        id: String,
        map: String,
    },
    #[error("start references unknown map '{map}'")]
    UnknownStartMap { map: String },
    #[error("enemy '{id}' references unknown npc '{npc}'")]
    UnknownNpc { id: String, npc: String },
    #[error("npc '{id}' {tier} stage {stage} next index {next} out of range (stage count {len})")]
    DialogNextOutOfRange {
        id: String,
        tier: &'static str,
        stage: usize,
        next: usize,
        len: usize,
    },
    #[error("npc '{id}' {tier} stage {stage} has {count} choices; at most {max} are supported")]
    TooManyChoices {
        id: String,
        tier: &'static str,
        stage: usize,
        count: usize,
        max: usize,
    },
    #[error("npc '{id}' has {count} quizzes; at most {max} are supported")]
    TooManyQuizzes {
        id: String,
        count: usize,
        max: usize,
    },
    #[error("npc '{id}' quiz {index} has {count} answers; expected {min} to {max}")]
    QuizAnswerCount {
        id: String,
        index: usize,
        count: usize,
        min: usize,
        max: usize,
    },
    #[error("npc '{id}' quiz {index} correct answer {correct} out of range (answer count {len})")]
    QuizCorrectOutOfRange {
        id: String,
        index: usize,
        correct: usize,
        len: usize,
    },
    #[error("expected exactly one final npc, found {count}")]
    FinalNpcCount { count: usize },
    #[error("quest '{id}' references unknown item '{item}'")]
    UnknownItemRef { id: String, item: String },
    #[error("quest '{id}' references unknown quest '{of}'")]
    UnknownQuestRef { id: String, of: String },
    #[error("map '{id}' tile layout is malformed: {source}")]
    Grid {
        id: String,
        #[source]
        source: TileGridError,
    },
}

pub(crate) fn load_world() -> Result<WorldModel, ContentError> {
    let spec = parse_world_spec(WORLD_JSON)?;
    resolve_world(spec)
}

/// Parse with `serde_path_to_error` so a malformed document names the exact
/// JSON path that failed instead of a byte offset.
fn parse_world_spec(raw: &str) -> Result<WorldSpec, ContentError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, WorldSpec>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        ContentError::Parse {
            path,
            source: error.into_inner(),
        }
    })
}

fn index_by_id<'a, I>(entries: I, kind: &'static str) -> Result<HashMap<&'a str, usize>, ContentError>
where
    I: Iterator<Item = &'a str>,
{
    let mut lookup = HashMap::new();
    for (index, id) in entries.enumerate() {
        if lookup.insert(id, index).is_some() {
            return Err(ContentError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(lookup)
}

fn resolve_world(spec: WorldSpec) -> Result<WorldModel, ContentError> {
    let map_lookup = index_by_id(spec.maps.iter().map(|map| map.id.as_str()), "map")?;
    let npc_lookup = index_by_id(spec.npcs.iter().map(|npc| npc.id.as_str()), "npc")?;
    let item_lookup = index_by_id(spec.items.iter().map(|item| item.id.as_str()), "item")?;
    let quest_lookup = index_by_id(spec.quests.iter().map(|quest| quest.id.as_str()), "quest")?;
    index_by_id(spec.enemies.iter().map(|enemy| enemy.id.as_str()), "enemy")?;

    let resolve_map = |kind: &'static str, id: &str, map: &str| -> Result<usize, ContentError> {
        map_lookup
            .get(map)
            .copied()
            .ok_or_else(|| ContentError::UnknownMap {
                kind,
                id: id.to_string(),
                map: map.to_string(),
            })
    };

    let mut maps = Vec::with_capacity(spec.maps.len());
    for map in &spec.maps {
        if map.width == 0 || map.height == 0 {
            return Err(ContentError::InvalidMapDimensions {
                id: map.id.clone(),
                width: map.width,
                height: map.height,
            });
        }
        let tiles = generate_layout(map.layout, map.width, map.height, map.seed);
        let grid = TileGrid::new(map.width, map.height, tiles).map_err(|source| {
            ContentError::Grid {
                id: map.id.clone(),
                source,
            }
        })?;
        maps.push(GameMap {
            id: map.id.clone(),
            name: map.name.clone(),
            background: [map.background[0], map.background[1], map.background[2], 255],
            grid,
        });
    }

    let start_map =
        map_lookup
            .get(spec.start.map.as_str())
            .copied()
            .ok_or(ContentError::UnknownStartMap {
                map: spec.start.map.clone(),
            })?;

    let final_count = spec.npcs.iter().filter(|npc| npc.final_npc).count();
    if final_count != 1 {
        return Err(ContentError::FinalNpcCount { count: final_count });
    }

    let mut npcs = Vec::with_capacity(spec.npcs.len());
    for npc in &spec.npcs {
        let map = resolve_map("npc", &npc.id, &npc.map)?;
        if npc.quizzes.len() > MAX_QUIZZES_PER_NPC {
            return Err(ContentError::TooManyQuizzes {
                id: npc.id.clone(),
                count: npc.quizzes.len(),
                max: MAX_QUIZZES_PER_NPC,
            });
        }
        let mut quizzes = Vec::with_capacity(npc.quizzes.len());
        for (index, quiz) in npc.quizzes.iter().enumerate() {
            if quiz.answers.len() < MIN_QUIZ_ANSWERS || quiz.answers.len() > MAX_QUIZ_ANSWERS {
                return Err(ContentError::QuizAnswerCount {
                    id: npc.id.clone(),
                    index,
                    count: quiz.answers.len(),
                    min: MIN_QUIZ_ANSWERS,
                    max: MAX_QUIZ_ANSWERS,
                });
            }
            if quiz.correct >= quiz.answers.len() {
                return Err(ContentError::QuizCorrectOutOfRange {
                    id: npc.id.clone(),
                    index,
                    correct: quiz.correct,
                    len: quiz.answers.len(),
                });
            }
            quizzes.push(Quiz {
                question: quiz.question.clone(),
                answers: quiz.answers.clone(),
                correct: quiz.correct,
            });
        }
        npcs.push(Npc {
            id: npc.id.clone(),
            name: npc.name.clone(),
            map,
            position: Vec2 { x: npc.x, y: npc.y },
            dialogs: resolve_dialogs(&npc.id, "dialogs", &npc.dialogs)?,
            second_dialogs: resolve_dialogs(&npc.id, "second_dialogs", &npc.second_dialogs)?,
            ending_dialogs: resolve_dialogs(&npc.id, "ending_dialogs", &npc.ending_dialogs)?,
            quizzes,
            is_final: npc.final_npc,
            talked_to: false,
            interacted: false,
            quizzes_done: 0,
            ending_shown: false,
        });
    }

    let mut items = Vec::with_capacity(spec.items.len());
    for item in &spec.items {
        let map = resolve_map("item", &item.id, &item.map)?;
        items.push(Item {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            map,
            position: Vec2 {
                x: item.x,
                y: item.y,
            },
            collected: false,
        });
    }

    let mut portals = Vec::with_capacity(spec.portals.len());
    for (index, portal) in spec.portals.iter().enumerate() {
        let portal_id = format!("portal[{index}]");
        let map = resolve_map("portal", &portal_id, &portal.map)?;
        let to_map = resolve_map("portal", &portal_id, &portal.to_map)?;
        portals.push(Portal {
            map,
            position: Vec2 {
                x: portal.x,
                y: portal.y,
            },
            to_map,
            to_position: Vec2 {
                x: portal.to_x,
                y: portal.to_y,
            },
            visited: false,
        });
    }

    let mut enemies = Vec::with_capacity(spec.enemies.len());
    for enemy in &spec.enemies {
        let map = resolve_map("enemy", &enemy.id, &enemy.map)?;
        let npc = npc_lookup
            .get(enemy.npc.as_str())
            .copied()
            .ok_or_else(|| ContentError::UnknownNpc {
                id: enemy.id.clone(),
                npc: enemy.npc.clone(),
            })?;
        enemies.push(Enemy {
            id: enemy.id.clone(),
            name: enemy.name.clone(),
            map,
            position: Vec2 {
                x: enemy.x,
                y: enemy.y,
            },
            npc,
            health: enemy.max_health,
            max_health: enemy.max_health,
            speed: enemy.speed,
            aggro_radius: enemy.aggro_radius,
            attack_range: enemy.attack_range,
            aggro: false,
            last_attack_at: None,
        });
    }

    let mut quests = Vec::with_capacity(spec.quests.len());
    for quest in &spec.quests {
        let kind = match &quest.kind {
            QuestKindSpec::Talk { era } => QuestKind::Talk {
                era: match era {
                    Some(map) => Some(resolve_map("quest", &quest.id, map)?),
                    None => None,
                },
            },
            QuestKindSpec::Quiz { era } => QuestKind::Quiz {
                era: resolve_map("quest", &quest.id, era)?,
            },
            QuestKindSpec::Fight { era } => QuestKind::Fight {
                era: resolve_map("quest", &quest.id, era)?,
            },
            QuestKindSpec::Items { items: item_ids } => {
                let mut resolved = Vec::with_capacity(item_ids.len());
                for item_id in item_ids {
                    let index = item_lookup.get(item_id.as_str()).copied().ok_or_else(|| {
                        ContentError::UnknownItemRef {
                            id: quest.id.clone(),
                            item: item_id.clone(),
                        }
                    })?;
                    resolved.push(index);
                }
                QuestKind::Items { items: resolved }
            }
            QuestKindSpec::Explore => QuestKind::Explore,
            QuestKindSpec::Meta { of } => {
                let mut resolved = Vec::with_capacity(of.len());
                for quest_id in of {
                    let index = quest_lookup.get(quest_id.as_str()).copied().ok_or_else(|| {
                        ContentError::UnknownQuestRef {
                            id: quest.id.clone(),
                            of: quest_id.clone(),
                        }
                    })?;
                    resolved.push(index);
                }
                QuestKind::Meta { of: resolved }
            }
        };
        quests.push(Quest {
            id: quest.id.clone(),
            title: quest.title.clone(),
            description: quest.description.clone(),
            objectives: quest.objectives.clone(),
            progress: 0,
            required: quest.required,
            completed: false,
            active: false,
            kind,
        });
    }

    Ok(WorldModel {
        tile_size: spec.tile_size,
        start_map,
        start_position: Vec2 {
            x: spec.start.x,
            y: spec.start.y,
        },
        maps,
        npcs,
        items,
        portals,
        enemies,
        quests,
    })
}

fn resolve_dialogs(
    npc_id: &str,
    tier: &'static str,
    stages: &[DialogStageSpec],
) -> Result<Vec<DialogStage>, ContentError> {
    let mut resolved = Vec::with_capacity(stages.len());
    for (stage_index, stage) in stages.iter().enumerate() {
        if let Some(next) = stage.next {
            if next >= stages.len() {
                return Err(ContentError::DialogNextOutOfRange {
                    id: npc_id.to_string(),
                    tier,
                    stage: stage_index,
                    next,
                    len: stages.len(),
                });
            }
        }
        if stage.choices.len() > MAX_CHOICES_PER_STAGE {
            return Err(ContentError::TooManyChoices {
                id: npc_id.to_string(),
                tier,
                stage: stage_index,
                count: stage.choices.len(),
                max: MAX_CHOICES_PER_STAGE,
            });
        }
        resolved.push(DialogStage {
            text: stage.text.clone(),
            next: stage.next,
            choices: stage
                .choices
                .iter()
                .map(|choice| Choice {
                    text: choice.text.clone(),
                    action: choice.action,
                })
                .collect(),
        });
    }
    Ok(resolved)
}
