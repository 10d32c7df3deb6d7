#[derive(Debug, Clone, PartialEq, Eq)]
enum QuestKind {
    Talk { era: Option<usize> },
    Quiz { era: usize },
    Fight { era: usize },
    Items { items: Vec<usize> },
    Explore,
    Meta { of: Vec<usize> },
}

#[derive(Debug)]
pub(crate) struct Quest {
    id: String,
    title: String,
    description: String,
    objectives: Vec<String>,
    progress: u32,
    required: u32,
    completed: bool,
    active: bool,
    kind: QuestKind,
}

/// Quest id → progress/completion state plus every rule that mutates it.
/// Completion is sticky: once `completed` flips true it never reverts and
/// further progress calls are no-ops.
#[derive(Debug)]
pub(crate) struct QuestLedger {
    quests: Vec<Quest>,
}

impl QuestLedger {
    fn new(quests: Vec<Quest>) -> Self {
        Self { quests }
    }

    fn quests(&self) -> &[Quest] {
        &self.quests
    }

    fn find(&self, id: &str) -> Option<usize> {
        self.quests.iter().position(|quest| quest.id == id)
    }

    fn active_count(&self) -> usize {
        self.quests.iter().filter(|quest| quest.active).count()
    }

    fn all_completed(&self) -> bool {
        self.quests.iter().all(|quest| quest.completed)
    }

    /// Idempotent; a completed quest can never be reactivated.
    fn activate(&mut self, index: usize) {
        let Some(quest) = self.quests.get_mut(index) else {
            return;
        };
        if quest.completed || quest.active {
            return;
        }
        quest.active = true;
        info!(quest = quest.id.as_str(), "quest_activated");
    }

    /// Adds `amount` toward the threshold and returns every quest index that
    /// newly completed, dependent meta quests included. Unknown indices and
    /// already-completed quests are silent no-ops.
    fn progress(&mut self, index: usize, amount: u32) -> Vec<usize> {
        let mut completed = Vec::new();
        let Some(quest) = self.quests.get_mut(index) else {
            return completed;
        };
        if quest.completed {
            return completed;
        }
        quest.progress = quest.progress.saturating_add(amount);
        if quest.progress >= quest.required {
            quest.completed = true;
            quest.active = false;
            info!(quest = quest.id.as_str(), "quest_completed");
            completed.push(index);
            self.recompute_meta(&mut completed);
        }
        completed
    }

    /// Meta quests are recomputed in full from their member list on every
    /// completion, so the result is the same under any completion order.
    fn recompute_meta(&mut self, completed: &mut Vec<usize>) {
        for index in 0..self.quests.len() {
            let QuestKind::Meta { of } = &self.quests[index].kind else {
                continue;
            };
            if self.quests[index].completed {
                continue;
            }
            let done = of
                .iter()
                .filter(|member| self.quests.get(**member).is_some_and(|q| q.completed))
                .count() as u32;
            let quest = &mut self.quests[index];
            quest.progress = done;
            if quest.progress >= quest.required {
                quest.completed = true;
                quest.active = false;
                info!(quest = quest.id.as_str(), "quest_completed");
                completed.push(index);
            }
        }
    }

    /// Every not-yet-completed talk quest matching `era` (era-bound quests
    /// plus the era-less global ones), in authored order.
    fn talk_quests_for_era(&self, era: usize) -> Vec<usize> {
        self.quests
            .iter()
            .enumerate()
            .filter(|(_, quest)| {
                if quest.completed {
                    return false;
                }
                match &quest.kind {
                    QuestKind::Talk { era: None } => true,
                    QuestKind::Talk { era: Some(e) } => *e == era,
                    _ => false,
                }
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// First not-yet-completed quiz quest for `era`, in authored order.
    fn quiz_quest_for_era(&self, era: usize) -> Option<usize> {
        self.quests.iter().position(|quest| {
            !quest.completed && matches!(&quest.kind, QuestKind::Quiz { era: e } if *e == era)
        })
    }

    /// First not-yet-completed fight quest for `era`, in authored order.
    fn fight_quest_for_era(&self, era: usize) -> Option<usize> {
        self.quests.iter().position(|quest| {
            !quest.completed && matches!(&quest.kind, QuestKind::Fight { era: e } if *e == era)
        })
    }

    /// Quests whose item table lists `item`, in authored order. Completed
    /// quests are included; `progress` no-ops them.
    fn quests_for_item(&self, item: usize) -> Vec<usize> {
        self.quests
            .iter()
            .enumerate()
            .filter(|(_, quest)| {
                matches!(&quest.kind, QuestKind::Items { items } if items.contains(&item))
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn explore_quests(&self) -> Vec<usize> {
        self.quests
            .iter()
            .enumerate()
            .filter(|(_, quest)| matches!(quest.kind, QuestKind::Explore))
            .map(|(index, _)| index)
            .collect()
    }
}
