pub(crate) struct GameScene {
    world: WorldModel,
    ledger: QuestLedger,
    player: Player,
    current_map: usize,
    inventory: Vec<usize>,
    dialog: Option<DialogSession>,
    quiz: Option<QuizSession>,
    ui: UiState,
    audio: Box<dyn AudioSink>,
    rng: StdRng,
    muted: bool,
    last_interact_at: Option<Duration>,
    last_footstep_at: Option<Duration>,
    pending_ending: Option<Ending>,
}

impl GameScene {
    fn new(mut world: WorldModel, audio: Box<dyn AudioSink>, rng: StdRng) -> Self {
        let quests = std::mem::take(&mut world.quests);
        let player = Player::new(world.start_position);
        let current_map = world.start_map;
        Self {
            world,
            ledger: QuestLedger::new(quests),
            player,
            current_map,
            inventory: Vec::new(),
            dialog: None,
            quiz: None,
            ui: UiState::default(),
            audio,
            rng,
            muted: false,
            last_interact_at: None,
            last_footstep_at: None,
            pending_ending: None,
        }
    }

    /// Opens the right dialog tier for this NPC, with first-contact quest
    /// bookkeeping. A fully-quizzed NPC degrades to an "already spoken"
    /// notification instead of a session.
    fn start_dialog(&mut self, npc_index: usize, now: Duration) {
        if !self.world.npcs[npc_index].talked_to {
            let npc = &mut self.world.npcs[npc_index];
            npc.talked_to = true;
            npc.interacted = true;
            let era = npc.map;
            let npc_id = npc.id.clone();
            info!(npc = npc_id.as_str(), "npc_first_contact");
            for quest_index in self.ledger.talk_quests_for_era(era) {
                let completed = self.ledger.progress(quest_index, 1);
                self.announce_completions(&completed, now);
            }
        }

        let npc = &self.world.npcs[npc_index];
        let is_final = npc.is_final;
        let ending_shown = npc.ending_shown;
        let fully_quizzed = npc.all_quizzes_passed() && npc.interacted;
        let has_secondary = npc.quizzes_done >= 1 && !npc.second_dialogs.is_empty();
        let label = npc.label();

        let tier = if is_final && !ending_shown && self.ledger.all_completed() {
            DialogTier::Ending
        } else if fully_quizzed {
            self.notify(format!("{label} nie ma już nic do dodania."), now);
            return;
        } else if has_secondary {
            DialogTier::Secondary
        } else {
            DialogTier::Primary
        };

        if tier == DialogTier::Ending {
            // Sticky guard: the ending tier opens exactly once.
            self.world.npcs[npc_index].ending_shown = true;
        }

        self.dialog = Some(DialogSession {
            npc: npc_index,
            tier,
            stage: 0,
        });
        self.show_dialog_stage(now);
    }

    fn dialog_stages(&self, npc_index: usize, tier: DialogTier) -> &[DialogStage] {
        let npc = &self.world.npcs[npc_index];
        match tier {
            DialogTier::Primary => &npc.dialogs,
            DialogTier::Secondary => &npc.second_dialogs,
            DialogTier::Ending => &npc.ending_dialogs,
        }
    }

    fn show_dialog_stage(&mut self, now: Duration) {
        let Some(session) = self.dialog else {
            return;
        };
        let stages = self.dialog_stages(session.npc, session.tier);
        let Some(stage) = stages.get(session.stage) else {
            self.close_dialog(DialogCloseReason::Completed, now);
            return;
        };
        let text = stage.text.clone();
        let choices: Vec<String> = stage
            .choices
            .iter()
            .map(|choice| choice.text.clone())
            .collect();
        let continue_hint = choices.is_empty();
        let speaker = self.world.npcs[session.npc].name.clone();
        self.ui.show_dialog(DialogBox {
            speaker,
            text: text.clone(),
            choices,
            continue_hint,
        });
        self.audio
            .narrate(&text, DIALOG_NARRATION_RATE, DIALOG_NARRATION_PITCH);
    }

    /// Continue past a stage with no choices: follow `next`, or close when the
    /// stage is terminal. Stages with choices only advance via a selection.
    fn continue_dialog(&mut self, now: Duration) {
        let Some(session) = self.dialog else {
            return;
        };
        let stages = self.dialog_stages(session.npc, session.tier);
        let Some(stage) = stages.get(session.stage) else {
            self.close_dialog(DialogCloseReason::Completed, now);
            return;
        };
        if !stage.choices.is_empty() {
            return;
        }
        match stage.next {
            Some(next) => {
                if let Some(session) = &mut self.dialog {
                    session.stage = next;
                }
                self.show_dialog_stage(now);
            }
            None => self.close_dialog(DialogCloseReason::Completed, now),
        }
    }

    fn select_dialog_choice(&mut self, choice_index: usize, now: Duration) {
        let Some(session) = self.dialog else {
            return;
        };
        let stages = self.dialog_stages(session.npc, session.tier);
        let Some(stage) = stages.get(session.stage) else {
            return;
        };
        let Some(choice) = stage.choices.get(choice_index) else {
            return;
        };
        let action = choice.action;
        self.apply_dialog_action(action, now);
        self.close_dialog(DialogCloseReason::Completed, now);
    }

    /// Central, exhaustive consumer of dialog action tokens: each token
    /// activates its quest and raises the authored notification.
    fn apply_dialog_action(&mut self, action: DialogAction, now: Duration) {
        let (quest_id, message) = match action {
            DialogAction::AcceptMainQuest => (
                "main_quest",
                "Quest rozpoczęty: Naprawa Czasoprzestrzeni",
            ),
            DialogAction::Skeptical => (
                "main_quest",
                "Czasem rzeczywistość jest dziwniejsza niż fikcja...",
            ),
            DialogAction::ExplainPendrive => (
                "mieszko_pendrive",
                "Quest rozpoczęty: Mieszko I i Ochrzczony Pendrive",
            ),
            DialogAction::FunnyBaptism => (
                "mieszko_pendrive",
                "Mieszko zastanawia się nad tą propozycją...",
            ),
            DialogAction::AcceptNapoleonQuest => (
                "napoleon_sandwich",
                "Quest rozpoczęty: Napoleon i Imperium Kanapek",
            ),
            DialogAction::WaterlooJoke => (
                "napoleon_sandwich",
                "Napoleon nie wygląda na zadowolonego z tego żartu...",
            ),
            DialogAction::AcceptJuliusQuest => (
                "julius_history",
                "Quest rozpoczęty: Juliusz Cezar i Historia Rzymu",
            ),
            DialogAction::JuliusBrutusJoke => (
                "julius_history",
                "Et tu, Brute? Cezar nie ceni sobie tego żartu...",
            ),
            DialogAction::AcceptDavinciQuest => (
                "davinci_backpack",
                "Quest rozpoczęty: Leonardo da Vinci i Latający Plecak",
            ),
            DialogAction::DavinciSafety => (
                "davinci_backpack",
                "Leonardo zapewnia, że wszystko jest pod kontrolą!",
            ),
            DialogAction::ConvinceSobieski => (
                "sobieski_charge",
                "Quest rozpoczęty: Sobieski i Szarża na Nauczycieli",
            ),
            DialogAction::SobieskiRecon => (
                "sobieski_charge",
                "Sobieski docenia strategiczne podejście!",
            ),
            DialogAction::AcceptMarieQuest => (
                "marie_powerups",
                "Quest rozpoczęty: Maria i Power-upy",
            ),
            DialogAction::MarieSafety => (
                "marie_powerups",
                "Maria Skłodowska-Curie wie, co robi!",
            ),
        };
        if let Some(quest_index) = self.ledger.find(quest_id) {
            self.ledger.activate(quest_index);
        }
        self.notify(message.to_string(), now);
    }

    fn close_dialog(&mut self, reason: DialogCloseReason, now: Duration) {
        let Some(session) = self.dialog.take() else {
            return;
        };
        self.ui.hide_dialog();
        self.audio.stop_narration();
        if reason == DialogCloseReason::Cancelled {
            return;
        }
        match session.tier {
            DialogTier::Ending => {
                self.pending_ending = Some(Ending::Victory);
            }
            DialogTier::Primary | DialogTier::Secondary => {
                self.maybe_open_quiz(session.npc, now);
            }
        }
    }

    fn maybe_open_quiz(&mut self, npc_index: usize, _now: Duration) {
        let npc = &self.world.npcs[npc_index];
        let next_quiz = npc.quizzes_done as usize;
        if next_quiz >= npc.quizzes.len() {
            return;
        }
        self.open_quiz(npc_index, next_quiz);
    }

    /// Presents a quiz with a freshly shuffled answer order. The session keeps
    /// the displayed-slot → authored-index mapping so the correctness check is
    /// invariant under the shuffle.
    fn open_quiz(&mut self, npc_index: usize, quiz_index: usize) {
        let quiz = &self.world.npcs[npc_index].quizzes[quiz_index];
        let mut order: Vec<usize> = (0..quiz.answers.len()).collect();
        order.shuffle(&mut self.rng);
        let answers: Vec<String> = order
            .iter()
            .map(|original| quiz.answers[*original].clone())
            .collect();
        self.ui.show_quiz(QuizBox {
            question: quiz.question.clone(),
            answers,
            locked: false,
        });
        self.quiz = Some(QuizSession {
            npc: npc_index,
            quiz_index,
            order,
            locked_until: None,
        });
    }

    /// A correct answer is judged against the authored index behind the
    /// shuffled slot. A wrong answer locks input for a short spell and keeps
    /// the same presentation order; retries are unlimited.
    fn answer_quiz(&mut self, display_index: usize, now: Duration) {
        let Some(session) = self.quiz.clone() else {
            return;
        };
        if session
            .locked_until
            .is_some_and(|locked_until| now < locked_until)
        {
            return;
        }
        let Some(original_index) = session.order.get(display_index).copied() else {
            return;
        };

        let quiz = &self.world.npcs[session.npc].quizzes[session.quiz_index];
        if original_index != quiz.correct {
            self.audio.play(SoundCue::QuizFailure);
            self.ui.set_quiz_locked(true);
            self.ui
                .show_notification("Zła odpowiedź! Spróbuj ponownie.".to_string(), now);
            if let Some(session) = &mut self.quiz {
                session.locked_until = Some(now + QUIZ_RETRY_LOCKOUT);
            }
            return;
        }

        self.quiz = None;
        self.ui.hide_quiz();
        self.audio.play(SoundCue::QuizSuccess);
        self.ui
            .show_notification("Dobra odpowiedź!".to_string(), now);

        let npc = &mut self.world.npcs[session.npc];
        npc.quizzes_done = npc.quizzes_done.saturating_add(1);
        let era = npc.map;
        let quizzes_done = npc.quizzes_done;
        info!(npc = npc.id.as_str(), quizzes_done, "quiz_passed");

        if let Some(quest_index) = self.ledger.quiz_quest_for_era(era) {
            let completed = self.ledger.progress(quest_index, 1);
            self.announce_completions(&completed, now);
        }

        if quizzes_done == 2 {
            self.wake_linked_enemy(session.npc, now);
        }
    }

    /// Dormant → aggro is one-way and externally triggered, here by the linked
    /// NPC's second quiz.
    fn wake_linked_enemy(&mut self, npc_index: usize, now: Duration) {
        let Some(enemy_index) = self
            .world
            .enemies
            .iter()
            .position(|enemy| enemy.npc == npc_index && enemy.alive())
        else {
            return;
        };
        let enemy = &mut self.world.enemies[enemy_index];
        if enemy.aggro {
            return;
        }
        enemy.aggro = true;
        let enemy_name = enemy.name.clone();
        info!(enemy = enemy.id.as_str(), "enemy_aggro");
        self.notify(format!("Uwaga! {enemy_name} rusza do ataku!"), now);
    }
}
