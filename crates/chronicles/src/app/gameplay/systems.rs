#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimulationSystemId {
    Movement,
    Combat,
    Interaction,
    Hud,
}

/// Fixed per-tick order. Movement resolves first so combat and the portal
/// path inside interaction read the just-updated player position.
const SIMULATION_SYSTEM_ORDER: [SimulationSystemId; 4] = [
    SimulationSystemId::Movement,
    SimulationSystemId::Combat,
    SimulationSystemId::Interaction,
    SimulationSystemId::Hud,
];

impl GameScene {
    fn run_systems(&mut self, fixed_dt_seconds: f32, now: Duration, input: &InputSnapshot) {
        // Edge routing is decided against the modal state at tick start, so a
        // continue that closes a dialog cannot re-trigger interact (or the
        // reverse) within the same tick.
        let dialog_open_at_start = self.dialog.is_some();
        let quiz_open_at_start = self.quiz.is_some();
        for system_id in SIMULATION_SYSTEM_ORDER {
            match system_id {
                SimulationSystemId::Movement => self.run_movement_system(fixed_dt_seconds, now, input),
                SimulationSystemId::Combat => self.run_combat_system(fixed_dt_seconds, now, input),
                SimulationSystemId::Interaction => self.run_interaction_system(
                    now,
                    input,
                    dialog_open_at_start,
                    quiz_open_at_start,
                ),
                SimulationSystemId::Hud => self.run_hud_system(now),
            }
        }
    }

    /// Movement freezes while a dialog or quiz box is open; otherwise the
    /// whole candidate move is accepted or rejected, with no axis sliding.
    fn run_movement_system(&mut self, fixed_dt_seconds: f32, now: Duration, input: &InputSnapshot) {
        if self.modal_open() {
            self.player.moving = false;
            return;
        }

        let Some((delta, direction)) =
            movement_delta(input, fixed_dt_seconds, self.player.speed)
        else {
            self.player.moving = false;
            return;
        };

        let candidate = Vec2 {
            x: self.player.position.x + delta.x,
            y: self.player.position.y + delta.y,
        };
        let map = &self.world.maps[self.current_map];
        if is_blocked(map, self.world.tile_size, candidate.x, candidate.y) {
            self.player.moving = false;
            return;
        }

        self.player.position = candidate;
        self.player.moving = true;
        self.player.direction = direction;

        let due = self
            .last_footstep_at
            .map_or(true, |last| now.saturating_sub(last) >= FOOTSTEP_INTERVAL);
        if due {
            self.audio.play(SoundCue::Step);
            self.last_footstep_at = Some(now);
        }
    }

    /// Combat also pauses behind open dialog/quiz boxes: aggro enemies would
    /// otherwise batter a player who cannot move.
    fn run_combat_system(&mut self, fixed_dt_seconds: f32, now: Duration, input: &InputSnapshot) {
        if self.modal_open() {
            return;
        }

        if input.attack_pressed() {
            self.player_attack(now);
        }

        let player_position = self.player.position;
        for enemy_index in 0..self.world.enemies.len() {
            let enemy = &self.world.enemies[enemy_index];
            if enemy.map != self.current_map || !enemy.alive() || !enemy.aggro {
                continue;
            }

            let in_attack_range =
                within_radius(enemy.position, player_position, enemy.attack_range);
            if !in_attack_range {
                let enemy = &mut self.world.enemies[enemy_index];
                enemy.position =
                    step_toward(enemy.position, player_position, enemy.speed, fixed_dt_seconds);
                continue;
            }

            let cooldown_elapsed = enemy
                .last_attack_at
                .map_or(true, |last| now.saturating_sub(last) >= ENEMY_ATTACK_COOLDOWN);
            if !cooldown_elapsed {
                continue;
            }
            self.world.enemies[enemy_index].last_attack_at = Some(now);
            self.audio.play(SoundCue::Attack);
            self.player.health = self.player.health.saturating_sub(ENEMY_CONTACT_DAMAGE);
            if self.player.health == 0 {
                info!(enemy = self.world.enemies[enemy_index].id.as_str(), "player_defeated");
                self.pending_ending = Some(Ending::Defeat);
                return;
            }
        }
    }

    /// Manual attack input. Only an aggro, still-alive enemy is a valid
    /// target; with none in range the press is a silent no-op.
    fn player_attack(&mut self, now: Duration) {
        let player_position = self.player.position;
        let current_map = self.current_map;
        let Some(enemy_index) = self.world.enemies.iter().position(|enemy| {
            enemy.map == current_map
                && enemy.alive()
                && enemy.aggro
                && within_radius(enemy.position, player_position, PLAYER_ATTACK_RANGE_UNITS)
        }) else {
            return;
        };

        self.audio.play(SoundCue::Attack);
        let enemy = &mut self.world.enemies[enemy_index];
        enemy.health = enemy.health.saturating_sub(PLAYER_ATTACK_DAMAGE);
        if enemy.alive() {
            return;
        }

        let enemy_name = enemy.name.clone();
        let era = enemy.map;
        info!(enemy = self.world.enemies[enemy_index].id.as_str(), "enemy_defeated");
        self.audio.play(SoundCue::EnemyDown);
        self.player.score = self.player.score.saturating_add(ENEMY_KILL_SCORE);
        self.notify(format!("Pokonano: {enemy_name}!"), now);
        if let Some(quest_index) = self.ledger.fight_quest_for_era(era) {
            let completed = self.ledger.progress(quest_index, 1);
            self.announce_completions(&completed, now);
        }
    }

    fn run_interaction_system(
        &mut self,
        now: Duration,
        input: &InputSnapshot,
        dialog_open_at_start: bool,
        quiz_open_at_start: bool,
    ) {
        if input.mute_toggle_pressed() {
            self.muted = !self.muted;
            self.audio.set_muted(self.muted);
        }
        if input.inventory_toggle_pressed() {
            self.ui.toggle_inventory();
        }
        if input.quests_toggle_pressed() {
            self.ui.toggle_quests();
        }
        if input.close_all_pressed() {
            self.close_all(now);
            return;
        }

        if let Some(choice) = input.choice_pressed() {
            if quiz_open_at_start {
                self.answer_quiz(choice as usize, now);
            } else if dialog_open_at_start {
                self.select_dialog_choice(choice as usize, now);
            }
        }

        if input.interact_pressed() && !dialog_open_at_start && !quiz_open_at_start {
            self.handle_interact(now);
        }

        if input.continue_pressed() && dialog_open_at_start {
            self.continue_dialog(now);
        }
    }

    /// Debounced interact dispatch with fixed priority: NPC first, then an
    /// uncollected item, then a portal. The first category with a match wins;
    /// no fall-through, and no eligible target is a silent no-op.
    fn handle_interact(&mut self, now: Duration) {
        if self.modal_open() {
            return;
        }
        if let Some(last) = self.last_interact_at {
            if now.saturating_sub(last) < INTERACT_DEBOUNCE {
                return;
            }
        }
        self.last_interact_at = Some(now);

        let player_position = self.player.position;
        let current_map = self.current_map;

        if let Some(npc_index) = self.world.npcs.iter().position(|npc| {
            npc.map == current_map
                && within_radius(npc.position, player_position, NPC_INTERACT_RADIUS_UNITS)
        }) {
            self.start_dialog(npc_index, now);
            return;
        }

        if let Some(item_index) = self.world.items.iter().position(|item| {
            item.map == current_map
                && !item.collected
                && within_radius(item.position, player_position, ITEM_INTERACT_RADIUS_UNITS)
        }) {
            self.collect_item(item_index, now);
            return;
        }

        if let Some(portal_index) = self.world.portals.iter().position(|portal| {
            portal.map == current_map
                && within_radius(portal.position, player_position, PORTAL_INTERACT_RADIUS_UNITS)
        }) {
            self.use_portal(portal_index, now);
        }
    }

    fn collect_item(&mut self, item_index: usize, now: Duration) {
        let item = &mut self.world.items[item_index];
        item.collected = true;
        let item_name = item.name.clone();
        self.inventory.push(item_index);
        self.audio.play(SoundCue::Pickup);
        self.notify(format!("Zdobyto: {item_name}!"), now);
        info!(item = self.world.items[item_index].id.as_str(), "item_collected");

        for quest_index in self.ledger.quests_for_item(item_index) {
            let completed = self.ledger.progress(quest_index, 1);
            self.announce_completions(&completed, now);
        }
    }

    fn use_portal(&mut self, portal_index: usize, now: Duration) {
        let portal = &mut self.world.portals[portal_index];
        let to_map = portal.to_map;
        let to_position = portal.to_position;
        let first_use = !portal.visited;
        portal.visited = true;

        self.current_map = to_map;
        self.player.position = to_position;
        self.audio.play(SoundCue::Portal);
        let map_name = self.world.maps[to_map].name.clone();
        self.notify(format!("Przeniesiono do: {map_name}"), now);
        info!(map = self.world.maps[to_map].id.as_str(), "map_entered");

        if first_use {
            for quest_index in self.ledger.explore_quests() {
                let completed = self.ledger.progress(quest_index, 1);
                self.announce_completions(&completed, now);
            }
        }
    }

    fn run_hud_system(&mut self, now: Duration) {
        self.ui.expire_notification(now, NOTIFICATION_TTL);
        if let Some(session) = &mut self.quiz {
            if let Some(locked_until) = session.locked_until {
                if now >= locked_until {
                    session.locked_until = None;
                    self.ui.set_quiz_locked(false);
                }
            }
        }
    }

    fn modal_open(&self) -> bool {
        self.dialog.is_some() || self.quiz.is_some()
    }

    /// Escape: panels close, and an open dialog or quiz is cancelled outright
    /// (cancelling also cancels any in-flight narration).
    fn close_all(&mut self, now: Duration) {
        self.ui.close_panels();
        if self.dialog.is_some() {
            self.close_dialog(DialogCloseReason::Cancelled, now);
        }
        if self.quiz.is_some() {
            self.quiz = None;
            self.ui.hide_quiz();
        }
    }

    fn notify(&mut self, text: String, now: Duration) {
        self.audio.play(SoundCue::Notify);
        self.ui.show_notification(text, now);
    }

    fn announce_completions(&mut self, completed: &[usize], now: Duration) {
        for quest_index in completed {
            let title = self.ledger.quests()[*quest_index].title.clone();
            self.audio.play(SoundCue::QuestComplete);
            self.notify(format!("Quest ukończony: {title}!"), now);
        }
    }
}
