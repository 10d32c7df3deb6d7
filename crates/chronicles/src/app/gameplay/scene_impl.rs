impl Scene for GameScene {
    fn load(&mut self) {
        info!(
            maps = self.world.maps.len(),
            npcs = self.world.npcs.len(),
            items = self.world.items.len(),
            portals = self.world.portals.len(),
            enemies = self.world.enemies.len(),
            quests = self.ledger.quests().len(),
            "world_loaded"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        now: Duration,
        input: &InputSnapshot,
    ) -> SceneCommand {
        if let Some(ending) = self.pending_ending {
            return SceneCommand::End(ending);
        }
        self.run_systems(fixed_dt_seconds, now, input);
        match self.pending_ending {
            Some(ending) => SceneCommand::End(ending),
            None => SceneCommand::None,
        }
    }

    fn frame_view(&self) -> FrameView<'_> {
        let map = &self.world.maps[self.current_map];
        FrameView {
            map_name: &map.name,
            background: map.background,
            grid: &map.grid,
            tile_size: self.world.tile_size,
            camera: self.player.position,
            sprites: self.build_sprites(),
            prompt: self.prompt_text(),
            hud: HudView {
                location: map.name.clone(),
                active_quests: self.ledger.active_count(),
                inventory_count: self.inventory.len(),
                health: self.player.health,
                max_health: PLAYER_MAX_HEALTH,
                score: self.player.score,
            },
            dialog: self.ui.dialog.as_ref().map(|dialog| DialogBoxView {
                speaker: dialog.speaker.clone(),
                text: dialog.text.clone(),
                choices: dialog.choices.clone(),
                continue_hint: dialog.continue_hint,
            }),
            quiz: self.ui.quiz.as_ref().map(|quiz| QuizBoxView {
                question: quiz.question.clone(),
                answers: quiz.answers.clone(),
                locked: quiz.locked,
            }),
            notification: self
                .ui
                .notification
                .as_ref()
                .map(|(text, _)| text.clone()),
            inventory_panel: self.ui.inventory_open.then(|| {
                self.inventory
                    .iter()
                    .map(|item_index| {
                        let item = &self.world.items[*item_index];
                        InventoryEntryView {
                            name: item.name.clone(),
                            description: item.description.clone(),
                        }
                    })
                    .collect()
            }),
            quest_panel: self.ui.quests_open.then(|| {
                self.ledger
                    .quests()
                    .iter()
                    .filter(|quest| quest.active || quest.completed)
                    .map(|quest| QuestEntryView {
                        title: quest.title.clone(),
                        description: quest.description.clone(),
                        objectives: quest.objectives.clone(),
                        progress: quest.progress,
                        required: quest.required,
                        completed: quest.completed,
                    })
                    .collect()
            }),
        }
    }

    fn window_title(&self) -> Option<String> {
        Some(format!(
            "Kroniki Zagiętego Czasu - {}",
            self.world.maps[self.current_map].name
        ))
    }
}

impl GameScene {
    fn build_sprites(&self) -> Vec<SpriteView> {
        let mut sprites = Vec::new();
        for portal in &self.world.portals {
            if portal.map != self.current_map {
                continue;
            }
            sprites.push(SpriteView {
                kind: SpriteKind::Portal,
                position: portal.position,
                label: None,
            });
        }
        for item in &self.world.items {
            if item.map != self.current_map || item.collected {
                continue;
            }
            sprites.push(SpriteView {
                kind: SpriteKind::Item,
                position: item.position,
                label: None,
            });
        }
        // A dead enemy stops rendering along with everything else it did.
        for enemy in &self.world.enemies {
            if enemy.map != self.current_map || !enemy.alive() {
                continue;
            }
            sprites.push(SpriteView {
                kind: SpriteKind::Enemy {
                    aggro: enemy.aggro,
                    aggro_radius: enemy.aggro_radius,
                    health_fraction: enemy.health as f32 / enemy.max_health.max(1) as f32,
                },
                position: enemy.position,
                label: Some(enemy.name.clone()),
            });
        }
        for npc in &self.world.npcs {
            if npc.map != self.current_map {
                continue;
            }
            sprites.push(SpriteView {
                kind: SpriteKind::Npc,
                position: npc.position,
                label: Some(npc.label()),
            });
        }
        sprites.push(SpriteView {
            kind: SpriteKind::Player {
                facing: self.player.direction.to_facing(),
                moving: self.player.moving,
            },
            position: self.player.position,
            label: None,
        });
        sprites
    }

    /// Interaction prompt for the renderer: shown whenever any interactable
    /// is in range and no dialog or quiz box is open.
    fn prompt_text(&self) -> Option<String> {
        if self.modal_open() {
            return None;
        }
        let player_position = self.player.position;
        let near_npc = self.world.npcs.iter().any(|npc| {
            npc.map == self.current_map
                && within_radius(npc.position, player_position, NPC_INTERACT_RADIUS_UNITS)
        });
        let near_item = self.world.items.iter().any(|item| {
            item.map == self.current_map
                && !item.collected
                && within_radius(item.position, player_position, ITEM_INTERACT_RADIUS_UNITS)
        });
        let near_portal = self.world.portals.iter().any(|portal| {
            portal.map == self.current_map
                && within_radius(portal.position, player_position, PORTAL_INTERACT_RADIUS_UNITS)
        });
        (near_npc || near_item || near_portal).then(|| "Naciśnij E, aby działać".to_string())
    }
}
