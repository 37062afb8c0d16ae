//! # Scene Management System
//!
//! Switches between normal play and the end screens, and runs the frame loop.

use crate::input::cheat_key;
use crate::{
    CompletionState, CrawlResult, GameState, InputHandler, MacroquadDisplay, PlayerInput,
};
use log::{debug, info};
use macroquad::prelude::next_frame;

/// Represents the current scene in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneType {
    /// Normal gameplay
    Playing,
    /// End screen after death or victory
    GameOver(CompletionState),
}

/// What the frame loop should do after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneTransition {
    Stay,
    Switch(SceneType),
    Exit,
}

/// Applies one input to the game in the given scene.
pub fn apply_input(
    state: &mut GameState,
    scene: SceneType,
    input: PlayerInput,
) -> SceneTransition {
    match (scene, input) {
        (_, PlayerInput::Quit) => SceneTransition::Exit,
        (SceneType::GameOver(_), PlayerInput::Confirm) => SceneTransition::Exit,
        (SceneType::GameOver(_), PlayerInput::Move(_)) => SceneTransition::Stay,
        (SceneType::Playing, PlayerInput::Confirm) => SceneTransition::Stay,
        (SceneType::Playing, PlayerInput::Move(direction)) => {
            let delta = direction.to_delta();
            let outcome = state.move_player(delta.x, delta.y);
            debug!("Move {:?} -> {:?}", direction, outcome);
            if state.is_finished() {
                SceneTransition::Switch(SceneType::GameOver(state.completion_state()))
            } else {
                SceneTransition::Stay
            }
        }
    }
}

/// The main scene manager that coordinates all game scenes
pub struct SceneManager {
    current_scene: SceneType,
    game_state: GameState,
    display: MacroquadDisplay,
    input_handler: InputHandler,
}

impl SceneManager {
    pub fn new(
        game_state: GameState,
        display: MacroquadDisplay,
        input_handler: InputHandler,
    ) -> Self {
        Self {
            current_scene: SceneType::Playing,
            game_state,
            display,
            input_handler,
        }
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    /// Runs the frame loop until the player quits.
    pub async fn run(&mut self) -> CrawlResult<()> {
        loop {
            let view = self.display.view_size();
            if view != self.game_state.view_size() {
                self.game_state.resize(view.0, view.1);
            }

            if let Some(key) = self.input_handler.poll() {
                if self.current_scene == SceneType::Playing {
                    self.game_state.register_key(cheat_key(key));
                }

                if let Some(input) = self.input_handler.map_key(key) {
                    match apply_input(&mut self.game_state, self.current_scene, input) {
                        SceneTransition::Stay => {}
                        SceneTransition::Switch(scene) => {
                            info!("Switching to scene {:?}", scene);
                            self.current_scene = scene;
                        }
                        SceneTransition::Exit => break,
                    }
                }
            }

            self.display.render_game(&self.game_state);
            if let SceneType::GameOver(_) = self.current_scene {
                self.display.render_end_screen(&self.game_state);
            }

            next_frame().await;
        }

        let stats = self.game_state.statistics();
        info!(
            "Session over: level {}, {} kills, {} moves, {} damage taken",
            self.game_state.level(),
            stats.enemies_killed,
            stats.moves,
            stats.damage_taken
        );
        Ok(())
    }
}
