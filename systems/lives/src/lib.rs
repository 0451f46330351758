#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Life counter that ends the run when the last life is lost.

use panel_cut_core::{Event, LivesConfig};
use tracing::info;

/// Result of losing a life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifeLoss {
    /// A life was lost; the contained count remains.
    Remaining(u32),
    /// The last life was lost.
    GameOver,
    /// The run was already over, nothing changed.
    Ignored,
}

/// Pure system counting the player's remaining lives.
#[derive(Clone, Debug)]
pub struct Lives {
    max_lives: u32,
    lives: u32,
    game_over: bool,
}

impl Lives {
    /// Creates a counter filled to the configured maximum.
    #[must_use]
    pub fn new(config: LivesConfig) -> Self {
        Self {
            max_lives: config.max_lives,
            lives: config.max_lives,
            game_over: false,
        }
    }

    /// Lives left.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Lives at the start of a run.
    #[must_use]
    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    /// Reports whether the counter has run out.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Removes one life, never dropping below zero.
    pub fn lose_life(&mut self) -> LifeLoss {
        if self.game_over {
            return LifeLoss::Ignored;
        }

        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.game_over = true;
            LifeLoss::GameOver
        } else {
            LifeLoss::Remaining(self.lives)
        }
    }

    /// Refills the counter.
    pub fn reset(&mut self) {
        self.lives = self.max_lives;
        self.game_over = false;
    }

    /// Consumes judgment events, removing one life per missed panel.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        for event in events {
            if !matches!(event, Event::PanelMissed { .. }) {
                continue;
            }

            match self.lose_life() {
                LifeLoss::Remaining(lives) => out.push(Event::LivesChanged { lives }),
                LifeLoss::GameOver => {
                    info!(max_lives = self.max_lives, "last life lost");
                    out.push(Event::LivesChanged { lives: 0 });
                    out.push(Event::GameOver);
                }
                LifeLoss::Ignored => {}
            }
        }
    }
}
