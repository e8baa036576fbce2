//! Score and timed abilities
//!
//! Every change is pushed to the registered listeners as it happens. Ability
//! countdowns tick once per second of gameplay time, so they freeze with the
//! game when it is paused.

use serde::{Deserialize, Serialize};

use super::events::{EventBus, EventListener, GameEvent};

/// Countdown granularity
const COUNTDOWN_STEP_MS: u32 = 1000;
const COUNTDOWN_STEP_SECS: f32 = 1.0;

/// A timed player buff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    /// Ranged attack
    Shooting,
    /// Faster running and higher jumps
    Speed,
}

/// One-second-resolution countdown that saturates at zero
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AbilityTimer {
    remaining_ms: u32,
    /// Seconds accumulated toward the next step
    elapsed: f32,
}

impl AbilityTimer {
    /// Positive values (re)start the countdown; zero or below cancels it
    pub fn set(&mut self, ms: i64) {
        self.remaining_ms = ms.clamp(0, u32::MAX as i64) as u32;
        self.elapsed = 0.0;
    }

    #[inline]
    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0
    }

    /// Advance by `dt` seconds; returns how many one-second steps elapsed
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.is_active() {
            return 0;
        }
        self.elapsed += dt.max(0.0);
        let mut steps = 0;
        while self.elapsed >= COUNTDOWN_STEP_SECS && self.is_active() {
            self.elapsed -= COUNTDOWN_STEP_SECS;
            self.remaining_ms = self.remaining_ms.saturating_sub(COUNTDOWN_STEP_MS);
            steps += 1;
        }
        if !self.is_active() {
            self.elapsed = 0.0;
        }
        steps
    }
}

/// Session-wide score and ability state
#[derive(Debug, Default)]
pub struct Status {
    score: u64,
    shooting: AbilityTimer,
    speed: AbilityTimer,
    bus: EventBus,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl EventListener + 'static) {
        self.bus.subscribe(listener);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.bus.emit(event);
    }

    /// Push the current values to listeners (fresh HUD)
    pub fn announce(&mut self) {
        self.bus.emit(GameEvent::ScoreChanged { score: self.score });
        for ability in [AbilityKind::Shooting, AbilityKind::Speed] {
            let remaining_ms = self.timer(ability).remaining_ms();
            self.bus.emit(GameEvent::AbilityTimeChanged { ability, remaining_ms });
        }
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Scores only ever go up
    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points as u64);
        self.bus.emit(GameEvent::ScoreChanged { score: self.score });
    }

    pub fn timer(&self, ability: AbilityKind) -> &AbilityTimer {
        match ability {
            AbilityKind::Shooting => &self.shooting,
            AbilityKind::Speed => &self.speed,
        }
    }

    fn timer_mut(&mut self, ability: AbilityKind) -> &mut AbilityTimer {
        match ability {
            AbilityKind::Shooting => &mut self.shooting,
            AbilityKind::Speed => &mut self.speed,
        }
    }

    pub fn has(&self, ability: AbilityKind) -> bool {
        self.timer(ability).is_active()
    }

    pub fn set_ability(&mut self, ability: AbilityKind, ms: i64) {
        self.timer_mut(ability).set(ms);
        let remaining_ms = self.timer(ability).remaining_ms();
        self.bus.emit(GameEvent::AbilityTimeChanged { ability, remaining_ms });
    }

    pub fn clear_abilities(&mut self) {
        self.set_ability(AbilityKind::Shooting, 0);
        self.set_ability(AbilityKind::Speed, 0);
    }

    /// Tick both countdowns, notifying once per elapsed step
    pub fn advance(&mut self, dt: f32) {
        for ability in [AbilityKind::Shooting, AbilityKind::Speed] {
            let steps = self.timer_mut(ability).advance(dt);
            if steps > 0 {
                let remaining_ms = self.timer(ability).remaining_ms();
                self.bus.emit(GameEvent::AbilityTimeChanged { ability, remaining_ms });
            }
        }
    }
}
