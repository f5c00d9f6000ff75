//! Timed power-ups and consumable items.
//!
//! Every timed effect is the same value: a kind plus the millisecond it was
//! activated, with one shared duration. Timers are polled once per frame
//! against the simulation clock: no callbacks, no scheduling. Re-activating
//! a kind before it expires simply restarts its window.

use crate::tunables::POWER_UP_DURATION_MS;

/// Consumables carried into the level. Four of them start a timer; the
/// watermelon and the whistle are one-shot effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    InvincibilityPotion,
    SpeedPotion,
    RocketBoots,
    FreezePotion,
    Watermelon,
    DragonWhistle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    Invincibility,
    SpeedBoost,
    LowGravity,
    EnemyFreeze,
}

#[derive(Debug, Clone, Copy)]
pub struct PowerUpTimer {
    pub kind: PowerUpKind,
    activated_ms: u64,
}

impl PowerUpTimer {
    pub fn expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.activated_ms) >= POWER_UP_DURATION_MS
    }
}

/// The level's set of running timers. Kinds are independent; at most one
/// timer per kind exists at a time.
#[derive(Debug, Default)]
pub struct ActiveTimers {
    timers: Vec<PowerUpTimer>,
}

impl ActiveTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the kind's window, or restart it if already running.
    pub fn activate(&mut self, kind: PowerUpKind, now_ms: u64) {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.kind == kind) {
            timer.activated_ms = now_ms;
        } else {
            self.timers.push(PowerUpTimer {
                kind,
                activated_ms: now_ms,
            });
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Remove and return every kind whose window has closed. The caller
    /// applies the matching revert.
    pub fn drain_expired(&mut self, now_ms: u64) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        self.timers.retain(|timer| {
            if timer.expired(now_ms) {
                expired.push(timer.kind);
                false
            } else {
                true
            }
        });
        expired
    }
}
