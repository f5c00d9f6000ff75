//! Events emitted by one level update.
//!
//! The level never owns persistent player progress and never plays audio or
//! spawns particles; it reports what happened and the embedder reacts.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEvent {
    /// Signed health delta (damage is negative).
    HealthChanged(i32),
    /// Signed coin delta.
    CoinsChanged(i32),
    /// The active entity fell out of the world.
    Died,
    /// The active entity reached the goal marker.
    ReachedGoal,
    /// Presentation cue for the audio/particle layers.
    Cue(FxCue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxCue {
    Jumped,
    Stomped,
    CoinCollected,
    CrateExploded,
    EnemyExploded,
    PlayerHit,
}
