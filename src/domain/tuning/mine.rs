/// Gameplay tuning for mines.

#[derive(Debug, Clone, Copy)]
pub struct MineTuning {
    /// Milliseconds between spawn attempts.
    pub spawn_interval_ms: u64,

    /// Maximum number of live mines on the map.
    pub max_live: usize,

    /// Contact radius that detonates the mine.
    pub trigger_radius: f64,

    /// Radius of the explosion's damage and knockback.
    pub damage_radius: f64,

    /// Damage dealt to every ship inside the damage radius.
    pub damage: f64,

    /// Knockback at the epicentre; falls off linearly with distance.
    pub max_knockback: f64,

    /// Stagger between an explosion and its chain-reaction check.
    pub chain_delay_ms: u64,

    /// Extra reach when a laser sweeps over a mine.
    pub laser_trigger_slack: f64,
}

impl Default for MineTuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 2000,
            max_live: 10,
            trigger_radius: 20.0,
            damage_radius: 240.0,
            damage: 40.0,
            max_knockback: 20.0,
            chain_delay_ms: 100,
            laser_trigger_slack: 10.0,
        }
    }
}
