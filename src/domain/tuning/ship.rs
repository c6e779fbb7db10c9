/// Gameplay tuning for player-controlled ships.

#[derive(Debug, Clone, Copy)]
pub struct ShipTuning {
    /// World-space collision radius in pixels (server-side hit checks).
    pub radius: f64,

    /// Velocity multiplier applied once per tick.
    pub friction: f64,

    /// Speeds below this are snapped to zero.
    pub min_speed: f64,

    /// Maximum speed in pixels per tick.
    pub max_speed: f64,

    /// Velocity scale (negated) when a wall clamp fires on an axis.
    pub wall_restitution: f64,

    /// Delay between death and respawn, in milliseconds.
    pub respawn_delay_ms: u64,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            radius: 25.0,
            friction: 0.92,
            min_speed: 0.01,
            max_speed: 15.0,
            wall_restitution: 0.5,
            respawn_delay_ms: 6000,
        }
    }
}
