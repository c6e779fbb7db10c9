/// Gameplay tuning for continuous laser beams.

#[derive(Debug, Clone, Copy)]
pub struct LaserTuning {
    /// Beam duration in ticks.
    pub duration_ticks: u32,

    /// Raycast segment length in pixels.
    pub length: f64,

    /// Ships within this distance of the segment take damage.
    pub hit_distance: f64,

    /// Damage dealt per tick to each ship the beam touches.
    pub damage_per_tick: f64,
}

impl Default for LaserTuning {
    fn default() -> Self {
        Self {
            duration_ticks: 120,
            length: 2000.0,
            hit_distance: 25.0,
            damage_per_tick: 2.0,
        }
    }
}
