/// Gameplay tuning for pickups.

#[derive(Debug, Clone, Copy)]
pub struct PowerupTuning {
    /// Milliseconds between spawn attempts.
    pub spawn_interval_ms: u64,

    /// Maximum number of uncollected pickups on the map.
    pub max_live: usize,

    /// Contact radius for collection (added to the ship radius).
    pub pickup_radius: f64,

    /// Health restored by a health pickup.
    pub heal_amount: f64,

    /// Shield granted by a shield pickup.
    pub shield_amount: f64,

    /// Shots granted when a special weapon is picked up.
    pub special_ammo: u32,

    /// Weighted-choice weights for pickup kinds.
    pub weapon_weight: u32,
    pub health_weight: u32,
    pub shield_weight: u32,
}

impl Default for PowerupTuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 3000,
            max_live: 5,
            pickup_radius: 30.0,
            heal_amount: 50.0,
            shield_amount: 30.0,
            special_ammo: 3,
            weapon_weight: 70,
            health_weight: 20,
            shield_weight: 10,
        }
    }
}
