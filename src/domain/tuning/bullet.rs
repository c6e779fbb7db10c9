/// Gameplay tuning for bullets and rockets.

#[derive(Debug, Clone, Copy)]
pub struct BulletTuning {
    /// Standard bullet speed in pixels per tick.
    pub speed: f64,

    /// Rocket speed in pixels per tick.
    pub rocket_speed: f64,

    /// Standard bullet lifetime in ticks.
    pub lifetime_ticks: u32,

    /// Rocket lifetime in ticks.
    pub rocket_lifetime_ticks: u32,

    /// World-space collision radius in pixels.
    pub radius: f64,

    /// Base damage dealt by a standard bullet.
    pub damage: f64,

    /// Knockback magnitude applied along the bullet's direction of travel.
    pub knockback: f64,

    /// Radius of a rocket's explosion.
    pub explosion_radius: f64,

    /// Damage at the epicentre of a rocket explosion; falls off linearly.
    pub explosion_max_damage: f64,

    /// Radial knockback at the epicentre of a rocket explosion.
    pub explosion_max_knockback: f64,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            speed: 15.0,
            rocket_speed: 6.0,
            lifetime_ticks: 120,
            rocket_lifetime_ticks: 180,
            radius: 3.0,
            damage: 10.0,
            knockback: 10.0,
            explosion_radius: 150.0,
            explosion_max_damage: 100.0,
            explosion_max_knockback: 25.0,
        }
    }
}
