// Gameplay tuning, kept separate from runtime/server configuration.

pub mod bot;
pub mod bullet;
pub mod laser;
pub mod map;
pub mod mine;
pub mod powerup;
pub mod ship;

pub use bot::BotTuning;
pub use bullet::BulletTuning;
pub use laser::LaserTuning;
pub use map::MapTuning;
pub use mine::MineTuning;
pub use powerup::PowerupTuning;
pub use ship::ShipTuning;

/// Bundle of all gameplay tuning consumed by the room task.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tuning {
    pub map: MapTuning,
    pub ship: ShipTuning,
    pub bullet: BulletTuning,
    pub mine: MineTuning,
    pub powerup: PowerupTuning,
    pub laser: LaserTuning,
    pub bot: BotTuning,
}
