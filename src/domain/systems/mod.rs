// Per-tick entity systems driven by the room task.

pub mod bots;
pub mod bullets;
pub mod lasers;
pub mod mines;
pub mod physics;
pub mod powerups;

pub use bullets::{Bullet, Bullets};
pub use lasers::{Laser, Lasers};
pub use mines::{Mine, MineField};
pub use powerups::{Powerup, PowerupField, PowerupKind};
