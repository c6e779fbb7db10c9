// Domain layer: core simulation types and rules.

pub mod geometry;
pub mod systems;
pub mod tuning;
pub mod weapons;
pub mod world;

pub use weapons::WeaponKind;
pub use world::{Bot, GameSettings, SettingsPatch, Ship, World};
