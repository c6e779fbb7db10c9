// World state: ships, bots and match settings, plus the small mutators the
// room task drives every tick. Subsystems reference entities by id only.

use crate::domain::tuning::MapTuning;
use crate::domain::weapons::WeaponKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed palette assigned to ships by insertion order.
pub const NEON_PALETTE: [&str; 10] = [
    "#39ff14", "#00e5ff", "#ff3cac", "#faff00", "#ff6f00", "#b026ff", "#04d9ff", "#ff073a",
    "#0aff9d", "#ff9ff3",
];

/// Color used for every bot cursor.
pub const BOT_COLOR: &str = "#7f8c8d";

pub const MAX_HEALTH: f64 = 100.0;

/// A connected player's ship.
#[derive(Debug, Clone)]
pub struct Ship {
    pub id: String,
    pub player_key: Option<String>,
    pub label: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub vx: f64,
    pub vy: f64,
    pub health: f64,
    pub shield: f64,
    pub weapon: WeaponKind,
    /// Remaining shots for the active special weapon; `None` means infinite.
    pub ammo: Option<u32>,
    pub kills: u32,
    pub deaths: u32,
    pub bot_kills: u32,
    pub placement_points: u32,
    pub score_submitted: bool,
    /// Monotonic admission counter; breaks leaderboard ties.
    pub insertion_seq: u64,
}

impl Ship {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Leaderboard sort key.
    pub fn rank_score(&self) -> i64 {
        self.kills as i64 * 100 - self.deaths as i64 * 50
    }

    /// Applies damage, draining the shield before health. Health is clamped
    /// to [0, 100].
    pub fn absorb_damage(&mut self, amount: f64) {
        let mut remaining = amount.max(0.0);
        if self.shield > 0.0 {
            let absorbed = self.shield.min(remaining);
            self.shield -= absorbed;
            remaining -= absorbed;
        }
        self.health = (self.health - remaining).clamp(0.0, MAX_HEALTH);
    }

    /// Spends one shot of the active special weapon, reverting to the machine
    /// gun when the budget runs out.
    pub fn spend_ammo(&mut self) {
        if let Some(ammo) = self.ammo {
            let left = ammo.saturating_sub(1);
            if left == 0 {
                self.weapon = WeaponKind::MachineGun;
                self.ammo = None;
            } else {
                self.ammo = Some(left);
            }
        }
    }

    pub fn arm(&mut self, weapon: WeaponKind, ammo: u32) {
        self.weapon = weapon;
        self.ammo = if weapon.is_special() { Some(ammo) } else { None };
    }
}

/// A server-driven NPC ship.
#[derive(Debug, Clone)]
pub struct Bot {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub health: f64,
    pub respawn_due_at: Option<u64>,
}

impl Bot {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Match settings mutable through the admin channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Bot movement speed in pixels per tick.
    pub bot_speed: f64,
    /// Target bot population.
    pub bot_count: u32,
    /// Health bots spawn with, 1..=100.
    pub bot_health: u32,
    /// Health ships spawn and respawn with, 1..=100.
    pub player_starting_health: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            bot_speed: 2.5,
            bot_count: 4,
            bot_health: 30,
            player_starting_health: 100,
        }
    }
}

/// Partial settings update from `admin:updateSettings`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub bot_speed: Option<f64>,
    pub bot_count: Option<u32>,
    pub bot_health: Option<u32>,
    pub player_starting_health: Option<u32>,
}

#[derive(Debug)]
pub enum SettingsError {
    OutOfRange(&'static str),
}

/// Mapping of player id to ship and bot id to bot, plus settings.
///
/// The room task is the only writer; everything here is synchronous.
#[derive(Debug, Default)]
pub struct World {
    ships: HashMap<String, Ship>,
    bots: Vec<Bot>,
    pub settings: GameSettings,
    next_insertion: u64,
    next_bot_seq: u64,
}

impl World {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn add_ship(&mut self, id: String, player_key: Option<String>) -> &Ship {
        let seq = self.next_insertion;
        self.next_insertion += 1;
        let ship = Ship {
            label: format!("Player {}", seq + 1),
            color: NEON_PALETTE[(seq as usize) % NEON_PALETTE.len()].to_string(),
            id: id.clone(),
            player_key,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            vx: 0.0,
            vy: 0.0,
            health: self.settings.player_starting_health as f64,
            shield: 0.0,
            weapon: WeaponKind::MachineGun,
            ammo: None,
            kills: 0,
            deaths: 0,
            bot_kills: 0,
            placement_points: 0,
            score_submitted: false,
            insertion_seq: seq,
        };
        self.ships.entry(id).or_insert(ship)
    }

    pub fn remove_ship(&mut self, id: &str) -> Option<Ship> {
        self.ships.remove(id)
    }

    pub fn ship(&self, id: &str) -> Option<&Ship> {
        self.ships.get(id)
    }

    pub fn ship_mut(&mut self, id: &str) -> Option<&mut Ship> {
        self.ships.get_mut(id)
    }

    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships.values()
    }

    pub fn ships_mut(&mut self) -> impl Iterator<Item = &mut Ship> {
        self.ships.values_mut()
    }

    pub fn ship_count(&self) -> usize {
        self.ships.len()
    }

    /// Stores a client-reported pose, clamped to the map.
    pub fn move_ship(&mut self, id: &str, x: f64, y: f64, rotation: f64, map: &MapTuning) {
        if let Some(ship) = self.ships.get_mut(id) {
            let (cx, cy) = map.clamp(x, y);
            ship.x = cx;
            ship.y = cy;
            ship.rotation = rotation;
        }
    }

    pub fn set_health(&mut self, id: &str, health: f64) {
        if let Some(ship) = self.ships.get_mut(id) {
            ship.health = health.clamp(0.0, MAX_HEALTH);
        }
    }

    pub fn apply_knockback(&mut self, id: &str, dvx: f64, dvy: f64) {
        if let Some(ship) = self.ships.get_mut(id) {
            ship.vx += dvx;
            ship.vy += dvy;
        }
    }

    pub fn add_kill(&mut self, id: &str) {
        if let Some(ship) = self.ships.get_mut(id) {
            ship.kills += 1;
        }
    }

    pub fn add_death(&mut self, id: &str) {
        if let Some(ship) = self.ships.get_mut(id) {
            ship.deaths += 1;
        }
    }

    /// Ships sorted for the leaderboard: rank score descending, admission
    /// order breaking ties.
    pub fn leaderboard(&self) -> Vec<&Ship> {
        let mut ships: Vec<&Ship> = self.ships.values().collect();
        ships.sort_by(|a, b| {
            b.rank_score()
                .cmp(&a.rank_score())
                .then(a.insertion_seq.cmp(&b.insertion_seq))
        });
        ships
    }

    /// 1-based leaderboard position.
    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.leaderboard()
            .iter()
            .position(|ship| ship.id == id)
            .map(|index| index + 1)
    }

    pub fn add_bot(&mut self, x: f64, y: f64, heading: f64) -> &Bot {
        let seq = self.next_bot_seq;
        self.next_bot_seq += 1;
        self.bots.push(Bot {
            id: format!("bot-{seq}"),
            label: format!("Bot {}", seq + 1),
            x,
            y,
            heading,
            health: self.settings.bot_health as f64,
            respawn_due_at: None,
        });
        self.bots.last().expect("bot was just pushed")
    }

    /// Removes the most recently added bot.
    pub fn remove_tail_bot(&mut self) -> Option<Bot> {
        self.bots.pop()
    }

    pub fn remove_bot(&mut self, id: &str) -> Option<Bot> {
        let index = self.bots.iter().position(|bot| bot.id == id)?;
        Some(self.bots.remove(index))
    }

    pub fn bot(&self, id: &str) -> Option<&Bot> {
        self.bots.iter().find(|bot| bot.id == id)
    }

    pub fn bot_mut(&mut self, id: &str) -> Option<&mut Bot> {
        self.bots.iter_mut().find(|bot| bot.id == id)
    }

    pub fn bots(&self) -> impl Iterator<Item = &Bot> {
        self.bots.iter()
    }

    pub fn bots_mut(&mut self) -> impl Iterator<Item = &mut Bot> {
        self.bots.iter_mut()
    }

    pub fn bot_count(&self) -> usize {
        self.bots.len()
    }

    /// Applies a validated partial settings update.
    pub fn patch_settings(&mut self, patch: SettingsPatch) -> Result<(), SettingsError> {
        if let Some(speed) = patch.bot_speed {
            if !speed.is_finite() || speed < 0.0 {
                return Err(SettingsError::OutOfRange("botSpeed"));
            }
        }
        if let Some(health) = patch.bot_health {
            if !(1..=100).contains(&health) {
                return Err(SettingsError::OutOfRange("botHealth"));
            }
        }
        if let Some(health) = patch.player_starting_health {
            if !(1..=100).contains(&health) {
                return Err(SettingsError::OutOfRange("playerStartingHealth"));
            }
        }

        if let Some(speed) = patch.bot_speed {
            self.settings.bot_speed = speed;
        }
        if let Some(count) = patch.bot_count {
            self.settings.bot_count = count;
        }
        if let Some(health) = patch.bot_health {
            self.settings.bot_health = health;
        }
        if let Some(health) = patch.player_starting_health {
            self.settings.player_starting_health = health;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(GameSettings::default())
    }

    #[test]
    fn colors_follow_insertion_order() {
        let mut world = world();
        let first = world.add_ship("a".into(), None).color.clone();
        let second = world.add_ship("b".into(), None).color.clone();
        assert_eq!(first, NEON_PALETTE[0]);
        assert_eq!(second, NEON_PALETTE[1]);
    }

    #[test]
    fn move_ship_clamps_to_bounds() {
        let mut world = world();
        let map = MapTuning::default();
        world.add_ship("a".into(), None);
        world.move_ship("a", 1e9, -1e9, 0.5, &map);
        let ship = world.ship("a").expect("ship exists");
        assert_eq!(ship.x, map.half_width());
        assert_eq!(ship.y, -map.half_height());
    }

    #[test]
    fn set_health_clamps() {
        let mut world = world();
        world.add_ship("a".into(), None);
        world.set_health("a", 250.0);
        assert_eq!(world.ship("a").expect("ship").health, MAX_HEALTH);
        world.set_health("a", -10.0);
        assert_eq!(world.ship("a").expect("ship").health, 0.0);
    }

    #[test]
    fn shield_absorbs_before_health() {
        let mut world = world();
        world.add_ship("a".into(), None);
        let ship = world.ship_mut("a").expect("ship");
        ship.shield = 30.0;
        ship.absorb_damage(20.0);
        assert_eq!(ship.shield, 10.0);
        assert_eq!(ship.health, 100.0);
        ship.absorb_damage(20.0);
        assert_eq!(ship.shield, 0.0);
        assert_eq!(ship.health, 90.0);
    }

    #[test]
    fn rank_orders_by_score_then_insertion() {
        let mut world = world();
        world.add_ship("a".into(), None);
        world.add_ship("b".into(), None);
        world.add_ship("c".into(), None);
        world.add_kill("b");
        world.add_kill("b");
        world.add_kill("c");
        world.add_death("c");
        // b: 200, c: 50, a: 0
        assert_eq!(world.rank_of("b"), Some(1));
        assert_eq!(world.rank_of("c"), Some(2));
        assert_eq!(world.rank_of("a"), Some(3));
    }

    #[test]
    fn rank_ties_break_by_insertion_order() {
        let mut world = world();
        world.add_ship("a".into(), None);
        world.add_ship("b".into(), None);
        assert_eq!(world.rank_of("a"), Some(1));
        assert_eq!(world.rank_of("b"), Some(2));
    }

    #[test]
    fn bot_ids_never_collide_with_player_ids() {
        let mut world = world();
        world.add_ship("player-1".into(), None);
        let bot_id = world.add_bot(0.0, 0.0, 0.0).id.clone();
        assert!(bot_id.starts_with("bot-"));
        assert!(world.ship(&bot_id).is_none());
    }

    #[test]
    fn ammo_runs_out_and_reverts_to_machine_gun() {
        let mut world = world();
        world.add_ship("a".into(), None);
        let ship = world.ship_mut("a").expect("ship");
        ship.arm(WeaponKind::Rocket, 3);
        ship.spend_ammo();
        ship.spend_ammo();
        assert_eq!(ship.weapon, WeaponKind::Rocket);
        ship.spend_ammo();
        assert_eq!(ship.weapon, WeaponKind::MachineGun);
        assert_eq!(ship.ammo, None);
    }

    #[test]
    fn settings_patch_rejects_out_of_range() {
        let mut world = world();
        let err = world.patch_settings(SettingsPatch {
            bot_health: Some(0),
            ..Default::default()
        });
        assert!(err.is_err());
        // Nothing was applied.
        assert_eq!(world.settings.bot_health, GameSettings::default().bot_health);
    }

    #[test]
    fn settings_patch_applies_partial_keys() {
        let mut world = world();
        world
            .patch_settings(SettingsPatch {
                bot_count: Some(9),
                bot_speed: Some(4.5),
                ..Default::default()
            })
            .expect("valid patch");
        assert_eq!(world.settings.bot_count, 9);
        assert_eq!(world.settings.bot_speed, 4.5);
        assert_eq!(
            world.settings.player_starting_health,
            GameSettings::default().player_starting_health
        );
    }
}
