// Typed pickups: cadence-driven spawning, weighted kinds, contact queries.

use crate::domain::geometry::distance;
use crate::domain::tuning::{MapTuning, PowerupTuning};
use crate::domain::weapons::WeaponKind;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerupKind {
    Weapon,
    Health,
    Shield,
}

#[derive(Debug, Clone)]
pub struct Powerup {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub kind: PowerupKind,
    /// Present only when `kind` is `Weapon`.
    pub weapon: Option<WeaponKind>,
}

#[derive(Debug)]
pub struct PowerupField {
    powerups: Vec<Powerup>,
    next_id: u64,
    next_spawn_at: u64,
}

impl PowerupField {
    pub fn new() -> Self {
        Self {
            powerups: Vec::new(),
            next_id: 0,
            next_spawn_at: 0,
        }
    }

    pub fn maybe_spawn<R: Rng>(
        &mut self,
        now_ms: u64,
        rng: &mut R,
        tuning: &PowerupTuning,
        map: &MapTuning,
    ) -> Option<&Powerup> {
        if now_ms < self.next_spawn_at {
            return None;
        }
        self.next_spawn_at = now_ms + tuning.spawn_interval_ms;
        if self.powerups.len() >= tuning.max_live {
            return None;
        }

        let kind = weighted_kind(rng, tuning);
        let weapon = match kind {
            PowerupKind::Weapon => {
                let index = rng.gen_range(0..WeaponKind::SPECIALS.len());
                Some(WeaponKind::SPECIALS[index])
            }
            _ => None,
        };

        let id = self.next_id;
        self.next_id += 1;
        self.powerups.push(Powerup {
            id,
            x: rng.gen_range(-map.half_width()..=map.half_width()),
            y: rng.gen_range(-map.half_height()..=map.half_height()),
            kind,
            weapon,
        });
        self.powerups.last()
    }

    /// Id of the first pickup in contact with a ship at (x, y).
    pub fn contacted_by(
        &self,
        x: f64,
        y: f64,
        ship_radius: f64,
        tuning: &PowerupTuning,
    ) -> Option<u64> {
        let reach = ship_radius + tuning.pickup_radius;
        self.powerups
            .iter()
            .find(|powerup| distance(powerup.x, powerup.y, x, y) <= reach)
            .map(|powerup| powerup.id)
    }

    /// Removes and returns a pickup; collection removes before broadcasting.
    pub fn take(&mut self, id: u64) -> Option<Powerup> {
        let index = self.powerups.iter().position(|powerup| powerup.id == id)?;
        Some(self.powerups.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Powerup> {
        self.powerups.iter()
    }

    pub fn len(&self) -> usize {
        self.powerups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powerups.is_empty()
    }

    #[cfg(test)]
    pub fn insert_at(&mut self, x: f64, y: f64, kind: PowerupKind, weapon: Option<WeaponKind>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.powerups.push(Powerup {
            id,
            x,
            y,
            kind,
            weapon,
        });
        id
    }
}

impl Default for PowerupField {
    fn default() -> Self {
        Self::new()
    }
}

fn weighted_kind<R: Rng>(rng: &mut R, tuning: &PowerupTuning) -> PowerupKind {
    let total = tuning.weapon_weight + tuning.health_weight + tuning.shield_weight;
    let roll = rng.gen_range(0..total);
    if roll < tuning.weapon_weight {
        PowerupKind::Weapon
    } else if roll < tuning.weapon_weight + tuning.health_weight {
        PowerupKind::Health
    } else {
        PowerupKind::Shield
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn spawn_respects_cadence_and_cap() {
        let tuning = PowerupTuning::default();
        let map = MapTuning::default();
        let mut field = PowerupField::new();
        let mut rng = thread_rng();

        assert!(field.maybe_spawn(0, &mut rng, &tuning, &map).is_some());
        assert!(field.maybe_spawn(1, &mut rng, &tuning, &map).is_none());

        for _ in 0..tuning.max_live {
            field.insert_at(0.0, 0.0, PowerupKind::Health, None);
        }
        assert!(field
            .maybe_spawn(10 * tuning.spawn_interval_ms, &mut rng, &tuning, &map)
            .is_none());
    }

    #[test]
    fn weapon_pickups_always_carry_a_weapon_kind() {
        let tuning = PowerupTuning::default();
        let map = MapTuning::default();
        let mut field = PowerupField::new();
        let mut rng = thread_rng();
        for round in 0..50u64 {
            if let Some(powerup) = field.maybe_spawn(
                round * tuning.spawn_interval_ms,
                &mut rng,
                &tuning,
                &map,
            ) {
                let id = powerup.id;
                let powerup = field.take(id).expect("just spawned");
                assert_eq!(powerup.kind == PowerupKind::Weapon, powerup.weapon.is_some());
            }
        }
    }

    #[test]
    fn contact_honors_combined_radius() {
        let tuning = PowerupTuning::default();
        let mut field = PowerupField::new();
        let id = field.insert_at(0.0, 0.0, PowerupKind::Shield, None);
        let reach = 25.0 + tuning.pickup_radius;
        assert_eq!(field.contacted_by(reach - 1.0, 0.0, 25.0, &tuning), Some(id));
        assert_eq!(field.contacted_by(reach + 1.0, 0.0, 25.0, &tuning), None);
    }

    #[test]
    fn take_is_one_shot() {
        let mut field = PowerupField::new();
        let id = field.insert_at(0.0, 0.0, PowerupKind::Health, None);
        assert!(field.take(id).is_some());
        assert!(field.take(id).is_none());
    }
}
