// Static mines: cadence-driven spawning and proximity queries. Explosion
// effects touch ships, so they are resolved by the room task.

use crate::domain::geometry::distance;
use crate::domain::tuning::{MapTuning, MineTuning};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Mine {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug)]
pub struct MineField {
    mines: Vec<Mine>,
    next_id: u64,
    next_spawn_at: u64,
}

impl MineField {
    pub fn new() -> Self {
        Self {
            mines: Vec::new(),
            next_id: 0,
            next_spawn_at: 0,
        }
    }

    /// Spawns one mine when the cadence allows and the cap is not reached.
    pub fn maybe_spawn<R: Rng>(
        &mut self,
        now_ms: u64,
        rng: &mut R,
        tuning: &MineTuning,
        map: &MapTuning,
    ) -> Option<&Mine> {
        if now_ms < self.next_spawn_at {
            return None;
        }
        self.next_spawn_at = now_ms + tuning.spawn_interval_ms;
        if self.mines.len() >= tuning.max_live {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.mines.push(Mine {
            id,
            x: rng.gen_range(-map.half_width()..=map.half_width()),
            y: rng.gen_range(-map.half_height()..=map.half_height()),
        });
        self.mines.last()
    }

    /// Removes and returns a mine. Explosions must take the mine out of the
    /// set before applying any effect, so a chain cannot re-trigger it.
    pub fn take(&mut self, id: u64) -> Option<Mine> {
        let index = self.mines.iter().position(|mine| mine.id == id)?;
        Some(self.mines.remove(index))
    }

    /// Id of the first mine whose trigger radius contains the point.
    pub fn triggered_at(&self, x: f64, y: f64, tuning: &MineTuning) -> Option<u64> {
        self.mines
            .iter()
            .find(|mine| distance(mine.x, mine.y, x, y) <= tuning.trigger_radius)
            .map(|mine| mine.id)
    }

    /// Mines reachable from an explosion epicentre for chain reactions.
    pub fn chained_by(&self, x: f64, y: f64, damage_radius: f64, tuning: &MineTuning) -> Vec<u64> {
        let reach = tuning.trigger_radius + damage_radius;
        self.mines
            .iter()
            .filter(|mine| distance(mine.x, mine.y, x, y) <= reach)
            .map(|mine| mine.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mine> {
        self.mines.iter()
    }

    pub fn len(&self) -> usize {
        self.mines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mines.is_empty()
    }

    #[cfg(test)]
    pub fn insert_at(&mut self, x: f64, y: f64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.mines.push(Mine { id, x, y });
        id
    }
}

impl Default for MineField {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn spawn_respects_cadence_and_cap() {
        let tuning = MineTuning::default();
        let map = MapTuning::default();
        let mut field = MineField::new();
        let mut rng = thread_rng();

        assert!(field.maybe_spawn(0, &mut rng, &tuning, &map).is_some());
        // Cadence not yet elapsed.
        assert!(field.maybe_spawn(100, &mut rng, &tuning, &map).is_none());
        assert!(field
            .maybe_spawn(tuning.spawn_interval_ms, &mut rng, &tuning, &map)
            .is_some());

        for _ in 0..tuning.max_live {
            field.insert_at(0.0, 0.0);
        }
        let at_cap = field.len();
        assert!(field
            .maybe_spawn(10 * tuning.spawn_interval_ms, &mut rng, &tuning, &map)
            .is_none());
        assert_eq!(field.len(), at_cap);
    }

    #[test]
    fn take_removes_before_effects() {
        let mut field = MineField::new();
        let id = field.insert_at(10.0, 10.0);
        let mine = field.take(id).expect("mine exists");
        assert_eq!(mine.id, id);
        assert!(field.take(id).is_none());
    }

    #[test]
    fn trigger_requires_proximity() {
        let tuning = MineTuning::default();
        let mut field = MineField::new();
        let id = field.insert_at(0.0, 0.0);
        assert_eq!(field.triggered_at(5.0, 5.0, &tuning), Some(id));
        assert_eq!(
            field.triggered_at(tuning.trigger_radius + 1.0, 0.0, &tuning),
            None
        );
    }

    #[test]
    fn chain_reach_includes_trigger_slack() {
        let tuning = MineTuning::default();
        let mut field = MineField::new();
        let near = field.insert_at(tuning.damage_radius + tuning.trigger_radius - 1.0, 0.0);
        let far = field.insert_at(tuning.damage_radius + tuning.trigger_radius + 1.0, 0.0);
        let chained = field.chained_by(0.0, 0.0, tuning.damage_radius, &tuning);
        assert!(chained.contains(&near));
        assert!(!chained.contains(&far));
    }
}
