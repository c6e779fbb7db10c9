// Per-owner continuous beams. Each tick the room task refreshes the origin
// from the owner's current pose and re-raycasts the segment.

use crate::domain::geometry::{angle_to_vec, point_segment_distance};
use crate::domain::tuning::LaserTuning;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Laser {
    pub owner_id: String,
    pub angle: f64,
    pub ticks_remaining: u32,
}

/// A raycast segment for one tick of one beam.
#[derive(Debug, Clone, Copy)]
pub struct BeamSegment {
    pub ax: f64,
    pub ay: f64,
    pub bx: f64,
    pub by: f64,
}

impl BeamSegment {
    pub fn from_pose(x: f64, y: f64, angle: f64, length: f64) -> Self {
        let (dx, dy) = angle_to_vec(angle);
        Self {
            ax: x,
            ay: y,
            bx: x + dx * length,
            by: y + dy * length,
        }
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        point_segment_distance(x, y, self.ax, self.ay, self.bx, self.by)
    }
}

#[derive(Debug, Default)]
pub struct Lasers {
    beams: HashMap<String, Laser>,
}

impl Lasers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a beam for the owner, replacing any existing one.
    pub fn install(&mut self, owner_id: String, angle: f64, tuning: &LaserTuning) {
        self.beams.insert(
            owner_id.clone(),
            Laser {
                owner_id,
                angle,
                ticks_remaining: tuning.duration_ticks,
            },
        );
    }

    pub fn remove(&mut self, owner_id: &str) {
        self.beams.remove(owner_id);
    }

    /// Owner ids of currently installed beams.
    pub fn owners(&self) -> Vec<String> {
        self.beams.keys().cloned().collect()
    }

    pub fn get(&self, owner_id: &str) -> Option<&Laser> {
        self.beams.get(owner_id)
    }

    /// Updates a beam for this tick: stores the owner's current angle and
    /// burns one tick of duration. Returns true when the beam fires this
    /// tick; a beam on its last tick still fires, then disappears.
    pub fn refresh(&mut self, owner_id: &str, angle: f64) -> bool {
        let Some(beam) = self.beams.get_mut(owner_id) else {
            return false;
        };
        beam.angle = angle;
        beam.ticks_remaining = beam.ticks_remaining.saturating_sub(1);
        if beam.ticks_remaining == 0 {
            self.beams.remove(owner_id);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.beams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refiring_replaces_the_existing_beam() {
        let tuning = LaserTuning::default();
        let mut lasers = Lasers::new();
        lasers.install("a".into(), 0.0, &tuning);
        lasers.refresh("a", 0.0);
        lasers.install("a".into(), 1.0, &tuning);
        let beam = lasers.get("a").expect("beam exists");
        assert_eq!(beam.ticks_remaining, tuning.duration_ticks);
        assert_eq!(beam.angle, 1.0);
        assert_eq!(lasers.len(), 1);
    }

    #[test]
    fn beams_fire_for_exactly_their_duration() {
        let tuning = LaserTuning {
            duration_ticks: 2,
            ..LaserTuning::default()
        };
        let mut lasers = Lasers::new();
        lasers.install("a".into(), 0.0, &tuning);
        assert!(lasers.refresh("a", 0.0));
        assert!(lasers.refresh("a", 0.0));
        assert!(lasers.is_empty());
        assert!(!lasers.refresh("a", 0.0));
    }

    #[test]
    fn segment_tracks_the_owner_pose() {
        let segment = BeamSegment::from_pose(10.0, 20.0, 0.0, 2000.0);
        assert_eq!(segment.ax, 10.0);
        assert_eq!(segment.bx, 2010.0);
        assert!((segment.distance_to(500.0, 45.0) - 25.0).abs() < 1e-9);
    }
}
