// Ship physics: velocity integration, friction, speed cap and wall rebound.

use crate::domain::tuning::{MapTuning, ShipTuning};
use crate::domain::world::Ship;

/// Advances one ship by one tick. Returns true when the ship carries
/// non-trivial velocity, so the caller can broadcast the authoritative pose.
pub fn step_ship(ship: &mut Ship, tuning: &ShipTuning, map: &MapTuning) -> bool {
    ship.x += ship.vx;
    ship.y += ship.vy;

    ship.vx *= tuning.friction;
    ship.vy *= tuning.friction;

    let speed = (ship.vx * ship.vx + ship.vy * ship.vy).sqrt();
    if speed < tuning.min_speed {
        ship.vx = 0.0;
        ship.vy = 0.0;
    } else if speed > tuning.max_speed {
        let scale = tuning.max_speed / speed;
        ship.vx *= scale;
        ship.vy *= scale;
    }

    // Wall clamps reflect the velocity so knockback rebounds off walls.
    let half_w = map.half_width();
    let half_h = map.half_height();
    if ship.x < -half_w {
        ship.x = -half_w;
        ship.vx = -ship.vx * tuning.wall_restitution;
    } else if ship.x > half_w {
        ship.x = half_w;
        ship.vx = -ship.vx * tuning.wall_restitution;
    }
    if ship.y < -half_h {
        ship.y = -half_h;
        ship.vy = -ship.vy * tuning.wall_restitution;
    } else if ship.y > half_h {
        ship.y = half_h;
        ship.vy = -ship.vy * tuning.wall_restitution;
    }

    ship.vx != 0.0 || ship.vy != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::world::{GameSettings, World};

    fn ship_at(x: f64, y: f64, vx: f64, vy: f64) -> Ship {
        let mut world = World::new(GameSettings::default());
        world.add_ship("s".into(), None);
        let mut ship = world.ship("s").expect("ship").clone();
        ship.x = x;
        ship.y = y;
        ship.vx = vx;
        ship.vy = vy;
        ship
    }

    #[test]
    fn integrates_then_applies_friction() {
        let mut ship = ship_at(0.0, 0.0, 10.0, 0.0);
        let moved = step_ship(&mut ship, &ShipTuning::default(), &MapTuning::default());
        assert!(moved);
        assert_eq!(ship.x, 10.0);
        assert!((ship.vx - 9.2).abs() < 1e-9);
    }

    #[test]
    fn tiny_velocity_snaps_to_zero() {
        let mut ship = ship_at(0.0, 0.0, 0.005, 0.0);
        let moved = step_ship(&mut ship, &ShipTuning::default(), &MapTuning::default());
        assert!(!moved);
        assert_eq!(ship.vx, 0.0);
    }

    #[test]
    fn speed_is_capped() {
        let mut ship = ship_at(0.0, 0.0, 100.0, 0.0);
        step_ship(&mut ship, &ShipTuning::default(), &MapTuning::default());
        let tuning = ShipTuning::default();
        let speed = (ship.vx * ship.vx + ship.vy * ship.vy).sqrt();
        assert!(speed <= tuning.max_speed + 1e-9);
    }

    #[test]
    fn wall_clamp_reflects_and_dampens() {
        let map = MapTuning::default();
        let tuning = ShipTuning::default();
        let mut ship = ship_at(map.half_width() - 1.0, 0.0, 10.0, 0.0);
        step_ship(&mut ship, &tuning, &map);
        assert_eq!(ship.x, map.half_width());
        // Friction applies before the clamp, then the rebound halves and flips.
        assert!((ship.vx - (-10.0 * tuning.friction * tuning.wall_restitution)).abs() < 1e-9);
    }
}
