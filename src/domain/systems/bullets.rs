// In-flight projectiles: integration, wall bounce and lifetime expiry.
// Collision resolution lives in the room task, which sees ships and mines.

use crate::domain::geometry::angle_to_vec;
use crate::domain::tuning::{BulletTuning, MapTuning};

#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: u64,
    pub owner_id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub lifetime_ticks: u32,
    pub is_rocket: bool,
}

#[derive(Debug, Default)]
pub struct Bullets {
    bullets: Vec<Bullet>,
    next_id: u64,
}

impl Bullets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        owner_id: String,
        x: f64,
        y: f64,
        angle: f64,
        is_rocket: bool,
        tuning: &BulletTuning,
    ) -> &Bullet {
        let id = self.next_id;
        self.next_id += 1;
        let speed = if is_rocket {
            tuning.rocket_speed
        } else {
            tuning.speed
        };
        let (dx, dy) = angle_to_vec(angle);
        self.bullets.push(Bullet {
            id,
            owner_id,
            x,
            y,
            vx: dx * speed,
            vy: dy * speed,
            lifetime_ticks: if is_rocket {
                tuning.rocket_lifetime_ticks
            } else {
                tuning.lifetime_ticks
            },
            is_rocket,
        });
        self.bullets.last().expect("bullet was just pushed")
    }

    /// Integrates every bullet by one tick, bouncing off walls and expiring
    /// spent lifetimes.
    pub fn advance(&mut self, map: &MapTuning) {
        let half_w = map.half_width();
        let half_h = map.half_height();
        for bullet in &mut self.bullets {
            bullet.x += bullet.vx;
            bullet.y += bullet.vy;

            // Bullets bounce: reflect the crossed axis and snap to the wall.
            if bullet.x < -half_w {
                bullet.x = -half_w;
                bullet.vx = -bullet.vx;
            } else if bullet.x > half_w {
                bullet.x = half_w;
                bullet.vx = -bullet.vx;
            }
            if bullet.y < -half_h {
                bullet.y = -half_h;
                bullet.vy = -bullet.vy;
            } else if bullet.y > half_h {
                bullet.y = half_h;
                bullet.vy = -bullet.vy;
            }

            bullet.lifetime_ticks = bullet.lifetime_ticks.saturating_sub(1);
        }
        self.bullets.retain(|bullet| bullet.lifetime_ticks > 0);
    }

    pub fn remove(&mut self, id: u64) {
        self.bullets.retain(|bullet| bullet.id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bullet> {
        self.bullets.iter()
    }

    pub fn get(&self, id: u64) -> Option<&Bullet> {
        self.bullets.iter().find(|bullet| bullet.id == id)
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_and_rocket_use_their_own_speeds() {
        let tuning = BulletTuning::default();
        let mut bullets = Bullets::new();
        let standard = bullets
            .spawn("a".into(), 0.0, 0.0, 0.0, false, &tuning)
            .clone();
        let rocket = bullets
            .spawn("a".into(), 0.0, 0.0, 0.0, true, &tuning)
            .clone();
        assert!((standard.vx - tuning.speed).abs() < 1e-9);
        assert!((rocket.vx - tuning.rocket_speed).abs() < 1e-9);
        assert_eq!(standard.lifetime_ticks, tuning.lifetime_ticks);
        assert_eq!(rocket.lifetime_ticks, tuning.rocket_lifetime_ticks);
    }

    #[test]
    fn bullets_bounce_off_walls() {
        let map = MapTuning::default();
        let tuning = BulletTuning::default();
        let mut bullets = Bullets::new();
        let id = bullets
            .spawn("a".into(), map.half_width() - 10.0, 0.0, 0.0, false, &tuning)
            .id;

        bullets.advance(&map);
        let bullet = bullets.get(id).expect("still live");
        assert_eq!(bullet.x, map.half_width());
        assert!((bullet.vx + tuning.speed).abs() < 1e-9);

        bullets.advance(&map);
        let bullet = bullets.get(id).expect("still live");
        assert!((bullet.x - (map.half_width() - 15.0)).abs() < 1e-9);
    }

    #[test]
    fn bullets_expire_after_lifetime() {
        let map = MapTuning::default();
        let tuning = BulletTuning {
            lifetime_ticks: 2,
            ..BulletTuning::default()
        };
        let mut bullets = Bullets::new();
        bullets.spawn("a".into(), 0.0, 0.0, 0.0, false, &tuning);
        bullets.advance(&map);
        assert_eq!(bullets.len(), 1);
        bullets.advance(&map);
        assert!(bullets.is_empty());
    }

    #[test]
    fn remove_drops_a_single_bullet() {
        let tuning = BulletTuning::default();
        let mut bullets = Bullets::new();
        let first = bullets.spawn("a".into(), 0.0, 0.0, 0.0, false, &tuning).id;
        let second = bullets.spawn("b".into(), 0.0, 0.0, 1.0, false, &tuning).id;
        bullets.remove(first);
        assert!(bullets.get(first).is_none());
        assert!(bullets.get(second).is_some());
    }
}
