// Bot wandering: heading jitter, forward steps, wall reflection and random
// fire. Population reconciliation happens in the room task, which owns the
// broadcast channel.

use crate::domain::geometry::angle_to_vec;
use crate::domain::tuning::{BotTuning, MapTuning};
use crate::domain::world::{Bot, GameSettings};
use rand::Rng;

#[derive(Debug, Clone, Copy, Default)]
pub struct WanderOutcome {
    /// Angle to fire a bullet along, when the bot decided to shoot.
    pub fired_angle: Option<f64>,
}

/// Advances one living bot by one AI pass.
pub fn step_bot<R: Rng>(
    bot: &mut Bot,
    settings: &GameSettings,
    tuning: &BotTuning,
    map: &MapTuning,
    rng: &mut R,
) -> WanderOutcome {
    if rng.gen_bool(tuning.turn_chance) {
        bot.heading += rng.gen_range(-tuning.turn_jitter..=tuning.turn_jitter);
    }

    let step = settings.bot_speed * rng.gen_range(tuning.step_min..=tuning.step_max);
    let (dx, dy) = angle_to_vec(bot.heading);
    let mut x = bot.x + dx * step;
    let mut y = bot.y + dy * step;

    // Steps that would cross a wall reflect the heading across that wall's
    // normal and clamp the position.
    let half_w = map.half_width();
    let half_h = map.half_height();
    if x < -half_w || x > half_w {
        bot.heading = std::f64::consts::PI - bot.heading;
        x = x.clamp(-half_w, half_w);
    }
    if y < -half_h || y > half_h {
        bot.heading = -bot.heading;
        y = y.clamp(-half_h, half_h);
    }
    bot.x = x;
    bot.y = y;

    let fired_angle = if rng.gen_bool(tuning.fire_chance) {
        Some(bot.heading + rng.gen_range(-tuning.fire_spread..=tuning.fire_spread))
    } else {
        None
    };

    WanderOutcome { fired_angle }
}

/// Uniform spawn point away from the walls.
pub fn random_spawn<R: Rng>(map: &MapTuning, margin: f64, rng: &mut R) -> (f64, f64) {
    let half_w = (map.half_width() - margin).max(0.0);
    let half_h = (map.half_height() - margin).max(0.0);
    (
        rng.gen_range(-half_w..=half_w),
        rng.gen_range(-half_h..=half_h),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    fn bot_at(x: f64, y: f64, heading: f64) -> Bot {
        Bot {
            id: "bot-0".into(),
            label: "Bot 1".into(),
            x,
            y,
            heading,
            health: 30.0,
            respawn_due_at: None,
        }
    }

    #[test]
    fn bots_stay_inside_the_map() {
        let settings = GameSettings::default();
        let tuning = BotTuning::default();
        let map = MapTuning::default();
        let mut rng = thread_rng();
        let mut bot = bot_at(map.half_width() - 1.0, map.half_height() - 1.0, 0.5);
        for _ in 0..500 {
            step_bot(&mut bot, &settings, &tuning, &map, &mut rng);
            assert!(map.contains(bot.x, bot.y));
        }
    }

    #[test]
    fn wall_contact_reflects_heading() {
        let settings = GameSettings {
            bot_speed: 50.0,
            ..GameSettings::default()
        };
        // Force a straight step into the east wall.
        let tuning = BotTuning {
            turn_chance: 0.0,
            fire_chance: 0.0,
            step_min: 1.0,
            step_max: 1.0,
            ..BotTuning::default()
        };
        let map = MapTuning::default();
        let mut rng = thread_rng();
        let mut bot = bot_at(map.half_width() - 10.0, 0.0, 0.0);
        step_bot(&mut bot, &settings, &tuning, &map, &mut rng);
        assert_eq!(bot.x, map.half_width());
        assert!((bot.heading - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn random_spawn_respects_margin() {
        let map = MapTuning::default();
        let mut rng = thread_rng();
        for _ in 0..100 {
            let (x, y) = random_spawn(&map, 50.0, &mut rng);
            assert!(x.abs() <= map.half_width() - 50.0);
            assert!(y.abs() <= map.half_height() - 50.0);
        }
    }
}
