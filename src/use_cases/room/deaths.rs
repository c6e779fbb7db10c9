// Death and respawn policy: kill credit, stats and score events, deferred
// respawns, and the damage entry points every combat path funnels through.

use super::Room;
use crate::domain::systems::bots;
use crate::domain::WeaponKind;
use crate::interface_adapters::protocol::{CursorState, ServerMessage};
use crate::use_cases::timers::TimerAction;
use rand::Rng;

/// Placement points for killing another player.
const KILL_POINTS: u32 = 100;
/// Placement points deducted from the victim, floored at zero.
const DEATH_PENALTY: u32 = 50;
/// Placement points for destroying a bot.
const BOT_KILL_POINTS: u32 = 25;

impl Room {
    /// Applies damage to a ship, broadcasting the update and running the
    /// death policy on an alive-to-dead transition. Dead ships take no
    /// further damage until they respawn.
    pub(crate) fn damage_ship(
        &mut self,
        victim_id: &str,
        amount: f64,
        attacker_id: Option<&str>,
        now_ms: u64,
    ) {
        let Some(ship) = self.world.ship_mut(victim_id) else {
            return;
        };
        if !ship.is_alive() {
            return;
        }
        ship.absorb_damage(amount);
        let health = ship.health;
        let shield = ship.shield;
        let died = !ship.is_alive();

        self.broadcast(&ServerMessage::HealthUpdate {
            user_id: victim_id.to_string(),
            health,
            shield,
            attacker_id: attacker_id.map(|a| a.to_string()),
        });
        if died {
            let credited = attacker_id.filter(|a| *a != victim_id);
            self.on_ship_death(victim_id, credited, now_ms);
        }
    }

    pub(crate) fn damage_bot(
        &mut self,
        bot_id: &str,
        amount: f64,
        attacker_id: Option<&str>,
        now_ms: u64,
    ) {
        let Some(bot) = self.world.bot_mut(bot_id) else {
            return;
        };
        if !bot.is_alive() {
            return;
        }
        bot.health = (bot.health - amount.max(0.0)).max(0.0);
        let health = bot.health;
        let died = !bot.is_alive();

        self.broadcast(&ServerMessage::HealthUpdate {
            user_id: bot_id.to_string(),
            health,
            shield: 0.0,
            attacker_id: attacker_id.map(|a| a.to_string()),
        });
        if died {
            self.on_bot_death(bot_id, attacker_id, now_ms);
        }
    }

    /// Centralised death policy for player ships.
    pub(crate) fn on_ship_death(
        &mut self,
        victim_id: &str,
        attacker_id: Option<&str>,
        now_ms: u64,
    ) {
        let Some(victim_name) = self.world.ship(victim_id).map(|ship| ship.label.clone()) else {
            return;
        };
        self.world.add_death(victim_id);
        if let Some(ship) = self.world.ship_mut(victim_id) {
            ship.vx = 0.0;
            ship.vy = 0.0;
        }
        self.lasers.remove(victim_id);

        // Suicides carry no attacker; bot attackers are named but only
        // player attackers earn kills and placement points.
        let attacker_id = attacker_id.filter(|a| *a != victim_id);
        let attacker_name = attacker_id.and_then(|a| self.display_name_of(a));
        let credited = attacker_id.filter(|a| self.world.ship(a).is_some());

        if let Some(attacker) = credited {
            self.world.add_kill(attacker);
            if let Some(ship) = self.world.ship_mut(attacker) {
                ship.placement_points += KILL_POINTS;
            }
            if let Some(ship) = self.world.ship_mut(victim_id) {
                ship.placement_points = ship.placement_points.saturating_sub(DEATH_PENALTY);
            }
        }

        self.broadcast(&ServerMessage::PlayerKilled {
            victim_id: victim_id.to_string(),
            victim_name: victim_name.clone(),
            attacker_id: attacker_id.map(|a| a.to_string()),
            attacker_name: attacker_name.clone(),
        });

        if let Some((kills, deaths)) = self
            .world
            .ship(victim_id)
            .map(|ship| (ship.kills, ship.deaths))
        {
            self.broadcast(&ServerMessage::StatsUpdate {
                user_id: victim_id.to_string(),
                kills,
                deaths,
            });
        }

        if let Some(attacker) = credited {
            if let Some((kills, deaths)) = self
                .world
                .ship(attacker)
                .map(|ship| (ship.kills, ship.deaths))
            {
                self.broadcast(&ServerMessage::StatsUpdate {
                    user_id: attacker.to_string(),
                    kills,
                    deaths,
                });
            }
            self.broadcast(&ServerMessage::Kill {
                killer_id: attacker.to_string(),
                killer_name: attacker_name.clone().unwrap_or_default(),
                victim_id: victim_id.to_string(),
                victim_name: victim_name.clone(),
                points: KILL_POINTS,
            });
        }

        let snapshot = self.score_snapshot();
        self.broadcast(&snapshot);

        let respawn_at = now_ms + self.tuning.ship.respawn_delay_ms;
        self.broadcast(&ServerMessage::PlayerRespawn {
            user_id: victim_id.to_string(),
            x: 0.0,
            y: 0.0,
            respawn_time: respawn_at,
        });
        self.timers.schedule(
            respawn_at,
            TimerAction::RespawnShip {
                user_id: victim_id.to_string(),
            },
        );
    }

    /// Death policy for bots: schedule the respawn, credit the attacker.
    pub(crate) fn on_bot_death(&mut self, bot_id: &str, attacker_id: Option<&str>, now_ms: u64) {
        let respawn_at = now_ms + self.tuning.bot.respawn_delay_ms;
        let Some(victim_name) = self.world.bot_mut(bot_id).map(|bot| {
            bot.respawn_due_at = Some(respawn_at);
            bot.label.clone()
        }) else {
            return;
        };
        self.timers.schedule(
            respawn_at,
            TimerAction::RespawnBot {
                bot_id: bot_id.to_string(),
            },
        );

        let Some(attacker) = attacker_id.filter(|a| self.world.ship(a).is_some()) else {
            return;
        };
        let stats = self.world.ship_mut(attacker).map(|ship| {
            ship.bot_kills += 1;
            ship.placement_points += BOT_KILL_POINTS;
            (ship.label.clone(), ship.kills, ship.deaths)
        });
        let Some((killer_name, kills, deaths)) = stats else {
            return;
        };

        self.broadcast(&ServerMessage::Kill {
            killer_id: attacker.to_string(),
            killer_name,
            victim_id: bot_id.to_string(),
            victim_name,
            points: BOT_KILL_POINTS,
        });
        self.broadcast(&ServerMessage::StatsUpdate {
            user_id: attacker.to_string(),
            kills,
            deaths,
        });
        let snapshot = self.score_snapshot();
        self.broadcast(&snapshot);
    }

    /// Deferred ship reset: full health, machine gun, fresh random position.
    pub(crate) fn respawn_ship(&mut self, user_id: &str) {
        let starting_health = self.world.settings.player_starting_health as f64;
        let map = self.tuning.map;
        let margin = self.tuning.ship.radius;
        let (x, y) = {
            let mut rng = rand::thread_rng();
            bots::random_spawn(&map, margin, &mut rng)
        };

        let Some(ship) = self.world.ship_mut(user_id) else {
            return;
        };
        ship.health = starting_health;
        ship.shield = 0.0;
        ship.weapon = WeaponKind::MachineGun;
        ship.ammo = None;
        ship.x = x;
        ship.y = y;
        ship.vx = 0.0;
        ship.vy = 0.0;
        let health = ship.health;
        let shield = ship.shield;
        let update = ServerMessage::CursorUpdate {
            user_id: user_id.to_string(),
            cursor: CursorState::from(&*ship),
        };

        self.broadcast(&ServerMessage::HealthUpdate {
            user_id: user_id.to_string(),
            health,
            shield,
            attacker_id: None,
        });
        self.broadcast(&update);
    }

    pub(crate) fn respawn_bot(&mut self, bot_id: &str) {
        let bot_health = self.world.settings.bot_health as f64;
        let map = self.tuning.map;
        let margin = self.tuning.ship.radius;
        let (x, y, heading) = {
            let mut rng = rand::thread_rng();
            let (x, y) = bots::random_spawn(&map, margin, &mut rng);
            (x, y, rng.gen_range(0.0..std::f64::consts::TAU))
        };

        let Some(bot) = self.world.bot_mut(bot_id) else {
            return;
        };
        if bot.respawn_due_at.is_none() {
            return;
        }
        bot.x = x;
        bot.y = y;
        bot.heading = heading;
        bot.health = bot_health;
        bot.respawn_due_at = None;
        let update = ServerMessage::CursorUpdate {
            user_id: bot_id.to_string(),
            cursor: CursorState::from(&*bot),
        };
        self.broadcast(&update);
    }

    fn display_name_of(&self, id: &str) -> Option<String> {
        if let Some(ship) = self.world.ship(id) {
            return Some(ship.label.clone());
        }
        self.world.bot(id).map(|bot| bot.label.clone())
    }
}
