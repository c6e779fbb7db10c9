// The authoritative room: one task owns the world, all subsystems and every
// session's outbound queue. Inbound socket events are marshalled onto this
// task's input channel, so no two state mutations ever overlap.

use crate::domain::geometry::distance;
use crate::domain::systems::lasers::BeamSegment;
use crate::domain::systems::{bots, physics, Bullets, Lasers, Mine, MineField, PowerupField, PowerupKind};
use crate::domain::tuning::Tuning;
use crate::domain::world::{GameSettings, World, BOT_COLOR, MAX_HEALTH};
use crate::interface_adapters::clients::hub::HubClient;
use crate::interface_adapters::protocol::{
    ClientMessage, CursorState, MineState, PowerupState, ScoreEntry, ServerMessage,
};
use crate::use_cases::timers::{TimerAction, TimerQueue};
use crate::use_cases::types::{RoomEvent, SessionCommand};
use axum::extract::ws::Utf8Bytes;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

mod admin;
mod deaths;

/// One connected socket as the room sees it.
#[derive(Debug)]
struct Session {
    user_id: String,
    outbound: mpsc::Sender<SessionCommand>,
    admin: bool,
}

pub struct Room {
    world: World,
    bullets: Bullets,
    mines: MineField,
    powerups: PowerupField,
    lasers: Lasers,
    timers: TimerQueue,
    sessions: HashMap<u64, Session>,
    tuning: Tuning,
    admin_password: String,
    hub: Arc<HubClient>,
    /// Handle for async completions (hub calls) to re-enter the room.
    self_tx: mpsc::Sender<RoomEvent>,
    users_tx: watch::Sender<usize>,
    tick: u64,
    next_bot_pass_at: u64,
    next_admin_push_at: u64,
}

impl Room {
    pub fn new(
        settings: GameSettings,
        tuning: Tuning,
        admin_password: String,
        hub: Arc<HubClient>,
        self_tx: mpsc::Sender<RoomEvent>,
        users_tx: watch::Sender<usize>,
    ) -> Self {
        Self {
            world: World::new(settings),
            bullets: Bullets::new(),
            mines: MineField::new(),
            powerups: PowerupField::new(),
            lasers: Lasers::new(),
            timers: TimerQueue::new(),
            sessions: HashMap::new(),
            tuning,
            admin_password,
            hub,
            self_tx,
            users_tx,
            tick: 0,
            next_bot_pass_at: 0,
            next_admin_push_at: 0,
        }
    }

    pub fn handle_event(&mut self, event: RoomEvent, now_ms: u64) {
        match event {
            RoomEvent::Connect {
                conn_id,
                player_key,
                outbound,
            } => self.connect(conn_id, player_key, outbound),
            RoomEvent::Disconnect { conn_id } => self.disconnect(conn_id),
            RoomEvent::Message { conn_id, message } => {
                self.handle_message(conn_id, message, now_ms)
            }
            RoomEvent::NameResolved { user_id, label } => self.apply_resolved_name(user_id, label),
            RoomEvent::ScoresSubmitted {
                conn_id,
                user_ids,
                success,
            } => self.finish_score_submission(conn_id, user_ids, success),
        }
    }

    /// One fixed-rate simulation step.
    pub fn tick(&mut self, now_ms: u64) {
        self.tick = self.tick.wrapping_add(1);
        let tuning = self.tuning;

        self.drain_timers(now_ms);

        // Spawn cadences.
        let spawned_mine = {
            let mut rng = rand::thread_rng();
            self.mines
                .maybe_spawn(now_ms, &mut rng, &tuning.mine, &tuning.map)
                .map(MineState::from)
        };
        if let Some(mine) = spawned_mine {
            self.broadcast(&ServerMessage::MineSpawn { mine });
        }

        let spawned_powerup = {
            let mut rng = rand::thread_rng();
            self.powerups
                .maybe_spawn(now_ms, &mut rng, &tuning.powerup, &tuning.map)
                .map(PowerupState::from)
        };
        if let Some(powerup) = spawned_powerup {
            self.broadcast(&ServerMessage::PowerupSpawn { powerup });
        }

        // Projectiles and beams.
        self.bullets.advance(&tuning.map);
        self.advance_lasers(now_ms);

        // Ship physics; ships carrying velocity get an authoritative pose
        // broadcast so clients see knockback.
        let mut updates = Vec::new();
        for ship in self.world.ships_mut() {
            if !ship.is_alive() {
                continue;
            }
            if physics::step_ship(ship, &tuning.ship, &tuning.map) {
                updates.push(ServerMessage::CursorUpdate {
                    user_id: ship.id.clone(),
                    cursor: CursorState::from(&*ship),
                });
            }
        }
        for update in &updates {
            self.broadcast(update);
        }

        self.resolve_ship_contacts(now_ms);
        self.resolve_bullet_collisions(now_ms);

        if now_ms >= self.next_bot_pass_at {
            self.next_bot_pass_at = now_ms + tuning.bot.pass_interval_ms;
            self.bot_pass();
        }

        self.push_admin_snapshots(now_ms);
    }

    // ---- session lifecycle ----

    fn connect(
        &mut self,
        conn_id: u64,
        player_key: Option<String>,
        outbound: mpsc::Sender<SessionCommand>,
    ) {
        let user_id = format!("player-{conn_id}");
        self.sessions.insert(
            conn_id,
            Session {
                user_id: user_id.clone(),
                outbound,
                admin: false,
            },
        );

        let lookup_key = player_key.clone();
        let (info, joined) = {
            let ship = self.world.add_ship(user_id.clone(), player_key);
            (
                ServerMessage::PlayerInfo {
                    user_id: ship.id.clone(),
                    label: ship.label.clone(),
                    color: ship.color.clone(),
                    kills: ship.kills,
                    deaths: ship.deaths,
                    health: ship.health,
                },
                ServerMessage::UserJoined {
                    user_id: ship.id.clone(),
                    cursor: CursorState::from(ship),
                },
            )
        };

        let mut cursors = HashMap::new();
        for other in self.world.ships() {
            if other.id != user_id {
                cursors.insert(other.id.clone(), CursorState::from(other));
            }
        }
        for bot in self.world.bots() {
            cursors.insert(bot.id.clone(), CursorState::from(bot));
        }

        self.send_to(conn_id, &info);
        self.broadcast_except(conn_id, &joined);
        self.send_to(conn_id, &ServerMessage::CursorsSync { cursors });
        let mines = self.mines.iter().map(MineState::from).collect();
        self.send_to(conn_id, &ServerMessage::MineSync { mines });
        let powerups = self.powerups.iter().map(PowerupState::from).collect();
        self.send_to(conn_id, &ServerMessage::PowerupSync { powerups });

        self.publish_user_count();
        info!(%user_id, "client connected");

        // Display names come from the hub; the lookup never gates a tick.
        if let Some(key) = lookup_key {
            let hub = self.hub.clone();
            let tx = self.self_tx.clone();
            let lookup_user = user_id;
            tokio::spawn(async move {
                match hub.display_name(&key).await {
                    Ok(Some(label)) => {
                        let _ = tx
                            .send(RoomEvent::NameResolved {
                                user_id: lookup_user,
                                label,
                            })
                            .await;
                    }
                    Ok(None) => {}
                    Err(err) => warn!(?err, "hub name lookup failed"),
                }
            });
        }
    }

    fn disconnect(&mut self, conn_id: u64) {
        let Some(session) = self.sessions.remove(&conn_id) else {
            return;
        };
        let user_id = session.user_id;
        self.lasers.remove(&user_id);
        if self.world.remove_ship(&user_id).is_some() {
            self.broadcast(&ServerMessage::UserLeft {
                user_id: user_id.clone(),
            });
        }
        self.publish_user_count();
        info!(%user_id, "client disconnected");
    }

    fn apply_resolved_name(&mut self, user_id: String, label: String) {
        // The session may have vanished while the lookup was in flight.
        let Some(ship) = self.world.ship_mut(&user_id) else {
            return;
        };
        ship.label = label;
        let update = ServerMessage::CursorUpdate {
            user_id: user_id.clone(),
            cursor: CursorState::from(&*ship),
        };
        self.broadcast(&update);
    }

    // ---- inbound gameplay events ----

    fn handle_message(&mut self, conn_id: u64, message: ClientMessage, now_ms: u64) {
        match message {
            ClientMessage::CursorMove { x, y, rotation } => {
                self.on_cursor_move(conn_id, x, y, rotation)
            }
            ClientMessage::BulletShoot {
                x,
                y,
                angle,
                is_rocket,
            } => self.on_bullet_shoot(conn_id, x, y, angle, is_rocket),
            ClientMessage::LaserShoot { angle, .. } => self.on_laser_shoot(conn_id, angle),
            ClientMessage::HealthDamage {
                user_id,
                health,
                attacker_id,
            } => self.on_health_damage(user_id, health, attacker_id, now_ms),
            other => self.handle_admin(conn_id, other, now_ms),
        }
    }

    fn on_cursor_move(&mut self, conn_id: u64, x: f64, y: f64, rotation: f64) {
        if !(x.is_finite() && y.is_finite() && rotation.is_finite()) {
            return;
        }
        let Some(user_id) = self.session_user(conn_id) else {
            return;
        };
        if !self.ship_is_alive(&user_id) {
            return;
        }
        let map = self.tuning.map;
        self.world.move_ship(&user_id, x, y, rotation, &map);
        if let Some(ship) = self.world.ship(&user_id) {
            let update = ServerMessage::CursorUpdate {
                user_id: user_id.clone(),
                cursor: CursorState::from(ship),
            };
            self.broadcast_except(conn_id, &update);
        }
    }

    fn on_bullet_shoot(&mut self, conn_id: u64, x: f64, y: f64, angle: f64, is_rocket: bool) {
        if !(x.is_finite() && y.is_finite() && angle.is_finite()) {
            return;
        }
        let Some(user_id) = self.session_user(conn_id) else {
            return;
        };
        let Some(color) = self
            .world
            .ship(&user_id)
            .filter(|ship| ship.is_alive())
            .map(|ship| ship.color.clone())
        else {
            return;
        };
        if let Some(ship) = self.world.ship_mut(&user_id) {
            if ship.weapon.is_special() {
                ship.spend_ammo();
            }
        }

        let (cx, cy) = self.tuning.map.clamp(x, y);
        let tuning = self.tuning.bullet;
        let (bullet_id, bx, by, bvx, bvy) = {
            let bullet = self
                .bullets
                .spawn(user_id.clone(), cx, cy, angle, is_rocket, &tuning);
            (bullet.id, bullet.x, bullet.y, bullet.vx, bullet.vy)
        };
        self.broadcast(&ServerMessage::BulletSpawn {
            bullet_id,
            user_id,
            x: bx,
            y: by,
            vx: bvx,
            vy: bvy,
            color,
            is_rocket,
        });
    }

    fn on_laser_shoot(&mut self, conn_id: u64, angle: f64) {
        if !angle.is_finite() {
            return;
        }
        let Some(user_id) = self.session_user(conn_id) else {
            return;
        };
        let Some((x, y, color)) = self
            .world
            .ship(&user_id)
            .filter(|ship| ship.is_alive())
            .map(|ship| (ship.x, ship.y, ship.color.clone()))
        else {
            return;
        };
        if let Some(ship) = self.world.ship_mut(&user_id) {
            if ship.weapon.is_special() {
                ship.spend_ammo();
            }
        }
        self.lasers
            .install(user_id.clone(), angle, &self.tuning.laser);
        self.broadcast(&ServerMessage::LaserSpawn {
            user_id,
            x,
            y,
            angle,
            color,
        });
    }

    fn on_health_damage(
        &mut self,
        user_id: String,
        health: f64,
        attacker_id: Option<String>,
        now_ms: u64,
    ) {
        if !health.is_finite() {
            return;
        }
        if !self.ship_is_alive(&user_id) {
            return;
        }
        let clamped = health.clamp(0.0, MAX_HEALTH);
        self.world.set_health(&user_id, clamped);
        let Some((health, shield)) = self
            .world
            .ship(&user_id)
            .map(|ship| (ship.health, ship.shield))
        else {
            return;
        };
        self.broadcast(&ServerMessage::HealthUpdate {
            user_id: user_id.clone(),
            health,
            shield,
            attacker_id: attacker_id.clone(),
        });
        if health <= 0.0 {
            let credited = attacker_id.as_deref().filter(|a| *a != user_id);
            self.on_ship_death(&user_id, credited, now_ms);
        }
    }

    // ---- per-tick resolution ----

    fn drain_timers(&mut self, now_ms: u64) {
        while let Some(action) = self.timers.pop_due(now_ms) {
            match action {
                TimerAction::RespawnShip { user_id } => self.respawn_ship(&user_id),
                TimerAction::RespawnBot { bot_id } => self.respawn_bot(&bot_id),
                TimerAction::MineChain {
                    x,
                    y,
                    damage_radius,
                    triggered_by,
                } => self.run_mine_chain(x, y, damage_radius, triggered_by, now_ms),
            }
        }
    }

    fn advance_lasers(&mut self, now_ms: u64) {
        let tuning = self.tuning;
        for owner in self.lasers.owners() {
            let Some((x, y, angle, alive)) = self
                .world
                .ship(&owner)
                .map(|ship| (ship.x, ship.y, ship.rotation, ship.is_alive()))
            else {
                self.lasers.remove(&owner);
                continue;
            };
            if !alive {
                self.lasers.remove(&owner);
                continue;
            }
            // The beam sweeps with the ship: origin and angle are refreshed
            // from the owner's current pose every tick.
            if !self.lasers.refresh(&owner, angle) {
                continue;
            }
            let segment = BeamSegment::from_pose(x, y, angle, tuning.laser.length);

            let ship_victims: Vec<String> = self
                .world
                .ships()
                .filter(|ship| {
                    ship.id != owner
                        && ship.is_alive()
                        && segment.distance_to(ship.x, ship.y) <= tuning.laser.hit_distance
                })
                .map(|ship| ship.id.clone())
                .collect();
            for victim in ship_victims {
                self.damage_ship(&victim, tuning.laser.damage_per_tick, Some(&owner), now_ms);
            }

            let bot_victims: Vec<String> = self
                .world
                .bots()
                .filter(|bot| {
                    bot.is_alive()
                        && segment.distance_to(bot.x, bot.y) <= tuning.laser.hit_distance
                })
                .map(|bot| bot.id.clone())
                .collect();
            for victim in bot_victims {
                self.damage_bot(&victim, tuning.laser.damage_per_tick, Some(&owner), now_ms);
            }

            let mine_reach = tuning.mine.trigger_radius + tuning.mine.laser_trigger_slack;
            let mine_hits: Vec<u64> = self
                .mines
                .iter()
                .filter(|mine| segment.distance_to(mine.x, mine.y) <= mine_reach)
                .map(|mine| mine.id)
                .collect();
            for mine_id in mine_hits {
                if let Some(mine) = self.mines.take(mine_id) {
                    self.explode_mine(mine, Some(owner.clone()), now_ms);
                }
            }
        }
    }

    /// Pickup collection, then mine contact, for every alive ship.
    fn resolve_ship_contacts(&mut self, now_ms: u64) {
        let tuning = self.tuning;
        let ship_ids: Vec<String> = self
            .world
            .ships()
            .filter(|ship| ship.is_alive())
            .map(|ship| ship.id.clone())
            .collect();

        for user_id in ship_ids {
            let Some((x, y)) = self
                .world
                .ship(&user_id)
                .filter(|ship| ship.is_alive())
                .map(|ship| (ship.x, ship.y))
            else {
                continue;
            };
            if let Some(powerup_id) =
                self.powerups
                    .contacted_by(x, y, tuning.ship.radius, &tuning.powerup)
            {
                self.collect_powerup(powerup_id, &user_id);
            }

            // An earlier explosion in this pass may have killed the ship.
            let Some((x, y)) = self
                .world
                .ship(&user_id)
                .filter(|ship| ship.is_alive())
                .map(|ship| (ship.x, ship.y))
            else {
                continue;
            };
            let trigger_reach = tuning.mine.trigger_radius + tuning.ship.radius;
            let mine_id = self
                .mines
                .iter()
                .find(|mine| distance(mine.x, mine.y, x, y) <= trigger_reach)
                .map(|mine| mine.id);
            if let Some(mine_id) = mine_id {
                if let Some(mine) = self.mines.take(mine_id) {
                    self.explode_mine(mine, Some(user_id.clone()), now_ms);
                }
            }
        }
    }

    fn collect_powerup(&mut self, powerup_id: u64, user_id: &str) {
        // One-shot: the pickup leaves the set before anything is broadcast.
        let Some(powerup) = self.powerups.take(powerup_id) else {
            return;
        };
        let tuning = self.tuning.powerup;
        self.broadcast(&ServerMessage::PowerupCollect {
            power_up_id: powerup.id,
            user_id: user_id.to_string(),
            kind: powerup.kind,
            weapon_type: powerup.weapon,
        });

        match powerup.kind {
            PowerupKind::Weapon => {
                if let (Some(weapon), Some(ship)) = (powerup.weapon, self.world.ship_mut(user_id)) {
                    ship.arm(weapon, tuning.special_ammo);
                }
            }
            PowerupKind::Health => {
                let updated = self.world.ship_mut(user_id).map(|ship| {
                    ship.health = (ship.health + tuning.heal_amount).min(MAX_HEALTH);
                    (ship.health, ship.shield)
                });
                if let Some((health, shield)) = updated {
                    self.broadcast(&ServerMessage::HealthUpdate {
                        user_id: user_id.to_string(),
                        health,
                        shield,
                        attacker_id: None,
                    });
                }
            }
            PowerupKind::Shield => {
                let updated = self.world.ship_mut(user_id).map(|ship| {
                    ship.shield = tuning.shield_amount;
                    (ship.health, ship.shield)
                });
                if let Some((health, shield)) = updated {
                    self.broadcast(&ServerMessage::HealthUpdate {
                        user_id: user_id.to_string(),
                        health,
                        shield,
                        attacker_id: None,
                    });
                }
            }
        }
    }

    fn resolve_bullet_collisions(&mut self, now_ms: u64) {
        let tuning = self.tuning;
        let bullets: Vec<_> = self.bullets.iter().cloned().collect();
        for bullet in bullets {
            // Mines first.
            if let Some(mine_id) = self.mines.triggered_at(bullet.x, bullet.y, &tuning.mine) {
                if let Some(mine) = self.mines.take(mine_id) {
                    self.bullets.remove(bullet.id);
                    self.explode_mine(mine, Some(bullet.owner_id.clone()), now_ms);
                    if bullet.is_rocket {
                        self.rocket_explosion(bullet.x, bullet.y, &bullet.owner_id, now_ms);
                    }
                    continue;
                }
            }

            let reach = tuning.ship.radius + tuning.bullet.radius;

            // Ships. Standard bullets never resolve against their owner;
            // rockets detonate on any contact, the owner included.
            let ship_hit = self
                .world
                .ships()
                .find(|ship| {
                    ship.is_alive()
                        && (bullet.is_rocket || ship.id != bullet.owner_id)
                        && distance(ship.x, ship.y, bullet.x, bullet.y) <= reach
                })
                .map(|ship| ship.id.clone());
            if let Some(victim) = ship_hit {
                self.bullets.remove(bullet.id);
                if bullet.is_rocket {
                    self.rocket_explosion(bullet.x, bullet.y, &bullet.owner_id, now_ms);
                } else {
                    if let Some((dx, dy)) = normalized(bullet.vx, bullet.vy) {
                        self.push_knockback(
                            &victim,
                            dx * tuning.bullet.knockback,
                            dy * tuning.bullet.knockback,
                        );
                    }
                    self.damage_ship(
                        &victim,
                        tuning.bullet.damage,
                        Some(&bullet.owner_id),
                        now_ms,
                    );
                }
                continue;
            }

            // Bots.
            let bot_hit = self
                .world
                .bots()
                .find(|bot| {
                    bot.is_alive()
                        && bot.id != bullet.owner_id
                        && distance(bot.x, bot.y, bullet.x, bullet.y) <= reach
                })
                .map(|bot| bot.id.clone());
            if let Some(victim) = bot_hit {
                self.bullets.remove(bullet.id);
                if bullet.is_rocket {
                    self.rocket_explosion(bullet.x, bullet.y, &bullet.owner_id, now_ms);
                } else {
                    self.damage_bot(&victim, tuning.bullet.damage, Some(&bullet.owner_id), now_ms);
                }
            }
        }
    }

    /// Detonates a mine that has already been removed from the field.
    fn explode_mine(&mut self, mine: Mine, triggered_by: Option<String>, now_ms: u64) {
        let tuning = self.tuning.mine;
        self.broadcast(&ServerMessage::MineExplode {
            mine_id: mine.id,
            x: mine.x,
            y: mine.y,
            triggered_by: triggered_by.clone(),
        });

        let victims: Vec<(String, f64)> = self
            .world
            .ships()
            .filter(|ship| ship.is_alive())
            .filter_map(|ship| {
                let dist = distance(ship.x, ship.y, mine.x, mine.y);
                (dist <= tuning.damage_radius).then(|| (ship.id.clone(), dist))
            })
            .collect();
        for (victim, dist) in victims {
            let falloff = 1.0 - dist / tuning.damage_radius;
            let push = self.world.ship(&victim).and_then(|ship| {
                radial_direction(mine.x, mine.y, ship.x, ship.y)
                    .map(|(dx, dy)| (dx * tuning.max_knockback * falloff, dy * tuning.max_knockback * falloff))
            });
            if let Some((dvx, dvy)) = push {
                self.push_knockback(&victim, dvx, dvy);
            }
            self.damage_ship(&victim, tuning.damage, triggered_by.as_deref(), now_ms);
        }

        let bot_victims: Vec<String> = self
            .world
            .bots()
            .filter(|bot| {
                bot.is_alive() && distance(bot.x, bot.y, mine.x, mine.y) <= tuning.damage_radius
            })
            .map(|bot| bot.id.clone())
            .collect();
        for victim in bot_victims {
            self.damage_bot(&victim, tuning.damage, triggered_by.as_deref(), now_ms);
        }

        // The deferred check makes chains cascade instead of detonating in
        // one burst; the stagger is visible to clients.
        self.timers.schedule(
            now_ms + tuning.chain_delay_ms,
            TimerAction::MineChain {
                x: mine.x,
                y: mine.y,
                damage_radius: tuning.damage_radius,
                triggered_by,
            },
        );
    }

    fn run_mine_chain(
        &mut self,
        x: f64,
        y: f64,
        damage_radius: f64,
        triggered_by: Option<String>,
        now_ms: u64,
    ) {
        let chained = self.mines.chained_by(x, y, damage_radius, &self.tuning.mine);
        for mine_id in chained {
            if let Some(mine) = self.mines.take(mine_id) {
                self.explode_mine(mine, triggered_by.clone(), now_ms);
            }
        }
    }

    fn rocket_explosion(&mut self, x: f64, y: f64, owner_id: &str, now_ms: u64) {
        let tuning = self.tuning.bullet;
        let victims: Vec<(String, f64)> = self
            .world
            .ships()
            .filter(|ship| ship.is_alive())
            .filter_map(|ship| {
                let dist = distance(ship.x, ship.y, x, y);
                (dist <= tuning.explosion_radius).then(|| (ship.id.clone(), dist))
            })
            .collect();
        for (victim, dist) in victims {
            let falloff = 1.0 - dist / tuning.explosion_radius;
            let push = self.world.ship(&victim).and_then(|ship| {
                radial_direction(x, y, ship.x, ship.y).map(|(dx, dy)| {
                    (
                        dx * tuning.explosion_max_knockback * falloff,
                        dy * tuning.explosion_max_knockback * falloff,
                    )
                })
            });
            if let Some((dvx, dvy)) = push {
                self.push_knockback(&victim, dvx, dvy);
            }
            self.damage_ship(
                &victim,
                tuning.explosion_max_damage * falloff,
                Some(owner_id),
                now_ms,
            );
        }

        let bot_victims: Vec<(String, f64)> = self
            .world
            .bots()
            .filter(|bot| bot.is_alive())
            .filter_map(|bot| {
                let dist = distance(bot.x, bot.y, x, y);
                (dist <= tuning.explosion_radius).then(|| (bot.id.clone(), dist))
            })
            .collect();
        for (victim, dist) in bot_victims {
            let falloff = 1.0 - dist / tuning.explosion_radius;
            self.damage_bot(
                &victim,
                tuning.explosion_max_damage * falloff,
                Some(owner_id),
                now_ms,
            );
        }
    }

    // ---- bots ----

    fn bot_pass(&mut self) {
        let tuning = self.tuning;
        let settings = self.world.settings;

        // Reconcile the population to the configured target at the tail.
        let target = settings.bot_count as usize;
        while self.world.bot_count() < target {
            self.spawn_bot();
        }
        while self.world.bot_count() > target {
            if let Some(bot) = self.world.remove_tail_bot() {
                self.broadcast(&ServerMessage::UserLeft { user_id: bot.id });
            }
        }

        let mut moved = Vec::new();
        let mut shots = Vec::new();
        {
            let mut rng = rand::thread_rng();
            for bot in self.world.bots_mut() {
                if !bot.is_alive() {
                    continue;
                }
                let outcome = bots::step_bot(bot, &settings, &tuning.bot, &tuning.map, &mut rng);
                moved.push(ServerMessage::CursorUpdate {
                    user_id: bot.id.clone(),
                    cursor: CursorState::from(&*bot),
                });
                if let Some(angle) = outcome.fired_angle {
                    shots.push((bot.id.clone(), bot.x, bot.y, angle));
                }
            }
        }
        for update in &moved {
            self.broadcast(update);
        }
        for (owner, x, y, angle) in shots {
            let (bullet_id, bx, by, bvx, bvy) = {
                let bullet = self
                    .bullets
                    .spawn(owner.clone(), x, y, angle, false, &tuning.bullet);
                (bullet.id, bullet.x, bullet.y, bullet.vx, bullet.vy)
            };
            self.broadcast(&ServerMessage::BulletSpawn {
                bullet_id,
                user_id: owner,
                x: bx,
                y: by,
                vx: bvx,
                vy: bvy,
                color: BOT_COLOR.to_string(),
                is_rocket: false,
            });
        }
    }

    pub(crate) fn spawn_bot(&mut self) -> String {
        let map = self.tuning.map;
        let margin = self.tuning.ship.radius;
        let (x, y, heading) = {
            let mut rng = rand::thread_rng();
            let (x, y) = bots::random_spawn(&map, margin, &mut rng);
            (x, y, rng.gen_range(0.0..std::f64::consts::TAU))
        };
        let (bot_id, joined) = {
            let bot = self.world.add_bot(x, y, heading);
            (
                bot.id.clone(),
                ServerMessage::UserJoined {
                    user_id: bot.id.clone(),
                    cursor: CursorState::from(bot),
                },
            )
        };
        self.broadcast(&joined);
        bot_id
    }

    // ---- knockback and scores ----

    pub(crate) fn push_knockback(&mut self, user_id: &str, dvx: f64, dvy: f64) {
        self.world.apply_knockback(user_id, dvx, dvy);
        self.broadcast(&ServerMessage::Knockback {
            user_id: user_id.to_string(),
            vx: dvx,
            vy: dvy,
        });
    }

    pub(crate) fn score_snapshot(&self) -> ServerMessage {
        ServerMessage::ScoreUpdate {
            scores: self
                .world
                .leaderboard()
                .into_iter()
                .map(ScoreEntry::from)
                .collect(),
        }
    }

    // ---- outbound fan-out ----

    fn encode(message: &ServerMessage) -> Option<Utf8Bytes> {
        match serde_json::to_string(message) {
            Ok(text) => Some(Utf8Bytes::from(text)),
            Err(err) => {
                error!(error = %err, "failed to serialize server event");
                None
            }
        }
    }

    fn push(session: &Session, command: SessionCommand) {
        // A slow socket drops frames; it never stalls the simulation.
        if let Err(mpsc::error::TrySendError::Full(_)) = session.outbound.try_send(command) {
            warn!(user_id = %session.user_id, "outbound queue full; dropping event");
        }
    }

    pub(crate) fn broadcast(&self, message: &ServerMessage) {
        let Some(bytes) = Self::encode(message) else {
            return;
        };
        for session in self.sessions.values() {
            Self::push(session, SessionCommand::Event(bytes.clone()));
        }
    }

    fn broadcast_except(&self, skip_conn: u64, message: &ServerMessage) {
        let Some(bytes) = Self::encode(message) else {
            return;
        };
        for (conn_id, session) in &self.sessions {
            if *conn_id != skip_conn {
                Self::push(session, SessionCommand::Event(bytes.clone()));
            }
        }
    }

    pub(crate) fn send_to(&self, conn_id: u64, message: &ServerMessage) {
        let Some(session) = self.sessions.get(&conn_id) else {
            return;
        };
        let Some(bytes) = Self::encode(message) else {
            return;
        };
        Self::push(session, SessionCommand::Event(bytes));
    }

    fn publish_user_count(&self) {
        let _ = self.users_tx.send_replace(self.world.ship_count());
    }

    fn session_user(&self, conn_id: u64) -> Option<String> {
        self.sessions
            .get(&conn_id)
            .map(|session| session.user_id.clone())
    }

    fn ship_is_alive(&self, user_id: &str) -> bool {
        self.world
            .ship(user_id)
            .map(|ship| ship.is_alive())
            .unwrap_or(false)
    }
}

fn normalized(vx: f64, vy: f64) -> Option<(f64, f64)> {
    let len = (vx * vx + vy * vy).sqrt();
    (len > f64::EPSILON).then(|| (vx / len, vy / len))
}

fn radial_direction(from_x: f64, from_y: f64, to_x: f64, to_y: f64) -> Option<(f64, f64)> {
    normalized(to_x - from_x, to_y - from_y)
}

/// Drives the room at a fixed tick rate. Inbound events are drained at each
/// tick boundary, so the room is the single writer to all world state.
pub async fn room_task(
    mut room: Room,
    mut input_rx: mpsc::Receiver<RoomEvent>,
    tick_interval: Duration,
) {
    let started = Instant::now();
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let now_ms = started.elapsed().as_millis() as u64;
        while let Ok(event) = input_rx.try_recv() {
            room.handle_event(event, now_ms);
        }
        room.tick(now_ms);
    }
}
