// Wire protocol DTOs for the public game socket. The event set and payload
// shapes are frozen; both directions use `{event, data}` JSON envelopes.

use crate::domain::systems::{Mine, Powerup, PowerupKind};
use crate::domain::world::{Bot, GameSettings, SettingsPatch, Ship, BOT_COLOR};
use crate::domain::WeaponKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Messages clients send to the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    #[serde(rename = "cursor:move", rename_all = "camelCase")]
    CursorMove { x: f64, y: f64, rotation: f64 },

    #[serde(rename = "bullet:shoot", rename_all = "camelCase")]
    BulletShoot {
        x: f64,
        y: f64,
        angle: f64,
        #[serde(default)]
        is_rocket: bool,
    },

    // Clients send their position with the shot; the beam origin is always
    // the server-side ship pose, so only the angle is used.
    #[serde(rename = "laser:shoot", rename_all = "camelCase")]
    LaserShoot {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        angle: f64,
    },

    #[serde(rename = "health:damage", rename_all = "camelCase")]
    HealthDamage {
        user_id: String,
        health: f64,
        #[serde(default)]
        attacker_id: Option<String>,
    },

    #[serde(rename = "admin:login")]
    AdminLogin { password: String },

    #[serde(rename = "admin:getPlayers")]
    AdminGetPlayers { token: String },

    #[serde(rename = "admin:getBots")]
    AdminGetBots { token: String },

    #[serde(rename = "admin:getSettings")]
    AdminGetSettings { token: String },

    #[serde(rename = "admin:addBot")]
    AdminAddBot { token: String },

    #[serde(rename = "admin:removeBot")]
    AdminRemoveBot { token: String, id: String },

    #[serde(rename = "admin:removeAllBots")]
    AdminRemoveAllBots { token: String },

    #[serde(rename = "admin:kickPlayer")]
    AdminKickPlayer { token: String, id: String },

    #[serde(rename = "admin:kickAll")]
    AdminKickAll { token: String },

    #[serde(rename = "admin:updateSettings")]
    AdminUpdateSettings {
        token: String,
        settings: SettingsPatch,
    },

    #[serde(rename = "admin:endGame")]
    AdminEndGame { token: String },
}

/// Messages the server emits to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "player:info", rename_all = "camelCase")]
    PlayerInfo {
        user_id: String,
        label: String,
        color: String,
        kills: u32,
        deaths: u32,
        health: f64,
    },

    #[serde(rename = "user:joined", rename_all = "camelCase")]
    UserJoined {
        user_id: String,
        #[serde(flatten)]
        cursor: CursorState,
    },

    #[serde(rename = "user:left", rename_all = "camelCase")]
    UserLeft { user_id: String },

    #[serde(rename = "cursors:sync")]
    CursorsSync { cursors: HashMap<String, CursorState> },

    #[serde(rename = "cursor:update", rename_all = "camelCase")]
    CursorUpdate {
        user_id: String,
        #[serde(flatten)]
        cursor: CursorState,
    },

    #[serde(rename = "bullet:spawn", rename_all = "camelCase")]
    BulletSpawn {
        bullet_id: u64,
        user_id: String,
        x: f64,
        y: f64,
        vx: f64,
        vy: f64,
        color: String,
        is_rocket: bool,
    },

    #[serde(rename = "health:update", rename_all = "camelCase")]
    HealthUpdate {
        user_id: String,
        health: f64,
        shield: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        attacker_id: Option<String>,
    },

    #[serde(rename = "knockback", rename_all = "camelCase")]
    Knockback { user_id: String, vx: f64, vy: f64 },

    #[serde(rename = "mine:spawn")]
    MineSpawn {
        #[serde(flatten)]
        mine: MineState,
    },

    #[serde(rename = "mine:sync")]
    MineSync { mines: Vec<MineState> },

    #[serde(rename = "mine:explode", rename_all = "camelCase")]
    MineExplode {
        mine_id: u64,
        x: f64,
        y: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        triggered_by: Option<String>,
    },

    #[serde(rename = "powerup:spawn")]
    PowerupSpawn {
        #[serde(flatten)]
        powerup: PowerupState,
    },

    #[serde(rename = "powerup:sync")]
    PowerupSync { powerups: Vec<PowerupState> },

    #[serde(rename = "powerup:collect", rename_all = "camelCase")]
    PowerupCollect {
        power_up_id: u64,
        user_id: String,
        #[serde(rename = "type")]
        kind: PowerupKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        weapon_type: Option<WeaponKind>,
    },

    #[serde(rename = "laser:spawn", rename_all = "camelCase")]
    LaserSpawn {
        user_id: String,
        x: f64,
        y: f64,
        angle: f64,
        color: String,
    },

    #[serde(rename = "player:killed", rename_all = "camelCase")]
    PlayerKilled {
        victim_id: String,
        victim_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        attacker_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attacker_name: Option<String>,
    },

    #[serde(rename = "player:respawn", rename_all = "camelCase")]
    PlayerRespawn {
        user_id: String,
        x: f64,
        y: f64,
        respawn_time: u64,
    },

    #[serde(rename = "stats:update", rename_all = "camelCase")]
    StatsUpdate {
        user_id: String,
        kills: u32,
        deaths: u32,
    },

    #[serde(rename = "score:update")]
    ScoreUpdate { scores: Vec<ScoreEntry> },

    #[serde(rename = "kill", rename_all = "camelCase")]
    Kill {
        killer_id: String,
        killer_name: String,
        victim_id: String,
        victim_name: String,
        points: u32,
    },

    #[serde(rename = "admin:login:ok")]
    AdminLoginOk { token: String },

    #[serde(rename = "admin:login:error")]
    AdminLoginError { error: String },

    #[serde(rename = "admin:error")]
    AdminError { error: String },

    #[serde(rename = "admin:players")]
    AdminPlayers { players: Vec<AdminPlayer> },

    #[serde(rename = "admin:bots")]
    AdminBots { bots: Vec<AdminBot> },

    #[serde(rename = "admin:settings")]
    AdminSettings { settings: GameSettings },

    #[serde(rename = "admin:removeBot:error")]
    AdminRemoveBotError { error: String, id: String },

    #[serde(rename = "admin:kickPlayer:error")]
    AdminKickPlayerError { error: String, id: String },

    #[serde(rename = "admin:updateSettings:error")]
    AdminUpdateSettingsError { error: String },

    #[serde(rename = "admin:endGame:ok")]
    AdminEndGameOk {
        submitted: u32,
        failed: u32,
        total: u32,
    },
}

/// Rendered entity kind; "cursor" naming is historical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorKind {
    Player,
    Bot,
}

/// One ship or bot as clients render it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub color: String,
    pub label: String,
    pub health: f64,
    #[serde(rename = "type")]
    pub kind: CursorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_weapon: Option<WeaponKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shield: Option<f64>,
}

impl From<&Ship> for CursorState {
    fn from(ship: &Ship) -> Self {
        Self {
            x: ship.x,
            y: ship.y,
            rotation: ship.rotation,
            color: ship.color.clone(),
            label: ship.label.clone(),
            health: ship.health,
            kind: CursorKind::Player,
            active_weapon: Some(ship.weapon),
            shield: Some(ship.shield),
        }
    }
}

impl From<&Bot> for CursorState {
    fn from(bot: &Bot) -> Self {
        Self {
            x: bot.x,
            y: bot.y,
            rotation: bot.heading,
            color: BOT_COLOR.to_string(),
            label: bot.label.clone(),
            health: bot.health,
            kind: CursorKind::Bot,
            active_weapon: None,
            shield: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MineState {
    pub mine_id: u64,
    pub x: f64,
    pub y: f64,
}

impl From<&Mine> for MineState {
    fn from(mine: &Mine) -> Self {
        Self {
            mine_id: mine.id,
            x: mine.x,
            y: mine.y,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerupState {
    pub power_up_id: u64,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: PowerupKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon_type: Option<WeaponKind>,
}

impl From<&Powerup> for PowerupState {
    fn from(powerup: &Powerup) -> Self {
        Self {
            power_up_id: powerup.id,
            x: powerup.x,
            y: powerup.y,
            kind: powerup.kind,
            weapon_type: powerup.weapon,
        }
    }
}

/// One leaderboard row in `score:update`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub player_id: String,
    pub player_name: String,
    pub score: u32,
    pub kills: u32,
    pub deaths: u32,
    pub bot_kills: u32,
}

impl From<&Ship> for ScoreEntry {
    fn from(ship: &Ship) -> Self {
        Self {
            player_id: ship.id.clone(),
            player_name: ship.label.clone(),
            score: ship.placement_points,
            kills: ship.kills,
            deaths: ship.deaths,
            bot_kills: ship.bot_kills,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPlayer {
    pub user_id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_key: Option<String>,
    pub kills: u32,
    pub deaths: u32,
    pub bot_kills: u32,
    pub score: u32,
    pub health: f64,
    pub x: f64,
    pub y: f64,
    pub score_submitted: bool,
}

impl From<&Ship> for AdminPlayer {
    fn from(ship: &Ship) -> Self {
        Self {
            user_id: ship.id.clone(),
            label: ship.label.clone(),
            player_key: ship.player_key.clone(),
            kills: ship.kills,
            deaths: ship.deaths,
            bot_kills: ship.bot_kills,
            score: ship.placement_points,
            health: ship.health,
            x: ship.x,
            y: ship.y,
            score_submitted: ship.score_submitted,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBot {
    pub id: String,
    pub label: String,
    pub health: f64,
    pub x: f64,
    pub y: f64,
}

impl From<&Bot> for AdminBot {
    fn from(bot: &Bot) -> Self {
        Self {
            id: bot.id.clone(),
            label: bot.label.clone(),
            health: bot.health,
            x: bot.x,
            y: bot.y,
        }
    }
}
