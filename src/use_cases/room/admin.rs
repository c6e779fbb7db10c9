// Out-of-band admin channel: shared-secret auth, roster and settings
// commands, kicks, and end-of-game score submission to the hub.

use super::Room;
use crate::domain::world::SettingsError;
use crate::interface_adapters::clients::hub::ScoreSubmission;
use crate::interface_adapters::protocol::{AdminBot, AdminPlayer, ClientMessage, ServerMessage};
use crate::use_cases::scoring::placement_for_rank;
use crate::use_cases::types::{RoomEvent, SessionCommand};
use tracing::{info, warn};

/// Cadence for pushed `admin:players` / `admin:bots` snapshots.
const SNAPSHOT_INTERVAL_MS: u64 = 500;

impl Room {
    pub(crate) fn handle_admin(&mut self, conn_id: u64, message: ClientMessage, now_ms: u64) {
        match message {
            ClientMessage::AdminLogin { password } => self.admin_login(conn_id, password),
            ClientMessage::AdminGetPlayers { token } => {
                if self.authorize(conn_id, &token) {
                    self.send_players_snapshot(conn_id);
                }
            }
            ClientMessage::AdminGetBots { token } => {
                if self.authorize(conn_id, &token) {
                    self.send_bots_snapshot(conn_id);
                }
            }
            ClientMessage::AdminGetSettings { token } => {
                if self.authorize(conn_id, &token) {
                    self.send_to(
                        conn_id,
                        &ServerMessage::AdminSettings {
                            settings: self.world.settings,
                        },
                    );
                }
            }
            ClientMessage::AdminAddBot { token } => {
                if self.authorize(conn_id, &token) {
                    // Raise the target population too, or the next bot pass
                    // would reconcile the new bot straight back out.
                    self.world.settings.bot_count += 1;
                    let bot_id = self.spawn_bot();
                    info!(%bot_id, "admin spawned bot");
                    self.send_bots_snapshot(conn_id);
                }
            }
            ClientMessage::AdminRemoveBot { token, id } => {
                if self.authorize(conn_id, &token) {
                    self.remove_bot(conn_id, id);
                }
            }
            ClientMessage::AdminRemoveAllBots { token } => {
                if self.authorize(conn_id, &token) {
                    self.world.settings.bot_count = 0;
                    while let Some(bot) = self.world.remove_tail_bot() {
                        self.broadcast(&ServerMessage::UserLeft { user_id: bot.id });
                    }
                    self.send_bots_snapshot(conn_id);
                }
            }
            ClientMessage::AdminKickPlayer { token, id } => {
                if self.authorize(conn_id, &token) {
                    self.kick_player(conn_id, id);
                }
            }
            ClientMessage::AdminKickAll { token } => {
                if self.authorize(conn_id, &token) {
                    self.kick_all(conn_id);
                }
            }
            ClientMessage::AdminUpdateSettings { token, settings } => {
                if self.authorize(conn_id, &token) {
                    match self.world.patch_settings(settings) {
                        Ok(()) => self.send_to(
                            conn_id,
                            &ServerMessage::AdminSettings {
                                settings: self.world.settings,
                            },
                        ),
                        Err(SettingsError::OutOfRange(key)) => self.send_to(
                            conn_id,
                            &ServerMessage::AdminUpdateSettingsError {
                                error: format!("{key} out of range"),
                            },
                        ),
                    }
                }
            }
            ClientMessage::AdminEndGame { token } => {
                if self.authorize(conn_id, &token) {
                    self.end_game(conn_id, now_ms);
                }
            }
            // Gameplay events are dispatched before reaching this handler.
            _ => {}
        }
    }

    fn admin_login(&mut self, conn_id: u64, password: String) {
        if password == self.admin_password {
            if let Some(session) = self.sessions.get_mut(&conn_id) {
                session.admin = true;
            }
            info!(conn_id, "admin authenticated");
            self.send_to(conn_id, &ServerMessage::AdminLoginOk { token: password });
        } else {
            warn!(conn_id, "admin login rejected");
            self.send_to(
                conn_id,
                &ServerMessage::AdminLoginError {
                    error: "Invalid password".to_string(),
                },
            );
        }
    }

    /// Token check for every command after login. The token is the shared
    /// secret itself; anything else is unauthorized and mutates nothing.
    fn authorize(&mut self, conn_id: u64, token: &str) -> bool {
        if token == self.admin_password {
            return true;
        }
        self.send_to(
            conn_id,
            &ServerMessage::AdminError {
                error: "Unauthorized".to_string(),
            },
        );
        false
    }

    fn remove_bot(&mut self, conn_id: u64, id: String) {
        match self.world.remove_bot(&id) {
            Some(bot) => {
                self.world.settings.bot_count = self.world.settings.bot_count.saturating_sub(1);
                self.broadcast(&ServerMessage::UserLeft { user_id: bot.id });
                self.send_bots_snapshot(conn_id);
            }
            None => self.send_to(
                conn_id,
                &ServerMessage::AdminRemoveBotError {
                    error: "Unknown bot".to_string(),
                    id,
                },
            ),
        }
    }

    fn kick_player(&mut self, conn_id: u64, id: String) {
        if self.world.bot(&id).is_some() {
            self.send_to(
                conn_id,
                &ServerMessage::AdminKickPlayerError {
                    error: "Cannot kick a bot".to_string(),
                    id,
                },
            );
            return;
        }
        let target = self
            .sessions
            .iter()
            .find(|(_, session)| session.user_id == id)
            .map(|(target_conn, _)| *target_conn);
        match target {
            Some(target_conn) => {
                info!(user_id = %id, "admin kicked player");
                if let Some(session) = self.sessions.get(&target_conn) {
                    Self::push(session, SessionCommand::Close);
                }
            }
            None => self.send_to(
                conn_id,
                &ServerMessage::AdminKickPlayerError {
                    error: "Unknown player".to_string(),
                    id,
                },
            ),
        }
    }

    fn kick_all(&mut self, issuer_conn: u64) {
        info!("admin kicked all players");
        for (conn_id, session) in &self.sessions {
            if *conn_id != issuer_conn {
                Self::push(session, SessionCommand::Close);
            }
        }
    }

    /// Submits a placement score for every keyed ship that has not yet been
    /// submitted. The POST runs off the room task and reports back through
    /// the input channel.
    fn end_game(&mut self, conn_id: u64, _now_ms: u64) {
        let mut pending: Vec<(String, ScoreSubmission)> = Vec::new();
        for (index, ship) in self.world.leaderboard().iter().enumerate() {
            if ship.score_submitted {
                continue;
            }
            let Some(player_key) = &ship.player_key else {
                continue;
            };
            pending.push((
                ship.id.clone(),
                ScoreSubmission {
                    score: placement_for_rank(Some(index + 1)),
                    name: ship.label.clone(),
                    player_key: player_key.clone(),
                },
            ));
        }

        if pending.is_empty() {
            self.send_to(
                conn_id,
                &ServerMessage::AdminEndGameOk {
                    submitted: 0,
                    failed: 0,
                    total: 0,
                },
            );
            return;
        }

        // Mark before the POST so a re-issued endGame cannot double-submit;
        // a failed submission reverts the flags for a later retry.
        let user_ids: Vec<String> = pending.iter().map(|(id, _)| id.clone()).collect();
        for user_id in &user_ids {
            if let Some(ship) = self.world.ship_mut(user_id) {
                ship.score_submitted = true;
            }
        }

        let scores: Vec<ScoreSubmission> = pending.into_iter().map(|(_, entry)| entry).collect();
        let hub = self.hub.clone();
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            let success = match hub.submit_scores(&scores).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(?err, "hub score submission failed");
                    false
                }
            };
            let _ = tx
                .send(RoomEvent::ScoresSubmitted {
                    conn_id,
                    user_ids,
                    success,
                })
                .await;
        });
    }

    pub(crate) fn finish_score_submission(
        &mut self,
        conn_id: u64,
        user_ids: Vec<String>,
        success: bool,
    ) {
        let total = user_ids.len() as u32;
        if success {
            self.send_to(
                conn_id,
                &ServerMessage::AdminEndGameOk {
                    submitted: total,
                    failed: 0,
                    total,
                },
            );
        } else {
            for user_id in &user_ids {
                if let Some(ship) = self.world.ship_mut(user_id) {
                    ship.score_submitted = false;
                }
            }
            self.send_to(
                conn_id,
                &ServerMessage::AdminEndGameOk {
                    submitted: 0,
                    failed: total,
                    total,
                },
            );
        }
    }

    /// Pushes roster snapshots to every authenticated admin session.
    pub(crate) fn push_admin_snapshots(&mut self, now_ms: u64) {
        if now_ms < self.next_admin_push_at {
            return;
        }
        self.next_admin_push_at = now_ms + SNAPSHOT_INTERVAL_MS;

        let admins: Vec<u64> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.admin)
            .map(|(conn_id, _)| *conn_id)
            .collect();
        if admins.is_empty() {
            return;
        }

        let players = ServerMessage::AdminPlayers {
            players: self.world.ships().map(AdminPlayer::from).collect(),
        };
        let bots = ServerMessage::AdminBots {
            bots: self.world.bots().map(AdminBot::from).collect(),
        };
        for conn_id in admins {
            self.send_to(conn_id, &players);
            self.send_to(conn_id, &bots);
        }
    }

    fn send_players_snapshot(&mut self, conn_id: u64) {
        let players = ServerMessage::AdminPlayers {
            players: self.world.ships().map(AdminPlayer::from).collect(),
        };
        self.send_to(conn_id, &players);
    }

    fn send_bots_snapshot(&mut self, conn_id: u64) {
        let bots = ServerMessage::AdminBots {
            bots: self.world.bots().map(AdminBot::from).collect(),
        };
        self.send_to(conn_id, &bots);
    }
}
