//! The turn/round state machine: drawer rotation, word choice, the round
//! timer, guess handling, and game termination.
//!
//! Timers never touch a room directly. Every firing is delivered back
//! through [`AppState::apply_timer`], which takes the same per-room lock as
//! client actions and compares the epoch captured at scheduling time
//! against the room's current one. Any state change that supersedes a
//! pending timer bumps the epoch, so a delayed firing is a guaranteed
//! no-op.

use super::{AppState, Room};
use crate::error::GameError;
use crate::guess;
use crate::protocol::{ChatKind, ServerMessage};
use crate::types::*;
use crate::words;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use std::time::{Duration, Instant};

const WORD_CHOICE_COUNT: usize = 3;
/// Core-enforced word-choice window; on expiry a word is picked for the drawer
const CHOICE_SECONDS: u64 = 15;
/// Pause between turns
const INTERMISSION_SECONDS: u64 = 5;

/// A deferred scheduler event, delivered into the room's serialization
/// point like any client action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The drawer never picked a word
    ChoiceTimeout,
    /// Drawing time expired
    TurnDeadline,
    /// The pause between turns elapsed
    Intermission,
}

impl AppState {
    /// Owner-only, from the lobby, with at least two players.
    pub async fn start_game(
        self: &Arc<Self>,
        room_id: &str,
        session_id: &str,
    ) -> Result<(), GameError> {
        let room = self.room(room_id).await.ok_or(GameError::RoomNotFound)?;
        let mut room = room.lock().await;

        if room.phase != RoomPhase::Lobby {
            return Err(GameError::InvalidState);
        }
        if !room.player(session_id).is_some_and(|p| p.is_owner) {
            return Err(GameError::NotOwner);
        }
        if room.players.len() < 2 {
            return Err(GameError::InsufficientPlayers);
        }

        room.phase = RoomPhase::Playing;
        room.current_round = 1;
        room.broadcast(ServerMessage::GameStarted);
        tracing::info!("Game started in room {}", room_id);
        self.begin_turn_locked(&mut room);
        Ok(())
    }

    /// Rotate to the next drawer and offer their word choices.
    pub(crate) fn begin_turn_locked(self: &Arc<Self>, room: &mut Room) {
        if room.players.is_empty() {
            return;
        }
        let epoch = room.next_epoch();

        let idx = (room.current_round as usize - 1) % room.players.len();
        let drawer = room.players[idx].clone();
        room.current_drawer = Some(drawer.id.clone());
        room.word_choices = words::draw(WORD_CHOICE_COUNT);
        room.current_word = None;
        room.guessed.clear();
        room.turn_started_at = None;
        room.deadline = None;

        room.broadcast(ServerMessage::NewTurn {
            round: room.current_round,
            total_rounds: room.settings.rounds,
            drawer: drawer.name.clone(),
            drawer_id: drawer.id.clone(),
        });
        room.send_to(
            &drawer.id,
            ServerMessage::ChooseWord {
                words: room.word_choices.clone(),
            },
        );
        room.broadcast(ServerMessage::ClearCanvas);

        self.schedule(
            room.id.clone(),
            epoch,
            Duration::from_secs(CHOICE_SECONDS),
            TimerEvent::ChoiceTimeout,
        );
    }

    /// Drawer commits to a word; the round timer starts now. Silently
    /// ignored for anyone but the drawer, and after a word is already set.
    pub async fn choose_word(self: &Arc<Self>, room_id: &str, session_id: &str, word: String) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let mut room = room.lock().await;
        if !room.is_drawer(session_id)
            || room.phase != RoomPhase::Playing
            || room.current_word.is_some()
        {
            return;
        }
        self.choose_word_locked(&mut room, word);
    }

    pub(crate) fn choose_word_locked(self: &Arc<Self>, room: &mut Room, word: String) {
        let Some(drawer_id) = room.current_drawer.clone() else {
            return;
        };
        let drawer_name = room
            .player(&drawer_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();

        room.current_word = Some(word.clone());
        room.word_choices.clear();
        room.turn_started_at = Some(Instant::now());
        room.deadline =
            Some(chrono::Utc::now() + chrono::Duration::seconds(room.settings.draw_seconds as i64));
        room.guessed.clear();

        room.broadcast(ServerMessage::WordChosen {
            drawer: drawer_name,
            drawer_id: drawer_id.clone(),
            word_hint: word.chars().map(|_| '_').collect(),
            seconds_left: room.settings.draw_seconds,
        });
        room.send_to(&drawer_id, ServerMessage::YourWord { word });

        let epoch = room.next_epoch();
        self.schedule(
            room.id.clone(),
            epoch,
            Duration::from_secs(room.settings.draw_seconds as u64),
            TimerEvent::TurnDeadline,
        );
    }

    /// Evaluate a chat line as a guess. Correct guesses score both the
    /// guesser and the drawer; close guesses earn encouragement; anything
    /// else (including the drawer's own chatter) is relayed verbatim.
    pub async fn submit_guess(self: &Arc<Self>, room_id: &str, session_id: &str, text: String) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let mut room = room.lock().await;
        let Some(player) = room.player(session_id).cloned() else {
            return;
        };

        let guessing = room.phase == RoomPhase::Playing
            && !room.is_drawer(session_id)
            && room.current_word.is_some()
            && !room.guessed.contains(session_id);

        if guessing {
            let secret = room.current_word.clone().unwrap_or_default();

            if guess::is_exact_match(&text, &secret) {
                room.guessed.insert(session_id.to_string());

                let limit_ms = room.settings.draw_seconds as u64 * 1000;
                let elapsed_ms = room
                    .turn_started_at
                    .map(|t| t.elapsed().as_millis() as u64)
                    .unwrap_or(0)
                    .min(limit_ms);

                let points = guess::guesser_points(elapsed_ms, limit_ms);
                if let Some(p) = room.player_mut(session_id) {
                    p.score += points;
                }
                let drawer_points = guess::drawer_points(elapsed_ms, limit_ms);
                if let Some(drawer_id) = room.current_drawer.clone() {
                    if let Some(d) = room.player_mut(&drawer_id) {
                        d.score += drawer_points;
                    }
                }

                room.broadcast(ServerMessage::CorrectGuess {
                    player: player.name.clone(),
                    points,
                });
                room.broadcast_players();

                // Everyone but the drawer has it
                if room.guessed.len() == room.players.len() - 1 {
                    self.end_turn_locked(&mut room);
                }
                return;
            }

            if guess::is_close_match(&text, &secret) {
                room.broadcast(ServerMessage::Chat {
                    kind: ChatKind::Close,
                    player: Some(player.name.clone()),
                    message: text,
                    encouragement: Some(guess::close_message().to_string()),
                });
                return;
            }
        }

        room.broadcast(ServerMessage::Chat {
            kind: ChatKind::Player,
            player: Some(player.name),
            message: text,
            encouragement: None,
        });
    }

    /// Conclude the active turn: reveal, record history, and either move to
    /// the next round after an intermission or end the game. Idempotent.
    pub(crate) fn end_turn_locked(self: &Arc<Self>, room: &mut Room) {
        if room.phase != RoomPhase::Playing {
            return;
        }
        room.next_epoch();

        let drawer_name = room
            .current_drawer
            .as_ref()
            .and_then(|id| room.player(id))
            .map(|p| p.name.clone());
        let guessers = room
            .guessed
            .iter()
            .filter_map(|id| room.player(id))
            .map(|p| p.name.clone())
            .collect();
        room.history.push(TurnRecord {
            round: room.current_round,
            word: room.current_word.clone(),
            drawer: drawer_name.clone(),
            guessers,
            ended_at: chrono::Utc::now().to_rfc3339(),
        });

        let ended_word = room.current_word.take();
        let turn_scores = room.scoreboard();
        room.broadcast(ServerMessage::TurnEnded {
            word: ended_word,
            drawer: drawer_name,
            scores: turn_scores,
        });

        room.current_drawer = None;
        room.word_choices.clear();
        room.guessed.clear();
        room.turn_started_at = None;
        room.deadline = None;

        if room.current_round >= room.settings.rounds {
            room.phase = RoomPhase::Ended;
            let scores = room.scoreboard();
            if let Some(winner) = scores.first().cloned() {
                room.broadcast(ServerMessage::GameEnded {
                    winner,
                    scores,
                    history: room.history.clone(),
                });
            }
            tracing::info!("Game ended in room {}", room.id);
        } else {
            room.current_round += 1;
            let epoch = room.timer_epoch;
            self.schedule(
                room.id.clone(),
                epoch,
                Duration::from_secs(INTERMISSION_SECONDS),
                TimerEvent::Intermission,
            );
        }
    }

    /// Back to the lobby with a clean slate. Only valid once the game has
    /// ended.
    pub async fn reset_game(
        self: &Arc<Self>,
        room_id: &str,
        session_id: &str,
    ) -> Result<(), GameError> {
        let room = self.room(room_id).await.ok_or(GameError::RoomNotFound)?;
        let mut room = room.lock().await;
        if room.player(session_id).is_none() {
            return Ok(());
        }
        if room.phase != RoomPhase::Ended {
            return Err(GameError::InvalidState);
        }

        room.phase = RoomPhase::Lobby;
        room.current_round = 0;
        room.current_drawer = None;
        room.current_word = None;
        room.word_choices.clear();
        room.guessed.clear();
        room.turn_started_at = None;
        room.deadline = None;
        room.history.clear();
        for p in &mut room.players {
            p.score = 0;
        }
        room.next_epoch();

        room.broadcast(ServerMessage::GameReset);
        room.broadcast_players();
        tracing::info!("Room {} reset to lobby", room_id);
        Ok(())
    }

    fn schedule(self: &Arc<Self>, room_id: RoomId, epoch: u64, delay: Duration, event: TimerEvent) {
        let state = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.apply_timer(&room_id, epoch, event).await;
        });
    }

    /// Deliver a timer firing into the room's serialization point. Stale
    /// epochs, vanished rooms, and rooms that moved on are all discarded.
    pub async fn apply_timer(self: &Arc<Self>, room_id: &str, epoch: u64, event: TimerEvent) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let mut room = room.lock().await;
        if room.timer_epoch != epoch {
            tracing::debug!("Discarding stale {:?} timer for room {}", event, room_id);
            return;
        }

        match event {
            TimerEvent::ChoiceTimeout => {
                if room.phase == RoomPhase::Playing && room.current_word.is_none() {
                    if let Some(word) = room.word_choices.choose(&mut rand::rng()).cloned() {
                        tracing::info!("Room {}: choice window expired, picking for the drawer", room_id);
                        self.choose_word_locked(&mut room, word);
                    } else {
                        self.end_turn_locked(&mut room);
                    }
                }
            }
            TimerEvent::TurnDeadline => self.end_turn_locked(&mut room),
            TimerEvent::Intermission => {
                if room.phase == RoomPhase::Playing {
                    self.begin_turn_locked(&mut room);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ServerMessage;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    async fn three_player_room(
        state: &Arc<AppState>,
        settings: RoomSettings,
    ) -> (RoomId, Vec<UnboundedReceiver<ServerMessage>>) {
        let (tx, rx_a) = mpsc::unbounded_channel();
        let room_id = state
            .create_room_for("a", "Alice", settings, tx)
            .await
            .unwrap();
        let (tx, rx_b) = mpsc::unbounded_channel();
        state.join_room(&room_id, "Bob", "b", tx).await.unwrap();
        let (tx, rx_c) = mpsc::unbounded_channel();
        state.join_room(&room_id, "Carol", "c", tx).await.unwrap();
        (room_id, vec![rx_a, rx_b, rx_c])
    }

    fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut msgs = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            msgs.push(msg);
        }
        msgs
    }

    async fn current_epoch(state: &Arc<AppState>, room_id: &str) -> u64 {
        state.room(room_id).await.unwrap().lock().await.timer_epoch
    }

    #[tokio::test]
    async fn test_start_requires_owner() {
        let state = Arc::new(AppState::new());
        let (room_id, _rxs) = three_player_room(&state, RoomSettings::default()).await;
        assert_eq!(
            state.start_game(&room_id, "b").await.unwrap_err(),
            GameError::NotOwner
        );
    }

    #[tokio::test]
    async fn test_start_requires_two_players() {
        let state = Arc::new(AppState::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let room_id = state
            .create_room_for("a", "Alice", RoomSettings::default(), tx)
            .await
            .unwrap();
        assert_eq!(
            state.start_game(&room_id, "a").await.unwrap_err(),
            GameError::InsufficientPlayers
        );
    }

    #[tokio::test]
    async fn test_start_only_from_lobby() {
        let state = Arc::new(AppState::new());
        let (room_id, _rxs) = three_player_room(&state, RoomSettings::default()).await;
        state.start_game(&room_id, "a").await.unwrap();
        assert_eq!(
            state.start_game(&room_id, "a").await.unwrap_err(),
            GameError::InvalidState
        );
    }

    #[tokio::test]
    async fn test_first_drawer_is_first_joiner() {
        let state = Arc::new(AppState::new());
        let (room_id, mut rxs) = three_player_room(&state, RoomSettings::default()).await;
        state.start_game(&room_id, "a").await.unwrap();

        let room = state.room(&room_id).await.unwrap();
        let guard = room.lock().await;
        assert_eq!(guard.phase, RoomPhase::Playing);
        assert_eq!(guard.current_round, 1);
        assert_eq!(guard.current_drawer.as_deref(), Some("a"));
        assert_eq!(guard.word_choices.len(), 3);
        drop(guard);

        // The word offer goes to the drawer alone
        let drawer_msgs = drain(&mut rxs[0]);
        assert!(drawer_msgs
            .iter()
            .any(|m| matches!(m, ServerMessage::ChooseWord { words } if words.len() == 3)));
        let other_msgs = drain(&mut rxs[1]);
        assert!(!other_msgs
            .iter()
            .any(|m| matches!(m, ServerMessage::ChooseWord { .. })));
        assert!(other_msgs
            .iter()
            .any(|m| matches!(m, ServerMessage::NewTurn { round: 1, .. })));
    }

    #[tokio::test]
    async fn test_choose_word_is_drawer_only() {
        let state = Arc::new(AppState::new());
        let (room_id, mut rxs) = three_player_room(&state, RoomSettings::default()).await;
        state.start_game(&room_id, "a").await.unwrap();
        for rx in rxs.iter_mut() {
            drain(rx);
        }

        state.choose_word(&room_id, "b", "cat".to_string()).await;
        {
            let room = state.room(&room_id).await.unwrap();
            assert!(room.lock().await.current_word.is_none());
        }

        state.choose_word(&room_id, "a", "cat".to_string()).await;
        let room = state.room(&room_id).await.unwrap();
        let guard = room.lock().await;
        assert_eq!(guard.current_word.as_deref(), Some("cat"));
        assert!(guard.turn_started_at.is_some());
        assert!(guard.deadline.is_some());
        drop(guard);

        // Masked hint to the room, full word to the drawer only
        let guesser_msgs = drain(&mut rxs[1]);
        assert!(guesser_msgs.iter().any(|m| matches!(
            m,
            ServerMessage::WordChosen { word_hint, .. } if word_hint == "___"
        )));
        assert!(!guesser_msgs
            .iter()
            .any(|m| matches!(m, ServerMessage::YourWord { .. })));
        assert!(drain(&mut rxs[0])
            .iter()
            .any(|m| matches!(m, ServerMessage::YourWord { word } if word == "cat")));
    }

    #[tokio::test]
    async fn test_guess_scenario_correct_close_and_chat() {
        let state = Arc::new(AppState::new());
        let (room_id, mut rxs) = three_player_room(&state, RoomSettings::default()).await;
        state.start_game(&room_id, "a").await.unwrap();
        state.choose_word(&room_id, "a", "cat".to_string()).await;
        for rx in rxs.iter_mut() {
            drain(rx);
        }

        // Correct guess scores guesser and drawer
        state.submit_guess(&room_id, "b", "cat".to_string()).await;
        {
            let room = state.room(&room_id).await.unwrap();
            let guard = room.lock().await;
            assert!(guard.player("b").unwrap().score > 0);
            assert!(guard.player("a").unwrap().score > 0);
            assert_eq!(guard.player("c").unwrap().score, 0);
            assert!(guard.guessed.contains("b"));
            // One guesser of two non-drawers: the turn continues
            assert_eq!(guard.phase, RoomPhase::Playing);
            assert!(guard.current_word.is_some());
            assert!(guard.history.is_empty());
        }
        let carol_msgs = drain(&mut rxs[2]);
        assert!(carol_msgs.iter().any(|m| matches!(
            m,
            ServerMessage::CorrectGuess { player, points } if player == "Bob" && *points > 0
        )));
        assert!(carol_msgs
            .iter()
            .any(|m| matches!(m, ServerMessage::PlayersUpdated { .. })));

        // Close guess elicits encouragement without scoring
        state.submit_guess(&room_id, "c", "cta".to_string()).await;
        let msgs = drain(&mut rxs[0]);
        assert!(msgs.iter().any(|m| matches!(
            m,
            ServerMessage::Chat { kind: ChatKind::Close, encouragement: Some(_), .. }
        )));

        // Unrelated text relays as plain chat
        state.submit_guess(&room_id, "c", "dog".to_string()).await;
        let msgs = drain(&mut rxs[0]);
        assert!(msgs.iter().any(|m| matches!(
            m,
            ServerMessage::Chat { kind: ChatKind::Player, message, .. } if message == "dog"
        )));
        let room = state.room(&room_id).await.unwrap();
        assert_eq!(room.lock().await.player("c").unwrap().score, 0);
    }

    #[tokio::test]
    async fn test_drawer_guess_is_plain_chat() {
        let state = Arc::new(AppState::new());
        let (room_id, mut rxs) = three_player_room(&state, RoomSettings::default()).await;
        state.start_game(&room_id, "a").await.unwrap();
        state.choose_word(&room_id, "a", "cat".to_string()).await;
        for rx in rxs.iter_mut() {
            drain(rx);
        }

        state.submit_guess(&room_id, "a", "cat".to_string()).await;
        let room = state.room(&room_id).await.unwrap();
        let guard = room.lock().await;
        assert_eq!(guard.player("a").unwrap().score, 0);
        assert!(guard.guessed.is_empty());
        drop(guard);
        assert!(drain(&mut rxs[1]).iter().any(|m| matches!(
            m,
            ServerMessage::Chat { kind: ChatKind::Player, .. }
        )));
    }

    #[tokio::test]
    async fn test_turn_ends_when_everyone_guessed() {
        let state = Arc::new(AppState::new());
        let (room_id, mut rxs) = three_player_room(&state, RoomSettings::default()).await;
        state.start_game(&room_id, "a").await.unwrap();
        state.choose_word(&room_id, "a", "cat".to_string()).await;

        state.submit_guess(&room_id, "b", "cat".to_string()).await;
        state.submit_guess(&room_id, "c", "cat".to_string()).await;

        let room = state.room(&room_id).await.unwrap();
        let guard = room.lock().await;
        assert_eq!(guard.history.len(), 1);
        assert_eq!(guard.history[0].word.as_deref(), Some("cat"));
        assert_eq!(guard.history[0].guessers.len(), 2);
        assert_eq!(guard.current_round, 2);
        assert!(guard.current_word.is_none());
        drop(guard);

        let msgs = drain(&mut rxs[0]);
        assert!(msgs.iter().any(|m| matches!(
            m,
            ServerMessage::TurnEnded { word: Some(w), .. } if w == "cat"
        )));
    }

    #[tokio::test]
    async fn test_drawer_rotation_is_fair() {
        let state = Arc::new(AppState::new());
        let settings = RoomSettings {
            rounds: 5,
            ..Default::default()
        };
        let (room_id, _rxs) = three_player_room(&state, settings).await;
        state.start_game(&room_id, "a").await.unwrap();

        let mut drawers = Vec::new();
        for _ in 0..5 {
            let room = state.room(&room_id).await.unwrap();
            let guard = room.lock().await;
            drawers.push(guard.current_drawer.clone().unwrap());
            let epoch = guard.timer_epoch;
            drop(guard);

            state.apply_timer(&room_id, epoch, TimerEvent::TurnDeadline).await;
            let epoch = current_epoch(&state, &room_id).await;
            state.apply_timer(&room_id, epoch, TimerEvent::Intermission).await;
        }

        assert_eq!(drawers, ["a", "b", "c", "a", "b"]);
        let room = state.room(&room_id).await.unwrap();
        assert_eq!(room.lock().await.phase, RoomPhase::Ended);
    }

    #[tokio::test]
    async fn test_stale_timer_is_discarded() {
        let state = Arc::new(AppState::new());
        let (room_id, _rxs) = three_player_room(&state, RoomSettings::default()).await;
        state.start_game(&room_id, "a").await.unwrap();

        let stale = current_epoch(&state, &room_id).await;
        // Choosing a word supersedes the choice-timeout timer
        state.choose_word(&room_id, "a", "cat".to_string()).await;

        state
            .apply_timer(&room_id, stale, TimerEvent::TurnDeadline)
            .await;
        let room = state.room(&room_id).await.unwrap();
        let guard = room.lock().await;
        assert!(guard.history.is_empty(), "stale timer must not end the turn");
        assert_eq!(guard.current_word.as_deref(), Some("cat"));
    }

    #[tokio::test]
    async fn test_choice_timeout_picks_a_word_for_the_drawer() {
        let state = Arc::new(AppState::new());
        let (room_id, _rxs) = three_player_room(&state, RoomSettings::default()).await;
        state.start_game(&room_id, "a").await.unwrap();

        let room = state.room(&room_id).await.unwrap();
        let (epoch, offered) = {
            let guard = room.lock().await;
            (guard.timer_epoch, guard.word_choices.clone())
        };
        state
            .apply_timer(&room_id, epoch, TimerEvent::ChoiceTimeout)
            .await;

        let guard = room.lock().await;
        let word = guard.current_word.clone().expect("a word was auto-picked");
        assert!(offered.contains(&word));
        assert!(guard.word_choices.is_empty());
        assert!(guard.turn_started_at.is_some());
    }

    #[tokio::test]
    async fn test_game_end_and_winner_tiebreak() {
        let state = Arc::new(AppState::new());
        let settings = RoomSettings {
            rounds: 1,
            ..Default::default()
        };
        let (room_id, mut rxs) = three_player_room(&state, settings).await;
        state.start_game(&room_id, "a").await.unwrap();

        // Nobody guesses; all scores tie at zero and the earliest joiner wins
        let epoch = current_epoch(&state, &room_id).await;
        state
            .apply_timer(&room_id, epoch, TimerEvent::TurnDeadline)
            .await;

        let room = state.room(&room_id).await.unwrap();
        assert_eq!(room.lock().await.phase, RoomPhase::Ended);
        let msgs = drain(&mut rxs[1]);
        assert!(msgs.iter().any(|m| matches!(
            m,
            ServerMessage::GameEnded { winner, .. } if winner.id == "a"
        )));
    }

    #[tokio::test]
    async fn test_reset_only_after_ended() {
        let state = Arc::new(AppState::new());
        let settings = RoomSettings {
            rounds: 1,
            ..Default::default()
        };
        let (room_id, _rxs) = three_player_room(&state, settings).await;

        assert_eq!(
            state.reset_game(&room_id, "a").await.unwrap_err(),
            GameError::InvalidState
        );

        state.start_game(&room_id, "a").await.unwrap();
        state.choose_word(&room_id, "a", "cat".to_string()).await;
        state.submit_guess(&room_id, "b", "cat".to_string()).await;
        state.submit_guess(&room_id, "c", "cat".to_string()).await;

        state.reset_game(&room_id, "a").await.unwrap();
        let room = state.room(&room_id).await.unwrap();
        let guard = room.lock().await;
        assert_eq!(guard.phase, RoomPhase::Lobby);
        assert_eq!(guard.current_round, 0);
        assert!(guard.history.is_empty());
        assert!(guard.players.iter().all(|p| p.score == 0));
    }

    #[tokio::test]
    async fn test_drawer_disconnect_ends_turn() {
        let state = Arc::new(AppState::new());
        let (room_id, _rxs) = three_player_room(&state, RoomSettings::default()).await;
        state.start_game(&room_id, "a").await.unwrap();
        state.choose_word(&room_id, "a", "cat".to_string()).await;

        // Alice is both owner and drawer, but the game is running so the
        // lobby grace does not apply
        state.mark_disconnected(&room_id, "a").await;

        let room = state.room(&room_id).await.unwrap();
        let guard = room.lock().await;
        assert_eq!(guard.players.len(), 2);
        assert_eq!(guard.history.len(), 1);
        assert!(guard.history[0].drawer.is_none());
        assert_eq!(guard.current_round, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_timer_fires_through_the_scheduler() {
        let state = Arc::new(AppState::new());
        let settings = RoomSettings {
            rounds: 3,
            draw_seconds: 30,
            ..Default::default()
        };
        let (room_id, _rxs) = three_player_room(&state, settings).await;
        state.start_game(&room_id, "a").await.unwrap();
        state.choose_word(&room_id, "a", "cat".to_string()).await;

        // Past the deadline but short of the intermission that follows it
        tokio::time::sleep(Duration::from_secs(31)).await;

        let room = state.room(&room_id).await.unwrap();
        let guard = room.lock().await;
        assert_eq!(guard.history.len(), 1);
        assert_eq!(guard.current_round, 2);
        assert_eq!(guard.phase, RoomPhase::Playing);
    }
}
