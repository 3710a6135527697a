//! Outbound events
//!
//! ドメインが発行する通知の型と、宛先付きの送信キュー（Outbox）。
//! ワイヤ上では `{"event": "<name>", "payload": {...}}` として直列化される。

use std::collections::BTreeMap;

use serde::Serialize;

use super::{
    drawing::DrawingEvent,
    entity::{ActiveEffect, Cooldown, Difficulty, GameStatus, Player, Room, WordChoice},
    powerup::PowerupKind,
    scoring::Bonus,
    value_object::{PlayerId, RoomCode},
};

/// 公開してよいゲーム状態（お題と候補は含めない）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub round: u32,
    pub max_rounds: u32,
    pub current_drawer: Option<PlayerId>,
    pub display_word: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub round_started_at: Option<i64>,
    pub round_duration_ms: u64,
    pub round_deadline: Option<i64>,
    pub time_paused_until: Option<i64>,
    pub brush_sabotage_active: bool,
}

impl From<&Room> for GameSnapshot {
    fn from(room: &Room) -> Self {
        let game = &room.game;
        Self {
            status: game.status,
            round: game.round,
            max_rounds: game.max_rounds,
            current_drawer: game.current_drawer.clone(),
            display_word: game.display_word.clone(),
            difficulty: game.word_difficulty,
            round_started_at: game.round_started_at,
            round_duration_ms: game.round_duration_ms,
            round_deadline: game.round_deadline,
            time_paused_until: game.time_paused_until,
            brush_sabotage_active: game.brush_sabotage_active,
        }
    }
}

/// 得点表の 1 行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLine {
    pub player_id: PlayerId,
    pub name: String,
    pub score: i64,
}

impl From<&Player> for ScoreLine {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.id.clone(),
            name: player.name.to_string(),
            score: player.score,
        }
    }
}

/// パワーアップ効果の通知
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectNotice {
    #[serde(rename_all = "camelCase")]
    RevealLetter { display_word: String },
    #[serde(rename_all = "camelCase")]
    WordLength { word_length: usize },
    #[serde(rename_all = "camelCase")]
    OracleHint {
        category: String,
        first_letter: String,
    },
    #[serde(rename_all = "camelCase")]
    ExtraTime {
        extra_ms: u64,
        round_deadline: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    StreakShield { expires_at: i64 },
    #[serde(rename_all = "camelCase")]
    DoublePoints { expires_at: i64 },
    #[serde(rename_all = "camelCase")]
    TriplePoints { expires_at: i64 },
    #[serde(rename_all = "camelCase")]
    SpeedCurse {
        by: String,
        target: PlayerId,
        expires_at: i64,
    },
    #[serde(rename_all = "camelCase")]
    TimeWarp {
        by: String,
        duration_ms: u64,
        paused_until: i64,
        round_deadline: Option<i64>,
    },
    TimeWarpEnded,
    #[serde(rename_all = "camelCase")]
    BrushSabotage { by: String, duration_ms: u64 },
    BrushSabotageEnded,
    #[serde(rename_all = "camelCase")]
    BlindSpot {
        by: String,
        duration_ms: u64,
        coverage_pct: u32,
    },
    BlindSpotEnded,
    #[serde(rename_all = "camelCase")]
    CanvasChaos { by: String, duration_ms: u64 },
    CanvasChaosEnded,
    #[serde(rename_all = "camelCase")]
    PointSteal {
        thief: PlayerId,
        thief_name: String,
        victim: PlayerId,
        victim_name: String,
        amount: i64,
    },
}

/// サーバーから送る通知
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum ServerEvent {
    #[serde(rename = "connection.ready", rename_all = "camelCase")]
    ConnectionReady { player_id: PlayerId },

    #[serde(rename = "room.created", rename_all = "camelCase")]
    RoomCreated {
        room_code: RoomCode,
        player_id: PlayerId,
        is_host: bool,
        players: Vec<Player>,
    },

    #[serde(rename = "room.joined", rename_all = "camelCase")]
    RoomJoined {
        room_code: RoomCode,
        player_id: PlayerId,
        is_host: bool,
        players: Vec<Player>,
        game: GameSnapshot,
        drawing_history: Vec<DrawingEvent>,
    },

    #[serde(rename = "room.left", rename_all = "camelCase")]
    RoomLeft { room_code: RoomCode },

    #[serde(rename = "room.players_update", rename_all = "camelCase")]
    PlayersUpdated {
        players: Vec<Player>,
        host: PlayerId,
        all_ready: bool,
    },

    #[serde(rename = "room.error")]
    RoomError { message: String },

    #[serde(rename = "room.closed", rename_all = "camelCase")]
    RoomClosed { room_code: RoomCode, reason: String },

    #[serde(rename = "game.started", rename_all = "camelCase")]
    GameStarted {
        max_rounds: u32,
        round_duration_ms: u64,
    },

    #[serde(rename = "round.start_drawer", rename_all = "camelCase")]
    RoundStartDrawer {
        round: u32,
        max_rounds: u32,
        word_options: Vec<WordChoice>,
        choice_timeout_ms: u64,
    },

    #[serde(rename = "round.start_guesser", rename_all = "camelCase")]
    RoundStartGuesser {
        round: u32,
        max_rounds: u32,
        drawer_id: PlayerId,
        drawer_name: String,
    },

    /// 描き手向けだけ `word` を含む
    #[serde(rename = "word.selected", rename_all = "camelCase")]
    WordSelected {
        display_word: String,
        difficulty: Difficulty,
        round_duration_ms: u64,
        round_deadline: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        word: Option<String>,
    },

    #[serde(rename = "hint.revealed", rename_all = "camelCase")]
    HintRevealed { display_word: String },

    #[serde(rename = "chat.received", rename_all = "camelCase")]
    ChatReceived {
        player_id: PlayerId,
        player_name: String,
        message: String,
        is_correct: bool,
        timestamp: i64,
    },

    #[serde(rename = "guess.correct", rename_all = "camelCase")]
    GuessCorrect {
        player_id: PlayerId,
        player_name: String,
    },

    #[serde(rename = "guess.close")]
    GuessClose { message: String },

    #[serde(rename = "bonus.awarded", rename_all = "camelCase")]
    BonusAwarded {
        bonuses: Vec<Bonus>,
        base_score: i64,
        total_score: i64,
    },

    #[serde(rename = "round.end", rename_all = "camelCase")]
    RoundEnded {
        word: String,
        scores: Vec<ScoreLine>,
        next_round_in_ms: Option<u64>,
    },

    #[serde(rename = "game.end", rename_all = "camelCase")]
    GameEnded {
        winners: Vec<ScoreLine>,
        final_scores: Vec<ScoreLine>,
    },

    #[serde(rename = "game.restarted")]
    GameRestarted {
        players: Vec<Player>,
        game: GameSnapshot,
    },

    #[serde(rename = "drawing.batch")]
    DrawingBatch { events: Vec<DrawingEvent> },

    #[serde(rename = "drawing.clear")]
    DrawingCleared,

    #[serde(rename = "powerup.price_update", rename_all = "camelCase")]
    PowerupPriceUpdate {
        powerup_id: PowerupKind,
        price: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<PlayerId>,
    },

    #[serde(rename = "powerup.purchased", rename_all = "camelCase")]
    PowerupPurchased {
        powerup_id: PowerupKind,
        price: i64,
        score: i64,
        powerups: BTreeMap<PowerupKind, u32>,
    },

    #[serde(rename = "powerup.activated", rename_all = "camelCase")]
    PowerupActivated {
        powerup_id: PowerupKind,
        powerups: BTreeMap<PowerupKind, u32>,
        active_effects: Vec<ActiveEffect>,
        cooldowns: BTreeMap<PowerupKind, Cooldown>,
    },

    #[serde(rename = "powerup.awarded", rename_all = "camelCase")]
    PowerupAwarded {
        powerup_id: PowerupKind,
        name: String,
    },

    #[serde(rename = "powerup.error")]
    PowerupError { message: String },

    #[serde(rename = "powerup.effect")]
    PowerupEffect(EffectNotice),
}

impl ServerEvent {
    /// 参加者一覧の更新通知（期限切れの効果は含めない）
    pub fn players_updated(room: &Room, min_players: usize, now: i64) -> Self {
        let players = room
            .players
            .iter()
            .cloned()
            .map(|mut player| {
                player.prune_effects(now);
                player
            })
            .collect();
        ServerEvent::PlayersUpdated {
            players,
            host: room.host.clone(),
            all_ready: room.all_ready(min_players),
        }
    }

    pub fn room_error(message: impl Into<String>) -> Self {
        ServerEvent::RoomError {
            message: message.into(),
        }
    }

    pub fn powerup_error(message: impl Into<String>) -> Self {
        ServerEvent::PowerupError {
            message: message.into(),
        }
    }
}

/// 宛先付きの通知
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outbound {
    pub targets: Vec<PlayerId>,
    pub event: ServerEvent,
}

/// 1 回の操作で発生した通知をためておくキュー
///
/// ドメインのロジックは通知を直接送らず、ここに積んで呼び出し元に返す。
/// ルームのロックを外してからまとめて配信する。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outbox {
    messages: Vec<Outbound>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(&mut self, target: &PlayerId, event: ServerEvent) {
        self.messages.push(Outbound {
            targets: vec![target.clone()],
            event,
        });
    }

    pub fn to_many(&mut self, targets: Vec<PlayerId>, event: ServerEvent) {
        if targets.is_empty() {
            return;
        }
        self.messages.push(Outbound { targets, event });
    }

    /// ルームの全員に送る
    pub fn room(&mut self, room: &Room, event: ServerEvent) {
        self.to_many(room.member_ids(), event);
    }

    /// ルームの `except` 以外に送る
    pub fn room_except(&mut self, room: &Room, except: &PlayerId, event: ServerEvent) {
        self.to_many(room.member_ids_except(except), event);
    }

    pub fn append(&mut self, other: Outbox) {
        self.messages.extend(other.messages);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outbound> {
        self.messages.iter()
    }

    pub fn into_messages(self) -> Vec<Outbound> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_event_envelope_uses_dotted_names() {
        // テスト項目: 通知は event / payload の封筒で直列化される
        // given (前提条件):
        let event = ServerEvent::HintRevealed {
            display_word: "c_t".to_string(),
        };

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"event": "hint.revealed", "payload": {"displayWord": "c_t"}})
        );
    }

    #[test]
    fn test_unit_event_has_no_payload() {
        // テスト項目: ペイロードのない通知は event だけになる
        // given (前提条件):
        let event = ServerEvent::DrawingCleared;

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(value, json!({"event": "drawing.clear"}));
    }

    #[test]
    fn test_effect_notice_is_tagged_with_type() {
        // テスト項目: パワーアップ効果は type で種類が分かる
        // given (前提条件):
        let event = ServerEvent::PowerupEffect(EffectNotice::TimeWarpEnded);

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"event": "powerup.effect", "payload": {"type": "time_warp_ended"}})
        );
    }

    #[test]
    fn test_guesser_word_selected_omits_plaintext() {
        // テスト項目: 回答者向けの word.selected にはお題が含まれない
        // given (前提条件):
        let event = ServerEvent::WordSelected {
            display_word: "___".to_string(),
            difficulty: Difficulty::Easy,
            round_duration_ms: 80_000,
            round_deadline: Some(80_000),
            word: None,
        };

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert!(value["payload"].get("word").is_none());
        assert_eq!(value["payload"]["difficulty"], "easy");
    }

    #[test]
    fn test_players_update_hides_expired_effects() {
        // テスト項目: 参加者一覧には期限切れの効果が載らない
        // given (前提条件):
        let mut host = Player::new(
            PlayerId::new("alice").unwrap(),
            crate::domain::PlayerName::new("alice").unwrap(),
            crate::domain::AvatarId(1),
            0,
        );
        host.active_effects.push(ActiveEffect {
            kind: PowerupKind::DoublePoints,
            activated_at: 0,
            expires_at: Some(10_000),
            source: None,
        });
        host.active_effects.push(ActiveEffect {
            kind: PowerupKind::StreakShield,
            activated_at: 5_000,
            expires_at: Some(125_000),
            source: None,
        });
        let room = Room::new(RoomCode::parse("ABCD").unwrap(), host, 3, 80_000, 0);

        // when (操作):
        let event = ServerEvent::players_updated(&room, 2, 10_000);

        // then (期待する結果):
        let ServerEvent::PlayersUpdated { players, .. } = event else {
            panic!("unexpected event: {:?}", event);
        };
        assert_eq!(players[0].active_effects.len(), 1);
        assert_eq!(players[0].active_effects[0].kind, PowerupKind::StreakShield);
        assert_eq!(room.players[0].active_effects.len(), 2);
    }

    #[test]
    fn test_outbox_skips_empty_target_lists() {
        // テスト項目: 宛先が空の通知は積まれない
        // given (前提条件):
        let mut outbox = Outbox::new();

        // when (操作):
        outbox.to_many(Vec::new(), ServerEvent::DrawingCleared);

        // then (期待する結果):
        assert!(outbox.is_empty());
    }
}
