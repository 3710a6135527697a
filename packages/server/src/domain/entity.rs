//! Entities（Room, Player, GameState）
//!
//! Room は Player 集合とゲーム状態を所有する集約ルート。
//! Player の並び順は参加順で、そのまま描き手の順番になる。

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{
    drawing::DrawingEvent,
    error::MembershipError,
    powerup::PowerupKind,
    value_object::{AvatarId, PlayerId, PlayerName, RoomCode},
};

/// ゲームの進行状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Choosing,
    Drawing,
    Ended,
}

/// お題の難易度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// 得点倍率（百分率）
    pub const fn multiplier_pct(self) -> i64 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Medium => 150,
            Difficulty::Hard => 200,
        }
    }
}

/// 描き手に提示されるお題の候補
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordChoice {
    pub word: String,
    pub difficulty: Difficulty,
}

/// プレイヤーに掛かっている時限効果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    pub kind: PowerupKind,
    pub activated_at: i64,
    pub expires_at: Option<i64>,
    /// 他プレイヤーから掛けられた効果の発動者
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PlayerId>,
}

impl ActiveEffect {
    pub fn is_live(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

/// 自動解除タイマーを持つ時限効果の枠（ルーム単位、または対象ごと）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EffectSlot {
    TimeWarp,
    BrushSabotage,
    BlindSpot(PlayerId),
    CanvasChaos(PlayerId),
}

/// 個人クールダウン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cooldown {
    pub last_used_at: i64,
    pub next_eligible_at: i64,
}

/// ルーム全体のクールダウンとラウンド内の使用回数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalCooldown {
    pub last_used_by: PlayerId,
    pub last_used_at: i64,
    pub next_eligible_at: i64,
    pub uses_this_round: u32,
}

/// プレイヤー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,
    pub avatar: AvatarId,
    /// 0 未満にはならない
    pub score: i64,
    pub is_ready: bool,
    pub guessed_correctly: bool,
    pub is_connected: bool,
    pub joined_at: i64,
    pub current_streak: u32,
    pub max_streak: u32,
    pub total_correct_guesses: u32,
    pub powerups: BTreeMap<PowerupKind, u32>,
    pub active_effects: Vec<ActiveEffect>,
    pub cooldowns: BTreeMap<PowerupKind, Cooldown>,
}

impl Player {
    pub fn new(id: PlayerId, name: PlayerName, avatar: AvatarId, joined_at: i64) -> Self {
        Self {
            id,
            name,
            avatar,
            score: 0,
            is_ready: false,
            guessed_correctly: false,
            is_connected: true,
            joined_at,
            current_streak: 0,
            max_streak: 0,
            total_correct_guesses: 0,
            powerups: BTreeMap::new(),
            active_effects: Vec::new(),
            cooldowns: BTreeMap::new(),
        }
    }

    /// 期限切れの効果を取り除く
    pub fn prune_effects(&mut self, now: i64) {
        self.active_effects.retain(|effect| effect.is_live(now));
    }

    pub fn has_effect(&mut self, kind: PowerupKind, now: i64) -> bool {
        self.prune_effects(now);
        self.active_effects.iter().any(|effect| effect.kind == kind)
    }

    /// 指定種類の効果を 1 つ消費する
    pub fn take_effect(&mut self, kind: PowerupKind, now: i64) -> Option<ActiveEffect> {
        self.prune_effects(now);
        let index = self
            .active_effects
            .iter()
            .position(|effect| effect.kind == kind)?;
        Some(self.active_effects.remove(index))
    }

    /// double / triple のうち最も早く発動したものを 1 つ消費する
    pub fn take_earliest_multiplier(&mut self, now: i64) -> Option<ActiveEffect> {
        self.prune_effects(now);
        let index = self
            .active_effects
            .iter()
            .enumerate()
            .filter(|(_, effect)| effect.kind.score_multiplier().is_some())
            .min_by_key(|(_, effect)| effect.activated_at)
            .map(|(index, _)| index)?;
        Some(self.active_effects.remove(index))
    }

    pub fn credit(&mut self, amount: i64) {
        self.score = self.score.saturating_add(amount).max(0);
    }

    /// 最大 `amount` だけ減算し、実際に減った量を返す
    pub fn debit(&mut self, amount: i64) -> i64 {
        let taken = amount.clamp(0, self.score.max(0));
        self.score -= taken;
        taken
    }

    pub fn grant(&mut self, kind: PowerupKind) {
        *self.powerups.entry(kind).or_insert(0) += 1;
    }

    pub fn owns(&self, kind: PowerupKind) -> bool {
        self.powerups.get(&kind).is_some_and(|count| *count > 0)
    }

    /// 在庫を 1 つ減らし、0 になったらエントリごと削除する
    pub fn consume(&mut self, kind: PowerupKind) -> bool {
        let Some(count) = self.powerups.get_mut(&kind) else {
            return false;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.powerups.remove(&kind);
        }
        true
    }

    /// リスタート時の初期化
    pub fn reset_for_new_game(&mut self) {
        self.score = 0;
        self.is_ready = false;
        self.guessed_correctly = false;
        self.current_streak = 0;
        self.max_streak = 0;
        self.total_correct_guesses = 0;
        self.powerups.clear();
        self.active_effects.clear();
        self.cooldowns.clear();
    }
}

/// ゲーム状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub status: GameStatus,
    pub round: u32,
    pub max_rounds: u32,
    pub current_drawer: Option<PlayerId>,
    /// 現在（直前）の描き手の席番号。退出で前の席が詰まると一緒に詰める
    pub drawer_seat: Option<usize>,
    pub current_word: Option<String>,
    pub display_word: Option<String>,
    pub word_difficulty: Option<Difficulty>,
    pub round_started_at: Option<i64>,
    pub round_duration_ms: u64,
    pub round_deadline: Option<i64>,
    pub word_options: Vec<WordChoice>,
    pub first_blood_awarded: bool,
    pub perfect_round_awarded: bool,
    pub guess_timestamps: HashMap<PlayerId, i64>,
    pub time_paused_until: Option<i64>,
    pub brush_sabotage_active: bool,
    /// 解除待ちの時限効果
    pub effect_slots: Vec<EffectSlot>,
    /// ラウンド終了から次のラウンド開始までの待ち時間中
    pub between_rounds: bool,
    /// 状態遷移ごとに進む世代番号。タイマーは自分の世代と一致するときだけ動く
    pub epoch: u64,
}

impl GameState {
    pub fn new(max_rounds: u32, round_duration_ms: u64) -> Self {
        Self {
            status: GameStatus::Waiting,
            round: 0,
            max_rounds,
            current_drawer: None,
            drawer_seat: None,
            current_word: None,
            display_word: None,
            word_difficulty: None,
            round_started_at: None,
            round_duration_ms,
            round_deadline: None,
            word_options: Vec::new(),
            first_blood_awarded: false,
            perfect_round_awarded: false,
            guess_timestamps: HashMap::new(),
            time_paused_until: None,
            brush_sabotage_active: false,
            effect_slots: Vec::new(),
            between_rounds: false,
            epoch: 0,
        }
    }

    pub fn advance_epoch(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }

    pub fn is_drawing(&self) -> bool {
        self.status == GameStatus::Drawing
    }

    /// 試合中（choosing / drawing）かどうか
    pub fn in_progress(&self) -> bool {
        matches!(self.status, GameStatus::Choosing | GameStatus::Drawing)
    }

    /// 時間停止（time warp）が明けるまでの残り時間
    pub fn pause_remaining_ms(&self, now: i64) -> Option<u64> {
        self.time_paused_until
            .filter(|paused_until| now < *paused_until)
            .map(|paused_until| (paused_until - now) as u64)
    }

    pub fn elapsed_ms(&self, now: i64) -> Option<i64> {
        self.round_started_at.map(|started| (now - started).max(0))
    }

    /// ラウンド単位の状態を捨てる
    pub fn clear_round(&mut self) {
        self.current_word = None;
        self.display_word = None;
        self.word_difficulty = None;
        self.round_started_at = None;
        self.round_deadline = None;
        self.word_options.clear();
        self.first_blood_awarded = false;
        self.perfect_round_awarded = false;
        self.guess_timestamps.clear();
        self.time_paused_until = None;
        self.brush_sabotage_active = false;
        self.effect_slots.clear();
        self.between_rounds = false;
    }
}

/// ルーム（集約ルート）
#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    pub host: PlayerId,
    pub players: Vec<Player>,
    pub game: GameState,
    pub drawing_history: Vec<DrawingEvent>,
    pub global_cooldowns: BTreeMap<PowerupKind, GlobalCooldown>,
    pub created_at: i64,
    pub last_activity: i64,
    /// 削除済み。参照を持っていた処理はここを見て何もせず抜ける
    pub closed: bool,
}

impl Room {
    pub fn new(
        code: RoomCode,
        host: Player,
        max_rounds: u32,
        round_duration_ms: u64,
        now: i64,
    ) -> Self {
        Self {
            code,
            host: host.id.clone(),
            players: vec![host],
            game: GameState::new(max_rounds, round_duration_ms),
            drawing_history: Vec::new(),
            global_cooldowns: BTreeMap::new(),
            created_at: now,
            last_activity: now,
            closed: false,
        }
    }

    pub fn touch(&mut self, now: i64) {
        self.last_activity = self.last_activity.max(now);
    }

    pub fn is_member(&self, id: &PlayerId) -> bool {
        self.players.iter().any(|player| &player.id == id)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| &player.id == id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| &player.id == id)
    }

    pub fn is_host(&self, id: &PlayerId) -> bool {
        &self.host == id
    }

    pub fn is_drawer(&self, id: &PlayerId) -> bool {
        self.game.current_drawer.as_ref() == Some(id)
    }

    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|player| player.id.clone()).collect()
    }

    pub fn member_ids_except(&self, except: &PlayerId) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|player| &player.id != except)
            .map(|player| player.id.clone())
            .collect()
    }

    /// 描き手以外のプレイヤー
    pub fn guessers(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|player| !self.is_drawer(&player.id))
    }

    /// 描き手以外が全員正解済みか（描き手以外が 1 人もいなければ false）
    pub fn all_guessers_guessed(&self) -> bool {
        let mut guessers = self.guessers().peekable();
        guessers.peek().is_some() && guessers.all(|player| player.guessed_correctly)
    }

    pub fn all_ready(&self, min_players: usize) -> bool {
        self.players.len() >= min_players && self.players.iter().all(|player| player.is_ready)
    }

    /// 参加可否を判定して追加する
    pub fn admit(&mut self, player: Player, max_players: usize) -> Result<(), MembershipError> {
        if self.closed {
            return Err(MembershipError::Closed);
        }
        if self.game.status != GameStatus::Waiting {
            return Err(MembershipError::AlreadyStarted);
        }
        if self.players.len() >= max_players {
            return Err(MembershipError::Full);
        }
        if self.is_member(&player.id) {
            return Err(MembershipError::AlreadyMember);
        }
        self.players.push(player);
        Ok(())
    }

    /// プレイヤーを取り除く
    ///
    /// ホストが抜けた場合は残りの先頭（参加順）をホストにする。
    /// 描き手の席番号は、抜けた席がそれ以前なら 1 つ詰める。
    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|player| &player.id == id)?;
        let removed = self.players.remove(index);

        if let Some(seat) = self.game.drawer_seat {
            self.game.drawer_seat = if index <= seat {
                seat.checked_sub(1)
            } else {
                Some(seat)
            };
        }

        if &self.host == id
            && let Some(next) = self.players.first()
        {
            self.host = next.id.clone();
        }

        Some(removed)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// 次の描き手の席番号（ラウンドロビン）
    pub fn next_drawer_seat(&self) -> Option<usize> {
        if self.players.is_empty() {
            return None;
        }
        Some(match self.game.drawer_seat {
            Some(seat) => (seat + 1) % self.players.len(),
            None => 0,
        })
    }

    /// スコア降順・同点は参加順の順位表
    pub fn standings(&self) -> Vec<&Player> {
        let mut standings: Vec<&Player> = self.players.iter().collect();
        standings.sort_by(|a, b| b.score.cmp(&a.score));
        standings
    }

    /// 順位表上の位置（0 始まり）
    pub fn rank_of(&self, id: &PlayerId) -> Option<usize> {
        self.standings().iter().position(|player| &player.id == id)
    }

    /// 2 人以上いるときの最下位か
    pub fn is_last_place(&self, id: &PlayerId) -> bool {
        let n = self.players.len();
        n >= 2 && self.rank_of(id) == Some(n - 1)
    }

    pub fn is_first_place(&self, id: &PlayerId) -> bool {
        self.rank_of(id) == Some(0)
    }

    /// 最高得点で並んだ全員
    pub fn winners(&self) -> Vec<&Player> {
        let Some(top) = self.players.iter().map(|player| player.score).max() else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|player| player.score == top)
            .collect()
    }

    /// リスタート時の初期化（ラウンド数・時間設定は維持）
    pub fn reset_for_new_game(&mut self) {
        for player in &mut self.players {
            player.reset_for_new_game();
        }
        self.global_cooldowns.clear();
        self.drawing_history.clear();
        self.game.clear_round();
        self.game.status = GameStatus::Waiting;
        self.game.round = 0;
        self.game.current_drawer = None;
        self.game.drawer_seat = None;
    }
}
