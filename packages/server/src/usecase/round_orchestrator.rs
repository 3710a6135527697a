//! UseCase: ラウンド進行（状態機械）
//!
//! `waiting → choosing → drawing → (choosing | ended)` と、`restart` による `waiting` への復帰。
//!
//! ## 設計ノート
//!
//! - 状態遷移はすべてルームのロックを取った状態で同期的に行い、通知は Outbox に積む。
//!   ロックを外してから配信する。
//! - タイマーは `(ルーム, 用途)` のキーで登録し、遷移のたびに世代番号（epoch）を進める。
//!   発火したタイマーは登録時の世代と一致しなければ何もしない。
//! - タイマー処理で panic が起きた場合はそのルームだけを閉じる。

use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};

use doodlerush_shared::time::Clock;
use futures_util::FutureExt;
use rand::seq::SliceRandom;

use crate::{
    config::GameConfig,
    domain::{
        GameSnapshot, GameStatus, GuessOutcome, MessagePusher, Outbox, PlayerId, PowerupKind,
        Room, RoomCode, RoomRepository, ScoreLine, ScoringEngine, ServerEvent, SharedRoom,
        TimerKey, TimerPurpose, TimerScheduler, TimerTask, WordChoice,
        economy::{self, EffectTimer},
        guess::MASKED_GUESS,
        match_guess,
        scoring::{PERFECT_ROUND_DRAWER_BONUS, PERFECT_ROUND_GUESSER_BONUS},
        words,
    },
};

use super::{dispatch::publish, error::GameCommandError};

/// ラウンド進行のユースケース
pub struct RoundOrchestrator {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// TimerScheduler（タイマーの抽象化）
    scheduler: Arc<dyn TimerScheduler>,
    clock: Arc<dyn Clock>,
    config: Arc<GameConfig>,
    scoring: ScoringEngine,
}

fn random_choice(options: &[WordChoice]) -> Option<WordChoice> {
    options.choose(&mut rand::thread_rng()).cloned()
}

fn reveal_letter(word: &str, display: &str) -> Option<String> {
    words::reveal_random(word, display, &mut rand::thread_rng())
}

fn score_table(room: &Room) -> Vec<ScoreLine> {
    room.standings().into_iter().map(ScoreLine::from).collect()
}

impl RoundOrchestrator {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        scheduler: Arc<dyn TimerScheduler>,
        clock: Arc<dyn Clock>,
        config: Arc<GameConfig>,
    ) -> Self {
        let scoring = config.scoring();
        Self {
            repository,
            message_pusher,
            scheduler,
            clock,
            config,
            scoring,
        }
    }

    async fn locate(&self, player: &PlayerId) -> Result<(RoomCode, SharedRoom), GameCommandError> {
        self.repository
            .room_of(player)
            .await
            .ok_or(GameCommandError::NotInRoom)
    }

    fn players_updated(&self, room: &Room) -> ServerEvent {
        ServerEvent::players_updated(room, self.config.min_players, self.clock.now_millis())
    }

    // ========================================
    // Inbound commands
    // ========================================

    /// ゲームを開始する（ホストのみ）
    pub async fn start_game(
        self: &Arc<Self>,
        host: &PlayerId,
        rounds: Option<u32>,
        round_duration_ms: Option<u64>,
    ) -> Result<(), GameCommandError> {
        let (code, shared) = self.locate(host).await?;
        let outbox = {
            let mut room = shared.lock().await;
            if room.closed || !room.is_member(host) {
                return Err(GameCommandError::NotInRoom);
            }
            room.touch(self.clock.now_millis());
            if !room.is_host(host) {
                return Err(GameCommandError::NotHost);
            }
            if room.game.status != GameStatus::Waiting {
                return Err(GameCommandError::InvalidPhase(room.game.status));
            }
            let rounds = rounds.unwrap_or(self.config.default_rounds);
            if rounds == 0 || rounds > self.config.max_rounds {
                return Err(GameCommandError::InvalidRounds {
                    max: self.config.max_rounds,
                });
            }
            let duration = round_duration_ms.unwrap_or(self.config.default_round_duration_ms);
            if !self.config.allowed_round_durations_ms.contains(&duration) {
                return Err(GameCommandError::InvalidDuration(duration));
            }
            if room.players.len() < self.config.min_players {
                return Err(GameCommandError::NotEnoughPlayers {
                    required: self.config.min_players,
                    present: room.players.len(),
                });
            }

            room.game.max_rounds = rounds;
            room.game.round_duration_ms = duration;
            room.game.round = 1;
            room.game.drawer_seat = None;
            for player in &mut room.players {
                player.score = 0;
                player.guessed_correctly = false;
            }

            let mut outbox = Outbox::new();
            outbox.room(
                &room,
                ServerEvent::GameStarted {
                    max_rounds: rounds,
                    round_duration_ms: duration,
                },
            );
            outbox.append(self.begin_round(&mut room));
            tracing::info!(
                "Game started in room '{}' ({} rounds, {} ms)",
                code,
                rounds,
                duration
            );
            outbox
        };
        publish(self.message_pusher.as_ref(), outbox).await;
        Ok(())
    }

    /// ゲームを待機状態に戻す（ホストのみ）
    ///
    /// ラウンド数と時間の設定は維持し、スコア・連続正解・所持品・クールダウン・描画履歴を消す。
    pub async fn restart_game(self: &Arc<Self>, host: &PlayerId) -> Result<(), GameCommandError> {
        let (code, shared) = self.locate(host).await?;
        let outbox = {
            let mut room = shared.lock().await;
            if room.closed || !room.is_member(host) {
                return Err(GameCommandError::NotInRoom);
            }
            room.touch(self.clock.now_millis());
            if !room.is_host(host) {
                return Err(GameCommandError::NotHost);
            }

            self.scheduler.cancel_room(&code);
            let mut outbox = economy::clear_all_effects(&mut room);
            room.reset_for_new_game();
            room.game.advance_epoch();

            outbox.room(
                &room,
                ServerEvent::GameRestarted {
                    players: room.players.clone(),
                    game: GameSnapshot::from(&*room),
                },
            );
            outbox.room(&room, self.players_updated(&room));
            tracing::info!("Game restarted in room '{}'", code);
            outbox
        };
        publish(self.message_pusher.as_ref(), outbox).await;
        Ok(())
    }

    /// 描き手がお題を選ぶ
    pub async fn select_word(
        self: &Arc<Self>,
        drawer: &PlayerId,
        word: &str,
    ) -> Result<(), GameCommandError> {
        let (_, shared) = self.locate(drawer).await?;
        let outbox = {
            let mut room = shared.lock().await;
            if room.closed || !room.is_member(drawer) {
                return Err(GameCommandError::NotInRoom);
            }
            let now = self.clock.now_millis();
            room.touch(now);
            if !room.is_drawer(drawer) {
                return Err(GameCommandError::NotDrawer);
            }
            if room.game.status != GameStatus::Choosing {
                return Err(GameCommandError::InvalidPhase(room.game.status));
            }
            let choice = room
                .game
                .word_options
                .iter()
                .find(|choice| choice.word == word)
                .cloned()
                .ok_or(GameCommandError::WordNotOffered)?;
            self.apply_word(&mut room, drawer, choice, now)
        };
        publish(self.message_pusher.as_ref(), outbox).await;
        Ok(())
    }

    /// チャット（描画中の回答者のメッセージは回答として扱う）
    ///
    /// 空のメッセージと長すぎるメッセージは黙って捨てる。
    /// 回答の回数に上限はない。
    pub async fn handle_chat(
        self: &Arc<Self>,
        sender: &PlayerId,
        text: &str,
    ) -> Result<(), GameCommandError> {
        let text = text.trim();
        if text.is_empty() || text.chars().count() > self.config.max_chat_len {
            tracing::debug!("Dropped chat message from '{}'", sender);
            return Ok(());
        }

        let (_, shared) = self.locate(sender).await?;
        let outbox = {
            let mut room = shared.lock().await;
            if room.closed {
                return Err(GameCommandError::NotInRoom);
            }
            let now = self.clock.now_millis();
            room.touch(now);
            let Some(player) = room.player(sender) else {
                return Err(GameCommandError::NotInRoom);
            };
            let player_name = player.name.to_string();
            let already_guessed = player.guessed_correctly;
            let chat = |message: &str, is_correct: bool| ServerEvent::ChatReceived {
                player_id: sender.clone(),
                player_name: player_name.clone(),
                message: message.to_string(),
                is_correct,
                timestamp: now,
            };

            let mut outbox = Outbox::new();
            let secret = room.game.current_word.clone();
            match secret {
                Some(secret) if room.game.is_drawing() && !room.is_drawer(sender) => {
                    if already_guessed {
                        // 正解済みの回答者は描き手と正解済みの人にだけ見える
                        let targets = room
                            .players
                            .iter()
                            .filter(|p| p.guessed_correctly || room.is_drawer(&p.id))
                            .map(|p| p.id.clone())
                            .collect();
                        outbox.to_many(targets, chat(text, false));
                    } else {
                        match match_guess(text, &secret) {
                            GuessOutcome::Exact => {
                                let announcement = format!("{} guessed the word!", player_name);
                                outbox.room_except(&room, sender, chat(&announcement, true));
                                outbox.append(self.correct_guess(&mut room, sender, now));
                            }
                            GuessOutcome::Close => {
                                outbox.to(sender, chat(text, false));
                                outbox.to(
                                    sender,
                                    ServerEvent::GuessClose {
                                        message: format!("'{}' is close!", text),
                                    },
                                );
                                outbox.room_except(&room, sender, chat(MASKED_GUESS, false));
                            }
                            GuessOutcome::NoMatch => {
                                outbox.to(sender, chat(text, false));
                                outbox.room_except(&room, sender, chat(MASKED_GUESS, false));
                            }
                        }
                    }
                }
                _ => outbox.room(&room, chat(text, false)),
            }
            outbox
        };
        publish(self.message_pusher.as_ref(), outbox).await;
        Ok(())
    }

    // ========================================
    // Transitions (ルームのロック内で呼ぶ)
    // ========================================

    /// 次のラウンドを始める: 描き手の交代とお題候補の提示
    fn begin_round(self: &Arc<Self>, room: &mut Room) -> Outbox {
        let mut outbox = Outbox::new();
        self.scheduler.cancel_room(&room.code);
        outbox.append(economy::clear_all_effects(room));

        let Some(seat) = room.next_drawer_seat() else {
            return outbox;
        };
        let Some(drawer) = room.players.get(seat) else {
            return outbox;
        };
        let drawer_id = drawer.id.clone();
        let drawer_name = drawer.name.to_string();

        room.game.clear_round();
        room.game.status = GameStatus::Choosing;
        room.game.drawer_seat = Some(seat);
        room.game.current_drawer = Some(drawer_id.clone());
        for player in &mut room.players {
            player.guessed_correctly = false;
        }
        economy::reset_round_usage(room);

        let options = words::word_options(&mut rand::thread_rng());
        room.game.word_options = options.clone();
        let epoch = room.game.advance_epoch();

        outbox.to(
            &drawer_id,
            ServerEvent::RoundStartDrawer {
                round: room.game.round,
                max_rounds: room.game.max_rounds,
                word_options: options,
                choice_timeout_ms: self.config.word_choice_timeout_ms,
            },
        );
        outbox.room_except(
            room,
            &drawer_id,
            ServerEvent::RoundStartGuesser {
                round: room.game.round,
                max_rounds: room.game.max_rounds,
                drawer_id: drawer_id.clone(),
                drawer_name: drawer_name.clone(),
            },
        );
        outbox.room(room, self.players_updated(room));

        self.schedule(
            &room.code,
            TimerPurpose::WordChoice,
            self.config.word_choice_timeout_ms,
            epoch,
        );
        tracing::info!(
            "Round {}/{} started in room '{}' (drawer '{}')",
            room.game.round,
            room.game.max_rounds,
            room.code,
            drawer_name
        );
        outbox
    }

    /// お題を確定して描画フェーズに入る
    fn apply_word(
        self: &Arc<Self>,
        room: &mut Room,
        drawer: &PlayerId,
        choice: WordChoice,
        now: i64,
    ) -> Outbox {
        let mut outbox = Outbox::new();
        self.scheduler
            .cancel(&TimerKey::new(room.code.clone(), TimerPurpose::WordChoice));

        let duration = room.game.round_duration_ms;
        let deadline = now + i64::try_from(duration).unwrap_or(i64::MAX - now);
        let display = words::mask(&choice.word);

        room.game.status = GameStatus::Drawing;
        room.game.current_word = Some(choice.word.clone());
        room.game.display_word = Some(display.clone());
        room.game.word_difficulty = Some(choice.difficulty);
        room.game.round_started_at = Some(now);
        room.game.round_deadline = Some(deadline);
        room.game.word_options.clear();
        room.drawing_history.clear();
        let epoch = room.game.advance_epoch();

        outbox.room(room, ServerEvent::DrawingCleared);
        outbox.to(
            drawer,
            ServerEvent::WordSelected {
                display_word: display.clone(),
                difficulty: choice.difficulty,
                round_duration_ms: duration,
                round_deadline: Some(deadline),
                word: Some(choice.word.clone()),
            },
        );
        outbox.room_except(
            room,
            drawer,
            ServerEvent::WordSelected {
                display_word: display,
                difficulty: choice.difficulty,
                round_duration_ms: duration,
                round_deadline: Some(deadline),
                word: None,
            },
        );

        for (index, offset) in self.config.hint_offsets_ms.iter().enumerate() {
            if *offset < duration {
                self.schedule(&room.code, TimerPurpose::Hint(index), *offset, epoch);
            }
        }
        self.schedule(&room.code, TimerPurpose::RoundEnd, duration, epoch);
        tracing::info!(
            "Word selected in room '{}' ({:?}, {} ms)",
            room.code,
            choice.difficulty,
            duration
        );
        outbox
    }

    /// 正解時の得点処理。全員正解なら Perfect Round を付与してラウンドを終える
    fn correct_guess(self: &Arc<Self>, room: &mut Room, guesser: &PlayerId, now: i64) -> Outbox {
        let mut outbox = Outbox::new();
        let Some(score) = self.scoring.score_guess(room, guesser, now) else {
            return outbox;
        };
        let player_name = room
            .player(guesser)
            .map(|player| player.name.to_string())
            .unwrap_or_default();

        outbox.to(
            guesser,
            ServerEvent::GuessCorrect {
                player_id: guesser.clone(),
                player_name: player_name.clone(),
            },
        );
        if !score.bonuses.is_empty() {
            outbox.to(
                guesser,
                ServerEvent::BonusAwarded {
                    bonuses: score.bonuses.clone(),
                    base_score: score.base,
                    total_score: score.total,
                },
            );
        }
        for kind in &score.milestones {
            outbox.to(
                guesser,
                ServerEvent::PowerupAwarded {
                    powerup_id: *kind,
                    name: kind.spec().name.to_string(),
                },
            );
        }
        outbox.room(room, self.players_updated(room));
        tracing::info!(
            "Player '{}' guessed correctly in room '{}' (+{}, drawer +{})",
            player_name,
            room.code,
            score.total,
            score.drawer_share
        );

        if let Some(perfect) = self.scoring.award_perfect_round(room) {
            let guesser_bonus = ScoringEngine::perfect_round_bonus(PERFECT_ROUND_GUESSER_BONUS);
            for id in &perfect.guessers {
                outbox.to(
                    id,
                    ServerEvent::BonusAwarded {
                        bonuses: vec![guesser_bonus.clone()],
                        base_score: 0,
                        total_score: PERFECT_ROUND_GUESSER_BONUS,
                    },
                );
            }
            if let Some(drawer) = perfect.drawer.as_ref().filter(|id| room.is_member(id)) {
                outbox.to(
                    drawer,
                    ServerEvent::BonusAwarded {
                        bonuses: vec![ScoringEngine::perfect_round_bonus(
                            PERFECT_ROUND_DRAWER_BONUS,
                        )],
                        base_score: 0,
                        total_score: PERFECT_ROUND_DRAWER_BONUS,
                    },
                );
            }
            outbox.room(room, self.players_updated(room));
            tracing::info!("Perfect round in room '{}', ending round early", room.code);
            outbox.append(self.end_round(room));
        }
        outbox
    }

    /// ラウンドを終える
    ///
    /// 未正解の回答者は連続正解が途切れる（ストリークシールドがあれば 1 回だけ守られる）。
    /// お題は公開した後に消し、最終ラウンドでなければ次のラウンドを予約する。
    fn end_round(self: &Arc<Self>, room: &mut Room) -> Outbox {
        self.scheduler.cancel_room(&room.code);
        let mut outbox = economy::clear_all_effects(room);
        let now = self.clock.now_millis();

        let drawer = room.game.current_drawer.clone();
        for player in &mut room.players {
            if drawer.as_ref() == Some(&player.id) || player.guessed_correctly {
                continue;
            }
            if player.take_effect(PowerupKind::StreakShield, now).is_some() {
                tracing::debug!(
                    "Streak shield kept {}x streak of '{}'",
                    player.current_streak,
                    player.name
                );
            } else {
                player.current_streak = 0;
            }
        }

        let word = room.game.current_word.clone().unwrap_or_default();
        let scores = score_table(room);
        let final_round = room.game.round >= room.game.max_rounds;
        room.game.clear_round();
        tracing::info!(
            "Round {}/{} ended in room '{}'",
            room.game.round,
            room.game.max_rounds,
            room.code
        );

        if final_round {
            outbox.room(
                room,
                ServerEvent::RoundEnded {
                    word,
                    scores,
                    next_round_in_ms: None,
                },
            );
            outbox.append(self.end_game(room));
        } else {
            let delay = self.config.inter_round_delay_ms;
            room.game.round += 1;
            room.game.status = GameStatus::Choosing;
            room.game.between_rounds = true;
            let epoch = room.game.advance_epoch();
            outbox.room(
                room,
                ServerEvent::RoundEnded {
                    word,
                    scores,
                    next_round_in_ms: Some(delay),
                },
            );
            self.schedule(&room.code, TimerPurpose::NextRound, delay, epoch);
        }
        outbox
    }

    /// ゲームを終えて勝者（最高得点で並んだ全員）を発表する
    fn end_game(&self, room: &mut Room) -> Outbox {
        self.scheduler.cancel_room(&room.code);
        let mut outbox = economy::clear_all_effects(room);
        room.game.clear_round();
        room.game.status = GameStatus::Ended;
        room.game.current_drawer = None;
        room.game.advance_epoch();

        let winners: Vec<ScoreLine> = room.winners().into_iter().map(ScoreLine::from).collect();
        outbox.room(
            room,
            ServerEvent::GameEnded {
                winners,
                final_scores: score_table(room),
            },
        );
        tracing::info!("Game ended in room '{}'", room.code);
        outbox
    }

    /// 退出後の進行調整（退出したプレイヤーは取り除き済み）
    pub(crate) fn handle_departure(
        self: &Arc<Self>,
        room: &mut Room,
        leaver: &PlayerId,
        was_drawer: bool,
    ) -> Outbox {
        if !room.game.in_progress() {
            return Outbox::new();
        }
        if room.players.len() < self.config.min_players {
            tracing::info!(
                "Not enough players left in room '{}', ending game",
                room.code
            );
            return self.end_game(room);
        }

        if was_drawer {
            if room.game.between_rounds {
                room.game.current_drawer = None;
                return Outbox::new();
            }
            tracing::info!("Drawer '{}' left room '{}', ending round", leaver, room.code);
            return self.end_round(room);
        }
        if room.game.is_drawing() && room.all_guessers_guessed() {
            tracing::info!(
                "All remaining guessers have guessed in room '{}', ending round",
                room.code
            );
            return self.end_round(room);
        }
        Outbox::new()
    }

    /// 締切が延びたのでラウンド終了タイマーを登録し直す
    pub(crate) fn extend_round(self: &Arc<Self>, room: &Room, deadline: i64, now: i64) {
        if !room.game.is_drawing() {
            return;
        }
        let remaining = u64::try_from(deadline - now).unwrap_or(0);
        self.schedule(
            &room.code,
            TimerPurpose::RoundEnd,
            remaining,
            room.game.epoch,
        );
        tracing::debug!(
            "Round end in room '{}' moved to {} ms from now",
            room.code,
            remaining
        );
    }

    /// 時限効果の自動解除を予約する
    pub(crate) fn schedule_effect_clear(self: &Arc<Self>, room: &Room, timer: EffectTimer) {
        self.schedule(
            &room.code,
            TimerPurpose::EffectClear(timer.slot),
            timer.delay_ms,
            room.game.epoch,
        );
    }

    // ========================================
    // Timers
    // ========================================

    fn schedule(self: &Arc<Self>, code: &RoomCode, purpose: TimerPurpose, delay_ms: u64, epoch: u64) {
        let this = Arc::clone(self);
        let task_code = code.clone();
        let task_purpose = purpose.clone();
        let task: TimerTask = Box::pin(async move {
            let outcome = AssertUnwindSafe(this.run_timer(&task_code, &task_purpose, epoch))
                .catch_unwind()
                .await;
            if outcome.is_err() {
                tracing::error!(
                    "Timer {:?} panicked in room '{}', closing room",
                    task_purpose,
                    task_code
                );
                this.close_room(&task_code, "internal error").await;
            }
        });
        self.scheduler.schedule(
            TimerKey::new(code.clone(), purpose),
            Duration::from_millis(delay_ms),
            task,
        );
    }

    async fn run_timer(self: &Arc<Self>, code: &RoomCode, purpose: &TimerPurpose, epoch: u64) {
        let Some(shared) = self.repository.get_room(code).await else {
            return;
        };
        let outbox = {
            let mut room = shared.lock().await;
            if room.closed || room.game.epoch != epoch {
                tracing::debug!("Stale timer {:?} ignored in room '{}'", purpose, code);
                return;
            }
            match purpose {
                TimerPurpose::WordChoice => self.auto_select_word(&mut room),
                TimerPurpose::Hint(index) => {
                    match room.game.pause_remaining_ms(self.clock.now_millis()) {
                        Some(wait) => {
                            // 時間停止中のヒントは停止明けまで遅らせる
                            self.schedule(code, TimerPurpose::Hint(*index), wait, epoch);
                            Outbox::new()
                        }
                        None => Self::reveal_hint(&mut room),
                    }
                }
                TimerPurpose::RoundEnd if room.game.is_drawing() => {
                    tracing::info!("Round timer expired in room '{}'", code);
                    self.end_round(&mut room)
                }
                TimerPurpose::NextRound if room.game.status == GameStatus::Choosing => {
                    self.begin_round(&mut room)
                }
                TimerPurpose::EffectClear(slot) => economy::clear_effect(&mut room, slot),
                _ => Outbox::new(),
            }
        };
        publish(self.message_pusher.as_ref(), outbox).await;
    }

    /// 描き手が選ばなかったので候補からランダムに決める
    fn auto_select_word(self: &Arc<Self>, room: &mut Room) -> Outbox {
        if room.game.status != GameStatus::Choosing {
            return Outbox::new();
        }
        let Some(drawer) = room.game.current_drawer.clone() else {
            return Outbox::new();
        };
        let Some(choice) = random_choice(&room.game.word_options) else {
            return Outbox::new();
        };
        tracing::info!("Word auto-selected in room '{}'", room.code);
        let now = self.clock.now_millis();
        self.apply_word(room, &drawer, choice, now)
    }

    fn reveal_hint(room: &mut Room) -> Outbox {
        let mut outbox = Outbox::new();
        if !room.game.is_drawing() {
            return outbox;
        }
        let (Some(word), Some(display)) = (&room.game.current_word, &room.game.display_word)
        else {
            return outbox;
        };
        let Some(revealed) = reveal_letter(word, display) else {
            return outbox;
        };
        room.game.display_word = Some(revealed.clone());
        outbox.room(
            room,
            ServerEvent::HintRevealed {
                display_word: revealed,
            },
        );
        outbox
    }

    // ========================================
    // Isolation
    // ========================================

    /// ルームを閉じる: タイマーの取り消し、参加者への通知、索引の解放
    pub async fn close_room(&self, code: &RoomCode, reason: &str) {
        let Some(shared) = self.repository.remove_room(code).await else {
            return;
        };
        self.scheduler.cancel_room(code);
        let members = {
            let mut room = shared.lock().await;
            room.closed = true;
            room.member_ids()
        };
        for member in &members {
            self.repository.unbind_player(member).await;
        }
        tracing::info!("Room '{}' closed ({})", code, reason);
        if members.is_empty() {
            return;
        }
        if let Err(e) = self
            .message_pusher
            .broadcast(
                members,
                &ServerEvent::RoomClosed {
                    room_code: code.clone(),
                    reason: reason.to_string(),
                },
            )
            .await
        {
            tracing::warn!("Failed to notify room closure: {}", e);
        }
    }

    /// プレイヤーの所属ルームを閉じる（コマンド処理中の panic 用）
    pub async fn close_room_of(&self, player: &PlayerId, reason: &str) {
        if let Some(code) = self.repository.room_code_of(player).await {
            self.close_room(&code, reason).await;
        }
    }
}
