//! Scoring engine
//!
//! 正解 1 回分の得点計算と、全員正解（Perfect Round）の判定。
//! 得点はすべて整数で、四捨五入は 0.5 切り上げ。

use serde::Serialize;

use super::{
    entity::{Difficulty, Room},
    powerup::PowerupKind,
    value_object::PlayerId,
};

const LIGHTNING_MS: i64 = 5_000;
const QUICK_MS: i64 = 10_000;
const FAST_MS: i64 = 20_000;

const LIGHTNING_BONUS: i64 = 500;
const QUICK_BONUS: i64 = 300;
const FAST_BONUS: i64 = 150;
const FIRST_BLOOD_BONUS: i64 = 200;
const STREAK_STEP: i64 = 100;
const STREAK_CAP: i64 = 500;

pub const PERFECT_ROUND_GUESSER_BONUS: i64 = 300;
pub const PERFECT_ROUND_DRAWER_BONUS: i64 = 500;

/// 連続正解でもらえるパワーアップ
pub const STREAK_MILESTONE: u32 = 3;
/// 累計正解でもらえるパワーアップ
pub const TOTAL_CORRECT_MILESTONE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    Lightning,
    Quick,
    Fast,
    FirstBlood,
    Streak,
    Multiplier,
    SpeedCurse,
    PerfectRound,
}

/// 加点の内訳 1 行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bonus {
    pub kind: BonusKind,
    #[serde(rename = "type")]
    pub label: String,
    pub amount: i64,
}

impl Bonus {
    fn new(kind: BonusKind, label: impl Into<String>, amount: i64) -> Self {
        Self {
            kind,
            label: label.into(),
            amount,
        }
    }
}

/// 正解 1 回分の計算結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessScore {
    /// 難易度補正前の時間ベース得点
    pub base: i64,
    pub total: i64,
    pub bonuses: Vec<Bonus>,
    pub drawer: Option<PlayerId>,
    pub drawer_share: i64,
    /// このタイミングで付与されたパワーアップ
    pub milestones: Vec<PowerupKind>,
}

/// Perfect Round の付与結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfectRound {
    pub guessers: Vec<PlayerId>,
    pub drawer: Option<PlayerId>,
}

/// 得点計算の設定値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringEngine {
    pub min_score: i64,
    pub max_score: i64,
    /// 描き手の取り分（百分率）
    pub drawer_share_pct: i64,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self {
            min_score: 500,
            max_score: 1_000,
            drawer_share_pct: 50,
        }
    }
}

fn round_div(numerator: i64, denominator: i64) -> i64 {
    if denominator <= 0 {
        return 0;
    }
    (2 * numerator + denominator).div_euclid(2 * denominator)
}

impl ScoringEngine {
    /// 残り時間の割合から線形に決まる基本点
    pub fn base_score(&self, duration_ms: i64, elapsed_ms: i64) -> i64 {
        if duration_ms <= 0 {
            return self.min_score;
        }
        let remaining = (duration_ms - elapsed_ms).clamp(0, duration_ms);
        self.min_score + round_div((self.max_score - self.min_score) * remaining, duration_ms)
    }

    pub fn apply_difficulty(&self, base: i64, difficulty: Difficulty) -> i64 {
        round_div(base * difficulty.multiplier_pct(), 100)
    }

    fn speed_bonus(elapsed_ms: i64) -> Option<Bonus> {
        if elapsed_ms < LIGHTNING_MS {
            Some(Bonus::new(BonusKind::Lightning, "Lightning", LIGHTNING_BONUS))
        } else if elapsed_ms < QUICK_MS {
            Some(Bonus::new(BonusKind::Quick, "Quick", QUICK_BONUS))
        } else if elapsed_ms < FAST_MS {
            Some(Bonus::new(BonusKind::Fast, "Fast", FAST_BONUS))
        } else {
            None
        }
    }

    /// 正解者の得点を計算し、正解者と描き手のスコアに反映する
    ///
    /// ラウンドが始まっていない、または正解者がルームにいなければ `None`。
    pub fn score_guess(&self, room: &mut Room, guesser: &PlayerId, now: i64) -> Option<GuessScore> {
        let elapsed = room.game.elapsed_ms(now)?;
        if !room.is_member(guesser) {
            return None;
        }
        let duration = i64::try_from(room.game.round_duration_ms).unwrap_or(i64::MAX);
        let difficulty = room.game.word_difficulty.unwrap_or(Difficulty::Easy);

        let base = self.base_score(duration, elapsed);
        let mut total = self.apply_difficulty(base, difficulty);
        let mut bonuses = Vec::new();

        if let Some(bonus) = Self::speed_bonus(elapsed) {
            total += bonus.amount;
            bonuses.push(bonus);
        }

        if !room.game.first_blood_awarded {
            room.game.first_blood_awarded = true;
            total += FIRST_BLOOD_BONUS;
            bonuses.push(Bonus::new(
                BonusKind::FirstBlood,
                "First Blood",
                FIRST_BLOOD_BONUS,
            ));
        }
        room.game.guess_timestamps.insert(guesser.clone(), now);

        let player = room.player_mut(guesser)?;

        if player.current_streak > 0 {
            let amount = (i64::from(player.current_streak) * STREAK_STEP).min(STREAK_CAP);
            total += amount;
            bonuses.push(Bonus::new(
                BonusKind::Streak,
                format!("On Fire x{}", player.current_streak),
                amount,
            ));
        }

        if let Some(effect) = player.take_earliest_multiplier(now)
            && let Some(factor) = effect.kind.score_multiplier()
        {
            let gained = total * (factor - 1);
            total += gained;
            bonuses.push(Bonus::new(
                BonusKind::Multiplier,
                effect.kind.spec().name,
                gained,
            ));
        }

        if player.take_effect(PowerupKind::SpeedCurse, now).is_some() {
            let lost = total - total / 2;
            total -= lost;
            bonuses.push(Bonus::new(BonusKind::SpeedCurse, "Speed Curse", -lost));
        }
        let total = total.max(0);

        player.credit(total);
        player.guessed_correctly = true;
        player.current_streak += 1;
        player.max_streak = player.max_streak.max(player.current_streak);
        player.total_correct_guesses += 1;

        let mut milestones = Vec::new();
        if player.current_streak == STREAK_MILESTONE {
            milestones.push(PowerupKind::RevealLetter);
        }
        if player.total_correct_guesses == TOTAL_CORRECT_MILESTONE {
            milestones.push(PowerupKind::DoublePoints);
        }
        for kind in &milestones {
            player.grant(*kind);
        }

        let drawer_share = round_div(total * self.drawer_share_pct, 100);
        let drawer = room.game.current_drawer.clone();
        if let Some(drawer_id) = &drawer
            && drawer_id != guesser
            && let Some(drawer_player) = room.player_mut(drawer_id)
        {
            drawer_player.credit(drawer_share);
        }

        Some(GuessScore {
            base,
            total,
            bonuses,
            drawer,
            drawer_share,
            milestones,
        })
    }

    /// 描き手以外が全員正解していれば Perfect Round を 1 ラウンド 1 回だけ付与する
    pub fn award_perfect_round(&self, room: &mut Room) -> Option<PerfectRound> {
        if room.game.perfect_round_awarded || !room.all_guessers_guessed() {
            return None;
        }
        room.game.perfect_round_awarded = true;

        let drawer = room.game.current_drawer.clone();
        let mut guessers = Vec::new();
        for player in &mut room.players {
            if drawer.as_ref() == Some(&player.id) {
                player.credit(PERFECT_ROUND_DRAWER_BONUS);
            } else {
                player.credit(PERFECT_ROUND_GUESSER_BONUS);
                guessers.push(player.id.clone());
            }
        }

        Some(PerfectRound { guessers, drawer })
    }

    pub fn perfect_round_bonus(amount: i64) -> Bonus {
        Bonus::new(BonusKind::PerfectRound, "Perfect Round", amount)
    }
}
