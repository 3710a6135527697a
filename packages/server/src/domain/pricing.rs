//! Dynamic pricing
//!
//! 価格 = 基本価格 × clamp(順位補正 × 時間補正 × 対象補正, 0.5, 2.0)
//!
//! 補正はすべて整数の百分率で持ち、積・クランプ・四捨五入まで整数演算で行う。

use super::{
    entity::Room,
    error::{PowerupError, TargetRejection},
    powerup::PowerupKind,
    value_object::PlayerId,
};

/// 倍率の下限（百分率）
pub const MIN_MULTIPLIER_PCT: i64 = 50;
/// 倍率の上限（百分率）
pub const MAX_MULTIPLIER_PCT: i64 = 200;

const POSITION_PCTS: [i64; 5] = [120, 105, 100, 90, 80];
const LAST_PLACE_PCT: i64 = 75;

const EARLY_PCT: i64 = 133;
const MID_PCT: i64 = 100;
const LATE_PCT: i64 = 67;

const GRIEFING_PCT: i64 = 135;
const COMEBACK_PCT: i64 = 60;
const LEADER_PCT: i64 = 160;

/// 価格を構成する補正の内訳
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFactors {
    pub position_pct: i64,
    pub time_pct: i64,
    pub target_pcts: Vec<i64>,
}

impl PriceFactors {
    /// 補正を収集する
    pub fn collect(
        room: &Room,
        buyer: &PlayerId,
        kind: PowerupKind,
        target: Option<&PlayerId>,
        now: i64,
    ) -> Self {
        Self {
            position_pct: position_pct(room, buyer),
            time_pct: time_pct(room, now),
            target_pcts: target_pcts(room, buyer, kind, target),
        }
    }

    /// 基本価格に補正を掛けた最終価格
    pub fn apply(&self, base_price: i64) -> i64 {
        let factors = std::iter::once(self.position_pct)
            .chain(std::iter::once(self.time_pct))
            .chain(self.target_pcts.iter().copied());

        let mut numerator: i128 = 1;
        let mut denominator: i128 = 1;
        for pct in factors {
            numerator *= i128::from(pct);
            denominator *= 100;
        }

        // [50%, 200%] に収める
        let min = denominator * i128::from(MIN_MULTIPLIER_PCT);
        let max = denominator * i128::from(MAX_MULTIPLIER_PCT);
        let scaled = (numerator * 100).clamp(min, max);
        let denominator = denominator * 100;

        let base = i128::from(base_price.max(0));
        let rounded = (2 * base * scaled + denominator) / (2 * denominator);
        i64::try_from(rounded).unwrap_or(i64::MAX)
    }
}

fn position_pct(room: &Room, buyer: &PlayerId) -> i64 {
    if room.is_last_place(buyer) {
        return LAST_PLACE_PCT;
    }
    room.rank_of(buyer)
        .and_then(|rank| POSITION_PCTS.get(rank).copied())
        .unwrap_or(100)
}

fn time_pct(room: &Room, now: i64) -> i64 {
    if !room.game.is_drawing() {
        return 100;
    }
    let duration = i64::try_from(room.game.round_duration_ms).unwrap_or(i64::MAX);
    let Some(elapsed) = room.game.elapsed_ms(now) else {
        return 100;
    };
    if duration <= 0 {
        return LATE_PCT;
    }
    if elapsed * 3 < duration {
        EARLY_PCT
    } else if elapsed * 3 < duration * 2 {
        MID_PCT
    } else {
        LATE_PCT
    }
}

fn target_pcts(
    room: &Room,
    buyer: &PlayerId,
    kind: PowerupKind,
    target: Option<&PlayerId>,
) -> Vec<i64> {
    let Some(target) = target else {
        return Vec::new();
    };
    if !kind.is_competitive() {
        return Vec::new();
    }
    let mut pcts = Vec::new();
    if room.is_last_place(target) {
        pcts.push(GRIEFING_PCT);
    }
    if room.is_last_place(buyer) {
        pcts.push(COMEBACK_PCT);
    }
    if room.is_first_place(buyer) {
        pcts.push(LEADER_PCT);
    }
    pcts
}

/// 購入者と対象を検証して価格を計算する
pub fn quote(
    room: &Room,
    buyer: &PlayerId,
    kind: PowerupKind,
    target: Option<&PlayerId>,
    now: i64,
) -> Result<i64, PowerupError> {
    if !room.is_member(buyer) {
        return Err(PowerupError::PlayerNotFound);
    }
    if let Some(target) = target {
        if target == buyer {
            return Err(TargetRejection::SelfTarget.into());
        }
        if !room.is_member(target) {
            return Err(TargetRejection::NotMember.into());
        }
    }
    Ok(PriceFactors::collect(room, buyer, kind, target, now).apply(kind.spec().base_price))
}
