//! Powerup catalog
//!
//! 13 種類のパワーアップの静的な定義（価格・対象・クールダウン・効果時間）。
//! 文字列 ID はワイヤ上の表現にのみ現れ、ドメイン内では常に `PowerupKind` を使う。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 効果を持たないパワーアップの「無制限」を表す使用回数上限
pub const UNLIMITED_USES_PER_ROUND: u32 = 999;

/// パワーアップの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerupKind {
    RevealLetter,
    WordLength,
    OracleHint,
    ExtraTime,
    StreakShield,
    DoublePoints,
    TriplePoints,
    SpeedCurse,
    TimeWarp,
    BrushSabotage,
    BlindSpot,
    CanvasChaos,
    PointSteal,
}

/// 誰が使えるか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsableBy {
    Drawer,
    Guesser,
    Either,
}

/// 効果の形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectShape {
    /// 即時のヒント公開
    Reveal,
    /// 自分（または対象）に付与される時限効果
    TimedSelf,
    /// ルーム全体・対象へのブロードキャストと自動解除タイマー
    TimedBroadcast,
    /// ラウンド締切の延長
    DeadlineExtension,
    /// 即時のポイント移動
    Transfer,
}

/// カタログの 1 行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerupSpec {
    pub name: &'static str,
    pub usable_by: UsableBy,
    pub base_price: i64,
    pub requires_target: bool,
    /// 効果時間（`ExtraTime` は延長量）
    pub effect_duration_ms: Option<u64>,
    pub personal_cooldown_ms: u64,
    pub global_cooldown_ms: u64,
    pub max_uses_per_round: u32,
    pub shape: EffectShape,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 13] = [
        PowerupKind::RevealLetter,
        PowerupKind::WordLength,
        PowerupKind::OracleHint,
        PowerupKind::ExtraTime,
        PowerupKind::StreakShield,
        PowerupKind::DoublePoints,
        PowerupKind::TriplePoints,
        PowerupKind::SpeedCurse,
        PowerupKind::TimeWarp,
        PowerupKind::BrushSabotage,
        PowerupKind::BlindSpot,
        PowerupKind::CanvasChaos,
        PowerupKind::PointSteal,
    ];

    pub const fn spec(self) -> PowerupSpec {
        use EffectShape::*;
        use UsableBy::*;

        const fn row(
            name: &'static str,
            usable_by: UsableBy,
            base_price: i64,
            requires_target: bool,
            effect_duration_ms: Option<u64>,
            personal_cooldown_ms: u64,
            global_cooldown_ms: u64,
            max_uses_per_round: u32,
            shape: EffectShape,
        ) -> PowerupSpec {
            PowerupSpec {
                name,
                usable_by,
                base_price,
                requires_target,
                effect_duration_ms,
                personal_cooldown_ms,
                global_cooldown_ms,
                max_uses_per_round,
                shape,
            }
        }

        match self {
            PowerupKind::RevealLetter => row(
                "Reveal Letter",
                Guesser,
                300,
                false,
                None,
                0,
                0,
                UNLIMITED_USES_PER_ROUND,
                Reveal,
            ),
            PowerupKind::WordLength => row(
                "Word Length",
                Guesser,
                200,
                false,
                None,
                0,
                0,
                UNLIMITED_USES_PER_ROUND,
                Reveal,
            ),
            PowerupKind::OracleHint => row(
                "Oracle Hint",
                Guesser,
                400,
                false,
                None,
                999_999,
                0,
                1,
                Reveal,
            ),
            PowerupKind::ExtraTime => row(
                "Extra Time",
                Drawer,
                400,
                false,
                Some(30_000),
                0,
                0,
                UNLIMITED_USES_PER_ROUND,
                DeadlineExtension,
            ),
            PowerupKind::StreakShield => row(
                "Streak Shield",
                Guesser,
                350,
                false,
                Some(120_000),
                0,
                0,
                UNLIMITED_USES_PER_ROUND,
                TimedSelf,
            ),
            PowerupKind::DoublePoints => row(
                "Double Points",
                Guesser,
                500,
                false,
                Some(120_000),
                0,
                0,
                UNLIMITED_USES_PER_ROUND,
                TimedSelf,
            ),
            PowerupKind::TriplePoints => row(
                "Triple Points",
                Guesser,
                700,
                false,
                Some(120_000),
                0,
                0,
                UNLIMITED_USES_PER_ROUND,
                TimedSelf,
            ),
            PowerupKind::SpeedCurse => row(
                "Speed Curse",
                Guesser,
                350,
                true,
                Some(120_000),
                60_000,
                0,
                3,
                TimedSelf,
            ),
            PowerupKind::TimeWarp => row(
                "Time Warp",
                Guesser,
                600,
                false,
                Some(15_000),
                45_000,
                30_000,
                2,
                TimedBroadcast,
            ),
            PowerupKind::BrushSabotage => row(
                "Brush Sabotage",
                Guesser,
                650,
                false,
                Some(15_000),
                90_000,
                45_000,
                2,
                TimedBroadcast,
            ),
            PowerupKind::BlindSpot => row(
                "Blind Spot",
                Guesser,
                550,
                true,
                Some(25_000),
                90_000,
                0,
                3,
                TimedBroadcast,
            ),
            PowerupKind::CanvasChaos => row(
                "Canvas Chaos",
                Guesser,
                400,
                true,
                Some(20_000),
                75_000,
                0,
                4,
                TimedBroadcast,
            ),
            PowerupKind::PointSteal => row(
                "Point Steal",
                Either,
                500,
                true,
                None,
                120_000,
                60_000,
                2,
                Transfer,
            ),
        }
    }

    /// ワイヤ上の ID
    pub const fn id(self) -> &'static str {
        match self {
            PowerupKind::RevealLetter => "reveal_letter",
            PowerupKind::WordLength => "word_length",
            PowerupKind::OracleHint => "oracle_hint",
            PowerupKind::ExtraTime => "extra_time",
            PowerupKind::StreakShield => "streak_shield",
            PowerupKind::DoublePoints => "double_points",
            PowerupKind::TriplePoints => "triple_points",
            PowerupKind::SpeedCurse => "speed_curse",
            PowerupKind::TimeWarp => "time_warp",
            PowerupKind::BrushSabotage => "brush_sabotage",
            PowerupKind::BlindSpot => "blind_spot",
            PowerupKind::CanvasChaos => "canvas_chaos",
            PowerupKind::PointSteal => "point_steal",
        }
    }

    /// 対象付きのときに順位補正が掛かる競争系パワーアップ
    pub const fn is_competitive(self) -> bool {
        matches!(
            self,
            PowerupKind::SpeedCurse
                | PowerupKind::BlindSpot
                | PowerupKind::CanvasChaos
                | PowerupKind::PointSteal
                | PowerupKind::BrushSabotage
        )
    }

    /// 描き手を対象にできるのは point_steal のみ
    pub const fn may_target_drawer(self) -> bool {
        matches!(self, PowerupKind::PointSteal)
    }

    /// `drawing` 中でなければ使えない種類
    pub const fn needs_active_round(self) -> bool {
        matches!(
            self,
            PowerupKind::RevealLetter
                | PowerupKind::WordLength
                | PowerupKind::OracleHint
                | PowerupKind::ExtraTime
                | PowerupKind::TimeWarp
                | PowerupKind::BrushSabotage
                | PowerupKind::BlindSpot
                | PowerupKind::CanvasChaos
        )
    }

    /// 倍率系（double / triple）の倍率
    pub const fn score_multiplier(self) -> Option<i64> {
        match self {
            PowerupKind::DoublePoints => Some(2),
            PowerupKind::TriplePoints => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for PowerupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_point_steal_may_target_drawer() {
        // テスト項目: 描き手を対象にできるのは point_steal だけ
        // given (前提条件):
        let kinds = PowerupKind::ALL;

        // when (操作):
        let allowed: Vec<_> = kinds.iter().filter(|k| k.may_target_drawer()).collect();

        // then (期待する結果):
        assert_eq!(allowed, vec![&PowerupKind::PointSteal]);
    }

    #[test]
    fn test_targeted_kinds_match_catalog() {
        // テスト項目: 対象必須の種類はカタログ通り 4 種
        // given (前提条件):
        let kinds = PowerupKind::ALL;

        // when (操作):
        let targeted: Vec<_> = kinds
            .iter()
            .copied()
            .filter(|k| k.spec().requires_target)
            .collect();

        // then (期待する結果):
        assert_eq!(
            targeted,
            vec![
                PowerupKind::SpeedCurse,
                PowerupKind::BlindSpot,
                PowerupKind::CanvasChaos,
                PowerupKind::PointSteal,
            ]
        );
    }

    #[test]
    fn test_wire_id_matches_serde_representation() {
        // テスト項目: id() と serde の表現が一致する
        // given (前提条件):
        let kinds = PowerupKind::ALL;

        // when (操作) / then (期待する結果):
        for kind in kinds {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.id()));
        }
    }

    #[test]
    fn test_drawer_only_and_either_kinds() {
        // テスト項目: 描き手専用は extra_time、両方使えるのは point_steal
        // given (前提条件):
        let kinds = PowerupKind::ALL;

        // when (操作):
        let drawer: Vec<_> = kinds
            .iter()
            .filter(|k| k.spec().usable_by == UsableBy::Drawer)
            .collect();
        let either: Vec<_> = kinds
            .iter()
            .filter(|k| k.spec().usable_by == UsableBy::Either)
            .collect();

        // then (期待する結果):
        assert_eq!(drawer, vec![&PowerupKind::ExtraTime]);
        assert_eq!(either, vec![&PowerupKind::PointSteal]);
    }
}
