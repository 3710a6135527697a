//! Drawing relay rules
//!
//! ストロークの中身は解釈しない。座標の範囲チェック、種別チェック、
//! 履歴バッファの上限管理だけを行う。

use serde::{Deserialize, Serialize};

/// ストローク種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Draw,
    Move,
}

impl StrokeKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draw" => Some(StrokeKind::Draw),
            "move" => Some(StrokeKind::Move),
            _ => None,
        }
    }
}

/// キャンバスの許容範囲
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
    pub tolerance: f64,
}

impl CanvasBounds {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x.is_finite()
            && y.is_finite()
            && (-self.tolerance..=self.width + self.tolerance).contains(&x)
            && (-self.tolerance..=self.height + self.tolerance).contains(&y)
    }
}

/// 検証済みの描画イベント
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingEvent {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: StrokeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl DrawingEvent {
    /// 範囲外・未知の種別なら `None`
    pub fn validated(
        x: f64,
        y: f64,
        kind: &str,
        color: Option<String>,
        size: Option<u32>,
        bounds: &CanvasBounds,
    ) -> Option<Self> {
        let kind = StrokeKind::parse(kind)?;
        if !bounds.contains(x, y) {
            return None;
        }
        Some(Self {
            x,
            y,
            kind,
            color,
            size,
        })
    }
}

/// 履歴バッファに追記し、`cap` を超えたら新しい方から `keep` 件だけ残す
pub fn append_history(
    history: &mut Vec<DrawingEvent>,
    events: &[DrawingEvent],
    cap: usize,
    keep: usize,
) {
    history.extend_from_slice(events);
    if history.len() > cap {
        let excess = history.len() - keep.min(history.len());
        history.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: CanvasBounds = CanvasBounds {
        width: 800.0,
        height: 600.0,
        tolerance: 10.0,
    };

    fn event(x: f64) -> DrawingEvent {
        DrawingEvent {
            x,
            y: 0.0,
            kind: StrokeKind::Draw,
            color: None,
            size: None,
        }
    }

    #[test]
    fn test_events_within_tolerance_are_accepted() {
        // テスト項目: 許容範囲の境界ちょうどは受け入れられる
        // given (前提条件):
        let (x, y) = (810.0, -10.0);

        // when (操作):
        let result = DrawingEvent::validated(x, y, "move", None, None, &BOUNDS);

        // then (期待する結果):
        assert!(result.is_some());
    }

    #[test]
    fn test_out_of_bounds_and_unknown_kinds_are_rejected() {
        // テスト項目: 範囲外・非有限・未知の種別は弾かれる
        // given (前提条件) / when (操作):
        let outside = DrawingEvent::validated(811.0, 0.0, "draw", None, None, &BOUNDS);
        let nan = DrawingEvent::validated(f64::NAN, 0.0, "draw", None, None, &BOUNDS);
        let unknown = DrawingEvent::validated(0.0, 0.0, "erase", None, None, &BOUNDS);

        // then (期待する結果):
        assert!(outside.is_none());
        assert!(nan.is_none());
        assert!(unknown.is_none());
    }

    #[test]
    fn test_history_is_trimmed_to_newest_events() {
        // テスト項目: 上限を超えると新しい方から keep 件だけ残る
        // given (前提条件):
        let mut history: Vec<DrawingEvent> = (0..10).map(|i| event(i as f64)).collect();

        // when (操作):
        append_history(&mut history, &[event(10.0)], 10, 5);

        // then (期待する結果):
        assert_eq!(history.len(), 5);
        assert_eq!(history.first().unwrap().x, 6.0);
        assert_eq!(history.last().unwrap().x, 10.0);
    }

    #[test]
    fn test_history_under_cap_is_untouched() {
        // テスト項目: 上限以下なら何も捨てない
        // given (前提条件):
        let mut history = vec![event(0.0)];

        // when (操作):
        append_history(&mut history, &[event(1.0)], 10, 5);

        // then (期待する結果):
        assert_eq!(history.len(), 2);
    }
}
