//! TimerScheduler trait 定義
//!
//! タイマーは `(ルーム, 用途)` のキーごとに高々 1 つ。
//! 同じキーで登録し直すと前のタイマーは取り消される。

use std::{future::Future, pin::Pin, time::Duration};

use super::{entity::EffectSlot, value_object::RoomCode};

/// タイマーで実行する処理
pub type TimerTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// タイマーの用途
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    WordChoice,
    RoundEnd,
    Hint(usize),
    NextRound,
    EffectClear(EffectSlot),
}

impl TimerPurpose {
    pub fn is_effect(&self) -> bool {
        matches!(self, TimerPurpose::EffectClear(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub room: RoomCode,
    pub purpose: TimerPurpose,
}

impl TimerKey {
    pub fn new(room: RoomCode, purpose: TimerPurpose) -> Self {
        Self { room, purpose }
    }
}

/// タイマーの登録・取り消し
pub trait TimerScheduler: Send + Sync {
    /// `delay` 後に `task` を実行する。同じキーの既存タイマーは取り消す
    fn schedule(&self, key: TimerKey, delay: Duration, task: TimerTask);

    /// 取り消した場合は true
    fn cancel(&self, key: &TimerKey) -> bool;

    /// ルーム内で条件に合うタイマーをすべて取り消し、件数を返す
    fn cancel_where(&self, room: &RoomCode, filter: &dyn Fn(&TimerPurpose) -> bool) -> usize;

    /// ルーム内の待機中タイマー数
    fn pending(&self, room: &RoomCode) -> usize;

    fn cancel_room(&self, room: &RoomCode) -> usize {
        self.cancel_where(room, &|_| true)
    }
}
