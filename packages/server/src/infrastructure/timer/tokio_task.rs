//! tokio を使った TimerScheduler 実装
//!
//! キーごとに `JoinHandle` を 1 つ持ち、取り消しは `abort` で行う。
//! 発火したタスクは、自分の登録がまだ残っているとき（世代番号が一致するとき）だけ
//! 登録を外してから処理を実行する。

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::task::JoinHandle;

use crate::domain::{RoomCode, TimerKey, TimerPurpose, TimerScheduler, TimerTask};

struct Entry {
    id: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    timers: Mutex<HashMap<TimerKey, Entry>>,
}

impl Inner {
    fn timers(&self) -> MutexGuard<'_, HashMap<TimerKey, Entry>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 自分の登録が残っていれば外して true
    fn claim(&self, key: &TimerKey, id: u64) -> bool {
        let mut timers = self.timers();
        match timers.get(key) {
            Some(entry) if entry.id == id => {
                timers.remove(key);
                true
            }
            _ => false,
        }
    }
}

/// tokio のタスクで動く TimerScheduler
#[derive(Clone, Default)]
pub struct TokioTimerScheduler {
    inner: Arc<Inner>,
}

impl TokioTimerScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerScheduler for TokioTimerScheduler {
    fn schedule(&self, key: TimerKey, delay: Duration, task: TimerTask) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();

        let mut timers = self.inner.timers();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.claim(&task_key, id) {
                tracing::debug!(
                    "Timer {:?} fired for room '{}'",
                    task_key.purpose,
                    task_key.room
                );
                task.await;
            }
        });
        if let Some(previous) = timers.insert(key, Entry { id, handle }) {
            previous.handle.abort();
        }
    }

    fn cancel(&self, key: &TimerKey) -> bool {
        match self.inner.timers().remove(key) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    fn cancel_where(&self, room: &RoomCode, filter: &dyn Fn(&TimerPurpose) -> bool) -> usize {
        let mut timers = self.inner.timers();
        let keys: Vec<TimerKey> = timers
            .keys()
            .filter(|key| &key.room == room && filter(&key.purpose))
            .cloned()
            .collect();
        for key in &keys {
            if let Some(entry) = timers.remove(key) {
                entry.handle.abort();
            }
        }
        if !keys.is_empty() {
            tracing::debug!("Cancelled {} timer(s) for room '{}'", keys.len(), room);
        }
        keys.len()
    }

    fn pending(&self, room: &RoomCode) -> usize {
        self.inner
            .timers()
            .keys()
            .filter(|key| &key.room == room)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EffectSlot;
    use std::sync::atomic::AtomicUsize;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 指定時間後の発火、取り消し、同じキーでの登録し直し
    // - ルーム単位・用途単位の一括取り消し
    //
    // 【なぜこのテストが必要か】
    // - 古いタイマーが新しいラウンドに割り込むと得点や状態が壊れる
    // - (ルーム, 用途) ごとに生きているタイマーは高々 1 つでなければならない
    //
    // 【どのような状況を想定しているか】
    // - tokio の時間を止めた状態（start_paused）で advance して発火を制御する
    // ========================================

    fn room(code: &str) -> RoomCode {
        RoomCode::parse(code).unwrap()
    }

    fn counter_task(counter: &Arc<AtomicUsize>) -> TimerTask {
        let counter = Arc::clone(counter);
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        // テスト項目: 指定時間が経つと 1 回だけ実行され、登録が外れる
        // given (前提条件):
        let scheduler = TokioTimerScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TimerKey::new(room("ABCD"), TimerPurpose::RoundEnd);
        scheduler.schedule(key.clone(), Duration::from_millis(1_000), counter_task(&counter));

        // when (操作):
        tokio::time::advance(Duration::from_millis(999)).await;
        settle().await;
        let before = counter.load(Ordering::SeqCst);
        tokio::time::advance(Duration::from_millis(2)).await;
        settle().await;

        // then (期待する結果):
        assert_eq!(before, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(&key.room), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        // テスト項目: 取り消したタイマーは実行されない
        // given (前提条件):
        let scheduler = TokioTimerScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TimerKey::new(room("ABCD"), TimerPurpose::WordChoice);
        scheduler.schedule(key.clone(), Duration::from_millis(500), counter_task(&counter));

        // when (操作):
        let cancelled = scheduler.cancel(&key);
        tokio::time::advance(Duration::from_millis(1_000)).await;
        settle().await;

        // then (期待する結果):
        assert!(cancelled);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!scheduler.cancel(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescheduling_replaces_previous_timer() {
        // テスト項目: 同じキーで登録し直すと前のタイマーは実行されない
        // given (前提条件):
        let scheduler = TokioTimerScheduler::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let key = TimerKey::new(room("ABCD"), TimerPurpose::RoundEnd);
        scheduler.schedule(key.clone(), Duration::from_millis(1_000), counter_task(&first));

        // when (操作):
        scheduler.schedule(key.clone(), Duration::from_millis(3_000), counter_task(&second));
        tokio::time::advance(Duration::from_millis(1_500)).await;
        settle().await;
        let second_early = second.load(Ordering::SeqCst);
        tokio::time::advance(Duration::from_millis(2_000)).await;
        settle().await;

        // then (期待する結果):
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second_early, 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(&room("ABCD")), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_where_only_touches_matching_room_and_purpose() {
        // テスト項目: 一括取り消しは対象ルーム・対象用途のタイマーだけを外す
        // given (前提条件):
        let scheduler = TokioTimerScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let abcd = room("ABCD");
        let wxyz = room("WXYZ");
        scheduler.schedule(
            TimerKey::new(abcd.clone(), TimerPurpose::RoundEnd),
            Duration::from_millis(100),
            counter_task(&counter),
        );
        scheduler.schedule(
            TimerKey::new(abcd.clone(), TimerPurpose::EffectClear(EffectSlot::TimeWarp)),
            Duration::from_millis(100),
            counter_task(&counter),
        );
        scheduler.schedule(
            TimerKey::new(wxyz.clone(), TimerPurpose::RoundEnd),
            Duration::from_millis(100),
            counter_task(&counter),
        );

        // when (操作):
        let cancelled = scheduler.cancel_where(&abcd, &|purpose| purpose.is_effect());

        // then (期待する結果):
        assert_eq!(cancelled, 1);
        assert_eq!(scheduler.pending(&abcd), 1);
        assert_eq!(scheduler.cancel_room(&abcd), 1);
        assert_eq!(scheduler.pending(&wxyz), 1);
        tokio::time::advance(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
