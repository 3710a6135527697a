//! Outbox の配信
//!
//! ルームのロックを外した後に呼ぶ。配信の失敗はログに残すだけで、
//! 操作自体は成功として扱う。

use crate::domain::{MessagePusher, Outbound, Outbox};

pub(crate) async fn publish(message_pusher: &dyn MessagePusher, outbox: Outbox) {
    for Outbound { targets, event } in outbox.into_messages() {
        let result = if targets.len() == 1 {
            message_pusher.push_to(&targets[0], &event).await
        } else {
            message_pusher.broadcast(targets, &event).await
        };
        if let Err(e) = result {
            tracing::warn!("Failed to deliver event: {}", e);
        }
    }
}
