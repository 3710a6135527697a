//! MessagePusher trait 定義
//!
//! 接続中のクライアントへ通知を届けるためのインターフェース。
//! WebSocket などの具体的な配信手段は Infrastructure 層が提供する。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, event::ServerEvent, value_object::PlayerId};

/// クライアントごとの送信チャンネル（直列化済みフレーム）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// 通知の配信インターフェース
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルを登録
    async fn register_client(&self, client_id: PlayerId, sender: PusherChannel);

    /// クライアントの送信チャンネルを解除
    async fn unregister_client(&self, client_id: &PlayerId);

    /// 1 クライアントに送信
    async fn push_to(
        &self,
        client_id: &PlayerId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数クライアントに送信（一部の失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<PlayerId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// 登録中のクライアント数
    async fn connected_count(&self) -> usize;
}
