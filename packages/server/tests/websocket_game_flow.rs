//! End-to-end tests over a real WebSocket connection.

mod common;

use common::{TestClient, TestServer, open_room};
use serde_json::json;

#[tokio::test]
async fn test_full_single_round_game() {
    // テスト項目: ルーム作成から 1 ラウンドのゲーム終了まで
    // given (前提条件):
    let server = TestServer::start().await;
    let mut host = TestClient::connect(&server).await;
    let mut guest = TestClient::connect(&server).await;
    open_room(&mut host, &mut [&mut guest]).await;

    // when (操作):
    host.send("game.start", json!({ "rounds": 1, "roundDuration": 30000 }))
        .await;
    let offer = host.expect("round.start_drawer").await;
    let word = offer["wordOptions"][0]["word"].as_str().unwrap().to_string();
    let guesser_start = guest.expect("round.start_guesser").await;
    assert_eq!(guesser_start["drawerName"], "host");

    host.send("word.select", json!({ "word": word })).await;
    let selected = guest.expect("word.selected").await;
    assert!(selected.get("word").is_none());
    assert_eq!(
        selected["displayWord"].as_str().unwrap().chars().count(),
        word.chars().count()
    );

    guest.send("chat.message", json!({ "text": word })).await;

    // then (期待する結果):
    guest.expect("guess.correct").await;
    let ended = host.expect("game.end").await;
    assert_eq!(ended["winners"][0]["playerId"], guest.player_id.as_str());
    assert_eq!(ended["finalScores"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_non_host_start_is_rejected() {
    // テスト項目: ホスト以外が開始しようとすると room.error が返る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut host = TestClient::connect(&server).await;
    let mut guest = TestClient::connect(&server).await;
    open_room(&mut host, &mut [&mut guest]).await;

    // when (操作):
    guest.send("game.start", json!({})).await;

    // then (期待する結果):
    let error = guest.expect("room.error").await;
    assert!(error["message"].as_str().unwrap().contains("host"));
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    // テスト項目: 不正な JSON や未知のイベントを送っても接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut host = TestClient::connect(&server).await;
    open_room(&mut host, &mut []).await;

    // when (操作):
    host.send_raw("not json at all").await;
    host.send("no.such.event", json!({})).await;
    host.send("player.ready", json!({ "isReady": true })).await;

    // then (期待する結果):
    let update = host.expect("room.players_update").await;
    assert_eq!(update["players"][0]["isReady"], true);
}

#[tokio::test]
async fn test_purchase_without_points_returns_powerup_error() {
    // テスト項目: 得点が足りない購入には powerup.error が返る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut host = TestClient::connect(&server).await;
    open_room(&mut host, &mut []).await;

    // when (操作):
    host.send("powerup.purchase", json!({ "powerupId": "reveal_letter" }))
        .await;

    // then (期待する結果):
    let error = host.expect("powerup.error").await;
    assert!(error["message"].as_str().unwrap().contains("not enough points"));
}

#[tokio::test]
async fn test_disconnect_is_treated_as_leave() {
    // テスト項目: 切断したプレイヤーはルームから外れ、ホストが引き継がれる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut host = TestClient::connect(&server).await;
    let mut guest = TestClient::connect(&server).await;
    open_room(&mut host, &mut [&mut guest]).await;
    let guest_id = guest.player_id.clone();

    // when (操作):
    host.close().await;

    // then (期待する結果):
    loop {
        let update = guest.expect("room.players_update").await;
        if update["players"].as_array().unwrap().len() == 1 {
            assert_eq!(update["host"], guest_id.as_str());
            break;
        }
    }
}
