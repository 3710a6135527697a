//! Powerup economy
//!
//! 購入・発動条件の判定・対象の検証・13 種類の効果の適用・時限効果の解除。
//! 通知は `Outbox` に積んで返し、自動解除タイマーは `EffectTimer` として要求する。

use std::collections::BTreeMap;

use rand::Rng;

use super::{
    entity::{ActiveEffect, Cooldown, EffectSlot, GlobalCooldown, Room},
    error::{PowerupError, TargetRejection},
    event::{EffectNotice, Outbox, ServerEvent},
    powerup::{PowerupKind, UsableBy},
    pricing,
    value_object::PlayerId,
    words,
};

/// 盗めるポイントの下限・上限
pub const POINT_STEAL_MIN: i64 = 100;
pub const POINT_STEAL_MAX: i64 = 400;
/// 盗むポイントの割合（百分率）
pub const POINT_STEAL_PCT: i64 = 15;
/// ブラインドスポットの覆う割合
pub const BLIND_SPOT_COVERAGE_PCT: u32 = 30;

/// 購入結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub price: i64,
    pub score: i64,
    pub powerups: BTreeMap<PowerupKind, u32>,
}

/// 自動解除タイマーの要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectTimer {
    pub slot: EffectSlot,
    pub delay_ms: u64,
}

/// 発動結果
#[derive(Debug, Default)]
pub struct Activation {
    pub outbox: Outbox,
    pub effect_timers: Vec<EffectTimer>,
    /// ラウンド締切が延びたときの新しい締切
    pub new_deadline: Option<i64>,
    /// スコアが動いた（参加者一覧の再送が必要）
    pub scores_changed: bool,
}

/// 盗む量: clamp(floor(score × 15%), 100, 400)
pub fn point_steal_amount(target_score: i64) -> i64 {
    (target_score.max(0) * POINT_STEAL_PCT / 100).clamp(POINT_STEAL_MIN, POINT_STEAL_MAX)
}

/// 価格を計算して購入する
pub fn purchase(
    room: &mut Room,
    buyer: &PlayerId,
    kind: PowerupKind,
    target: Option<&PlayerId>,
    now: i64,
) -> Result<Purchase, PowerupError> {
    let price = pricing::quote(room, buyer, kind, target, now)?;
    let player = room.player_mut(buyer).ok_or(PowerupError::PlayerNotFound)?;
    if player.score < price {
        return Err(PowerupError::InsufficientFunds {
            price,
            score: player.score,
        });
    }
    player.debit(price);
    player.grant(kind);
    Ok(Purchase {
        price,
        score: player.score,
        powerups: player.powerups.clone(),
    })
}

/// クールダウンとラウンド内の使用回数を確認する
pub fn can_activate(
    room: &Room,
    player_id: &PlayerId,
    kind: PowerupKind,
    now: i64,
) -> Result<(), PowerupError> {
    let player = room.player(player_id).ok_or(PowerupError::PlayerNotFound)?;
    if let Some(cooldown) = player.cooldowns.get(&kind)
        && now < cooldown.next_eligible_at
    {
        return Err(PowerupError::PersonalCooldown {
            kind,
            remaining_ms: cooldown.next_eligible_at - now,
        });
    }
    if let Some(global) = room.global_cooldowns.get(&kind) {
        if now < global.next_eligible_at {
            return Err(PowerupError::GlobalCooldown {
                kind,
                remaining_ms: global.next_eligible_at - now,
            });
        }
        let max = kind.spec().max_uses_per_round;
        if global.uses_this_round >= max {
            return Err(PowerupError::RoundLimitReached { kind, max });
        }
    }
    Ok(())
}

/// 対象指定を検証する
pub fn validate_target(
    room: &Room,
    buyer: &PlayerId,
    target: Option<&PlayerId>,
    kind: PowerupKind,
) -> Result<(), TargetRejection> {
    let requires_target = kind.spec().requires_target;
    let target = match (requires_target, target) {
        (true, None) => return Err(TargetRejection::Missing),
        (false, Some(_)) => return Err(TargetRejection::NotAccepted),
        (false, None) => return Ok(()),
        (true, Some(target)) => target,
    };
    if target == buyer {
        return Err(TargetRejection::SelfTarget);
    }
    if !room.is_member(target) {
        return Err(TargetRejection::NotMember);
    }
    if room.is_drawer(target) && !kind.may_target_drawer() {
        return Err(TargetRejection::Drawer);
    }
    Ok(())
}

fn check_role(room: &Room, player: &PlayerId, kind: PowerupKind) -> Result<(), PowerupError> {
    match kind.spec().usable_by {
        UsableBy::Drawer if !room.is_drawer(player) => Err(PowerupError::WrongRole {
            kind,
            role: "drawer",
        }),
        UsableBy::Guesser if room.is_drawer(player) => Err(PowerupError::WrongRole {
            kind,
            role: "guessers",
        }),
        _ => Ok(()),
    }
}

fn player_name(room: &Room, id: &PlayerId) -> String {
    room.player(id)
        .map(|player| player.name.to_string())
        .unwrap_or_default()
}

/// パワーアップを発動する
///
/// 検証の順序: 所持 → 役割 → ラウンド中か → 対象 → クールダウン → 効果固有の条件。
/// 効果が成立したときだけ在庫を減らし、クールダウンと使用回数を記録する。
pub fn activate<R: Rng + ?Sized>(
    room: &mut Room,
    activator: &PlayerId,
    kind: PowerupKind,
    target: Option<&PlayerId>,
    now: i64,
    rng: &mut R,
) -> Result<Activation, PowerupError> {
    let player = room.player(activator).ok_or(PowerupError::PlayerNotFound)?;
    if !player.owns(kind) {
        return Err(PowerupError::NotOwned(kind));
    }
    check_role(room, activator, kind)?;
    if kind.needs_active_round() && !room.game.is_drawing() {
        return Err(PowerupError::Unavailable("no round in progress"));
    }
    validate_target(room, activator, target, kind)?;
    can_activate(room, activator, kind, now)?;

    let mut activation = apply_effect(room, activator, kind, target, now, rng)?;

    let spec = kind.spec();
    let player = room
        .player_mut(activator)
        .ok_or(PowerupError::PlayerNotFound)?;
    player.consume(kind);
    player.prune_effects(now);
    player.cooldowns.insert(
        kind,
        Cooldown {
            last_used_at: now,
            next_eligible_at: now + spec.personal_cooldown_ms as i64,
        },
    );
    let activated = ServerEvent::PowerupActivated {
        powerup_id: kind,
        powerups: player.powerups.clone(),
        active_effects: player.active_effects.clone(),
        cooldowns: player.cooldowns.clone(),
    };

    let global = room
        .global_cooldowns
        .entry(kind)
        .or_insert_with(|| GlobalCooldown {
            last_used_by: activator.clone(),
            last_used_at: now,
            next_eligible_at: now,
            uses_this_round: 0,
        });
    global.last_used_by = activator.clone();
    global.last_used_at = now;
    global.next_eligible_at = now + spec.global_cooldown_ms as i64;
    global.uses_this_round += 1;

    activation.outbox.to(activator, activated);
    Ok(activation)
}

fn timed_self_effect(
    room: &mut Room,
    holder: &PlayerId,
    kind: PowerupKind,
    source: Option<&PlayerId>,
    now: i64,
) -> Result<i64, PowerupError> {
    let duration = kind.spec().effect_duration_ms.unwrap_or_default() as i64;
    let expires_at = now + duration;
    let player = room.player_mut(holder).ok_or(PowerupError::PlayerNotFound)?;
    player.prune_effects(now);
    player.active_effects.push(ActiveEffect {
        kind,
        activated_at: now,
        expires_at: Some(expires_at),
        source: source.cloned(),
    });
    Ok(expires_at)
}

fn require_target(target: Option<&PlayerId>) -> Result<&PlayerId, PowerupError> {
    target.ok_or(PowerupError::InvalidTarget(TargetRejection::Missing))
}

fn apply_effect<R: Rng + ?Sized>(
    room: &mut Room,
    activator: &PlayerId,
    kind: PowerupKind,
    target: Option<&PlayerId>,
    now: i64,
    rng: &mut R,
) -> Result<Activation, PowerupError> {
    let mut activation = Activation::default();
    let duration_ms = kind.spec().effect_duration_ms.unwrap_or_default();
    let by = player_name(room, activator);

    match kind {
        PowerupKind::RevealLetter => {
            let (Some(word), Some(display)) = (&room.game.current_word, &room.game.display_word)
            else {
                return Err(PowerupError::Unavailable("no word to reveal"));
            };
            let revealed = words::reveal_random(word, display, rng)
                .ok_or(PowerupError::Unavailable("nothing left to reveal"))?;
            room.game.display_word = Some(revealed.clone());
            activation.outbox.to(
                activator,
                ServerEvent::PowerupEffect(EffectNotice::RevealLetter {
                    display_word: revealed.clone(),
                }),
            );
            activation.outbox.room(
                room,
                ServerEvent::HintRevealed {
                    display_word: revealed,
                },
            );
        }
        PowerupKind::WordLength => {
            let word = room
                .game
                .current_word
                .as_ref()
                .ok_or(PowerupError::Unavailable("no word selected"))?;
            activation.outbox.to(
                activator,
                ServerEvent::PowerupEffect(EffectNotice::WordLength {
                    word_length: word.chars().count(),
                }),
            );
        }
        PowerupKind::OracleHint => {
            let word = room
                .game
                .current_word
                .as_ref()
                .ok_or(PowerupError::Unavailable("no word selected"))?;
            let notice = EffectNotice::OracleHint {
                category: words::category(word).to_string(),
                first_letter: words::first_letter(word).unwrap_or_default(),
            };
            activation
                .outbox
                .to(activator, ServerEvent::PowerupEffect(notice));
        }
        PowerupKind::ExtraTime => {
            let deadline = room
                .game
                .round_deadline
                .ok_or(PowerupError::Unavailable("no round in progress"))?
                + duration_ms as i64;
            room.game.round_deadline = Some(deadline);
            activation.new_deadline = Some(deadline);
            activation.outbox.room(
                room,
                ServerEvent::PowerupEffect(EffectNotice::ExtraTime {
                    extra_ms: duration_ms,
                    round_deadline: Some(deadline),
                }),
            );
        }
        PowerupKind::StreakShield | PowerupKind::DoublePoints | PowerupKind::TriplePoints => {
            let expires_at = timed_self_effect(room, activator, kind, None, now)?;
            let notice = match kind {
                PowerupKind::StreakShield => EffectNotice::StreakShield { expires_at },
                PowerupKind::DoublePoints => EffectNotice::DoublePoints { expires_at },
                _ => EffectNotice::TriplePoints { expires_at },
            };
            activation
                .outbox
                .to(activator, ServerEvent::PowerupEffect(notice));
        }
        PowerupKind::SpeedCurse => {
            let target = require_target(target)?;
            let expires_at = timed_self_effect(room, target, kind, Some(activator), now)?;
            activation.outbox.to_many(
                vec![target.clone(), activator.clone()],
                ServerEvent::PowerupEffect(EffectNotice::SpeedCurse {
                    by,
                    target: target.clone(),
                    expires_at,
                }),
            );
        }
        PowerupKind::TimeWarp => {
            if room
                .game
                .time_paused_until
                .is_some_and(|paused_until| now < paused_until)
            {
                return Err(PowerupError::Unavailable("time is already frozen"));
            }
            let paused_until = now + duration_ms as i64;
            room.game.time_paused_until = Some(paused_until);
            if let Some(deadline) = room.game.round_deadline {
                let deadline = deadline + duration_ms as i64;
                room.game.round_deadline = Some(deadline);
                activation.new_deadline = Some(deadline);
            }
            push_slot(room, EffectSlot::TimeWarp);
            activation.effect_timers.push(EffectTimer {
                slot: EffectSlot::TimeWarp,
                delay_ms: duration_ms,
            });
            activation.outbox.room(
                room,
                ServerEvent::PowerupEffect(EffectNotice::TimeWarp {
                    by,
                    duration_ms,
                    paused_until,
                    round_deadline: room.game.round_deadline,
                }),
            );
        }
        PowerupKind::BrushSabotage => {
            room.game.brush_sabotage_active = true;
            push_slot(room, EffectSlot::BrushSabotage);
            activation.effect_timers.push(EffectTimer {
                slot: EffectSlot::BrushSabotage,
                delay_ms: duration_ms,
            });
            activation.outbox.room(
                room,
                ServerEvent::PowerupEffect(EffectNotice::BrushSabotage { by, duration_ms }),
            );
        }
        PowerupKind::BlindSpot | PowerupKind::CanvasChaos => {
            let target = require_target(target)?.clone();
            let (slot, notice) = if kind == PowerupKind::BlindSpot {
                (
                    EffectSlot::BlindSpot(target.clone()),
                    EffectNotice::BlindSpot {
                        by,
                        duration_ms,
                        coverage_pct: BLIND_SPOT_COVERAGE_PCT,
                    },
                )
            } else {
                (
                    EffectSlot::CanvasChaos(target.clone()),
                    EffectNotice::CanvasChaos { by, duration_ms },
                )
            };
            push_slot(room, slot.clone());
            activation.effect_timers.push(EffectTimer {
                slot,
                delay_ms: duration_ms,
            });
            activation
                .outbox
                .to(&target, ServerEvent::PowerupEffect(notice));
        }
        PowerupKind::PointSteal => {
            let target = require_target(target)?;
            let victim = room.player_mut(target).ok_or(PowerupError::InvalidTarget(
                TargetRejection::NotMember,
            ))?;
            let amount = victim.debit(point_steal_amount(victim.score));
            let victim_name = victim.name.to_string();
            let thief = room
                .player_mut(activator)
                .ok_or(PowerupError::PlayerNotFound)?;
            thief.credit(amount);
            let thief_name = thief.name.to_string();
            activation.scores_changed = true;
            activation.outbox.to_many(
                vec![activator.clone(), target.clone()],
                ServerEvent::PowerupEffect(EffectNotice::PointSteal {
                    thief: activator.clone(),
                    thief_name,
                    victim: target.clone(),
                    victim_name,
                    amount,
                }),
            );
        }
    }

    Ok(activation)
}

fn push_slot(room: &mut Room, slot: EffectSlot) {
    if !room.game.effect_slots.contains(&slot) {
        room.game.effect_slots.push(slot);
    }
}

/// 時限効果を解除する（自動解除タイマーから呼ばれる）
///
/// 既に解除済みの枠なら何もしない。
pub fn clear_effect(room: &mut Room, slot: &EffectSlot) -> Outbox {
    let mut outbox = Outbox::new();
    let Some(index) = room.game.effect_slots.iter().position(|s| s == slot) else {
        return outbox;
    };
    room.game.effect_slots.remove(index);

    match slot {
        EffectSlot::TimeWarp => {
            room.game.time_paused_until = None;
            outbox.room(room, ServerEvent::PowerupEffect(EffectNotice::TimeWarpEnded));
        }
        EffectSlot::BrushSabotage => {
            room.game.brush_sabotage_active = false;
            outbox.room(
                room,
                ServerEvent::PowerupEffect(EffectNotice::BrushSabotageEnded),
            );
        }
        EffectSlot::BlindSpot(target) => {
            if room.is_member(target) {
                outbox.to(target, ServerEvent::PowerupEffect(EffectNotice::BlindSpotEnded));
            }
        }
        EffectSlot::CanvasChaos(target) => {
            if room.is_member(target) {
                outbox.to(
                    target,
                    ServerEvent::PowerupEffect(EffectNotice::CanvasChaosEnded),
                );
            }
        }
    }
    outbox
}

/// ラウンド終了時に残っている時限効果をすべて解除する
pub fn clear_all_effects(room: &mut Room) -> Outbox {
    let mut outbox = Outbox::new();
    let slots = room.game.effect_slots.clone();
    for slot in &slots {
        outbox.append(clear_effect(room, slot));
    }
    outbox
}

/// 新しいラウンドでラウンド内の使用回数を数え直す
pub fn reset_round_usage(room: &mut Room) {
    for global in room.global_cooldowns.values_mut() {
        global.uses_this_round = 0;
    }
}
