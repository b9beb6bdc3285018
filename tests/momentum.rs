//! End-to-end momentum behaviour through the public engine API.

mod common;

use common::*;
use momentum_engine::types::{Direction, Offset, OrderType, TargetState};
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

const RB: &str = "rb2405.SHFE";

#[tokio::test]
async fn test_rise_then_fall_buys_then_sells() {
    let (mut engine, gateway) = paper_engine(&[RB]);
    feed(&mut engine, vec![contract(RB, SIZE)]).await;

    feed(&mut engine, ticks(RB, &[10, 11, 12])).await;
    assert_eq!(engine.target(&key(RB)), TargetState::Long);
    let orders = gateway.orders();
    assert_eq!(orders.len(), 1);
    let buy = &orders[0].request;
    assert_eq!(buy.direction, Direction::Long);
    assert_eq!(buy.offset, Offset::Open);
    assert_eq!(buy.order_type, OrderType::Limit);
    assert_eq!(buy.price, dec!(22));
    assert_eq!(buy.volume, dec!(1));

    feed(&mut engine, ticks_from(RB, 3, &[12, 11, 10])).await;
    assert_eq!(engine.target(&key(RB)), TargetState::Flat);
    let orders = gateway.orders();
    assert_eq!(orders.len(), 2);
    let sell = &orders[1].request;
    assert_eq!(sell.direction, Direction::Short);
    assert_eq!(sell.offset, Offset::Close);
    assert_eq!(sell.price, dec!(0));
}

#[tokio::test]
async fn test_redelivered_rise_does_not_buy_twice() {
    let (mut engine, gateway) = paper_engine(&[RB]);
    feed(&mut engine, vec![contract(RB, SIZE)]).await;

    feed(&mut engine, ticks(RB, &[10, 11, 12])).await;
    feed(&mut engine, ticks_from(RB, 3, &[10, 11, 12])).await;

    assert_eq!(gateway.orders().len(), 1);
    assert_eq!(engine.target(&key(RB)), TargetState::Long);
}

#[tokio::test]
async fn test_plateau_never_trades() {
    let (mut engine, gateway) = paper_engine(&[RB]);
    feed(&mut engine, vec![contract(RB, SIZE)]).await;

    feed(&mut engine, ticks(RB, &[10, 10, 10])).await;
    assert!(gateway.orders().is_empty());

    feed(&mut engine, ticks_from(RB, 3, &[11, 12])).await;
    assert_eq!(engine.target(&key(RB)), TargetState::Long);

    // A plateau while long does not close either.
    feed(&mut engine, ticks_from(RB, 5, &[12, 12, 12])).await;
    assert_eq!(gateway.orders().len(), 1);
    assert_eq!(engine.target(&key(RB)), TargetState::Long);
}

#[tokio::test]
async fn test_two_ticks_are_not_enough() {
    let (mut engine, gateway) = paper_engine(&[RB]);
    let mut rx = engine.bus().subscribe();
    feed(&mut engine, vec![contract(RB, SIZE)]).await;

    feed(&mut engine, ticks(RB, &[10, 50])).await;

    assert!(gateway.orders().is_empty());
    assert_eq!(engine.target(&key(RB)), TargetState::Flat);
    assert!(signals(&drain(&mut rx)).is_empty());
}

#[tokio::test]
async fn test_signal_carries_newest_tick() {
    let (mut engine, _gateway) = paper_engine(&[RB]);
    feed(&mut engine, vec![contract(RB, SIZE)]).await;
    let mut rx = engine.bus().subscribe();

    let events = ticks(RB, &[10, 11, 12]);
    let newest = match &events[2] {
        momentum_engine::types::Event::Tick(t) => t.clone(),
        _ => unreachable!(),
    };
    feed(&mut engine, events).await;

    let published = drain(&mut rx);
    let signals = signals(&published);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].instrument, key(RB));
    assert_eq!(signals[0].datetime, newest.datetime);
    assert_eq!(signals[0].last_price, dec!(12));
    assert_eq!(signals[0].target, TargetState::Long);

    let logs = logs(&published);
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("rb2405.SHFE buy open 1 lot 2024-05-01 01:30:02"));
}

#[tokio::test]
async fn test_gateway_refusal_is_reported_and_state_stays() {
    let (mut engine, gateway) = paper_engine(&[RB]);
    let mut rx = engine.bus().subscribe();
    feed(&mut engine, vec![contract(RB, SIZE)]).await;

    gateway.set_error("venue offline");
    feed(&mut engine, ticks(RB, &[10, 11, 12])).await;

    assert!(gateway.orders().is_empty());
    assert_eq!(engine.target(&key(RB)), TargetState::Long);
    let logs = logs(&drain(&mut rx));
    assert!(logs.iter().any(|m| m.contains("send failed") && m.contains("venue offline")));
}

#[tokio::test]
async fn test_dispatch_loop_preserves_order() {
    let (mut engine, gateway) = paper_engine(&[RB]);
    let (tx, rx) = mpsc::channel(4);

    let producer = tokio::spawn(async move {
        let mut events = vec![contract(RB, SIZE)];
        events.extend(ticks(RB, &[10, 11, 12, 11, 10]));
        for event in events {
            tx.send(event).await.unwrap();
        }
    });

    let handled = engine.run(rx).await;
    producer.await.unwrap();

    assert_eq!(handled, 6);
    let directions: Vec<_> = gateway.orders().iter().map(|o| o.request.direction).collect();
    assert_eq!(directions, vec![Direction::Long, Direction::Short]);
    assert_eq!(engine.target(&key(RB)), TargetState::Flat);
}
