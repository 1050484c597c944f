use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use common::{Action, Bar, MarketEvent, OrderStatus, OrderUpdate, PositionSide};
use strategy::{BarDispatcher, DecisionEngine, Parameters, ShortEntries};

fn params_strategy() -> impl Strategy<Value = Parameters> {
    (
        2usize..12,
        5.0f64..50.0,
        50.0f64..95.0,
        20.0f64..80.0,
        1usize..25,
        1usize..25,
        0.001f64..0.1,
        0.001f64..0.1,
    )
        .prop_map(
            |(rsi_period, rsi_low, rsi_high, rsi_mid, sma_period, atr_period, pt, sl)| Parameters {
                rsi_period,
                rsi_low,
                rsi_high,
                rsi_mid,
                sma_period,
                atr_period,
                profit_target: pt,
                stop_loss: sl,
            },
        )
}

/// Random walk of closes starting at 100, kept strictly positive.
fn closes_strategy(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-3.0f64..3.0, 0..max_len).prop_map(|steps| {
        let mut price = 100.0f64;
        steps
            .into_iter()
            .map(|step| {
                price = (price + step).max(1.0);
                price
            })
            .collect()
    })
}

fn event(index: u64, close: f64) -> MarketEvent {
    MarketEvent {
        pair: "TESTUSD".into(),
        index,
        bar: Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(5 * index as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1.0,
        },
        is_delayed: None,
    }
}

fn dispatcher(params: Parameters, shorts: bool) -> BarDispatcher {
    let short_entries = if shorts {
        ShortEntries::Enabled
    } else {
        ShortEntries::Disabled
    };
    BarDispatcher::with_engine(DecisionEngine::new(params).with_short_entries(short_entries))
}

proptest! {
    /// Nothing is traded before every indicator has warmed up.
    #[test]
    fn warmup_bars_always_hold(
        params in params_strategy(),
        closes in closes_strategy(60),
        shorts in any::<bool>(),
    ) {
        let mut d = dispatcher(params, shorts);
        let warmup = d.warmup();
        let slowest = (params.rsi_period + 1).max(params.sma_period).max(params.atr_period);
        prop_assert_eq!(warmup, slowest);

        for (i, &close) in closes.iter().take(warmup - 1).enumerate() {
            prop_assert_eq!(d.on_bar(&event(i as u64, close)), Action::Hold);
        }
    }

    /// Entries only while flat, exits only while open, whatever the fills do.
    #[test]
    fn actions_respect_position_state(
        params in params_strategy(),
        closes in closes_strategy(300),
        outcomes in prop::collection::vec(0u8..4, 300),
        shorts in any::<bool>(),
    ) {
        let mut d = dispatcher(params, shorts);
        for (i, &close) in closes.iter().enumerate() {
            let side_before = d.position().side;
            let action = d.on_bar(&event(i as u64, close));

            match action {
                Action::EnterLong | Action::EnterShort => {
                    prop_assert_eq!(side_before, PositionSide::Flat)
                }
                Action::Exit => prop_assert_ne!(side_before, PositionSide::Flat),
                Action::Hold => continue,
            }
            if !shorts {
                prop_assert_ne!(action, Action::EnterShort);
            }

            let status = match outcomes[i] {
                0 => OrderStatus::Rejected,
                1 => OrderStatus::Margin,
                _ => OrderStatus::Completed,
            };
            let update = if status == OrderStatus::Completed {
                OrderUpdate::completed(format!("o{i}"), 1.0, close)
            } else {
                OrderUpdate::status(format!("o{i}"), status)
            };
            d.on_order_notification(&update);
            prop_assert!(!d.has_pending_order());

            let side_after = d.position().side;
            let expected = match (status, action) {
                (OrderStatus::Completed, Action::EnterLong) => PositionSide::Long,
                (OrderStatus::Completed, Action::EnterShort) => PositionSide::Short,
                (OrderStatus::Completed, Action::Exit) => PositionSide::Flat,
                _ => side_before,
            };
            prop_assert_eq!(side_after, expected);
        }
    }

    /// An unresolved order silences the strategy.
    #[test]
    fn unresolved_order_gates_every_later_bar(
        params in params_strategy(),
        closes in closes_strategy(300),
    ) {
        let mut d = dispatcher(params, true);
        let mut issued = false;
        for (i, &close) in closes.iter().enumerate() {
            let action = d.on_bar(&event(i as u64, close));
            if issued {
                prop_assert_eq!(action, Action::Hold);
            }
            if !action.is_hold() {
                issued = true;
                d.on_order_notification(&OrderUpdate::status("o", OrderStatus::Accepted));
                prop_assert!(d.has_pending_order());
            }
        }
    }

    /// Replaying a bar index never produces a second action.
    #[test]
    fn replayed_bars_are_no_ops(params in params_strategy(), closes in closes_strategy(200)) {
        let mut d = dispatcher(params, false);
        for (i, &close) in closes.iter().enumerate() {
            let ev = event(i as u64, close);
            let first = d.on_bar(&ev);
            let state = d.indicators();
            prop_assert_eq!(d.on_bar(&ev), Action::Hold);
            prop_assert_eq!(d.indicators(), state);
            if !first.is_hold() {
                d.on_order_notification(&OrderUpdate::completed(format!("o{i}"), 1.0, close));
            }
        }
    }

    /// RSI stays within [0, 100] on arbitrary price paths.
    #[test]
    fn rsi_stays_in_range(params in params_strategy(), closes in closes_strategy(200)) {
        let mut d = dispatcher(params, false);
        for (i, &close) in closes.iter().enumerate() {
            d.on_bar(&event(i as u64, close));
            if let Some(rsi) = d.indicators().rsi {
                prop_assert!((0.0..=100.0).contains(&rsi), "rsi {}", rsi);
            }
            if d.has_pending_order() {
                d.on_order_notification(&OrderUpdate::status("o", OrderStatus::Canceled));
            }
        }
    }
}
