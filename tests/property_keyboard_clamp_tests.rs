use chrono::{DateTime, TimeDelta, Utc};
use proptest::prelude::*;
use timeline_panel::core::TimeRange;
use timeline_panel::interaction::{NavigationKey, resolve_drag_range, resolve_keyboard_range};

fn at(second: i64) -> DateTime<Utc> {
    "2024-05-01T00:00:00Z"
        .parse::<DateTime<Utc>>()
        .expect("base instant")
        + TimeDelta::seconds(second)
}

fn key_strategy() -> impl Strategy<Value = NavigationKey> {
    prop_oneof![
        Just(NavigationKey::ArrowLeft),
        Just(NavigationKey::ArrowRight),
    ]
}

proptest! {
    #[test]
    fn keyboard_never_leaves_series_bounds(
        bounds_span in 600i64..86_400,
        begin_share in 0.0f64..1.0,
        width_share in 0.0f64..1.0,
        key in key_strategy(),
        modifier in any::<bool>(),
        step_ratio in 0.01f64..1.0,
        presses in 1usize..30
    ) {
        let bounds = TimeRange::new(at(0), at(bounds_span)).expect("bounds");
        let min_width = TimeDelta::minutes(1);
        let min_secs = min_width.num_seconds();
        let width = min_secs + ((bounds_span - min_secs) as f64 * width_share) as i64;
        let begin = ((bounds_span - width) as f64 * begin_share) as i64;
        let mut selection = TimeRange::new(at(begin), at(begin + width)).expect("selection");

        for _ in 0..presses {
            let next = resolve_keyboard_range(selection, bounds, key, modifier, step_ratio, min_width)
                .expect("resolve keyboard");
            let Some(next) = next else {
                break;
            };
            prop_assert!(next.begin() >= bounds.begin());
            prop_assert!(next.end() <= bounds.end());
            prop_assert!(next.duration() >= min_width);
            if !modifier {
                prop_assert_eq!(next.duration(), selection.duration());
            }
            selection = next;
        }
    }

    #[test]
    fn shrinking_a_narrow_selection_never_grows_it(
        bounds_span in 600i64..86_400,
        width in 1i64..60,
        begin_share in 0.0f64..1.0,
        step_ratio in 0.01f64..1.0
    ) {
        let bounds = TimeRange::new(at(0), at(bounds_span)).expect("bounds");
        let begin = ((bounds_span - width) as f64 * begin_share) as i64;
        let selection = TimeRange::new(at(begin), at(begin + width)).expect("selection");

        let next = resolve_keyboard_range(
            selection,
            bounds,
            NavigationKey::ArrowLeft,
            true,
            step_ratio,
            TimeDelta::minutes(1),
        )
        .expect("resolve keyboard");
        prop_assert!(next.is_none());
    }

    #[test]
    fn drag_keeps_width_inside_bounds(
        bounds_span in 600i64..86_400,
        width in 60i64..600,
        begin_share in 0.0f64..1.0,
        move_percent in prop_oneof![-2.0f64..2.0, -1.0e10f64..1.0e10]
    ) {
        let bounds = TimeRange::new(at(0), at(bounds_span)).expect("bounds");
        let begin = ((bounds_span - width) as f64 * begin_share) as i64;
        let selection = TimeRange::new(at(begin), at(begin + width)).expect("selection");

        let dragged = resolve_drag_range(selection, bounds, move_percent).expect("drag");
        prop_assert!(dragged.begin() >= bounds.begin());
        prop_assert!(dragged.end() <= bounds.end());
        prop_assert_eq!(dragged.duration(), selection.duration());
    }
}
