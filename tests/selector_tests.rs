// Stable datapoint selection scenarios

use aws_billing_plugin::error::BillingError;
use aws_billing_plugin::models::Datapoint;
use aws_billing_plugin::selector::select_stable;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn older_datapoint_wins_over_recent_one() {
    let n = now();
    let dps = [
        Datapoint::new(n - Duration::hours(1), 12.5),
        Datapoint::new(n - Duration::hours(5), 10.0),
    ];
    assert_eq!(select_stable("EstimatedCharges", &dps, n).unwrap(), 10.0);
}

#[test]
fn empty_response_is_no_data() {
    let err = select_stable("EstimatedCharges", &[], now()).unwrap_err();
    assert!(matches!(err, BillingError::NoData { ref metric } if metric == "EstimatedCharges"));
}

#[test]
fn tied_timestamps_keep_first_in_response_order() {
    let n = now();
    let dps = [
        Datapoint::new(n - Duration::hours(3), 7.0),
        Datapoint::new(n - Duration::hours(3), 9.0),
    ];
    assert_eq!(select_stable("m", &dps, n).unwrap(), 7.0);

    let reversed = [dps[1], dps[0]];
    assert_eq!(select_stable("m", &reversed, n).unwrap(), 9.0);
}

#[test]
fn tie_on_minimum_after_later_points_keeps_first_minimum() {
    let n = now();
    let dps = [
        Datapoint::new(n - Duration::hours(1), 1.0),
        Datapoint::new(n - Duration::hours(4), 2.0),
        Datapoint::new(n - Duration::hours(2), 3.0),
        Datapoint::new(n - Duration::hours(4), 4.0),
    ];
    assert_eq!(select_stable("m", &dps, n).unwrap(), 2.0);
}

#[test]
fn timestamps_at_or_after_now_are_no_data() {
    let n = now();
    let dps = [
        Datapoint::new(n, 1.0),
        Datapoint::new(n + Duration::minutes(5), 2.0),
    ];
    let err = select_stable("m", &dps, n).unwrap_err();
    assert!(matches!(err, BillingError::NoData { .. }));
}

#[test]
fn single_datapoint_is_selected() {
    let n = now();
    let dps = [Datapoint::new(n - Duration::seconds(1), 0.0)];
    assert_eq!(select_stable("m", &dps, n).unwrap(), 0.0);
}
