// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use ledgerloop::models::{Cadence, Schedule};
use ledgerloop::schedule::{
    days_in_month, next_occurrence, next_on_or_after, occurrences_in, validate, ScheduleError,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn monthly(day_of_month: u32, anchor: NaiveDate) -> Schedule {
    Schedule {
        cadence: Cadence::Monthly { day_of_month },
        anchor,
        until: None,
    }
}

#[test]
fn monthly_clamps_to_short_months_and_recovers() {
    let schedule = monthly(31, d(2024, 1, 31));
    let dates = occurrences_in(&schedule, d(2024, 1, 1), d(2024, 4, 30)).unwrap();
    assert_eq!(
        dates,
        vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]
    );
}

#[test]
fn monthly_clamp_uses_destination_month_length() {
    // Non-leap February, then back to the 31st in March: no remainder days
    // carried forward.
    let schedule = monthly(31, d(2023, 1, 31));
    assert_eq!(
        next_occurrence(d(2023, 1, 31), &schedule).unwrap(),
        d(2023, 2, 28)
    );
    assert_eq!(
        next_occurrence(d(2023, 2, 28), &schedule).unwrap(),
        d(2023, 3, 31)
    );
}

#[test]
fn monthly_skip_forward_is_path_dependent_on_anchor() {
    // Jumping straight into March must still go through the February clamp.
    let schedule = monthly(31, d(2024, 1, 31));
    assert_eq!(
        occurrences_in(&schedule, d(2024, 3, 1), d(2024, 3, 31)).unwrap(),
        vec![d(2024, 3, 31)]
    );
    assert_eq!(
        occurrences_in(&schedule, d(2024, 2, 1), d(2024, 2, 29)).unwrap(),
        vec![d(2024, 2, 29)]
    );
}

#[test]
fn window_is_closed_on_both_ends() {
    let schedule = Schedule {
        cadence: Cadence::Weekly,
        anchor: d(2024, 1, 1),
        until: None,
    };
    let dates = occurrences_in(&schedule, d(2024, 1, 1), d(2024, 1, 15)).unwrap();
    assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 8), d(2024, 1, 15)]);
}

#[test]
fn biweekly_steps_fourteen_days() {
    let schedule = Schedule {
        cadence: Cadence::Biweekly,
        anchor: d(2024, 1, 1),
        until: None,
    };
    let dates = occurrences_in(&schedule, d(2024, 1, 1), d(2024, 2, 1)).unwrap();
    assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 15), d(2024, 1, 29)]);
}

#[test]
fn anchor_after_window_yields_nothing() {
    let schedule = Schedule {
        cadence: Cadence::Weekly,
        anchor: d(2024, 6, 1),
        until: None,
    };
    assert!(occurrences_in(&schedule, d(2024, 1, 1), d(2024, 1, 31))
        .unwrap()
        .is_empty());
}

#[test]
fn end_date_equal_to_anchor_yields_single_occurrence() {
    let schedule = Schedule {
        cadence: Cadence::Weekly,
        anchor: d(2024, 3, 10),
        until: Some(d(2024, 3, 10)),
    };
    let dates = occurrences_in(&schedule, d(2024, 1, 1), d(2024, 12, 31)).unwrap();
    assert_eq!(dates, vec![d(2024, 3, 10)]);
}

#[test]
fn ended_schedule_yields_nothing_in_later_windows() {
    let schedule = Schedule {
        cadence: Cadence::Weekly,
        anchor: d(2024, 1, 1),
        until: Some(d(2024, 2, 1)),
    };
    assert!(occurrences_in(&schedule, d(2024, 3, 1), d(2024, 3, 31))
        .unwrap()
        .is_empty());
}

#[test]
fn custom_step_below_one_day_is_rejected() {
    let schedule = Schedule {
        cadence: Cadence::Custom { step_days: 0 },
        anchor: d(2024, 1, 1),
        until: None,
    };
    assert_eq!(validate(&schedule), Err(ScheduleError::StepBelowOneDay));
    assert_eq!(
        occurrences_in(&schedule, d(2024, 1, 1), d(2024, 2, 1)),
        Err(ScheduleError::StepBelowOneDay)
    );
}

#[test]
fn day_of_month_outside_range_is_rejected() {
    for bad in [0u32, 32] {
        let schedule = monthly(bad, d(2024, 1, 1));
        assert_eq!(
            validate(&schedule),
            Err(ScheduleError::DayOfMonthOutOfRange(bad))
        );
    }
}

#[test]
fn end_before_anchor_is_rejected() {
    let schedule = Schedule {
        cadence: Cadence::Weekly,
        anchor: d(2024, 5, 1),
        until: Some(d(2024, 4, 1)),
    };
    assert_eq!(
        validate(&schedule),
        Err(ScheduleError::EndsBeforeAnchor {
            anchor: d(2024, 5, 1),
            until: d(2024, 4, 1),
        })
    );
}

#[test]
fn next_on_or_after_steps_from_the_anchor() {
    let schedule = Schedule {
        cadence: Cadence::Weekly,
        anchor: d(2024, 1, 1),
        until: None,
    };
    assert_eq!(
        next_on_or_after(&schedule, d(2024, 1, 10)).unwrap(),
        Some(d(2024, 1, 15))
    );
    assert_eq!(
        next_on_or_after(&schedule, d(2024, 1, 8)).unwrap(),
        Some(d(2024, 1, 8))
    );

    let ended = Schedule {
        until: Some(d(2024, 1, 20)),
        ..schedule
    };
    assert_eq!(next_on_or_after(&ended, d(2024, 2, 1)).unwrap(), None);
}

#[test]
fn days_in_month_handles_leap_years() {
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2023, 2), 28);
    assert_eq!(days_in_month(2024, 4), 30);
    assert_eq!(days_in_month(2024, 12), 31);
}
