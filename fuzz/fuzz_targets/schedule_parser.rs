//! Fuzz fee schedule parsing with arbitrary JSON.
//!
//! Any schedule that parses must validate, re-serialise, and parse back to
//! the same value.

#![no_main]

use {libfuzzer_sys::fuzz_target, simplefees_schedule::FeeSchedule};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(schedule) = FeeSchedule::from_json(json) else {
        return;
    };

    assert!(schedule.validate().is_ok());
    let pretty = schedule.to_json_pretty().expect("parsed schedules serialise");
    let reparsed = FeeSchedule::from_json(&pretty).expect("serialised schedules parse");
    assert_eq!(reparsed, schedule);
});
