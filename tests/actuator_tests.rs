//! Blink pattern playback against a recording output

mod common;

use common::{RecordingOutput, RecordingSleeper};
use device_agent::actuator::{ActuatorHandler, BlinkPattern};
use std::sync::Arc;
use std::time::Duration;

fn handler(initially_on: bool) -> (ActuatorHandler, RecordingOutput, RecordingSleeper) {
    let output = RecordingOutput::new(initially_on);
    let sleeper = RecordingSleeper::new();
    let handler = ActuatorHandler::with_sleeper(output.clone(), Arc::new(sleeper.clone()));
    (handler, output, sleeper)
}

#[test]
fn test_even_pattern_returns_to_initial_level() {
    let (handler, output, sleeper) = handler(false);

    let report = handler.play("500:500:500:500");

    assert_eq!(report.toggles, 4);
    assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(500); 4]);
    assert_eq!(output.levels(), vec![true, false, true, false]);
    assert_eq!(report.final_on, report.initial_on);
    assert!(!handler.is_on());
}

#[test]
fn test_single_delay_toggles_once() {
    let (handler, output, sleeper) = handler(true);

    let report = handler.play("100");

    assert_eq!(report.toggles, 1);
    assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(100)]);
    assert_eq!(output.levels(), vec![false]);
    assert!(report.initial_on);
    assert!(!report.final_on);
}

#[test]
fn test_empty_pattern_does_nothing() {
    let (handler, output, sleeper) = handler(false);
    let report = handler.play("");
    assert_eq!(report.toggles, 0);
    assert!(sleeper.sleeps().is_empty());
    assert_eq!(output.toggles(), 0);
}

#[test]
fn test_malformed_tokens_count_as_zero_delay() {
    let (handler, output, sleeper) = handler(false);

    let report = handler.play("abc:-5:20x");

    assert_eq!(report.toggles, 3);
    assert_eq!(
        sleeper.sleeps(),
        vec![Duration::ZERO, Duration::ZERO, Duration::from_millis(20)]
    );
    assert_eq!(output.toggles(), 3);
    assert_eq!(report.total_delay, Duration::from_millis(20));
}

#[test]
fn test_parsed_pattern_reports_its_shape() {
    let pattern = BlinkPattern::parse("500:500:500:500:500:500:500:500");
    assert_eq!(pattern.steps(), 8);
    assert!(!pattern.flips_state());
    assert_eq!(pattern.total_duration(), Duration::from_secs(4));
    assert_eq!(pattern.to_string(), "500:500:500:500:500:500:500:500");
}

#[test]
fn test_patterns_from_different_threads_do_not_interleave() {
    let (handler, output, _) = handler(false);
    let handler = Arc::new(handler);

    let threads: Vec<_> = (0..4)
        .map(|_| {
            let handler = Arc::clone(&handler);
            std::thread::spawn(move || handler.play("0:0:0"))
        })
        .collect();
    for thread in threads {
        assert_eq!(thread.join().unwrap().toggles, 3);
    }

    // Each play flips three times, so every play starts where the previous ended
    assert_eq!(output.toggles(), 12);
    assert!(!handler.is_on());
}
