//! Deferred queue ordering and lifecycle

use device_agent::dispatch::{DeferredQueue, DispatchError, DispatchExit, Ticker};
use std::thread;
use std::time::Duration;

#[test]
fn test_tasks_run_in_submission_order() {
    let mut queue = DeferredQueue::new(Vec::<char>::new());
    let producer = queue.producer();
    for name in ['A', 'B', 'C'] {
        producer.post(move |log| log.push(name)).unwrap();
    }
    // Nothing runs until the owner dispatches
    assert!(queue.context().is_empty());
    assert_eq!(queue.pending(), 3);

    queue.dispatch_pending();
    assert_eq!(queue.context(), &vec!['A', 'B', 'C']);
}

#[test]
fn test_tasks_posted_by_a_task_run_after_earlier_ones() {
    let mut queue = DeferredQueue::new(Vec::<&'static str>::new());
    let producer = queue.producer();
    let nested = producer.clone();
    producer
        .post(move |log| {
            log.push("outer");
            nested.post(|log| log.push("nested")).unwrap();
        })
        .unwrap();
    producer.post(|log| log.push("second")).unwrap();

    queue.dispatch_pending();
    queue.dispatch_pending();
    assert_eq!(queue.context(), &vec!["outer", "second", "nested"]);
}

#[test]
fn test_cross_thread_producers_keep_their_own_order() {
    let mut queue = DeferredQueue::new(Vec::<(u8, u32)>::new());
    let handles: Vec<_> = (0..3u8)
        .map(|source| {
            let producer = queue.producer();
            thread::spawn(move || {
                for seq in 0..50u32 {
                    producer.post(move |log| log.push((source, seq))).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    queue.dispatch_pending();
    let log = queue.context();
    assert_eq!(log.len(), 150);
    for source in 0..3u8 {
        let seqs: Vec<u32> = log.iter().filter(|(s, _)| *s == source).map(|(_, n)| *n).collect();
        assert_eq!(seqs, (0..50).collect::<Vec<_>>());
    }
}

#[test]
fn test_dispatch_forever_runs_until_halted() {
    let mut queue = DeferredQueue::new(0u32);
    let producer = queue.producer();
    let worker = thread::spawn(move || {
        for _ in 0..10 {
            producer.post(|count| *count += 1).unwrap();
        }
        producer.request_halt("test finished").unwrap();
    });

    let exit = queue.dispatch_forever();
    worker.join().unwrap();
    assert_eq!(
        exit,
        DispatchExit::Halted {
            reason: "test finished".to_string()
        }
    );
    assert_eq!(*queue.context(), 10);
    assert_eq!(queue.stats().executed, 10);
}

#[test]
fn test_dispatch_forever_returns_when_producers_are_gone() {
    let mut queue = DeferredQueue::new(0u32);
    let producer = queue.producer();
    producer.post(|count| *count += 1).unwrap();
    drop(producer);

    assert_eq!(queue.dispatch_forever(), DispatchExit::Disconnected);
    assert_eq!(*queue.context(), 1);

    // The loop has given up its sender; late producers are detached
    let late = queue.producer();
    assert_eq!(late.post(|count| *count += 1), Err(DispatchError::QueueClosed));
}

#[test]
fn test_ticker_posts_periodically_until_dropped() {
    let mut queue = DeferredQueue::new(0u32);
    let ticker = Ticker::spawn("test-ticker", Duration::from_millis(5), queue.producer(), |count: &mut u32| {
        *count += 1;
    })
    .unwrap();
    assert_eq!(ticker.name(), "test-ticker");

    thread::sleep(Duration::from_millis(60));
    drop(ticker);

    queue.dispatch_pending();
    let ticks = *queue.context();
    assert!(ticks >= 2, "expected several ticks, got {ticks}");

    thread::sleep(Duration::from_millis(20));
    assert_eq!(queue.dispatch_pending(), 0);
}
