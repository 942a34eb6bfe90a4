//! Integration tests for BoundedQueue across threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use raster_core::{PixelDataType, RasterBuffer, Size2D};
use raster_queue::{BoundedQueue, FrameQueue, Pop, QueueConfig};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 2x1 single-channel frame whose first byte is `tag`.
fn tagged_frame(tag: u8) -> RasterBuffer {
    RasterBuffer::from_vec(vec![tag, 0], PixelDataType::U8, Size2D::new(2, 1), 1).unwrap()
}

#[test]
fn push_blocks_until_pop() {
    init_tracing();
    let capacity = 3;
    let queue = Arc::new(FrameQueue::new(capacity).unwrap());
    for tag in 0..capacity as u8 {
        queue.push(tagged_frame(tag));
    }
    assert!(queue.is_full());

    let pushed = Arc::new(AtomicBool::new(false));
    let producer = {
        let queue = Arc::clone(&queue);
        let pushed = Arc::clone(&pushed);
        thread::spawn(move || {
            queue.push(tagged_frame(99));
            pushed.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(100));
    assert!(!pushed.load(Ordering::SeqCst), "push on a full queue returned");

    assert_eq!(queue.pop().data()[0], 0);
    let deadline = Instant::now() + Duration::from_secs(5);
    while !pushed.load(Ordering::SeqCst) {
        assert!(Instant::now() < deadline, "blocked push never completed");
        thread::sleep(Duration::from_millis(1));
    }
    producer.join().unwrap();
    assert_eq!(queue.len(), capacity);
}

#[test]
fn timed_pop_on_empty_queue_times_out() {
    init_tracing();
    let queue = FrameQueue::new(2).unwrap();
    let timeout = Duration::from_millis(100);

    let start = Instant::now();
    let outcome = queue.try_pop(timeout);
    let elapsed = start.elapsed();

    assert!(outcome.is_timed_out());
    assert!(elapsed >= timeout, "returned after {elapsed:?}");
    assert!(queue.is_empty());
}

#[test]
fn timed_pop_receives_late_item() {
    init_tracing();
    let queue = Arc::new(BoundedQueue::new(1).unwrap());
    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            queue.push("late");
        })
    };
    assert_eq!(queue.try_pop(Duration::from_secs(5)), Pop::Item("late"));
    producer.join().unwrap();
}

#[test]
fn single_producer_order_is_fifo() {
    init_tracing();
    let config = QueueConfig::default().with_capacity(4);
    let queue = Arc::new(FrameQueue::from_config(&config).unwrap());
    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for tag in 0..10 {
                queue.push(tagged_frame(tag));
            }
        })
    };

    let tags: Vec<u8> = (0..10).map(|_| queue.pop().data()[0]).collect();
    producer.join().unwrap();
    assert_eq!(tags, (0..10).collect::<Vec<u8>>());
}

#[test]
fn many_producers_many_consumers() {
    init_tracing();
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 250;

    let queue = Arc::new(BoundedQueue::new(8).unwrap());
    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.push((p, i));
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Pop::Item(item) = queue.try_pop(Duration::from_millis(500)) {
                    seen.push(item);
                }
                seen
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    let mut all: Vec<(usize, usize)> = Vec::new();
    for consumer in consumers {
        let seen = consumer.join().unwrap();
        // Each producer's items stay in push order within one consumer
        for p in 0..PRODUCERS {
            let mine: Vec<usize> = seen.iter().filter(|(q, _)| *q == p).map(|(_, i)| *i).collect();
            assert!(mine.windows(2).all(|w| w[0] < w[1]));
        }
        all.extend(seen);
    }

    all.sort_unstable();
    let expected: Vec<(usize, usize)> = (0..PRODUCERS)
        .flat_map(|p| (0..PER_PRODUCER).map(move |i| (p, i)))
        .collect();
    assert_eq!(all, expected);
    assert!(queue.is_empty());
}
