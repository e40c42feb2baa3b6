use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::test]
async fn ticks_fire_and_stop_cancels() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();

    let mut scheduler = Scheduler::start("test", Duration::from_millis(10), move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    tokio::time::sleep(Duration::from_millis(55)).await;
    assert!(scheduler.is_running());
    let before_stop = ticks.load(Ordering::SeqCst);
    assert!(before_stop >= 2, "expected several ticks, got {before_stop}");

    scheduler.stop();
    tokio::time::sleep(Duration::from_millis(30)).await;
    let after_stop = ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), after_stop, "ticks continued after stop");
    assert!(!scheduler.is_running());
}

#[tokio::test]
async fn first_tick_is_immediate() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();

    let _scheduler = Scheduler::start("immediate", Duration::from_secs(3600), move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn drop_cancels_the_task() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();

    {
        let _scheduler = Scheduler::start("dropped", Duration::from_millis(5), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let at_drop = ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), at_drop);
}
