//! Unit tests for the asynchronous command channel.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use suite_runner::infra::command::{command_channel, Command};

#[tokio::test]
async fn commands_are_delivered_to_registered_listeners() {
    let (sender, reader) = command_channel();
    let hits = Arc::new(AtomicUsize::new(0));

    let listener_hits = Arc::clone(&hits);
    reader.add_shutdown_listener(Box::new(move |_| {
        listener_hits.fetch_add(1, Ordering::SeqCst);
    }));
    reader.await_started().await;

    assert!(sender.send(Command::Shutdown));
    // Yield until the dispatch task has delivered.
    while hits.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn shutdown_and_skip_listeners_are_independent() {
    let (sender, reader) = command_channel();
    let log = Arc::new(Mutex::new(Vec::new()));

    let shutdown_log = Arc::clone(&log);
    reader.add_shutdown_listener(Box::new(move |_| {
        shutdown_log.lock().unwrap().push("shutdown");
    }));
    let skip_log = Arc::clone(&log);
    reader.add_skip_next_tests_listener(Box::new(move |_| {
        skip_log.lock().unwrap().push("skip");
    }));
    reader.await_started().await;

    assert!(sender.send(Command::SkipNextTests));
    assert!(sender.send(Command::Shutdown));

    while log.lock().unwrap().len() < 2 {
        tokio::task::yield_now().await;
    }
    // Observed in delivery order.
    assert_eq!(*log.lock().unwrap(), vec!["skip", "shutdown"]);
}

#[tokio::test]
async fn commands_sent_before_registration_are_replayed() {
    let (sender, reader) = command_channel();
    assert!(sender.send(Command::Shutdown));
    reader.await_started().await;
    // Let the dispatch task consume the queued command first.
    tokio::task::yield_now().await;

    let hits = Arc::new(AtomicUsize::new(0));
    let listener_hits = Arc::clone(&hits);
    reader.add_shutdown_listener(Box::new(move |_| {
        listener_hits.fetch_add(1, Ordering::SeqCst);
    }));

    // Sticky replay fires synchronously at registration.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn noop_commands_have_no_effect() {
    let (sender, reader) = command_channel();
    let hits = Arc::new(AtomicUsize::new(0));

    let shutdown_hits = Arc::clone(&hits);
    reader.add_shutdown_listener(Box::new(move |_| {
        shutdown_hits.fetch_add(1, Ordering::SeqCst);
    }));
    let skip_hits = Arc::clone(&hits);
    reader.add_skip_next_tests_listener(Box::new(move |_| {
        skip_hits.fetch_add(1, Ordering::SeqCst);
    }));
    reader.await_started().await;

    assert!(sender.send(Command::Noop));
    assert!(sender.send(Command::Noop));
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sending_after_the_reader_is_dropped_fails() {
    let (sender, reader) = command_channel();
    reader.await_started().await;
    drop(reader);
    // The dispatch task shuts down; the channel eventually rejects sends.
    for _ in 0..100 {
        tokio::task::yield_now().await;
        if !sender.send(Command::Noop) {
            return;
        }
    }
    panic!("sender never observed the dispatch task shutting down");
}

#[tokio::test]
async fn await_started_is_reentrant() {
    let (_sender, reader) = command_channel();
    reader.await_started().await;
    reader.await_started().await;
}
