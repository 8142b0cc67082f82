//! Performance benchmarks for matchmaking hot paths

use client::game::evaluate_guess;
use server::coordinator::{MatchCoordinator, MatchStatus};
use server::leaderboard::Leaderboard;
use server::queue::MatchQueue;
use server::transport::ChannelTransport;
use server::words::WordList;
use shared::{ClientEvent, ConnectionId, ServerEvent, MAX_ATTEMPTS};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

type Inbox = mpsc::UnboundedReceiver<ServerEvent>;

fn coordinator_with(connections: u64) -> (MatchCoordinator, ChannelTransport, Vec<Inbox>) {
    let mut coordinator = MatchCoordinator::new(
        Box::new(WordList::builtin()),
        connections as usize,
        Duration::from_secs(300),
    );
    let mut transport = ChannelTransport::new();
    let mut inboxes = Vec::with_capacity(connections as usize);

    for id in 1..=connections {
        let (tx, rx) = mpsc::unbounded_channel();
        transport.attach(id, tx);
        let addr = "127.0.0.1:9000".parse().unwrap();
        assert!(coordinator.connect(id, addr, &mut transport));
        inboxes.push(rx);
    }
    (coordinator, transport, inboxes)
}

/// Benchmarks pairing a large lobby
#[test]
fn benchmark_pairing() {
    let connections: u64 = 4_000;
    let (mut coordinator, mut transport, _inboxes) = coordinator_with(connections);

    let start = Instant::now();
    let mut started = 0;
    for id in 1..=connections {
        if let Ok(MatchStatus::Started(_)) = coordinator.request_match(id, "", &mut transport) {
            started += 1;
        }
    }
    let duration = start.elapsed();

    println!(
        "Pairing: {} connections in {:?} ({:.2} μs/request)",
        connections,
        duration,
        duration.as_micros() as f64 / connections as f64
    );

    assert_eq!(started, connections / 2);
    assert_eq!(coordinator.sessions().len(), (connections / 2) as usize);
    assert!(coordinator.queue().is_empty());

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks session ids for uniqueness under load
#[test]
fn benchmark_session_id_uniqueness() {
    let connections: u64 = 4_000;
    let (mut coordinator, mut transport, _inboxes) = coordinator_with(connections);

    for id in 1..=connections {
        let _ = coordinator.request_match(id, "", &mut transport);
    }

    let ids: HashSet<&str> = coordinator.sessions().iter().map(|s| s.id().as_str()).collect();
    assert_eq!(ids.len(), (connections / 2) as usize);
    assert!(ids.iter().all(|id| id.starts_with("room-")));
}

/// Benchmarks full games from pairing to verdict
#[test]
fn benchmark_full_games() {
    let connections: u64 = 2_000;
    let (mut coordinator, mut transport, mut inboxes) = coordinator_with(connections);

    let start = Instant::now();
    for id in (1..=connections).step_by(2) {
        for player in [id, id + 1] {
            let find = ClientEvent::FindGame {
                name: format!("P{}", player),
            };
            coordinator.handle_event(player, find, &mut transport);
        }

        if id % 4 == 1 {
            coordinator.handle_event(id, ClientEvent::IWon { attempts: 3 }, &mut transport);
        } else {
            let exhausted = ClientEvent::AllAttemptsUsed {
                attempts: MAX_ATTEMPTS,
            };
            coordinator.handle_event(id, exhausted.clone(), &mut transport);
            coordinator.handle_event(id + 1, exhausted, &mut transport);
        }
    }
    let duration = start.elapsed();

    println!(
        "Full games: {} games in {:?} ({:.2} μs/game)",
        connections / 2,
        duration,
        duration.as_micros() as f64 / (connections / 2) as f64
    );

    assert!(coordinator.sessions().iter().all(|s| !s.is_playing()));
    assert_eq!(coordinator.leaderboard().len(), 10);

    let delivered: usize = inboxes
        .iter_mut()
        .map(|rx| std::iter::from_fn(|| rx.try_recv().ok()).count())
        .sum();
    assert!(delivered > 0);

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks leaderboard credit with many competing names
#[test]
fn benchmark_leaderboard_updates() {
    let mut leaderboard = Leaderboard::default();
    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let name = format!("Player{}", i % 25);
        leaderboard.record_win(&name);
    }

    let duration = start.elapsed();
    println!(
        "Leaderboard: {} wins in {:?} ({:.2} ns/win)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert_eq!(leaderboard.len(), 10);
    assert!(leaderboard
        .entries()
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks queue churn: join, leave, rejoin
#[test]
fn benchmark_queue_churn() {
    let mut queue = MatchQueue::new();
    let iterations: ConnectionId = 10_000;
    let start = Instant::now();

    for id in 0..iterations {
        queue.enqueue(id);
        if id % 3 == 0 {
            queue.remove(id);
        }
        if id % 7 == 0 {
            let _ = queue.dequeue_pair();
        }
    }

    let duration = start.elapsed();
    println!(
        "Queue churn: {} operations in {:?}, {} left waiting",
        iterations,
        duration,
        queue.len()
    );

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks local guess evaluation
#[test]
fn benchmark_guess_evaluation() {
    let guesses = ["trace", "eerie", "crate", "fjord", "abbey"];
    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let tiles = evaluate_guess("crate", guesses[i % guesses.len()]);
        assert_eq!(tiles.len(), 5);
    }

    let duration = start.elapsed();
    println!(
        "Guess evaluation: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}
