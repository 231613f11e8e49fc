//! Tests for the fixed-capacity session store.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use hand_cricket::{
    GameEngine, HardPolicy, Phase, Role, Rules, ScriptedRandom, SessionStore, StoreError, TossCall,
    WELCOME_MESSAGE,
};

#[test]
fn test_unknown_token_gets_fresh_session() {
    let store = SessionStore::default();
    let resolved = store.resolve(Some("not-a-real-token")).expect("Resolve failed");

    assert!(resolved.created());
    assert_ne!(resolved.token(), "not-a-real-token");
    let session = resolved.lock();
    assert_eq!(*session.state().phase(), Phase::Menu);
    assert_eq!(session.state().message(), WELCOME_MESSAGE);
    assert_eq!(session.token(), resolved.token());
}

#[test]
fn test_known_token_returns_same_session() {
    let store = SessionStore::default();
    let engine = GameEngine::default();

    let first = store.resolve(None).expect("Resolve failed");
    engine.start_new_game(first.lock().state_mut());

    let again = store.resolve(Some(first.token())).expect("Resolve failed");
    assert!(!again.created());
    assert_eq!(again.token(), first.token());
    assert_eq!(*again.lock().state().phase(), Phase::AwaitingTossCall);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_tokens_are_distinct() {
    let store = SessionStore::new(50, Duration::from_secs(3600));
    let tokens: HashSet<String> = (0..50)
        .map(|_| store.resolve(None).expect("Resolve failed").token().to_string())
        .collect();
    assert_eq!(tokens.len(), 50);
    assert_eq!(store.tokens().len(), 50);
}

#[test]
fn test_full_store_without_expired_sessions_is_exhausted() {
    let store = SessionStore::new(2, Duration::from_secs(3600));
    let first = store.resolve(None).expect("Resolve failed");
    store.resolve(None).expect("Resolve failed");

    let err = store.resolve(None).unwrap_err();
    assert_eq!(err, StoreError::PoolExhausted { capacity: 2 });
    assert_eq!(store.len(), 2);

    // Live sessions are still reachable.
    let again = store.resolve(Some(first.token())).expect("Resolve failed");
    assert!(!again.created());
}

#[test]
fn test_full_store_reclaims_oldest_expired_session() {
    let store = SessionStore::new(2, Duration::from_secs(60));
    let start = Utc::now();

    let oldest = store.resolve_at(None, start).expect("Resolve failed");
    let newer = store
        .resolve_at(None, start + chrono::Duration::seconds(30))
        .expect("Resolve failed");

    let later = start + chrono::Duration::seconds(100);
    let fresh = store.resolve_at(None, later).expect("Resolve failed");
    assert!(fresh.created());

    let tokens = store.tokens();
    assert_eq!(tokens.len(), 2);
    assert!(!tokens.contains(&oldest.token().to_string()));
    assert!(tokens.contains(&newer.token().to_string()));
    assert!(tokens.contains(&fresh.token().to_string()));
}

#[test]
fn test_concurrent_resolution_respects_capacity() {
    let store = Arc::new(SessionStore::new(8, Duration::from_secs(3600)));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.resolve(None).map(|r| r.token().to_string()))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();

    let created: HashSet<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    let exhausted = results.iter().filter(|r| r.is_err()).count();
    assert_eq!(created.len(), 8);
    assert_eq!(exhausted, 8);
    assert_eq!(store.len(), 8);
}

#[test]
fn test_concurrent_rounds_on_separate_sessions() {
    let store = SessionStore::default();
    let engine = GameEngine::default();

    let tokens: Vec<String> = (0..4)
        .map(|_| store.resolve(None).expect("Resolve failed").token().to_string())
        .collect();

    thread::scope(|scope| {
        for token in &tokens {
            let store = &store;
            let engine = &engine;
            scope.spawn(move || {
                let resolved = store.resolve(Some(token)).expect("Resolve failed");
                let mut session = resolved.lock();
                engine.start_new_game(session.state_mut());
            });
        }
    });

    for token in &tokens {
        let resolved = store.resolve(Some(token)).expect("Resolve failed");
        assert!(!resolved.created());
        assert_eq!(*resolved.lock().state().phase(), Phase::AwaitingTossCall);
    }
}

#[test]
fn test_concurrent_rounds_on_one_session_are_serialized() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 25;

    let store = SessionStore::default();
    let engine = GameEngine::new(Rules::new(5, THREADS * ROUNDS * 2, HardPolicy::Varied));

    let token = {
        let resolved = store.resolve(None).expect("Resolve failed");
        let mut session = resolved.lock();
        let state = session.state_mut();
        engine.start_new_game(state);
        engine
            .call_toss(state, TossCall::Head, &mut ScriptedRandom::new([0]))
            .expect("Toss failed");
        engine.choose_role(state, Role::Bowl).expect("Role choice failed");
        resolved.token().to_string()
    };

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let (store, engine, token) = (&store, &engine, token.as_str());
            scope.spawn(move || {
                // The opponent always plays 7 against the player's 2.
                let mut rng = ScriptedRandom::new(std::iter::repeat_n(7, ROUNDS));
                for _ in 0..ROUNDS {
                    let resolved = store.resolve(Some(token)).expect("Resolve failed");
                    assert!(!resolved.created());
                    let mut session = resolved.lock();
                    engine
                        .play_round(session.state_mut(), 2, &mut rng)
                        .expect("Round failed");
                }
            });
        }
    });

    let resolved = store.resolve(Some(&token)).expect("Resolve failed");
    let session = resolved.lock();
    let state = session.state();
    assert_eq!(state.move_history().len(), THREADS * ROUNDS);
    assert_eq!(*state.opponent_score(), (THREADS * ROUNDS * 7) as u32);
    assert_eq!(*state.repeat_count(), (THREADS * ROUNDS) as u32);
    assert_eq!(*state.phase(), Phase::InningsActive);
    assert_eq!(store.len(), 1);
}
