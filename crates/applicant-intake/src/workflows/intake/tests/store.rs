use chrono::Duration;

use super::common::now;
use crate::workflows::intake::domain::{ChatId, Session, Step};
use crate::workflows::intake::store::{InMemorySessionStore, SessionStore};

#[test]
fn upsert_get_and_delete_round_through_the_store() {
    let store = InMemorySessionStore::default();
    let chat = ChatId(7);
    assert!(store.get(chat).expect("get").is_none());

    let mut session = Session::new(now());
    session.step = Step::AwaitingDob;
    store.upsert(chat, session.clone()).expect("upsert");
    assert_eq!(store.get(chat).expect("get"), Some(session.clone()));
    assert_eq!(store.count().expect("count"), 1);

    assert_eq!(store.delete(chat).expect("delete"), Some(session));
    assert!(store.get(chat).expect("get").is_none());
    assert_eq!(store.delete(chat).expect("delete"), None);
}

#[test]
fn evict_idle_only_removes_sessions_older_than_cutoff() {
    let store = InMemorySessionStore::default();
    let stale = Session::new(now() - Duration::days(10));
    let fresh = Session::new(now() - Duration::hours(1));
    store.upsert(ChatId(1), stale).expect("upsert stale");
    store.upsert(ChatId(2), fresh).expect("upsert fresh");

    let evicted = store
        .evict_idle(now() - Duration::days(7))
        .expect("evict");

    assert_eq!(evicted, 1);
    assert!(store.get(ChatId(1)).expect("get").is_none());
    assert!(store.get(ChatId(2)).expect("get").is_some());
}

#[test]
fn clones_share_the_same_sessions() {
    let store = InMemorySessionStore::default();
    let handle = store.clone();
    store
        .upsert(ChatId(3), Session::new(now()))
        .expect("upsert");
    assert_eq!(handle.count().expect("count"), 1);
}
