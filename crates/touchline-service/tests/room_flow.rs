mod common;

use chrono::{Duration, Utc};

use touchline_core::ErrorKind;
use touchline_core::config::realtime::RealtimeConfig;
use touchline_core::config::room::RoomConfig;
use touchline_entity::{RoomSettings, RoomStatus};
use touchline_store::StateStore;

use common::{Harness, catalog, create, join};

fn harness() -> Harness {
    Harness::new(catalog(&[]))
}

#[tokio::test]
async fn test_create_join_capacity_and_host_handover() {
    let h = harness();
    let mut alice = h.connect("a").await;
    let mut bob = h.connect("b").await;
    let _carol = h.connect("c").await;

    let mut req = create("R", "alice");
    req.settings = Some(RoomSettings {
        max_users: 2,
        ..Default::default()
    });
    let snapshot = h.rooms.create_room("a", req).await.unwrap();
    assert_eq!(snapshot.host_id, "a");

    let snapshot = h.rooms.join_room("b", join("R", "bob")).await.unwrap();
    assert_eq!(snapshot.members.len(), 2);
    assert_eq!(snapshot.host_id, "a");

    let err = h.rooms.join_room("c", join("R", "carol")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Capacity);
    assert!(h.store.get_user("c").await.unwrap().is_none());

    let updates = alice.drain_of("roomStateUpdate");
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1]["payload"]["members"][1]["username"], "bob");
    assert_eq!(bob.drain_of("roomStateUpdate").len(), 1);

    h.rooms.leave_room("a").await.unwrap();
    let room = h.store.get_room("R").await.unwrap().unwrap();
    assert_eq!(room.host_id, "b");
    assert!(room.members["b"].is_host);
    let update = bob.drain_of("roomStateUpdate").pop().unwrap();
    assert_eq!(update["payload"]["hostId"], "b");

    h.rooms.leave_room("b").await.unwrap();
    assert!(h.store.get_room("R").await.unwrap().is_none());
    assert!(h.store.get_user("b").await.unwrap().is_none());
}

#[tokio::test]
async fn test_default_capacity_is_four() {
    let h = harness();
    h.rooms.create_room("u0", create("R", "u0")).await.unwrap();
    for i in 1..4 {
        h.rooms.join_room(&format!("u{i}"), join("R", "x")).await.unwrap();
    }
    let err = h.rooms.join_room("u4", join("R", "x")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Capacity);
}

#[tokio::test]
async fn test_leave_is_idempotent() {
    let h = harness();
    h.rooms.create_room("a", create("R", "alice")).await.unwrap();
    h.rooms.join_room("b", join("R", "bob")).await.unwrap();

    h.rooms.leave_room("b").await.unwrap();
    let after_first = h.store.get_room("R").await.unwrap().unwrap();
    h.rooms.leave_room("b").await.unwrap();
    let after_second = h.store.get_room("R").await.unwrap().unwrap();
    assert_eq!(after_first.members.len(), after_second.members.len());
    assert_eq!(after_second.host_id, "a");

    h.rooms.leave_room("nobody").await.unwrap();
}

#[tokio::test]
async fn test_private_room_checks_password() {
    let h = harness();
    let mut req = create("R", "alice");
    req.password = Some("pw".into());
    req.private = true;
    h.rooms.create_room("a", req).await.unwrap();

    let err = h.rooms.join_room("b", join("R", "bob")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let mut ok = join("R", "bob");
    ok.password = Some("pw".into());
    h.rooms.join_room("b", ok).await.unwrap();
}

#[tokio::test]
async fn test_create_rejects_duplicate_and_empty_ids() {
    let h = harness();
    h.rooms.create_room("a", create("R", "alice")).await.unwrap();
    let err = h.rooms.create_room("b", create("R", "bob")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    let err = h.rooms.create_room("b", create("  ", "bob")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_joining_elsewhere_leaves_previous_room() {
    let h = harness();
    h.rooms.create_room("a", create("R1", "alice")).await.unwrap();
    h.rooms.create_room("b", create("R2", "bob")).await.unwrap();
    h.rooms.join_room("a", join("R2", "alice")).await.unwrap();

    assert!(h.store.get_room("R1").await.unwrap().is_none());
    let user = h.store.get_user("a").await.unwrap().unwrap();
    assert_eq!(user.room_id, "R2");
    assert!(!user.is_host);
}

#[tokio::test]
async fn test_rejected_join_keeps_current_room() {
    let h = harness();
    h.rooms.create_room("a", create("R1", "alice")).await.unwrap();
    h.rooms.join_room("b", join("R1", "bob")).await.unwrap();

    let mut full = create("R2", "carol");
    full.settings = Some(RoomSettings {
        max_users: 1,
        ..Default::default()
    });
    h.rooms.create_room("c", full).await.unwrap();
    let err = h.rooms.join_room("b", join("R2", "bob")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Capacity);

    let mut locked = create("R3", "dave");
    locked.password = Some("pw".into());
    locked.private = true;
    h.rooms.create_room("d", locked).await.unwrap();
    let err = h.rooms.join_room("b", join("R3", "bob")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let err = h.rooms.join_room("b", join("nowhere", "bob")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let room = h.store.get_room("R1").await.unwrap().unwrap();
    assert_eq!(room.members.len(), 2);
    assert_eq!(room.host_id, "a");
    let bob = h.store.get_user("b").await.unwrap().unwrap();
    assert_eq!(bob.room_id, "R1");
}

#[tokio::test]
async fn test_rejected_create_keeps_current_room() {
    let h = harness();
    let mut alice = h.connect("a").await;
    h.rooms.create_room("a", create("R1", "alice")).await.unwrap();
    h.rooms.create_room("c", create("R2", "carol")).await.unwrap();
    alice.drain();

    let err = h.rooms.create_room("a", create("R2", "alice")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let room = h.store.get_room("R1").await.unwrap().unwrap();
    assert!(room.is_host("a"));
    assert_eq!(h.store.get_user("a").await.unwrap().unwrap().room_id, "R1");
    assert!(alice.drain().is_empty());
}

#[tokio::test]
async fn test_host_only_operations() {
    let h = harness();
    let mut bob = h.connect("b").await;
    h.rooms.create_room("a", create("R", "alice")).await.unwrap();
    h.rooms.join_room("b", join("R", "bob")).await.unwrap();
    bob.drain();

    let err = h.rooms.kick_user("b", "a").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    let err = h.rooms.transfer_host("b", "b").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    let err = h.rooms.set_settings("b", RoomSettings::default()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    let err = h.rooms.start_phase("b", "IN_PROGRESS").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    // rejected requests change nothing and emit nothing
    assert!(bob.drain().is_empty());
    assert_eq!(h.store.get_room("R").await.unwrap().unwrap().host_id, "a");
}

#[tokio::test]
async fn test_kick_removes_target_and_notifies_it() {
    let h = harness();
    let mut alice = h.connect("a").await;
    let mut bob = h.connect("b").await;
    h.rooms.create_room("a", create("R", "alice")).await.unwrap();
    h.rooms.join_room("b", join("R", "bob")).await.unwrap();
    alice.drain();
    bob.drain();

    assert_eq!(h.rooms.kick_user("a", "a").await.unwrap_err().kind, ErrorKind::Validation);
    assert_eq!(h.rooms.kick_user("a", "ghost").await.unwrap_err().kind, ErrorKind::NotFound);

    h.rooms.kick_user("a", "b").await.unwrap();
    let frames = bob.drain();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "kicked");
    assert_eq!(frames[0]["payload"]["roomId"], "R");
    assert!(h.store.get_user("b").await.unwrap().is_none());

    let update = alice.drain_of("roomStateUpdate").pop().unwrap();
    assert_eq!(update["payload"]["members"].as_array().unwrap().len(), 1);

    // the kicked user no longer receives room traffic
    h.rooms.chat("a", "still here?").await.unwrap();
    assert!(bob.drain().is_empty());
}

#[tokio::test]
async fn test_transfer_host_updates_flags() {
    let h = harness();
    h.rooms.create_room("a", create("R", "alice")).await.unwrap();
    h.rooms.join_room("b", join("R", "bob")).await.unwrap();

    let err = h.rooms.transfer_host("a", "ghost").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    h.rooms.transfer_host("a", "b").await.unwrap();
    let room = h.store.get_room("R").await.unwrap().unwrap();
    assert_eq!(room.host_id, "b");
    assert!(h.store.get_user("b").await.unwrap().unwrap().is_host);
    assert!(!h.store.get_user("a").await.unwrap().unwrap().is_host);
}

#[tokio::test]
async fn test_ready_chat_history_and_analytics() {
    let h = harness();
    let mut alice = h.connect("a").await;
    let mut bob = h.connect("b").await;
    h.rooms.create_room("a", create("R", "alice")).await.unwrap();
    h.rooms.join_room("b", join("R", "bob")).await.unwrap();

    h.rooms.set_ready("b", true).await.unwrap();
    assert!(h.store.get_user("b").await.unwrap().unwrap().ready);

    assert_eq!(h.rooms.chat("a", "   ").await.unwrap_err().kind, ErrorKind::Validation);
    h.rooms.chat("a", "hello").await.unwrap();
    h.rooms.chat("b", "hi").await.unwrap();
    let chats = bob.drain_of("chatMessage");
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0]["payload"]["username"], "alice");
    assert_eq!(chats[0]["payload"]["message"], "hello");
    alice.drain();

    let history = h.rooms.chat_history("a").await.unwrap();
    assert_eq!(history.len(), 2);
    let frames = alice.drain();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "getChatHistory");
    assert_eq!(frames[0]["payload"]["messages"][1]["message"], "hi");
    assert!(bob.drain().is_empty());

    assert_eq!(h.rooms.analytics("b").await.unwrap(), (2, 2));
    let frames = bob.drain();
    assert_eq!(frames[0]["payload"]["totalMessages"], 2);
    assert_eq!(frames[0]["payload"]["totalUsers"], 2);
    assert!(alice.drain().is_empty());
}

#[tokio::test]
async fn test_requests_from_unknown_users_are_not_found() {
    let h = harness();
    assert_eq!(h.rooms.chat("ghost", "x").await.unwrap_err().kind, ErrorKind::NotFound);
    assert_eq!(h.rooms.set_ready("ghost", true).await.unwrap_err().kind, ErrorKind::NotFound);
    assert_eq!(
        h.rooms.join_room("ghost", join("missing", "g")).await.unwrap_err().kind,
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_list_rooms_hides_private_and_full() {
    let h = harness();
    let mut lobby = h.connect("lobby").await;
    h.rooms.create_room("a", create("open", "alice")).await.unwrap();

    let mut private = create("secret", "bob");
    private.private = true;
    private.password = Some("pw".into());
    h.rooms.create_room("b", private).await.unwrap();

    let mut tiny = create("tiny", "carol");
    tiny.settings = Some(RoomSettings {
        max_users: 1,
        ..Default::default()
    });
    h.rooms.create_room("c", tiny).await.unwrap();

    let rooms = h.rooms.list_rooms("lobby").await.unwrap();
    let ids: Vec<_> = rooms.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["open"]);
    assert_eq!(rooms[0].max_users, 4);

    let frames = lobby.drain();
    assert_eq!(frames[0]["type"], "listRooms");
    assert_eq!(frames[0]["payload"]["rooms"][0]["id"], "open");
}

#[tokio::test]
async fn test_start_phase_changes_status() {
    let h = harness();
    h.rooms.create_room("a", create("R", "alice")).await.unwrap();
    assert_eq!(h.rooms.start_phase("a", "paused").await.unwrap(), RoomStatus::Paused);
    assert_eq!(h.store.get_room("R").await.unwrap().unwrap().status, RoomStatus::Paused);
    let err = h.rooms.start_phase("a", "drafting").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_host_invariant_holds_through_churn() {
    let h = harness();
    h.rooms.create_room("u1", create("R", "one")).await.unwrap();
    h.rooms.join_room("u2", join("R", "two")).await.unwrap();
    h.rooms.join_room("u3", join("R", "three")).await.unwrap();
    h.rooms.leave_room("u1").await.unwrap();
    h.rooms.join_room("u4", join("R", "four")).await.unwrap();
    h.rooms.leave_room("u2").await.unwrap();

    let room = h.store.get_room("R").await.unwrap().unwrap();
    assert!(room.members.contains_key(&room.host_id));
    assert_eq!(room.host_id, "u3");
    let hosts: Vec<_> = room.members.values().filter(|m| m.is_host).collect();
    assert_eq!(hosts.len(), 1);
}

#[tokio::test]
async fn test_sweep_removes_only_idle_rooms() {
    let h = harness();
    let mut alice = h.connect("a").await;
    h.rooms.create_room("a", create("R", "alice")).await.unwrap();
    alice.drain();

    let now = Utc::now();
    assert_eq!(h.rooms.sweep_expired(now + Duration::minutes(10)).await.unwrap(), 0);
    assert_eq!(h.rooms.sweep_expired(now + Duration::minutes(31)).await.unwrap(), 1);

    assert!(h.store.get_room("R").await.unwrap().is_none());
    assert!(h.store.get_user("a").await.unwrap().is_none());
    let frames = alice.drain();
    assert_eq!(frames[0]["type"], "roomClosed");
    assert_eq!(frames[0]["payload"]["reason"], "expired");
}

#[tokio::test]
async fn test_disconnect_runs_leave() {
    let h = Harness::with_config(catalog(&[]), RoomConfig::default(), RealtimeConfig::default());
    h.rooms.create_room("a", create("R", "alice")).await.unwrap();
    h.rooms.join_room("b", join("R", "bob")).await.unwrap();
    h.router.disconnect("a").await;
    let room = h.store.get_room("R").await.unwrap().unwrap();
    assert_eq!(room.host_id, "b");
    assert_eq!(room.members.len(), 1);
}
