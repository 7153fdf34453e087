mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};

use touchline_core::ErrorKind;
use touchline_entity::RoomStatus;
use touchline_realtime::message::inbound::LotRequest;
use touchline_service::AuctionPhase;
use touchline_store::{StateStore, TeamLedger};

use common::{FailingCatalog, Harness, catalog, create, join, lot};

/// Past one bid window.
const WINDOW: Duration = Duration::from_secs(11);

async fn room_with_two(h: &Harness) {
    h.rooms.create_room("a", create("R", "alice")).await.unwrap();
    h.rooms.join_room("b", join("R", "bob")).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_single_item_sold_to_first_highest_bidder() {
    let h = Harness::new(catalog(&[("Keeper", "GK")]));
    let mut alice = h.connect("a").await;
    let mut bob = h.connect("b").await;
    room_with_two(&h).await;
    alice.drain();
    bob.drain();

    h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap();
    let frames = bob.drain();
    let types: Vec<_> = frames.iter().map(|f| f["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["auctionPlayer", "bidHistory", "roomStateUpdate"]);
    assert_eq!(frames[0]["payload"]["position"], "GK");
    assert_eq!(frames[0]["payload"]["item"]["Name"], "Keeper");
    assert_eq!(frames[1]["payload"]["bids"].as_array().unwrap().len(), 0);
    assert_eq!(frames[2]["payload"]["status"], "IN_PROGRESS");

    assert!(h.rooms.place_bid("b", 100).await.unwrap());
    assert!(!h.rooms.place_bid("a", 100).await.unwrap());
    assert!(!h.rooms.place_bid("a", 50).await.unwrap());

    let history = alice.drain_of("bidHistory");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["payload"]["bids"][0]["userId"], "b");
    assert_eq!(history[0]["payload"]["bids"][0]["amount"], 100);

    tokio::time::sleep(WINDOW).await;

    let frames = alice.drain();
    let sold: Vec<_> = frames.iter().filter(|f| f["type"] == "playerSold").collect();
    assert_eq!(sold.len(), 1);
    assert_eq!(sold[0]["payload"]["winner"], "b");
    assert_eq!(sold[0]["payload"]["bid"], 100);
    assert_eq!(sold[0]["payload"]["item"]["Name"], "Keeper");
    let types: Vec<_> = frames.iter().map(|f| f["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["playerSold", "auctionComplete", "roomStateUpdate"]);
    assert_eq!(frames[1]["payload"]["roomId"], "R");
    assert_eq!(frames[2]["payload"]["status"], "FINISHED");

    let team = h.ledger.team("R", "b").await.unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].name, "Keeper");
    assert!(h.ledger.team("R", "a").await.unwrap().is_empty());

    let snapshot = h.auctions.snapshot("R").await.unwrap();
    assert_eq!(snapshot.phase, AuctionPhase::Complete);
    assert!(!h.rooms.place_bid("b", 500).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_lots_advance_without_bids() {
    let h = Harness::new(catalog(&[("Keeper", "GK"), ("Stopper", "CB")]));
    let mut alice = h.connect("a").await;
    room_with_two(&h).await;

    h.rooms
        .start_auction("a", &[lot("GK", 1), lot("CB", 1)])
        .await
        .unwrap();
    alice.drain();

    tokio::time::sleep(WINDOW).await;
    let frames = alice.drain();
    let types: Vec<_> = frames.iter().map(|f| f["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["playerSold", "auctionPlayer", "bidHistory"]);
    assert_eq!(frames[0]["payload"]["winner"], "");
    assert_eq!(frames[0]["payload"]["bid"], 0);
    assert_eq!(frames[1]["payload"]["position"], "CB");
    assert_eq!(frames[1]["payload"]["item"]["Name"], "Stopper");
    assert!(frames[2]["payload"]["bids"].as_array().unwrap().is_empty());

    tokio::time::sleep(Duration::from_secs(10)).await;
    let types: Vec<_> = alice
        .drain()
        .iter()
        .map(|f| f["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types, ["playerSold", "auctionComplete", "roomStateUpdate"]);
    assert!(h.ledger.team("R", "a").await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_bids_reset_between_items() {
    let h = Harness::new(catalog(&[("Keeper A", "GK"), ("Keeper B", "GK")]));
    room_with_two(&h).await;
    h.rooms.start_auction("a", &[lot("GK", 2)]).await.unwrap();

    assert!(h.rooms.place_bid("a", 300).await.unwrap());
    tokio::time::sleep(WINDOW).await;

    let snapshot = h.auctions.snapshot("R").await.unwrap();
    assert_eq!(snapshot.phase, AuctionPhase::OnBlock);
    assert_eq!(snapshot.current_bid, 0);
    assert!(snapshot.current_bidder.is_empty());
    assert!(snapshot.bids.is_empty());
    // a lower bid is fine on the fresh item
    assert!(h.rooms.place_bid("b", 10).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_stale_finalize_is_ignored() {
    let h = Harness::new(catalog(&[("Keeper A", "GK"), ("Keeper B", "GK")]));
    let mut alice = h.connect("a").await;
    room_with_two(&h).await;
    h.rooms.start_auction("a", &[lot("GK", 2)]).await.unwrap();

    let first = h.auctions.snapshot("R").await.unwrap();
    h.auctions.finalize("R", first.item_seq + 7).await;
    assert_eq!(h.auctions.snapshot("R").await.unwrap().item_seq, first.item_seq);

    tokio::time::sleep(WINDOW).await;
    let second = h.auctions.snapshot("R").await.unwrap();
    assert_eq!(second.item_seq, first.item_seq + 1);
    alice.drain();

    // the first item's timer firing late must not close the second item
    h.auctions.finalize("R", first.item_seq).await;
    let after = h.auctions.snapshot("R").await.unwrap();
    assert_eq!(after.phase, AuctionPhase::OnBlock);
    assert_eq!(after.item_seq, second.item_seq);
    assert!(alice.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_manual_finalize_closes_current_item_once() {
    let h = Harness::new(catalog(&[("Keeper", "GK")]));
    let mut alice = h.connect("a").await;
    room_with_two(&h).await;
    h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap();
    alice.drain();

    let seq = h.auctions.snapshot("R").await.unwrap().item_seq;
    h.auctions.finalize("R", seq).await;
    tokio::time::sleep(WINDOW).await;

    assert_eq!(alice.drain_of("playerSold").len(), 1);
}

#[tokio::test]
async fn test_catalog_failure_leaves_no_auction() {
    let h = Harness::new(Arc::new(FailingCatalog));
    room_with_two(&h).await;
    let err = h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Catalog);
    assert!(h.auctions.snapshot("R").await.is_none());
    let room = h.store.get_room("R").await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Waiting);
}

#[tokio::test]
async fn test_empty_pool_is_rejected() {
    let h = Harness::new(catalog(&[("Keeper", "GK")]));
    room_with_two(&h).await;
    let err = h.rooms.start_auction("a", &[lot("ST", 2)]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!h.auctions.is_running("R").await);
}

#[tokio::test(start_paused = true)]
async fn test_empty_lots_are_skipped() {
    let h = Harness::new(catalog(&[("Keeper", "GK")]));
    room_with_two(&h).await;
    h.rooms
        .start_auction("a", &[lot("ST", 2), lot("GK", 1)])
        .await
        .unwrap();
    let snapshot = h.auctions.snapshot("R").await.unwrap();
    assert_eq!(snapshot.position.as_deref(), Some("GK"));
}

#[tokio::test(start_paused = true)]
async fn test_any_position_lot_draws_from_whole_catalog() {
    let h = Harness::new(catalog(&[("Keeper", "GK"), ("Striker", "ST")]));
    room_with_two(&h).await;
    let any = LotRequest {
        position: None,
        count: 2,
    };
    h.rooms.start_auction("a", &[any]).await.unwrap();
    let snapshot = h.auctions.snapshot("R").await.unwrap();
    assert_eq!(snapshot.position.as_deref(), Some("ANY"));
}

#[tokio::test(start_paused = true)]
async fn test_only_one_auction_per_room() {
    let h = Harness::new(catalog(&[("Keeper", "GK")]));
    room_with_two(&h).await;

    let err = h.rooms.start_auction("b", &[lot("GK", 1)]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap();
    let err = h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    tokio::time::sleep(WINDOW).await;
    assert!(!h.auctions.is_running("R").await);
    // a finished auction can be replaced
    h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap();
    assert!(h.auctions.is_running("R").await);
}

#[tokio::test(start_paused = true)]
async fn test_completed_auction_finishes_room() {
    let h = Harness::new(catalog(&[("Keeper", "GK")]));
    room_with_two(&h).await;
    h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap();
    let room = h.store.get_room("R").await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::InProgress);

    tokio::time::sleep(WINDOW).await;
    let room = h.store.get_room("R").await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::Finished);

    h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap();
    let room = h.store.get_room("R").await.unwrap().unwrap();
    assert_eq!(room.status, RoomStatus::InProgress);
}

#[tokio::test(start_paused = true)]
async fn test_accepted_bid_counts_as_activity() {
    let h = Harness::new(catalog(&[("Keeper", "GK")]));
    room_with_two(&h).await;
    h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap();

    let mut room = h.store.get_room("R").await.unwrap().unwrap();
    let stale = Utc::now() - ChronoDuration::minutes(45);
    room.last_activity = stale;
    h.store.save_room(&room).await.unwrap();

    assert!(!h.rooms.place_bid("b", 0).await.unwrap());
    assert_eq!(h.store.get_room("R").await.unwrap().unwrap().last_activity, stale);

    assert!(h.rooms.place_bid("b", 20).await.unwrap());
    assert_eq!(h.rooms.sweep_expired(Utc::now()).await.unwrap(), 0);
    assert!(h.auctions.is_running("R").await);
}

#[tokio::test(start_paused = true)]
async fn test_late_joiner_gets_item_and_bids() {
    let h = Harness::new(catalog(&[("Keeper", "GK")]));
    let mut carol = h.connect("c").await;
    room_with_two(&h).await;
    h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap();
    assert!(h.rooms.place_bid("b", 40).await.unwrap());

    h.rooms.join_room("c", join("R", "carol")).await.unwrap();
    let frames = carol.drain();
    let types: Vec<_> = frames.iter().map(|f| f["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["roomStateUpdate", "auctionPlayer", "bidHistory"]);
    assert_eq!(frames[2]["payload"]["bids"][0]["amount"], 40);
}

#[tokio::test(start_paused = true)]
async fn test_room_destruction_aborts_auction() {
    let h = Harness::new(catalog(&[("Keeper", "GK")]));
    let mut bob = h.connect("b").await;
    room_with_two(&h).await;
    h.rooms.start_auction("a", &[lot("GK", 1)]).await.unwrap();

    h.rooms.leave_room("a").await.unwrap();
    h.rooms.leave_room("b").await.unwrap();
    assert!(h.auctions.snapshot("R").await.is_none());
    bob.drain();

    tokio::time::sleep(WINDOW).await;
    assert!(bob.drain().is_empty());
}

#[tokio::test]
async fn test_bid_outside_room_or_auction() {
    let h = Harness::new(catalog(&[("Keeper", "GK")]));
    room_with_two(&h).await;
    assert!(!h.rooms.place_bid("a", 10).await.unwrap());
    let err = h.rooms.place_bid("ghost", 10).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
