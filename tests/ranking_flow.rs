//! End-to-end flows over the store, feed, synchronizer, and ranking engines.
//!
//! These tests close the loop the unit tests only touch in pieces: commits
//! written through rank persistence come back around as change-feed batches
//! observed by the synchronizer, with the drag controller's gate deciding
//! whether they apply.

use reelrank::{
    ranks_are_dense, Decision, DragPhase, DragReorderController, InsertionStep, MemoryStore,
    OrderedListSynchronizer, RankInsertionEngine, RankStore, RankedItem, ReelrankError,
    StagedCommit,
};

fn ranked(id: &str, index: u32) -> RankedItem {
    let mut item =
        RankedItem::new(id, id.to_uppercase()).with_poster(format!("posters/{id}.jpg"));
    item.ranked = true;
    item.rank_index = Some(index);
    item
}

fn seeded(ids: &[&str]) -> MemoryStore {
    let mut store = MemoryStore::new();
    for (index, id) in ids.iter().enumerate() {
        store.put_item(ranked(id, index as u32)).unwrap();
    }
    store
}

fn ids(sync: &OrderedListSynchronizer) -> Vec<String> {
    sync.items().iter().map(|i| i.id.clone()).collect()
}

#[test]
fn insertion_commit_echoes_back_into_the_live_list() {
    // [a(0), b(1), c(2)], insert x answering "worse than b" then
    // "better than c".
    let mut store = seeded(&["a", "b", "c"]);
    let new_item = RankedItem::new("x", "X");
    store.put_item(new_item.clone()).unwrap();

    let mut list = OrderedListSynchronizer::new();
    list.subscribe(&mut store).unwrap();
    list.pump(DragPhase::Idle, 0).unwrap();
    assert_eq!(ids(&list), vec!["a", "b", "c"]);

    // The engine runs over an explicit copy; the live list stays untouched.
    let mut engine = RankInsertionEngine::begin(new_item.clone(), list.snapshot());
    let InsertionStep::Compare { anchor } = engine.step() else {
        panic!("three ranked items require a comparison");
    };
    assert_eq!(anchor.id, "b");

    let InsertionStep::Compare { anchor } = engine.decide(Decision::Worse).unwrap() else {
        panic!("search should continue past B");
    };
    assert_eq!(anchor.id, "c");

    let InsertionStep::Settled { target_index } = engine.decide(Decision::Better).unwrap()
    else {
        panic!("two answers settle a three-item search");
    };
    assert_eq!(target_index, 2);

    StagedCommit::insertion(&new_item, target_index, engine.ranked())
        .unwrap()
        .submit(&mut store)
        .unwrap();

    // The insertion flow does not gate the feed; the echo applies normally.
    let notifications = list.pump(DragPhase::Idle, 0).unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].len, 4);
    assert_eq!(ids(&list), vec!["a", "b", "x", "c"]);
    assert!(ranks_are_dense(list.items()));
    assert!(ranks_are_dense(&store.ranked_items().unwrap()));
}

#[test]
fn drag_commit_settles_without_reapplying_its_own_echo() {
    // Drag position 3 to 0 in a 5-item list, through the full loop.
    let mut store = seeded(&["m0", "m1", "m2", "m3", "m4"]);
    let mut list = OrderedListSynchronizer::new();
    let mut controller = DragReorderController::new(800);

    list.subscribe(&mut store).unwrap();
    list.pump(controller.phase(), 0).unwrap();

    controller.begin_drag().unwrap();
    controller.drag_move(&mut list, 3, 0).unwrap();

    // A batch delivered mid-drag changes nothing.
    store.put_item(ranked("intruder", 5)).unwrap();
    assert!(list.pump(controller.phase(), 0).unwrap().is_empty());
    assert_eq!(list.len(), 5);

    controller.end_drag(&mut list, &mut store, 1_000).unwrap();

    let committed = store.ranked_items().unwrap();
    assert!(ranks_are_dense(&committed));
    for (position, item) in list.items().iter().enumerate() {
        assert_eq!(item.rank_position(), Some(position));
    }

    // The echo of the commit drains inside the settle window, discarded.
    assert!(list.pump(controller.tick(1_200), 1_200).unwrap().is_empty());
    assert_eq!(ids(&list), vec!["m3", "m0", "m1", "m2", "m4"]);

    // After the deadline the gate reopens and external changes flow again.
    assert_eq!(controller.tick(1_900), DragPhase::Idle);
    store.remove_item("m4").unwrap();
    let resumed = list.pump(controller.phase(), 1_900).unwrap();
    assert_eq!(resumed.len(), 1);
    assert_eq!(list.len(), 4);
}

#[test]
fn failed_insertion_commit_leaves_both_sides_unchanged() {
    // The shift transaction fails; nothing moves anywhere.
    let mut store = seeded(&["a", "b", "c"]);
    let new_item = RankedItem::new("x", "X");
    store.put_item(new_item.clone()).unwrap();

    let mut list = OrderedListSynchronizer::new();
    list.subscribe(&mut store).unwrap();
    list.pump(DragPhase::Idle, 0).unwrap();

    let ranked_before = store.ranked_items().unwrap();
    let staged = StagedCommit::insertion(&new_item, 0, &ranked_before).unwrap();

    store.fail_next_commit();
    let err = staged.submit(&mut store).unwrap_err();
    assert!(matches!(err, ReelrankError::Commit(_)));

    assert_eq!(store.ranked_items().unwrap(), ranked_before);
    assert!(list.pump(DragPhase::Idle, 0).unwrap().is_empty());
    assert_eq!(ids(&list), vec!["a", "b", "c"]);
}

#[test]
fn feed_error_surfaces_without_clearing_the_list() {
    let mut store = seeded(&["a", "b"]);
    let mut list = OrderedListSynchronizer::new();
    list.subscribe(&mut store).unwrap();
    list.pump(DragPhase::Idle, 0).unwrap();

    store.publish_error("stream interrupted");

    let err = list.pump(DragPhase::Idle, 0).unwrap_err();
    assert!(matches!(err, ReelrankError::Feed(_)));
    assert_eq!(ids(&list), vec!["a", "b"]);

    // The feed keeps working after the error is handled.
    store.put_item(ranked("c", 2)).unwrap();
    list.pump(DragPhase::Idle, 0).unwrap();
    assert_eq!(ids(&list), vec!["a", "b", "c"]);
}

#[test]
fn ranks_stay_dense_across_a_mixed_session() {
    let mut store = MemoryStore::new();
    let mut list = OrderedListSynchronizer::new();
    let mut controller = DragReorderController::new(100);
    list.subscribe(&mut store).unwrap();

    // Rank four items one after another, always inserting at the front.
    for (step, id) in ["w", "x", "y", "z"].iter().enumerate() {
        let item = RankedItem::new(*id, id.to_uppercase());
        store.put_item(item.clone()).unwrap();
        list.pump(controller.phase(), step as i64).unwrap();

        let mut engine = RankInsertionEngine::begin(item.clone(), list.snapshot());
        while let InsertionStep::Compare { .. } = engine.step() {
            engine.decide(Decision::Better).unwrap();
        }
        let target = engine.target().unwrap();
        assert_eq!(target, 0);

        StagedCommit::insertion(&item, target, engine.ranked())
            .unwrap()
            .submit(&mut store)
            .unwrap();
        list.pump(controller.phase(), step as i64).unwrap();
        assert!(ranks_are_dense(&store.ranked_items().unwrap()));
    }
    assert_eq!(ids(&list), vec!["z", "y", "x", "w"]);

    // Then drag the bottom item to the top and settle.
    controller.begin_drag().unwrap();
    controller.drag_move(&mut list, 3, 0).unwrap();
    controller.end_drag(&mut list, &mut store, 10_000).unwrap();
    controller.tick(10_100);

    assert!(ranks_are_dense(&store.ranked_items().unwrap()));
    assert_eq!(ids(&list), vec!["w", "z", "y", "x"]);
    assert_eq!(
        ids(&list),
        store
            .ranked_items()
            .unwrap()
            .iter()
            .map(|i| i.id.clone())
            .collect::<Vec<_>>()
    );
}
