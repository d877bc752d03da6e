mod support;

use petbasket::User;
use support::{engine_with_users, standard_users};

#[test]
fn stale_basket_ids_are_dropped_with_one_notification_each() {
    let fixture = engine_with_users(standard_users());
    let engine = &fixture.engine;

    let hoot = engine.catalog().create("Owl", "Hoot").unwrap();
    let red = engine.catalog().create("Fox", "Red").unwrap();

    let mut alice = engine.select_user("alice").unwrap().unwrap();
    engine.reserve(&mut alice, &hoot).unwrap();
    engine.reserve(&mut alice, &red).unwrap();

    // another actor completes Red's adoption and the admin delists it
    engine.catalog().delete(red.id).unwrap();

    let alice = engine.select_user("alice").unwrap().unwrap();
    assert_eq!(engine.basket(&alice), vec![hoot]);

    let persisted = engine.users().get("alice").unwrap().unwrap();
    assert_eq!(persisted.basket_pets, vec![1]);

    let adopted_notes: Vec<_> = persisted
        .notifications
        .iter()
        .filter(|n| *n == "Red has been adopted")
        .collect();
    assert_eq!(adopted_notes.len(), 1);
}

#[test]
fn reconciliation_is_idempotent_across_reselects() {
    let fixture = engine_with_users(standard_users());
    let engine = &fixture.engine;

    let red = engine.catalog().create("Fox", "Red").unwrap();
    let mut alice = engine.select_user("alice").unwrap().unwrap();
    engine.reserve(&mut alice, &red).unwrap();
    engine.catalog().delete(red.id).unwrap();

    engine.select_user("alice").unwrap().unwrap();
    engine.select_user("alice").unwrap().unwrap();

    let persisted = engine.users().get("alice").unwrap().unwrap();
    assert_eq!(
        persisted
            .notifications
            .iter()
            .filter(|n| *n == "Red has been adopted")
            .count(),
        1
    );
}

#[test]
fn adopted_pets_keep_display_attributes_after_delisting() {
    let fixture = engine_with_users(standard_users());
    let engine = &fixture.engine;

    let hoot = engine.catalog().create("Owl", "Hoot").unwrap();
    let mut alice = engine.select_user("alice").unwrap().unwrap();
    engine.reserve(&mut alice, &hoot).unwrap();
    engine.adopt(&mut alice, hoot.id).unwrap();
    engine.catalog().delete(hoot.id).unwrap();

    let alice = engine.select_user("alice").unwrap().unwrap();
    let adopted = engine.adopted(&alice);
    assert_eq!(adopted.len(), 1);
    assert_eq!(adopted[0].name, "Hoot");
    assert_eq!(adopted[0].category, "Owl");
}

#[test]
fn reselecting_rebuilds_the_working_view() {
    let fixture = engine_with_users(standard_users());
    let engine = &fixture.engine;

    let hoot = engine.catalog().create("Owl", "Hoot").unwrap();
    let mut first = engine.select_user("alice").unwrap().unwrap();
    engine.reserve(&mut first, &hoot).unwrap();

    let second = engine.select_user("alice").unwrap().unwrap();
    assert_eq!(engine.basket(&second), vec![hoot]);
}

#[test]
fn clean_baskets_reconcile_without_writing() {
    let fixture = engine_with_users(vec![User::new("alice", "pw")]);
    let engine = &fixture.engine;

    let hoot = engine.catalog().create("Owl", "Hoot").unwrap();
    let mut alice = engine.select_user("alice").unwrap().unwrap();
    engine.reserve(&mut alice, &hoot).unwrap();

    // a write here would trip the failure switch; a clean select must not
    fixture.user_storage.fail_next_save();
    let alice = engine.select_user("alice").unwrap().unwrap();
    assert_eq!(engine.basket(&alice).len(), 1);
    assert!(engine
        .users()
        .get("alice")
        .unwrap()
        .unwrap()
        .notifications
        .is_empty());
}
