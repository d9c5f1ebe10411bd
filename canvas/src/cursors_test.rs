use super::*;

fn upsert(cursors: &mut RemoteCursors, id: ParticipantId, x: f64, now: i64) {
    cursors.upsert(id, Point::new(x, 0.0), "hsl(10, 70%, 50%)".into(), "Bob".into(), now);
}

#[test]
fn fresh_cursor_is_visible() {
    let mut cursors = RemoteCursors::new();
    let id = ParticipantId::new();
    upsert(&mut cursors, id, 5.0, 1000);
    let visible = cursors.visible(1000);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].position, Point::new(5.0, 0.0));
    assert_eq!(visible[0].display_name, "Bob");
}

#[test]
fn cursor_hidden_after_ttl() {
    let mut cursors = RemoteCursors::new();
    let id = ParticipantId::new();
    upsert(&mut cursors, id, 5.0, 1000);
    assert_eq!(cursors.visible(1000 + CURSOR_TTL_MS).len(), 1);
    assert!(cursors.visible(1000 + CURSOR_TTL_MS + 1).is_empty());
    // Still stored until pruned.
    assert_eq!(cursors.len(), 1);
}

#[test]
fn fresh_event_brings_cursor_back() {
    let mut cursors = RemoteCursors::new();
    let id = ParticipantId::new();
    upsert(&mut cursors, id, 5.0, 0);
    assert!(cursors.visible(5000).is_empty());
    upsert(&mut cursors, id, 9.0, 5000);
    let visible = cursors.visible(5000);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].position, Point::new(9.0, 0.0));
}

#[test]
fn remove_bypasses_ttl() {
    let mut cursors = RemoteCursors::new();
    let id = ParticipantId::new();
    upsert(&mut cursors, id, 5.0, 1000);
    assert!(cursors.remove(id));
    assert!(cursors.visible(1000).is_empty());
    assert!(!cursors.remove(id));
}

#[test]
fn prune_drops_only_stale_entries() {
    let mut cursors = RemoteCursors::new();
    let old = ParticipantId::new();
    let new = ParticipantId::new();
    upsert(&mut cursors, old, 1.0, 0);
    upsert(&mut cursors, new, 2.0, 2000);
    cursors.prune(2000);
    assert_eq!(cursors.len(), 1);
    assert_eq!(cursors.visible(2000)[0].participant_id, new);
}

#[test]
fn visible_order_is_stable() {
    let mut cursors = RemoteCursors::new();
    let mut ids: Vec<_> = (0..5).map(|_| ParticipantId::new()).collect();
    for (i, id) in ids.iter().enumerate() {
        upsert(&mut cursors, *id, i as f64, 0);
    }
    ids.sort();
    let seen: Vec<_> = cursors.visible(0).iter().map(|c| c.participant_id).collect();
    assert_eq!(seen, ids);
}

#[test]
fn marks_place_label_beside_the_dot() {
    let mut cursors = RemoteCursors::new();
    let id = ParticipantId::new();
    upsert(&mut cursors, id, 40.0, 1000);
    let marks = cursors.marks(1000);
    assert_eq!(marks.len(), 1);
    let mark = &marks[0];
    assert_eq!(mark.center, Point::new(40.0, 0.0));
    assert_eq!(mark.label, "Bob");
    assert_eq!(mark.color, "hsl(10, 70%, 50%)");
    assert_eq!(
        mark.label_at,
        Point::new(40.0 + CURSOR_LABEL_OFFSET.0, CURSOR_LABEL_OFFSET.1)
    );
}

#[test]
fn marks_skip_stale_cursors() {
    let mut cursors = RemoteCursors::new();
    upsert(&mut cursors, ParticipantId::new(), 1.0, 0);
    assert!(cursors.marks(CURSOR_TTL_MS + 1).is_empty());
}
