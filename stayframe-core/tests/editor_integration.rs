//! Editor Integration Tests
//!
//! Tests the complete editing flow including:
//! - Loading a catalog template into the store
//! - Hit testing and selection through the canvas view
//! - Drag-to-move with clamping at the canvas edge
//! - Inspector edits and the watermark lock
//! - Debounced viewport changes feeding the view

use std::time::Duration;

use stayframe_core::{
    compute_layout, CanvasView, Catalog, CoreError, EditorSettings, EditorStore, ElementId,
    NodeBody, Point, PropertyUpdate, Template, ViewContent, ViewportTracker,
};

/// Store with the classic meme loaded.
fn meme_store() -> EditorStore {
    let mut store = EditorStore::new(EditorSettings::default());
    store
        .load_template(Catalog::builtin().get("classic-meme").expect("builtin"))
        .expect("valid template");
    store
}

fn position_of(store: &EditorStore, id: &str) -> (f32, f32) {
    let element = store
        .template()
        .and_then(|t| t.element(&id.into()))
        .expect("element exists");
    (element.transform.x, element.transform.y)
}

// ============================================================================
// Drag Workflow Tests
// ============================================================================

#[test]
fn test_drag_to_bottom_right_is_clamped() {
    let mut store = meme_store();
    store
        .apply(
            &"bottom-text".into(),
            &PropertyUpdate::Position { x: 40.0, y: 480.0 },
        )
        .unwrap();

    // 800x800 template inside a 421x421 container: scale 0.5, centered.
    let layout = compute_layout(421.0, 421.0, 800.0, 800.0, 0.5);
    let mut view = CanvasView::new(layout);
    let scale = layout.content_scale;
    let grab = layout.template_to_screen(Point::new(100.0, 500.0));

    assert!(view.pointer_down(&mut store, grab));
    view.pointer_move(
        &mut store,
        Point::new(grab.x + 1000.0 * scale, grab.y + 1000.0 * scale),
    )
    .unwrap();
    view.pointer_up();

    let (x, y) = position_of(&store, "bottom-text");
    assert!((x - 80.0).abs() < 1e-3, "x = {x}");
    assert!((y - 700.0).abs() < 1e-3, "y = {y}");
}

#[test]
fn test_drag_moves_by_screen_delta_over_scale() {
    let mut store = meme_store();
    let layout = compute_layout(1600.0, 1600.0, 800.0, 800.0, 1.0);
    let mut view = CanvasView::new(layout);
    let scale = layout.content_scale;

    let grab = layout.template_to_screen(Point::new(400.0, 60.0));
    assert!(view.pointer_down(&mut store, grab));
    let update = view
        .pointer_move(&mut store, Point::new(grab.x - 10.0 * scale, grab.y + 30.0 * scale))
        .unwrap()
        .expect("moved");
    let PropertyUpdate::Position { x, y } = update else {
        panic!("expected a position update");
    };
    assert!((x - 30.0).abs() < 1e-3);
    assert!((y - 50.0).abs() < 1e-3);
    assert!(view.is_dragging());
    view.pointer_up();
    assert!(!view.is_dragging());
}

// ============================================================================
// Selection and Inspector Tests
// ============================================================================

#[test]
fn test_selection_survives_edits_and_clears_on_template_switch() {
    let mut store = meme_store();
    let mut view = CanvasView::new(compute_layout(1000.0, 1000.0, 800.0, 800.0, 1.0));
    let top = view.layout().template_to_screen(Point::new(400.0, 70.0));
    view.click(&mut store, top);
    assert_eq!(store.selected_id().map(ElementId::as_str), Some("top-text"));

    let id = store.selected_id().cloned().unwrap();
    store
        .apply(&id, &PropertyUpdate::Content("hello there".into()))
        .unwrap();
    let ViewContent::Nodes { nodes, .. } = view.render(&store) else {
        panic!("expected nodes");
    };
    let node = nodes.iter().find(|n| n.id == id).unwrap();
    assert!(node.selected);
    let NodeBody::Text(block) = &node.body else {
        panic!("text body");
    };
    // Impact style uppercases the content.
    assert_eq!(block.text, "HELLO THERE");

    store
        .load_template(Catalog::builtin().get("minimal-quote").unwrap())
        .unwrap();
    assert!(store.selected_id().is_none());
}

#[test]
fn test_watermark_stays_locked_for_free_accounts() {
    let mut store = meme_store();
    let err = store
        .apply(
            &"watermark".into(),
            &PropertyUpdate::Position { x: 0.0, y: 0.0 },
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::Locked(_)));

    store.set_pro_mode(true);
    assert!(store
        .apply(&"watermark".into(), &PropertyUpdate::Opacity(0.2))
        .unwrap());
}

#[test]
fn test_working_copy_round_trips_through_json() {
    let mut store = meme_store();
    store
        .apply(&"top-text".into(), &PropertyUpdate::Rotation(12.0))
        .unwrap();
    let json = store.template().unwrap().to_json().unwrap();
    let restored = Template::from_json(&json).unwrap();
    assert_eq!(Some(&restored), store.template());
}

// ============================================================================
// Viewport Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_resize_burst_updates_view_once() {
    let mut tracker = ViewportTracker::new(Duration::from_millis(100));
    let mut rx = tracker.subscribe();
    tracker.set_source(1080.0, 1920.0);
    rx.borrow_and_update();

    let mut view = CanvasView::default();
    for height in [600.0, 700.0, 800.0, 900.0, 1000.0] {
        tracker.resize(1000.0, height);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    rx.changed().await.unwrap();
    view.set_layout(*rx.borrow_and_update());

    assert_eq!(tracker.recomputations(), 2);
    assert!((view.layout().display_height - 950.0).abs() < 1e-3);
}
