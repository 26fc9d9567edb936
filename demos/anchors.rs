//! Anchors Example - pins, events, teardown
//!
//! Builds a toolbar with two buttons pinned edge to edge, moves the mouse
//! over them, clicks, then deletes the first button and shows the second
//! keeping its place.
//!
//! Run with: RUST_LOG=debug cargo run --example anchors

use std::cell::Cell;
use std::rc::Rc;

use spark_frames::{
    Anchor, Color, Configuration, Environment, EventKind, InputAction, InputEvent, InputMode,
    MouseButton, RecordingRenderer,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== spark-frames Anchors Example ===\n");

    let frames = RecordingRenderer::new();
    let mut env = Environment::with_config(
        Configuration::new()
            .with_renderer(frames.clone())
            .with_root_size(800.0, 600.0),
    );
    let root = env.root();

    // Toolbar across the top, 40 high
    let toolbar = env.create_frame(root, "toolbar").unwrap();
    env.set_point(toolbar, Anchor::TopLeft, root, Anchor::TopLeft, 0.0, 0.0).unwrap();
    env.set_point(toolbar, Anchor::TopRight, root, Anchor::TopRight, 0.0, 0.0).unwrap();
    env.set_height(toolbar, 40.0).unwrap();
    env.set_background(toolbar, Some(Color::GRAY)).unwrap();

    // Two buttons, the second pinned to the first
    let open = env.create_frame(toolbar, "open").unwrap();
    env.set_point(open, Anchor::CenterLeft, toolbar, Anchor::CenterLeft, 8.0, 0.0).unwrap();
    env.set_size(open, 100.0, 24.0).unwrap();
    env.set_background(open, Some(Color::BLUE)).unwrap();
    env.set_input_mode(open, InputMode::All).unwrap();

    let save = env.create_frame(toolbar, "save").unwrap();
    env.set_point(save, Anchor::CenterLeft, open, Anchor::CenterRight, 8.0, 0.0).unwrap();
    env.set_size(save, 100.0, 24.0).unwrap();
    env.set_background(save, Some(Color::GREEN)).unwrap();
    env.set_input_mode(save, InputMode::All).unwrap();

    let clicks = Rc::new(Cell::new(0));
    for button in [open, save] {
        let clicks = clicks.clone();
        env.on(button, EventKind::MouseClick, move |env, node, _| {
            clicks.set(clicks.get() + 1);
            println!("  clicked {}", env.name_full(node).unwrap_or_default());
        })
        .unwrap();
        env.on(button, EventKind::Move, |env, node, _| {
            println!(
                "  {} moved to {:?}",
                env.name_full(node).unwrap_or_default(),
                env.bounds(node).ok()
            );
        })
        .unwrap();
    }

    println!("Initial layout:");
    env.render(None).unwrap();
    for node in [toolbar, open, save] {
        println!("{}", env.debug_layout_dump(node).unwrap());
    }

    println!("\nClicking save at (170, 20):");
    env.input(&InputEvent::new(InputAction::MouseDown(MouseButton::Left)).with_mouse(170.0, 20.0));
    env.input(&InputEvent::new(InputAction::MouseUp(MouseButton::Left)));
    println!("  hovered: {:?}, clicks: {}", env.hovered(), clicks.get());

    println!("\nDeleting open:");
    env.obliterate(open).unwrap();
    env.render(None).unwrap();
    println!("{}", env.debug_layout_dump(save).unwrap());

    println!("\nResizing the window to 1024x768:");
    env.resize_root(1024.0, 768.0);
    env.render(None).unwrap();
    println!("  toolbar width {}", env.width(toolbar).unwrap());

    if let Some(frame) = frames.last_frame() {
        println!("\nLast frame: {}x{}, {} quads", frame.width, frame.height, frame.quads.len());
    }
}
