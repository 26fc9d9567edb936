//! State Module - interaction state layered on the environment
//!
//! - **Events** - Per-node handler registry and dispatch
//! - **Mouse** - Hover tracking, button capture, wheel
//! - **Keyboard** - Modifier state, key events to the focused node
//! - **Focus** - The node that receives key events
//! - **Input** - Input sequences and crossterm conversion

pub mod events;
pub mod focus;
pub mod input;
pub mod keyboard;
pub mod mouse;
