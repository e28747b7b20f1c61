//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the window host (winit) with the frame loop.
//
// The core only depends on this contract, so the host can be swapped
// (headless, scripted, windowed) without touching the application
// manager.
//
// Components:
// - `interface`: event types, loop control and the `HostEvents` trait
// - `event_collector`: channel-backed `HostEvents` used by the engine
//
//=========================================================================

//=== Module Declarations =================================================

mod event_collector;
mod interface;

//=== Public API ==========================================================

pub use event_collector::EventCollector;
pub use interface::{HostEvents, PlatformEvent, TickControl};
