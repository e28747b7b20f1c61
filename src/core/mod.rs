//=========================================================================
// Core
//=========================================================================
//
// Everything that runs on the core thread.
//
// Architecture:
// ```text
//   platform_bridge ──HostEvents──> app::AppManager
//                                      ├─ GameState stack
//                                      ├─ audio::AudioService
//                                      ├─ video::VideoService
//                                      └─ input::InputState
// ```
//
// Nothing in here touches winit; the host lives in `crate::platform`.
//
//=========================================================================

pub mod app;
pub mod audio;
pub mod input;
pub mod platform_bridge;
pub mod video;
