//=========================================================================
// Platform
//=========================================================================
//
// Winit host: owns the window and feeds the core thread over a channel.
//
// Architecture:
// ```text
//  Main Thread:                      Core Thread:
//  ┌───────────────────────────┐    ┌─────────────────────┐
//  │  Winit Event Loop         │    │  AppManager         │
//  │   ↓                       │    │   ↑                 │
//  │  InputTranslator          │    │  EventCollector     │
//  │   ↓                       │    │   ↑                 │
//  │  InputBuffer              │    │                     │
//  │   ↓ RedrawRequested       │    │                     │
//  │  Sender<PlatformEvent> ───┼────┼──→ Receiver         │
//  │                           │    │                     │
//  │  about_to_wait ←──────────┼────┼── shutdown flag     │
//  └───────────────────────────┘    └─────────────────────┘
// ```
//
// RedrawRequested is the batching boundary: the input gathered since the
// previous redraw crosses as one `PlatformEvent::Inputs`. Resizes cross
// immediately. The core raises the shutdown flag when its loop ends, and
// the platform closes the window on the next `about_to_wait`.
//
// Winit must run on the main thread on macOS/iOS, so this runs on the
// thread that called `Engine::run()`.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_buffer;
mod input_translator;

//=== Standard Library ====================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

//=== Internal Dependencies ===============================================

use crate::config::WindowConfig;
use crate::core::platform_bridge::PlatformEvent;
use crate::error::PlatformError;
use input_buffer::InputBuffer;
use input_translator::InputTranslator;

//=== Platform ============================================================

/// Window owner and input forwarder.
///
/// Not `Send`: it lives and dies on the main thread. The window is created
/// lazily in `resumed()`.
pub(crate) struct Platform {
    window: Option<Window>,
    config: WindowConfig,
    buffer: InputBuffer,
    translator: InputTranslator,
    event_sender: Sender<PlatformEvent>,
    shutdown: Arc<AtomicBool>,
}

impl Platform {
    pub(crate) fn new(
        event_sender: Sender<PlatformEvent>,
        config: WindowConfig,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            config,
            buffer: InputBuffer::new(),
            translator: InputTranslator::new(),
            event_sender,
            shutdown,
        }
    }

    /// Runs the winit event loop until the window closes or the core
    /// raises the shutdown flag.
    pub(crate) fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting winit event loop");

        let event_loop =
            EventLoop::new().map_err(|e| PlatformError::EventLoopCreation(e.to_string()))?;

        event_loop
            .run_app(&mut self)
            .map_err(|e| PlatformError::EventLoopExecution(e.to_string()))
    }

    //--- Internal Helpers -------------------------------------------------

    fn window_attributes(&self) -> WindowAttributes {
        let attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        if self.config.fullscreen {
            attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
        } else {
            attrs
        }
    }

    /// Sends the buffered input as one batch. Empty frames send nothing.
    ///
    /// A disconnected channel means the core already stopped; the events
    /// are dropped so the window can still close normally.
    fn flush_input_buffer(&mut self) {
        let Some((discrete, continuous)) = self.buffer.drain() else {
            return;
        };

        trace!(
            target: "platform::input",
            "Flushing {} discrete + {} continuous events",
            discrete.len(),
            continuous.len()
        );

        let total = discrete.len() + continuous.len();
        if self.event_sender.send(PlatformEvent::Inputs { discrete, continuous }).is_err() {
            warn!(target: "platform::input", "Channel disconnected, dropping {} events", total);
        }
    }

    fn send(&self, event: PlatformEvent) {
        if self.event_sender.send(event).is_err() {
            debug!(target: "platform", "Core thread gone, event dropped");
        }
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        match event_loop.create_window(self.window_attributes()) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.send(PlatformEvent::WindowClosed);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.send(PlatformEvent::WindowClosed);
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                debug!(target: "platform", "Window resized to {}x{}", size.width, size.height);
                self.send(PlatformEvent::Resized { width: size.width, height: size.height });
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.translator.set_modifiers(modifiers.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self.translator.cursor(position);
                self.buffer.push_continuous(event);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(event) = self.translator.key(&event) {
                    self.buffer.push_discrete(event);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.translator.mouse_button(button, state);
                self.buffer.push_discrete(event);
            }

            WindowEvent::RedrawRequested => {
                self.flush_input_buffer();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.shutdown.load(Ordering::Acquire) {
            info!(target: "platform", "Core finished, closing window");
            event_loop.exit();
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
