//=========================================================================
// Video Service
//=========================================================================
//
// Shader/texture registries and a layered quad batcher on top of a
// `VideoBackend`.
//
// Quads are queued during a state's render pass, keyed by layer and
// then texture id, and flushed in one `update` per frame:
//
//   layer 0 ─┬─ ""        → [quad, quad]      drawn first
//            └─ "tiles"   → [quad]
//   layer 3 ─── "player"  → [quad]            drawn last (on top)
//
// Each (layer, texture) batch binds its texture once. Calls made while
// the service is unallocated are no-ops returning `Ok`.
//
//=========================================================================

//=== Module Declarations =================================================

mod backend;
mod frame_rate;
mod quad;

//=== Public API ==========================================================

pub use backend::{
    DrawCall, HeadlessVideoBackend, ShaderHandle, TextureHandle, VideoBackend, Viewport,
};
pub use frame_rate::FrameRateCounter;
pub use quad::{rgba_to_abgr, Quad, Vertex};

//=== External Dependencies ===============================================

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::config::VideoConfig;
use crate::error::{AssetError, InitializationError, RenderError, Result};

//=== ShaderStage =========================================================

/// Programmable pipeline stage a shader source targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Texture id that draws with no texture bound.
pub const UNTEXTURED: &str = "";

type QuadQueue = BTreeMap<u8, BTreeMap<String, Vec<Quad>>>;

//=== VideoService ========================================================

pub struct VideoService {
    backend: Box<dyn VideoBackend>,
    allocated: bool,
    screen_width: u32,
    screen_height: u32,
    viewport: Viewport,
    shaders: HashMap<String, ShaderHandle>,
    textures: HashMap<String, TextureHandle>,
    queue: QuadQueue,
    frame_rate: FrameRateCounter,
}

impl VideoService {
    pub fn new(backend: impl VideoBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            allocated: false,
            screen_width: 0,
            screen_height: 0,
            viewport: Viewport::default(),
            shaders: HashMap::new(),
            textures: HashMap::new(),
            queue: QuadQueue::new(),
            frame_rate: FrameRateCounter::new(Duration::from_millis(250)),
        }
    }

    /// Service backed by [`HeadlessVideoBackend`].
    pub fn headless() -> Self {
        Self::new(HeadlessVideoBackend::new())
    }

    //=====================================================================
    // Lifecycle
    //=====================================================================

    /// Opens the surface, then compiles, attaches and links the
    /// configured default shaders. A shader failure closes the surface
    /// again before the error is returned.
    pub fn allocate(&mut self, config: &VideoConfig) -> Result<()> {
        if self.allocated {
            return Err(InitializationError::AlreadyAllocated("video service").into());
        }

        let window = Duration::try_from_secs_f64(config.frame_rate_window)
            .ok()
            .filter(|window| !window.is_zero())
            .ok_or_else(|| InitializationError::Subsystem {
                subsystem: "video",
                reason: format!("invalid frame rate window {}", config.frame_rate_window),
            })?;

        self.backend
            .open(config)
            .map_err(|reason| InitializationError::Subsystem { subsystem: "video", reason })?;

        self.allocated = true;
        self.screen_width = config.width;
        self.screen_height = config.height;
        self.viewport = Viewport {
            x: 0,
            y: 0,
            width: config.width as i32,
            height: config.height as i32,
        };
        self.frame_rate = FrameRateCounter::new(window);

        if let Err(err) = self.load_default_shaders(config) {
            self.deallocate();
            return Err(err);
        }

        info!(target: "video", "allocated {}x{} surface", config.width, config.height);
        Ok(())
    }

    fn load_default_shaders(&mut self, config: &VideoConfig) -> Result<()> {
        if config.default_shaders.is_empty() {
            return Ok(());
        }
        for shader in &config.default_shaders {
            self.load_shader(&shader.id, &shader.path, shader.stage)?;
            self.enable_shader(&shader.id)?;
        }
        self.update_shader_program()
    }

    /// Releases every shader and texture and closes the surface. Safe to
    /// call twice.
    pub fn deallocate(&mut self) {
        if !self.allocated {
            return;
        }

        for (_, shader) in self.shaders.drain() {
            self.backend.detach_shader(shader);
            self.backend.delete_shader(shader);
        }
        for (_, texture) in self.textures.drain() {
            self.backend.delete_texture(texture);
        }
        self.queue.clear();
        self.backend.close();
        self.allocated = false;

        info!(target: "video", "deallocated");
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    //=====================================================================
    // Shaders
    //=====================================================================

    /// Reads a shader file and compiles it under `id`.
    pub fn load_shader(&mut self, id: &str, path: impl AsRef<Path>, stage: ShaderStage) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }
        self.ensure_shader_free(id)?;

        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| RenderError::ShaderSource {
            path: path.to_path_buf(),
            source,
        })?;
        self.compile_shader(id, &source, stage)
    }

    /// Compiles in-memory shader source under `id`.
    pub fn load_shader_source(&mut self, id: &str, source: &str, stage: ShaderStage) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }
        self.ensure_shader_free(id)?;
        self.compile_shader(id, source, stage)
    }

    fn ensure_shader_free(&self, id: &str) -> Result<()> {
        if self.shaders.contains_key(id) {
            return Err(AssetError::Duplicate { kind: "shader".into(), id: id.to_string() }.into());
        }
        Ok(())
    }

    fn compile_shader(&mut self, id: &str, source: &str, stage: ShaderStage) -> Result<()> {
        let handle = self
            .backend
            .compile_shader(stage, source)
            .map_err(|log| RenderError::Compile { id: id.to_string(), log })?;
        self.shaders.insert(id.to_string(), handle);

        debug!(target: "video", "compiled {stage:?} shader '{id}'");
        Ok(())
    }

    /// Detaches and deletes a shader. The linked program keeps working
    /// until the next `update_shader_program`.
    pub fn unload_shader(&mut self, id: &str) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }
        let shader = self
            .shaders
            .remove(id)
            .ok_or_else(|| RenderError::UnknownShader(id.to_string()))?;
        self.backend.detach_shader(shader);
        self.backend.delete_shader(shader);
        Ok(())
    }

    /// Attaches a loaded shader to the program.
    pub fn enable_shader(&mut self, id: &str) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }
        let shader = self.shader(id)?;
        self.backend.attach_shader(shader);
        Ok(())
    }

    /// Detaches a loaded shader from the program.
    pub fn disable_shader(&mut self, id: &str) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }
        let shader = self.shader(id)?;
        self.backend.detach_shader(shader);
        Ok(())
    }

    /// Relinks the program from the currently attached shaders.
    pub fn update_shader_program(&mut self) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }
        self.backend.link_program().map_err(RenderError::Link)?;
        Ok(())
    }

    pub fn is_shader_loaded(&self, id: &str) -> bool {
        self.shaders.contains_key(id)
    }

    /// Backend handle of a loaded shader.
    pub fn shader(&self, id: &str) -> Result<ShaderHandle> {
        self.shaders
            .get(id)
            .copied()
            .ok_or_else(|| RenderError::UnknownShader(id.to_string()).into())
    }

    //=====================================================================
    // Textures
    //=====================================================================

    /// Loads a PNG image under `id`.
    pub fn load_texture(&mut self, id: &str, path: impl AsRef<Path>) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }
        if self.textures.contains_key(id) {
            return Err(AssetError::Duplicate { kind: "texture".into(), id: id.to_string() }.into());
        }

        let path = path.as_ref();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if !is_png {
            return Err(RenderError::UnsupportedTexture(path.to_path_buf()).into());
        }

        let texture = self.backend.create_texture(path).map_err(|reason| AssetError::Load {
            path: path.to_path_buf(),
            reason,
        })?;
        self.textures.insert(id.to_string(), texture);

        debug!(target: "video", "loaded texture '{id}' from {}", path.display());
        Ok(())
    }

    pub fn unload_texture(&mut self, id: &str) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }
        let texture = self
            .textures
            .remove(id)
            .ok_or_else(|| RenderError::UnknownTexture(id.to_string()))?;
        self.backend.delete_texture(texture);
        Ok(())
    }

    /// Binds a texture for subsequent draws. [`UNTEXTURED`] unbinds.
    pub fn set_texture(&mut self, id: &str) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }
        let texture = if id == UNTEXTURED {
            None
        } else {
            let texture = self
                .textures
                .get(id)
                .copied()
                .ok_or_else(|| RenderError::UnknownTexture(id.to_string()))?;
            Some(texture)
        };
        self.backend.bind_texture(texture);
        Ok(())
    }

    pub fn is_texture_loaded(&self, id: &str) -> bool {
        self.textures.contains_key(id)
    }

    //=====================================================================
    // Frame Composition
    //=====================================================================

    /// Buffers a quad for this frame's flush. Higher layers draw later.
    pub fn queue_quad(&mut self, layer: u8, texture_id: &str, quad: Quad) {
        if !self.allocated {
            return;
        }
        self.queue
            .entry(layer)
            .or_default()
            .entry(texture_id.to_string())
            .or_default()
            .push(quad);
    }

    /// Quads waiting for the next `update`.
    pub fn queued_quads(&self) -> usize {
        self.queue.values().flat_map(BTreeMap::values).map(Vec::len).sum()
    }

    /// Counts the frame, flushes the queue batch by batch and presents.
    ///
    /// The queue is emptied even when a batch names an unknown texture.
    pub fn update(&mut self) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }

        self.frame_rate.tick();
        self.backend.clear();

        let queue = std::mem::take(&mut self.queue);
        for (layer, batches) in &queue {
            for (texture_id, quads) in batches {
                self.set_texture(texture_id)?;
                trace!(target: "video", "layer {layer}: {} quad(s) with '{texture_id}'", quads.len());

                for quad in quads {
                    let vertices = quad.to_vertices(self.screen_width, self.screen_height);
                    self.backend.draw_quad(&vertices).map_err(RenderError::Draw)?;
                }
            }
        }

        self.backend.present().map_err(RenderError::Draw)?;
        Ok(())
    }

    //=====================================================================
    // Surface
    //=====================================================================

    /// Window resize: the logical surface keeps its size and the
    /// viewport is recentred in the new window.
    pub fn resize(&mut self, window_width: u32, window_height: u32) {
        if !self.allocated {
            return;
        }

        let width = self.screen_width as i32;
        let height = self.screen_height as i32;
        self.viewport = Viewport {
            x: window_width as i32 / 2 - width / 2,
            y: window_height as i32 / 2 - height / 2,
            width,
            height,
        };
        self.backend.set_viewport(self.viewport);

        debug!(target: "video", "window resized to {window_width}x{window_height}");
    }

    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frames per second over the last completed sampling window.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate.frame_rate()
    }

    //=====================================================================
    // Backend Access
    //=====================================================================

    /// Concrete backend, when it is of type `B`.
    pub fn backend_as<B: VideoBackend + 'static>(&self) -> Option<&B> {
        self.backend.as_any().downcast_ref::<B>()
    }
}

impl Drop for VideoService {
    fn drop(&mut self) {
        self.deallocate();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShaderConfig;
    use crate::error::Error;

    const VERT: &str = "#version 330\nvoid main() { gl_Position = vec4(0.0); }";
    const FRAG: &str = "#version 330\nout vec4 c; void main() { c = vec4(1.0); }";

    fn allocated() -> VideoService {
        let mut video = VideoService::headless();
        video.allocate(&VideoConfig::default()).unwrap();
        video
    }

    fn headless(video: &VideoService) -> &HeadlessVideoBackend {
        video.backend_as::<HeadlessVideoBackend>().unwrap()
    }

    fn with_tiles(video: &mut VideoService) {
        video.load_texture("tiles", "assets/tiles.png").unwrap();
    }

    //--- Lifecycle --------------------------------------------------------

    #[test]
    fn double_allocate_is_rejected() {
        let mut video = allocated();
        let err = video.allocate(&VideoConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Initialization(InitializationError::AlreadyAllocated(_))));
    }

    #[test]
    fn bad_frame_rate_window_is_rejected() {
        for window in [-0.25, 0.0, f64::NAN] {
            let mut video = VideoService::headless();
            let config = VideoConfig { frame_rate_window: window, ..VideoConfig::default() };

            let err = video.allocate(&config).unwrap_err();
            assert!(matches!(
                err,
                Error::Initialization(InitializationError::Subsystem { subsystem: "video", .. })
            ));
            assert!(!video.is_allocated());
            assert!(!headless(&video).is_open());
        }
    }

    #[test]
    fn unallocated_calls_are_no_ops() {
        let mut video = VideoService::headless();
        video.load_texture("tiles", "tiles.bmp").unwrap();
        video.set_texture("missing").unwrap();
        video.queue_quad(0, UNTEXTURED, Quad::new(0, 0, 1, 1));
        video.update().unwrap();
        assert_eq!(video.queued_quads(), 0);
        assert_eq!(headless(&video).present_count(), 0);
    }

    #[test]
    fn default_shader_failure_rolls_back() {
        let dir = std::env::temp_dir().join("strata_video_missing_shader");
        let config = VideoConfig {
            default_shaders: vec![ShaderConfig {
                id: "QuadVertex".into(),
                path: dir.join("QuadVertex.glsl"),
                stage: ShaderStage::Vertex,
            }],
            ..VideoConfig::default()
        };

        let mut video = VideoService::headless();
        let err = video.allocate(&config).unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::ShaderSource { .. })));
        assert!(!video.is_allocated());
        assert!(!headless(&video).is_open());
    }

    #[test]
    fn default_shaders_are_loaded_and_linked() {
        let dir = std::env::temp_dir().join(format!("strata_video_shaders_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("QuadVertex.glsl"), VERT).unwrap();
        fs::write(dir.join("QuadFragment.glsl"), FRAG).unwrap();

        let config = VideoConfig {
            default_shaders: vec![
                ShaderConfig {
                    id: "QuadVertex".into(),
                    path: dir.join("QuadVertex.glsl"),
                    stage: ShaderStage::Vertex,
                },
                ShaderConfig {
                    id: "QuadFragment".into(),
                    path: dir.join("QuadFragment.glsl"),
                    stage: ShaderStage::Fragment,
                },
            ],
            ..VideoConfig::default()
        };

        let mut video = VideoService::headless();
        video.allocate(&config).unwrap();
        assert!(video.is_shader_loaded("QuadVertex"));
        assert!(headless(&video).is_linked());

        fs::remove_dir_all(&dir).ok();
    }

    //--- Shaders ----------------------------------------------------------

    #[test]
    fn shader_program_lifecycle() {
        let mut video = allocated();
        video.load_shader_source("vs", VERT, ShaderStage::Vertex).unwrap();
        video.load_shader_source("fs", FRAG, ShaderStage::Fragment).unwrap();
        video.enable_shader("vs").unwrap();
        video.enable_shader("fs").unwrap();
        video.update_shader_program().unwrap();

        video.disable_shader("fs").unwrap();
        let err = video.update_shader_program().unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::Link(_))));

        video.unload_shader("fs").unwrap();
        assert!(!video.is_shader_loaded("fs"));
    }

    #[test]
    fn shader_errors() {
        let mut video = allocated();
        video.load_shader_source("vs", VERT, ShaderStage::Vertex).unwrap();

        let dup = video.load_shader_source("vs", VERT, ShaderStage::Vertex).unwrap_err();
        assert!(matches!(dup, Error::Asset(AssetError::Duplicate { .. })));

        let bad = video.load_shader_source("empty", "", ShaderStage::Fragment).unwrap_err();
        assert!(matches!(bad, Error::Render(RenderError::Compile { .. })));

        for result in [
            video.enable_shader("nope"),
            video.disable_shader("nope"),
            video.unload_shader("nope"),
        ] {
            assert!(matches!(result, Err(Error::Render(RenderError::UnknownShader(_)))));
        }
    }

    //--- Textures ---------------------------------------------------------

    #[test]
    fn textures_must_be_png_and_unique() {
        let mut video = allocated();
        with_tiles(&mut video);

        let dup = video.load_texture("tiles", "other.png").unwrap_err();
        assert!(matches!(dup, Error::Asset(AssetError::Duplicate { .. })));

        let jpg = video.load_texture("photo", "photo.jpg").unwrap_err();
        assert!(matches!(jpg, Error::Render(RenderError::UnsupportedTexture(_))));

        video.unload_texture("tiles").unwrap();
        let gone = video.set_texture("tiles").unwrap_err();
        assert!(matches!(gone, Error::Render(RenderError::UnknownTexture(_))));
    }

    //--- Frame Composition ------------------------------------------------

    #[test]
    fn flush_orders_by_layer_then_texture() {
        let mut video = allocated();
        with_tiles(&mut video);

        video.queue_quad(2, UNTEXTURED, Quad::solid(0, 0, 10, 10, 0xFF0000FF));
        video.queue_quad(0, "tiles", Quad::new(0, 0, 20, 20));
        video.queue_quad(0, UNTEXTURED, Quad::solid(0, 0, 30, 30, 0x00FF00FF));
        video.queue_quad(0, "tiles", Quad::new(5, 5, 20, 20));
        assert_eq!(video.queued_quads(), 4);

        video.update().unwrap();
        assert_eq!(video.queued_quads(), 0);

        let tiles = video.textures.get("tiles").copied();
        let frame = headless(&video).last_frame();
        let textures: Vec<_> = frame.iter().map(|d| d.texture).collect();
        assert_eq!(textures, vec![None, tiles, tiles, None]);
        // One bind per (layer, texture) batch.
        assert_eq!(headless(&video).bind_count(), 3);
        // Layer 2 was drawn last.
        assert_eq!(frame[3].vertices[0].color, rgba_to_abgr(0xFF0000FF));
    }

    #[test]
    fn unknown_texture_in_queue_fails_and_clears() {
        let mut video = allocated();
        video.queue_quad(0, "ghost", Quad::new(0, 0, 4, 4));

        let err = video.update().unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::UnknownTexture(_))));
        assert_eq!(video.queued_quads(), 0);

        video.update().unwrap();
    }

    #[test]
    fn every_update_presents() {
        let mut video = allocated();
        video.update().unwrap();
        video.update().unwrap();
        assert_eq!(headless(&video).present_count(), 2);
    }

    //--- Surface ----------------------------------------------------------

    #[test]
    fn resize_recentres_viewport() {
        let mut video = allocated();
        video.resize(1024, 768);

        let expected = Viewport { x: 112, y: 84, width: 800, height: 600 };
        assert_eq!(video.viewport(), expected);
        assert_eq!(headless(&video).viewport(), expected);
        assert_eq!(video.screen_width(), 800);
    }
}
