//=========================================================================
// Video Backend
//=========================================================================
//
// Seam between `VideoService` and the graphics API.
//
// The service keeps the id registries, the quad queue and the frame
// counter; a backend compiles, binds, draws and presents. Errors come
// back as strings and are wrapped into `RenderError` by the service.
//
// `HeadlessVideoBackend` draws nothing and records every call, which is
// what tests and the headless host inspect.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

//=== Internal Dependencies ===============================================

use super::quad::Vertex;
use super::ShaderStage;
use crate::config::VideoConfig;

//=== Handles =============================================================

/// Backend-issued compiled shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(u32);

impl ShaderHandle {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Backend-issued texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Drawable region of the window, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

//=== VideoBackend ========================================================

/// Graphics-API operations used by the video service.
pub trait VideoBackend: Send {
    /// Creates the surface and the (empty) shader program.
    fn open(&mut self, config: &VideoConfig) -> Result<(), String>;

    /// Releases the surface and everything created on it.
    fn close(&mut self);

    /// Compiles one stage. `Err` carries the compiler log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String>;

    fn delete_shader(&mut self, shader: ShaderHandle);

    fn attach_shader(&mut self, shader: ShaderHandle);

    fn detach_shader(&mut self, shader: ShaderHandle);

    /// Links the program from the attached stages. `Err` carries the linker log.
    fn link_program(&mut self) -> Result<(), String>;

    /// Decodes and uploads an image file.
    fn create_texture(&mut self, path: &Path) -> Result<TextureHandle, String>;

    fn delete_texture(&mut self, texture: TextureHandle);

    /// Binds a texture for subsequent draws; `None` draws untextured.
    fn bind_texture(&mut self, texture: Option<TextureHandle>);

    fn set_viewport(&mut self, viewport: Viewport);

    fn clear(&mut self);

    fn draw_quad(&mut self, vertices: &[Vertex; 4]) -> Result<(), String>;

    fn present(&mut self) -> Result<(), String>;

    /// Downcasts to `&dyn Any` for backend-specific inspection.
    fn as_any(&self) -> &dyn Any;
}

//=========================================================================
// HeadlessVideoBackend
//=========================================================================

/// A draw recorded by the headless backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture: Option<TextureHandle>,
    pub vertices: [Vertex; 4],
}

/// Graphics backend that records instead of drawing.
#[derive(Debug, Default)]
pub struct HeadlessVideoBackend {
    open: bool,
    next_handle: u32,
    shaders: HashMap<ShaderHandle, ShaderStage>,
    attached: HashSet<ShaderHandle>,
    linked: bool,
    textures: HashMap<TextureHandle, PathBuf>,
    bound: Option<TextureHandle>,
    viewport: Viewport,

    pending: Vec<DrawCall>,
    last_frame: Vec<DrawCall>,
    bind_count: usize,
    presents: u64,
}

impl HeadlessVideoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Inspection -------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_attached(&self, shader: ShaderHandle) -> bool {
        self.attached.contains(&shader)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn texture_path(&self, texture: TextureHandle) -> Option<&Path> {
        self.textures.get(&texture).map(PathBuf::as_path)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Draws of the most recently presented frame, in submission order.
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_frame
    }

    /// Texture binds performed since the last clear.
    pub fn bind_count(&self) -> usize {
        self.bind_count
    }

    pub fn present_count(&self) -> u64 {
        self.presents
    }

    fn next_raw(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl VideoBackend for HeadlessVideoBackend {
    fn open(&mut self, config: &VideoConfig) -> Result<(), String> {
        if config.width == 0 || config.height == 0 {
            return Err(format!("invalid surface size {}x{}", config.width, config.height));
        }
        self.open = true;
        self.viewport = Viewport {
            x: 0,
            y: 0,
            width: config.width as i32,
            height: config.height as i32,
        };
        Ok(())
    }

    fn close(&mut self) {
        *self = Self {
            presents: self.presents,
            ..Self::default()
        };
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String> {
        if source.trim().is_empty() {
            return Err("empty shader source".to_string());
        }
        let handle = ShaderHandle::new(self.next_raw());
        self.shaders.insert(handle, stage);
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.attached.remove(&shader);
        self.shaders.remove(&shader);
    }

    fn attach_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.contains_key(&shader) {
            self.attached.insert(shader);
        }
    }

    fn detach_shader(&mut self, shader: ShaderHandle) {
        self.attached.remove(&shader);
    }

    fn link_program(&mut self) -> Result<(), String> {
        let has_stage = |stage| self.attached.iter().any(|s| self.shaders.get(s) == Some(&stage));
        self.linked = has_stage(ShaderStage::Vertex) && has_stage(ShaderStage::Fragment);
        if self.linked {
            Ok(())
        } else {
            Err("program needs an attached vertex and fragment stage".to_string())
        }
    }

    fn create_texture(&mut self, path: &Path) -> Result<TextureHandle, String> {
        let handle = TextureHandle::new(self.next_raw());
        self.textures.insert(handle, path.to_path_buf());
        Ok(handle)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if self.bound == Some(texture) {
            self.bound = None;
        }
        self.textures.remove(&texture);
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.bound = texture;
        self.bind_count += 1;
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn clear(&mut self) {
        self.pending.clear();
        self.bind_count = 0;
    }

    fn draw_quad(&mut self, vertices: &[Vertex; 4]) -> Result<(), String> {
        if !self.open {
            return Err("surface is not open".to_string());
        }
        self.pending.push(DrawCall { texture: self.bound, vertices: *vertices });
        Ok(())
    }

    fn present(&mut self) -> Result<(), String> {
        self.last_frame = std::mem::take(&mut self.pending);
        self.presents += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
