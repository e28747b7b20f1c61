//=========================================================================
// Error Taxonomy
//=========================================================================
//
// Every failure the runtime can report, grouped by the boundary that
// raises it.
//
//   InitializationError  double allocate, subsystem setup failure
//   AssetError           unknown/duplicate ids, invalid audio kind
//   RenderError          shader compile/link, missing shader/texture
//   ConfigError          unreadable or malformed configuration
//   PlatformError        window/event-loop failures on the host side
//
// None of these are retried by the core. They abort the operation in
// flight and surface to whoever called `AppManager::start` or
// `Engine::run`, which decides whether the failure is fatal.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use thiserror::Error;

//=== InitializationError =================================================

/// Raised while bringing a subsystem up.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InitializationError {
    /// `allocate` called twice without an intervening `deallocate`.
    #[error("{0} is already allocated")]
    AlreadyAllocated(&'static str),

    /// `start` called while states from a previous run are still stacked.
    #[error("application manager already holds {depth} state(s); deallocate before starting again")]
    AlreadyStarted {
        /// Number of states still on the stack.
        depth: usize,
    },

    /// A backend refused to initialise.
    #[error("{subsystem} failed to initialise: {reason}")]
    Subsystem {
        /// Which subsystem failed ("audio", "video", ...).
        subsystem: &'static str,
        /// Backend-provided reason.
        reason: String,
    },
}

//=== AssetError ==========================================================

/// Raised by resource registries (sounds, shaders, textures).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssetError {
    /// An id was registered twice under the same kind.
    #[error("asset '{id}' is already loaded as {kind}")]
    Duplicate {
        /// Registry the id belongs to.
        kind: String,
        /// The offending id.
        id: String,
    },

    /// An id was looked up but never loaded (or already unloaded).
    #[error("asset '{id}' is not loaded as {kind}")]
    UnknownId {
        /// Registry the id was looked up in.
        kind: String,
        /// The missing id.
        id: String,
    },

    /// A kind value outside the known set (the "invalid" sentinel).
    #[error("invalid asset kind '{0}'")]
    InvalidKind(String),

    /// The backend could not open or decode the file.
    #[error("failed to load '{}': {reason}", .path.display())]
    Load {
        /// Path handed to the backend.
        path: PathBuf,
        /// Backend-provided reason.
        reason: String,
    },

    /// The backend refused to start a voice for a loaded sound.
    #[error("failed to play '{id}': {reason}")]
    Playback {
        /// Sound id.
        id: String,
        /// Backend-provided reason.
        reason: String,
    },
}

//=== RenderError =========================================================

/// Raised by the video service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Shader source failed to compile.
    #[error("shader '{id}' failed to compile: {log}")]
    Compile {
        /// Shader id.
        id: String,
        /// Compiler output.
        log: String,
    },

    /// Shader program failed to link.
    #[error("shader program failed to link: {0}")]
    Link(String),

    /// Lookup of a shader id that is not loaded.
    #[error("shader '{0}' is not loaded")]
    UnknownShader(String),

    /// Lookup of a texture id that is not loaded.
    #[error("texture '{0}' is not loaded")]
    UnknownTexture(String),

    /// Texture file is not a PNG image.
    #[error("unsupported texture format for '{}' (PNG required)", .0.display())]
    UnsupportedTexture(PathBuf),

    /// Shader source file could not be read.
    #[error("failed to read shader source '{}': {source}", .path.display())]
    ShaderSource {
        /// Path of the shader file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Backend draw or present failure.
    #[error("draw failed: {0}")]
    Draw(String),
}

//=== ConfigError =========================================================

/// Raised while loading an [`EngineConfig`](crate::config::EngineConfig) or asset manifest.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config '{}': {source}", .path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File contents are not valid TOML for the expected schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed successfully but a value is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted field path.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

//=== PlatformError =======================================================

/// Host/window failures. Typically fatal.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlatformError {
    /// Failed to create the event loop (OS-level issue).
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(String),

    /// Event loop terminated abnormally.
    #[error("event loop error: {0}")]
    EventLoopExecution(String),

    /// The core thread panicked.
    #[error("core thread panicked")]
    CoreThreadPanicked,
}

//=== Error ===============================================================

/// Crate-level error wrapping every subsystem taxonomy.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Initialization(#[from] InitializationError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

//=========================================================================
// Unit Tests
//=========================================================================
