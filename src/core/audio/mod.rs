//=========================================================================
// Audio Service
//=========================================================================
//
// Named sound registry on top of an `AudioBackend`.
//
// Sounds are registered per `AudioKind`; an id must be unique within its
// kind. Playback is routed to the kind's channel group, and group
// properties are mirrored here so they can be read back without asking
// the backend.
//
// Lifecycle:
//   new(backend) → allocate(config) → load/play/... → deallocate()
//
// Every call made before `allocate` (or after `deallocate`) is a no-op
// returning `Ok`. Unknown ids are always errors once allocated.
//
//=========================================================================

//=== Module Declarations =================================================

mod backend;
mod manifest;
mod types;

//=== Public API ==========================================================

pub use backend::{AudioBackend, HeadlessAudioBackend, HeadlessVoice, SoundHandle};
pub use manifest::{AudioManifest, ManifestEntry};
pub use types::{
    AudioKind, ChannelGroup, ChannelGroupState, ChannelSelect, GroupProperty, LoadOptions,
    LoopMode, PlayOptions, SoundMode,
};

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use crate::config::AudioConfig;
use crate::error::{AssetError, InitializationError, Result};

//=== AudioService ========================================================

/// Sound registry and channel-group mixer front end.
pub struct AudioService {
    backend: Box<dyn AudioBackend>,
    allocated: bool,
    sounds: HashMap<AudioKind, HashMap<String, SoundHandle>>,
    groups: [ChannelGroupState; ChannelGroup::COUNT],
}

impl AudioService {
    pub fn new(backend: impl AudioBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            allocated: false,
            sounds: HashMap::new(),
            groups: [ChannelGroupState::default(); ChannelGroup::COUNT],
        }
    }

    /// Service backed by [`HeadlessAudioBackend`].
    pub fn headless() -> Self {
        Self::new(HeadlessAudioBackend::new())
    }

    //=====================================================================
    // Lifecycle
    //=====================================================================

    pub fn allocate(&mut self, config: &AudioConfig) -> std::result::Result<(), InitializationError> {
        if self.allocated {
            return Err(InitializationError::AlreadyAllocated("audio service"));
        }

        self.backend
            .init(config)
            .map_err(|reason| InitializationError::Subsystem { subsystem: "audio", reason })?;

        self.groups = [ChannelGroupState::with_volume(config.default_volume); ChannelGroup::COUNT];
        for group in ChannelGroup::ALL {
            self.backend.apply_group(group, self.groups[group.index()]);
        }

        self.sounds = AudioKind::ALL.into_iter().map(|kind| (kind, HashMap::new())).collect();
        self.allocated = true;

        info!(target: "audio", "allocated ({} channels)", config.max_channels);
        Ok(())
    }

    /// Releases every sound and closes the backend. Safe to call twice.
    pub fn deallocate(&mut self) {
        if !self.allocated {
            return;
        }

        for (_, registry) in self.sounds.drain() {
            for (_, handle) in registry {
                self.backend.release_sound(handle);
            }
        }
        self.backend.shutdown();
        self.allocated = false;

        info!(target: "audio", "deallocated");
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Advances the mixer. Called once per frame by the application manager.
    pub fn update(&mut self) {
        if self.allocated {
            self.backend.update();
        }
    }

    //=====================================================================
    // Sound Registry
    //=====================================================================

    pub fn load(
        &mut self,
        kind: AudioKind,
        id: &str,
        path: impl AsRef<Path>,
        options: LoadOptions,
    ) -> Result<()> {
        if !self.allocated {
            debug!(target: "audio", "load of '{id}' ignored: service not allocated");
            return Ok(());
        }

        let path = path.as_ref();
        let registry = self.sounds.entry(kind).or_default();
        if registry.contains_key(id) {
            return Err(AssetError::Duplicate { kind: kind.to_string(), id: id.to_string() }.into());
        }

        let mode = options.mode.unwrap_or(kind.mode());
        let handle = self.backend.create_sound(path, mode).map_err(|reason| AssetError::Load {
            path: path.to_path_buf(),
            reason,
        })?;
        registry.insert(id.to_string(), handle);

        debug!(target: "audio", "loaded {kind} '{id}' from {}", path.display());
        Ok(())
    }

    /// Stops and releases a sound, freeing its id for reuse.
    pub fn unload(&mut self, kind: AudioKind, id: &str) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }

        let handle = self
            .sounds
            .get_mut(&kind)
            .and_then(|registry| registry.remove(id))
            .ok_or_else(|| unknown(kind, id))?;
        self.backend.release_sound(handle);

        debug!(target: "audio", "unloaded {kind} '{id}'");
        Ok(())
    }

    pub fn is_loaded(&self, kind: AudioKind, id: &str) -> bool {
        self.sounds.get(&kind).is_some_and(|registry| registry.contains_key(id))
    }

    /// Backend handle of a loaded sound.
    pub fn handle(&self, kind: AudioKind, id: &str) -> Option<SoundHandle> {
        self.sounds.get(&kind).and_then(|registry| registry.get(id)).copied()
    }

    //=====================================================================
    // Playback
    //=====================================================================

    /// Starts a voice of the sound on its kind's channel group.
    pub fn play(&mut self, kind: AudioKind, id: &str, options: &PlayOptions) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }

        let handle = self.handle(kind, id).ok_or_else(|| unknown(kind, id))?;
        self.backend
            .play(handle, kind.group(), options)
            .map_err(|reason| AssetError::Playback { id: id.to_string(), reason })?;
        Ok(())
    }

    /// Stops every voice playing the sound.
    pub fn stop(&mut self, kind: AudioKind, id: &str) -> Result<()> {
        if !self.allocated {
            return Ok(());
        }

        let handle = self.handle(kind, id).ok_or_else(|| unknown(kind, id))?;
        self.backend.stop(handle);
        Ok(())
    }

    //=====================================================================
    // Channel Groups
    //=====================================================================

    pub fn group_state(&self, group: ChannelGroup) -> ChannelGroupState {
        self.groups[group.index()]
    }

    pub fn set_group_property(&mut self, group: ChannelGroup, property: GroupProperty) {
        if !self.allocated {
            return;
        }

        let state = &mut self.groups[group.index()];
        match property {
            GroupProperty::Paused(paused) => state.paused = paused,
            GroupProperty::Muted(muted) => state.muted = muted,
            GroupProperty::Volume(volume) => {
                if !(0.0..=1.0).contains(&volume) {
                    warn!(target: "audio", "{group:?} volume {volume} clamped to 0..=1");
                }
                state.volume = volume.clamp(0.0, 1.0);
            }
        }
        self.backend.apply_group(group, *state);
    }

    //=====================================================================
    // Manifests
    //=====================================================================

    /// Loads every entry, stopping at the first failure. Entries loaded
    /// before the failure stay loaded.
    pub fn load_manifest(&mut self, manifest: &AudioManifest) -> Result<()> {
        for entry in manifest.entries() {
            self.load(entry.kind, &entry.id, &entry.path, LoadOptions::default())?;
        }
        Ok(())
    }

    /// Unloads every entry that is currently loaded; missing ones are skipped.
    pub fn unload_manifest(&mut self, manifest: &AudioManifest) -> Result<()> {
        for entry in manifest.entries() {
            if self.is_loaded(entry.kind, &entry.id) {
                self.unload(entry.kind, &entry.id)?;
            }
        }
        Ok(())
    }

    //=====================================================================
    // Backend Access
    //=====================================================================

    /// Concrete backend, when it is of type `B`.
    pub fn backend_as<B: AudioBackend + 'static>(&self) -> Option<&B> {
        self.backend.as_any().downcast_ref::<B>()
    }
}

impl Drop for AudioService {
    fn drop(&mut self) {
        self.deallocate();
    }
}

fn unknown(kind: AudioKind, id: &str) -> crate::error::Error {
    AssetError::UnknownId { kind: kind.to_string(), id: id.to_string() }.into()
}

//=========================================================================
// Unit Tests
//=========================================================================
