//=========================================================================
// Audio Backend
//=========================================================================
//
// Seam between `AudioService` and whatever actually produces sound.
//
// The service owns the registries, the id rules and the group
// properties; a backend only turns files into handles and handles into
// voices. Errors cross this boundary as plain strings and are wrapped
// into the crate taxonomy by the service.
//
// `HeadlessAudioBackend` mixes nothing. It keeps the voice table a real
// mixer would keep, which is what tests and the headless host inspect.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::trace;

//=== Internal Dependencies ===============================================

use super::types::{ChannelGroup, ChannelGroupState, ChannelSelect, LoopMode, PlayOptions, SoundMode};
use crate::config::AudioConfig;

//=== SoundHandle =========================================================

/// Backend-issued reference to a loaded sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(u64);

impl SoundHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

//=== AudioBackend ========================================================

/// Device-level audio operations.
pub trait AudioBackend: Send {
    /// Opens the output device with `config.max_channels` voices.
    fn init(&mut self, config: &AudioConfig) -> Result<(), String>;

    /// Stops every voice and closes the device.
    fn shutdown(&mut self);

    fn create_sound(&mut self, path: &Path, mode: SoundMode) -> Result<SoundHandle, String>;

    /// Stops any voice of `sound` and frees its data.
    fn release_sound(&mut self, sound: SoundHandle);

    fn play(
        &mut self,
        sound: SoundHandle,
        group: ChannelGroup,
        options: &PlayOptions,
    ) -> Result<(), String>;

    /// Stops every voice currently playing `sound`.
    fn stop(&mut self, sound: SoundHandle);

    /// Pushes a group's pause/mute/volume to the mixer.
    fn apply_group(&mut self, group: ChannelGroup, state: ChannelGroupState);

    /// Advances the mixer by one frame.
    fn update(&mut self);

    /// Downcasts to `&dyn Any` for backend-specific inspection.
    fn as_any(&self) -> &dyn Any;
}

//=========================================================================
// HeadlessAudioBackend
//=========================================================================

/// A voice in the headless mixer.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessVoice {
    pub sound: SoundHandle,
    pub group: ChannelGroup,
    pub options: PlayOptions,
    /// Play-throughs left after the current one; `None` repeats forever.
    pub remaining: Option<u32>,
}

#[derive(Debug)]
struct HeadlessSound {
    path: PathBuf,
    mode: SoundMode,
}

/// Silent mixer that tracks voices per update tick.
///
/// Each `update` counts as one complete play-through of every
/// unpaused voice.
#[derive(Debug, Default)]
pub struct HeadlessAudioBackend {
    initialized: bool,
    next_handle: u64,
    sounds: HashMap<SoundHandle, HeadlessSound>,
    slots: Vec<Option<HeadlessVoice>>,
    groups: [ChannelGroupState; ChannelGroup::COUNT],
    updates: u64,
}

impl HeadlessAudioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Inspection -------------------------------------------------------

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }

    pub fn sound_path(&self, sound: SoundHandle) -> Option<&Path> {
        self.sounds.get(&sound).map(|s| s.path.as_path())
    }

    pub fn sound_mode(&self, sound: SoundHandle) -> Option<SoundMode> {
        self.sounds.get(&sound).map(|s| s.mode)
    }

    pub fn voices(&self) -> impl Iterator<Item = &HeadlessVoice> {
        self.slots.iter().flatten()
    }

    pub fn voice_in_slot(&self, slot: u32) -> Option<&HeadlessVoice> {
        self.slots.get(slot as usize).and_then(Option::as_ref)
    }

    pub fn active_voices(&self) -> usize {
        self.voices().count()
    }

    /// Number of voices of `sound` currently playing.
    pub fn voices_of(&self, sound: SoundHandle) -> usize {
        self.voices().filter(|v| v.sound == sound).count()
    }

    /// Voice gain after its group and the master group are applied.
    pub fn effective_gain(&self, voice: &HeadlessVoice) -> f32 {
        let master = self.groups[ChannelGroup::Master.index()];
        let group = self.groups[voice.group.index()];
        voice.options.volume * group.gain() * master.gain()
    }

    pub fn group_state(&self, group: ChannelGroup) -> ChannelGroupState {
        self.groups[group.index()]
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    //--- Helpers ----------------------------------------------------------

    fn is_paused(&self, group: ChannelGroup) -> bool {
        self.groups[ChannelGroup::Master.index()].paused || self.groups[group.index()].paused
    }

    /// Picks a slot for a new voice of the given priority, or `None` when
    /// every slot holds something more important. A reused channel must
    /// exist.
    fn select_slot(&self, options: &PlayOptions) -> Result<Option<usize>, String> {
        if let ChannelSelect::Reuse(index) = options.channel {
            let slot = index as usize;
            if slot >= self.slots.len() {
                return Err(format!("channel {} out of range (0..{})", index, self.slots.len()));
            }
            return Ok(Some(slot));
        }

        if let Some(free) = self.slots.iter().position(Option::is_none) {
            return Ok(Some(free));
        }

        // Steal the least important voice, ties going to the oldest slot.
        Ok(self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v.options.priority)))
            .filter(|&(_, priority)| priority > options.priority)
            .max_by_key(|&(i, priority)| (priority, std::cmp::Reverse(i)))
            .map(|(i, _)| i))
    }
}

impl AudioBackend for HeadlessAudioBackend {
    fn init(&mut self, config: &AudioConfig) -> Result<(), String> {
        if config.max_channels == 0 {
            return Err("mixer needs at least one channel".to_string());
        }
        self.slots = vec![None; config.max_channels as usize];
        self.groups = [ChannelGroupState::with_volume(config.default_volume); ChannelGroup::COUNT];
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.slots.clear();
        self.sounds.clear();
        self.initialized = false;
    }

    fn create_sound(&mut self, path: &Path, mode: SoundMode) -> Result<SoundHandle, String> {
        if path.as_os_str().is_empty() {
            return Err("empty path".to_string());
        }
        self.next_handle += 1;
        let handle = SoundHandle::new(self.next_handle);
        self.sounds.insert(handle, HeadlessSound { path: path.to_path_buf(), mode });
        Ok(handle)
    }

    fn release_sound(&mut self, sound: SoundHandle) {
        self.stop(sound);
        self.sounds.remove(&sound);
    }

    fn play(
        &mut self,
        sound: SoundHandle,
        group: ChannelGroup,
        options: &PlayOptions,
    ) -> Result<(), String> {
        if !self.sounds.contains_key(&sound) {
            return Err(format!("no sound for handle {}", sound.raw()));
        }

        let Some(slot) = self.select_slot(options)? else {
            trace!(target: "audio", "all channels busy; dropping voice for handle {}", sound.raw());
            return Ok(());
        };

        let remaining = match options.looping {
            LoopMode::Once => Some(0),
            LoopMode::Count(n) => Some(n),
            LoopMode::Infinite => None,
        };
        self.slots[slot] = Some(HeadlessVoice { sound, group, options: *options, remaining });
        Ok(())
    }

    fn stop(&mut self, sound: SoundHandle) {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|v| v.sound == sound) {
                *slot = None;
            }
        }
    }

    fn apply_group(&mut self, group: ChannelGroup, state: ChannelGroupState) {
        self.groups[group.index()] = state;
    }

    fn update(&mut self) {
        self.updates += 1;

        for index in 0..self.slots.len() {
            let Some(voice) = self.slots[index].as_ref() else {
                continue;
            };
            if self.is_paused(voice.group) {
                continue;
            }

            match voice.remaining {
                Some(0) => self.slots[index] = None,
                Some(left) => {
                    if let Some(voice) = self.slots[index].as_mut() {
                        voice.remaining = Some(left - 1);
                    }
                }
                None => {}
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(channels: u32) -> HeadlessAudioBackend {
        let mut backend = HeadlessAudioBackend::new();
        backend
            .init(&AudioConfig { max_channels: channels, ..AudioConfig::default() })
            .unwrap();
        backend
    }

    #[test]
    fn zero_channels_fails_init() {
        let mut backend = HeadlessAudioBackend::new();
        let config = AudioConfig { max_channels: 0, ..AudioConfig::default() };
        assert!(backend.init(&config).is_err());
        assert!(!backend.is_initialized());
    }

    #[test]
    fn counted_loop_plays_n_plus_one_times() {
        let mut backend = backend(4);
        let sound = backend.create_sound(Path::new("jump.wav"), SoundMode::Sample).unwrap();
        let options = PlayOptions::new().looping(LoopMode::Count(2));
        backend.play(sound, ChannelGroup::Sfx, &options).unwrap();

        backend.update();
        backend.update();
        assert_eq!(backend.voices_of(sound), 1);
        backend.update();
        assert_eq!(backend.voices_of(sound), 0);
    }

    #[test]
    fn paused_master_holds_every_voice() {
        let mut backend = backend(4);
        let sound = backend.create_sound(Path::new("hit.wav"), SoundMode::Sample).unwrap();
        backend.play(sound, ChannelGroup::Sfx, &PlayOptions::new()).unwrap();

        let paused = ChannelGroupState { paused: true, ..ChannelGroupState::default() };
        backend.apply_group(ChannelGroup::Master, paused);
        backend.update();
        assert_eq!(backend.active_voices(), 1);

        backend.apply_group(ChannelGroup::Master, ChannelGroupState::default());
        backend.update();
        assert_eq!(backend.active_voices(), 0);
    }

    #[test]
    fn full_mixer_steals_less_important_voice() {
        let mut backend = backend(1);
        let quiet = backend.create_sound(Path::new("amb.ogg"), SoundMode::Stream).unwrap();
        let loud = backend.create_sound(Path::new("boom.wav"), SoundMode::Sample).unwrap();

        backend.play(quiet, ChannelGroup::Sfx, &PlayOptions::new().priority(200)).unwrap();
        backend.play(loud, ChannelGroup::Sfx, &PlayOptions::new().priority(10)).unwrap();
        assert_eq!(backend.voices_of(loud), 1);
        assert_eq!(backend.voices_of(quiet), 0);

        // Less important than what is playing: dropped.
        backend.play(quiet, ChannelGroup::Sfx, &PlayOptions::new().priority(250)).unwrap();
        assert_eq!(backend.voices_of(quiet), 0);
    }

    #[test]
    fn reuse_replaces_the_given_slot() {
        let mut backend = backend(2);
        let a = backend.create_sound(Path::new("a.wav"), SoundMode::Sample).unwrap();
        let b = backend.create_sound(Path::new("b.wav"), SoundMode::Sample).unwrap();

        backend.play(a, ChannelGroup::Sfx, &PlayOptions::new().channel(ChannelSelect::Reuse(1))).unwrap();
        backend.play(b, ChannelGroup::Sfx, &PlayOptions::new().channel(ChannelSelect::Reuse(1))).unwrap();

        assert_eq!(backend.voice_in_slot(1).map(|v| v.sound), Some(b));
        assert_eq!(backend.active_voices(), 1);
    }

    #[test]
    fn reuse_out_of_range_is_an_error() {
        let mut backend = backend(2);
        let a = backend.create_sound(Path::new("a.wav"), SoundMode::Sample).unwrap();

        let err = backend
            .play(a, ChannelGroup::Sfx, &PlayOptions::new().channel(ChannelSelect::Reuse(2)))
            .unwrap_err();

        assert!(err.contains("out of range"), "{}", err);
        assert_eq!(backend.active_voices(), 0);
    }

    #[test]
    fn busy_mixer_drop_is_not_an_error() {
        let mut backend = backend(2);
        let a = backend.create_sound(Path::new("a.wav"), SoundMode::Sample).unwrap();
        let b = backend.create_sound(Path::new("b.wav"), SoundMode::Sample).unwrap();
        backend.play(a, ChannelGroup::Sfx, &PlayOptions::new().priority(0)).unwrap();
        backend.play(a, ChannelGroup::Sfx, &PlayOptions::new().priority(0)).unwrap();

        assert!(backend.play(b, ChannelGroup::Sfx, &PlayOptions::new().priority(128)).is_ok());
        assert_eq!(backend.voices_of(b), 0);
        assert_eq!(backend.voices_of(a), 2);
    }

    #[test]
    fn gain_multiplies_through_master() {
        let mut backend = backend(2);
        let sound = backend.create_sound(Path::new("theme.ogg"), SoundMode::Stream).unwrap();
        backend.play(sound, ChannelGroup::Music, &PlayOptions::new().volume(0.5)).unwrap();
        backend.apply_group(ChannelGroup::Music, ChannelGroupState::with_volume(0.5));
        backend.apply_group(ChannelGroup::Master, ChannelGroupState::with_volume(0.8));

        let voice = backend.voices().next().unwrap().clone();
        assert!((backend.effective_gain(&voice) - 0.2).abs() < 1e-6);

        backend.apply_group(ChannelGroup::Master, ChannelGroupState { muted: true, ..ChannelGroupState::default() });
        assert_eq!(backend.effective_gain(&voice), 0.0);
    }
}
