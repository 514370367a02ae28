use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::assets::Slot;

/// Semantic UI sounds. Widgets request cues; the mixer maps them to samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Tap,
    Accept,
    Cancel,
}

/// What the GUI tree holds during update. The mixer implements it; tests use
/// a recording fake.
pub trait AudioSink {
    fn play(&mut self, cue: Cue);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleId(u64);

/// Sample registry with dedup: re-registering a name returns the existing
/// id, and byte-identical payloads under different names share one id. Slots
/// carry the usual pending/ready/failed load states.
#[derive(Default)]
pub struct SampleBank {
    next: u64,
    names: HashMap<String, SampleId>,
    slots: HashMap<SampleId, Slot<Arc<[u8]>>>,
    by_hash: HashMap<u64, SampleId>,
}

impl SampleBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues (or returns) the id for a name; the slot starts pending.
    pub fn reserve(&mut self, name: &str) -> SampleId {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        self.next += 1;
        let id = SampleId(self.next);
        self.names.insert(name.to_string(), id);
        self.slots.insert(id, Slot::new());
        id
    }

    /// Resolves a reserved sample. Content identical to an already-ready
    /// sample shares its payload.
    pub fn resolve(&mut self, id: SampleId, result: Result<Vec<u8>, String>) {
        let resolved = result.map(|bytes| {
            let hash = content_hash(&bytes);
            match self.by_hash.get(&hash) {
                Some(existing) => match self.slots.get(existing).and_then(|s| s.get()) {
                    Some(shared) => Arc::clone(shared),
                    None => Arc::from(bytes),
                },
                None => {
                    self.by_hash.insert(hash, id);
                    Arc::from(bytes)
                }
            }
        });
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.resolve(resolved);
        } else {
            log::warn!("resolving unknown sample id {id:?}");
        }
    }

    /// Reserve + resolve in one step. Byte-identical payloads dedup to the
    /// id that first carried them, and the name becomes an alias for it.
    pub fn register(&mut self, name: &str, bytes: Vec<u8>) -> SampleId {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        let hash = content_hash(&bytes);
        if let Some(existing) = self.by_hash.get(&hash) {
            let id = *existing;
            self.names.insert(name.to_string(), id);
            return id;
        }
        let id = self.reserve(name);
        self.resolve(id, Ok(bytes));
        id
    }

    pub fn id(&self, name: &str) -> Option<SampleId> {
        self.names.get(name).copied()
    }

    pub fn data(&self, id: SampleId) -> Option<&Arc<[u8]>> {
        self.slots.get(&id).and_then(|slot| slot.get())
    }

    pub fn is_ready(&self, id: SampleId) -> bool {
        self.data(id).is_some()
    }
}

fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// Plays registered samples with master/sfx volumes and a per-sample
/// cooldown throttle; a sample re-triggered inside the cooldown window is
/// dropped. The actual output device lives behind the `rodio-backend`
/// feature, so headless builds keep the full control surface.
pub struct Mixer {
    bank: SampleBank,
    cues: HashMap<Cue, String>,
    master_volume: f32,
    sfx_volume: f32,
    cooldown: Duration,
    last_played: HashMap<SampleId, Instant>,
    #[cfg(feature = "rodio-backend")]
    backend: rodio_impl::Backend,
}

impl Mixer {
    pub fn new() -> Self {
        let mut cues = HashMap::new();
        cues.insert(Cue::Tap, "tap".to_string());
        cues.insert(Cue::Accept, "accept".to_string());
        cues.insert(Cue::Cancel, "cancel".to_string());
        Self {
            bank: SampleBank::new(),
            cues,
            master_volume: 1.0,
            sfx_volume: 1.0,
            cooldown: Duration::from_millis(80),
            last_played: HashMap::new(),
            #[cfg(feature = "rodio-backend")]
            backend: rodio_impl::Backend::new(),
        }
    }

    pub fn bank(&self) -> &SampleBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut SampleBank {
        &mut self.bank
    }

    pub fn set_cue_sample(&mut self, cue: Cue, name: impl Into<String>) {
        self.cues.insert(cue, name.into());
    }

    pub fn set_master_volume(&mut self, v: f32) {
        self.master_volume = v.clamp(0.0, 1.0);
    }

    pub fn set_sfx_volume(&mut self, v: f32) {
        self.sfx_volume = v.clamp(0.0, 1.0);
    }

    pub fn set_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    fn effective_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    fn should_play(&mut self, id: SampleId) -> bool {
        let now = Instant::now();
        if let Some(prev) = self.last_played.get(&id) {
            if now.duration_since(*prev) < self.cooldown {
                return false;
            }
        }
        self.last_played.insert(id, now);
        true
    }

    /// Plays a registered sample by name. Unknown or still-loading samples
    /// are a logged no-op.
    pub fn play_named(&mut self, name: &str) {
        let Some(id) = self.bank.id(name) else {
            log::warn!("no sample registered as '{name}'");
            return;
        };
        if !self.bank.is_ready(id) {
            log::debug!("sample '{name}' not ready yet");
            return;
        }
        if !self.should_play(id) {
            return;
        }
        let volume = self.effective_volume();
        #[cfg(feature = "rodio-backend")]
        if let Some(data) = self.bank.data(id) {
            self.backend.play(data, volume);
        }
        #[cfg(not(feature = "rodio-backend"))]
        let _ = volume;
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for Mixer {
    fn play(&mut self, cue: Cue) {
        let Some(name) = self.cues.get(&cue).cloned() else {
            return;
        };
        self.play_named(&name);
    }
}

#[cfg(feature = "rodio-backend")]
mod rodio_impl {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    pub struct Backend {
        _stream: Option<OutputStream>,
        handle: Option<OutputStreamHandle>,
    }

    impl Backend {
        pub fn new() -> Self {
            match OutputStream::try_default() {
                Ok((stream, handle)) => Self {
                    _stream: Some(stream),
                    handle: Some(handle),
                },
                Err(e) => {
                    log::error!("audio output unavailable: {e}");
                    Self {
                        _stream: None,
                        handle: None,
                    }
                }
            }
        }

        pub fn play(&self, data: &Arc<[u8]>, volume: f32) {
            let Some(handle) = &self.handle else {
                return;
            };
            let source = match Decoder::new(Cursor::new(data.to_vec())) {
                Ok(source) => source,
                Err(e) => {
                    log::error!("sample decode failed: {e}");
                    return;
                }
            };
            if let Ok(sink) = Sink::try_new(handle) {
                sink.set_volume(volume.max(0.0));
                sink.append(source);
                sink.detach();
            }
        }
    }
}
