//! Recording coordinator
//!
//! Owns the single active capture session and the current stream handle,
//! and drives the Idle/Recording state machine: start, stop, device switch,
//! and startup recovery of chunks left behind by an interrupted run.

use crate::capture::traits::{
    AcquisitionError, MediaStream, RecorderError, RecorderFactory, StreamAcquirer,
    StreamConstraints,
};
use crate::config::RecordingConfig;
use crate::playback::{reconstruct, resolve_chunk_source, ChunkOrigin, PlayableArtifact};
use crate::recorder::session::CaptureSession;
use crate::recorder::state::{RecordingOutcome, RecordingState, SessionInfo};
use crate::settings::Settings;
use crate::store::ChunkStore;
use crate::utils::format_size;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Events emitted during recording
#[derive(Debug, Clone)]
pub enum RecordingEvent {
    /// Recording started
    Started,
    /// Recording stopped
    Stopped,
    /// The current stream was replaced with another device's
    DeviceSwitched { device_id: String },
    /// Durable storage failed; capture continues memory-only
    StorageDegraded { reason: String },
    /// A reconstructed recording is ready for playback
    ArtifactReady {
        artifact: PlayableArtifact,
        total_bytes: usize,
    },
}

/// Coordinator-level errors
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

/// Manages the capture lifecycle.
///
/// At most one capture session exists at a time; the coordinator owns it
/// exclusively, along with the current stream handle and the process-wide
/// chunk store connection.
pub struct RecordingCoordinator {
    /// Current recording state
    state: Arc<RwLock<RecordingState>>,

    /// Acquisition collaborator
    acquirer: Arc<dyn StreamAcquirer>,

    /// Recorder collaborator
    recorder_factory: Arc<dyn RecorderFactory>,

    /// Process-wide chunk store; `None` when durable storage is unavailable
    store: Option<Arc<ChunkStore>>,

    /// Current stream handle, held across recordings for preview/reuse
    stream: Option<Arc<dyn MediaStream>>,

    /// The single active capture session
    session: Option<CaptureSession>,

    /// Completed session bookkeeping
    history: Vec<SessionInfo>,

    /// Index assigned to the next session
    next_session_index: usize,

    /// Persisted preferences (last-selected device)
    settings: Settings,
    settings_path: PathBuf,

    /// Event broadcaster
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl RecordingCoordinator {
    /// Create a coordinator.
    ///
    /// `store` is `None` when opening durable storage failed; recordings
    /// then rely on the in-memory buffer alone.
    pub fn new(
        acquirer: Arc<dyn StreamAcquirer>,
        recorder_factory: Arc<dyn RecorderFactory>,
        store: Option<Arc<ChunkStore>>,
        settings_path: PathBuf,
    ) -> Self {
        let settings = match Settings::load(&settings_path) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("settings unreadable, using defaults: {err}");
                Settings::default()
            }
        };

        let (event_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(RecordingState::Idle)),
            acquirer,
            recorder_factory,
            store,
            stream: None,
            session: None,
            history: Vec::new(),
            next_session_index: 0,
            settings,
            settings_path,
            event_tx,
        }
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        *self.state.read()
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.event_tx.subscribe()
    }

    /// Device preferred by persisted settings
    pub fn preferred_device_id(&self) -> Option<&str> {
        self.settings.device_id.as_deref()
    }

    /// Whether a stream handle is currently held
    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Acquire the startup stream, preferring the persisted device
    pub async fn acquire_initial_stream(&mut self) -> Result<(), AcquisitionError> {
        let constraints = StreamConstraints::for_device(self.settings.device_id.as_deref());
        let stream = self.acquirer.acquire(&constraints).await?;

        tracing::info!(device = stream.id(), "capture stream acquired");
        self.stream = Some(stream);
        Ok(())
    }

    /// Rebuild the artifact of a prior, possibly interrupted run.
    ///
    /// Returns `None` when the durable store is absent or empty. Emits
    /// [`RecordingEvent::ArtifactReady`] when chunks were found.
    pub fn recover(&self, mime_type: &str) -> Option<PlayableArtifact> {
        let store = self.store.as_deref()?;
        let source = resolve_chunk_source(Some(store), &[]);
        if source.chunks.is_empty() {
            return None;
        }

        tracing::info!(
            chunks = source.chunks.len(),
            "recovered chunks from a previous run"
        );

        let artifact = reconstruct(&source, mime_type);
        let _ = self.event_tx.send(RecordingEvent::ArtifactReady {
            total_bytes: artifact.len(),
            artifact: artifact.clone(),
        });
        Some(artifact)
    }

    /// Start recording.
    ///
    /// A missing stream handle makes this a silent no-op; starting while
    /// already recording is an error and leaves the active session
    /// untouched.
    pub async fn start(&mut self, config: RecordingConfig) -> Result<(), CoordinatorError> {
        if self.state() != RecordingState::Idle {
            return Err(CoordinatorError::AlreadyRecording);
        }

        let Some(stream) = self.stream.clone() else {
            tracing::warn!("start requested without a stream handle; ignoring");
            return Ok(());
        };

        // Residual chunks from a previous recording must be gone before the
        // session's first write. A failed clear withholds the store from the
        // session entirely, so stale chunks can never bleed into this one.
        let session_store = match &self.store {
            Some(store) => match store.clear().await {
                Ok(()) => Some(Arc::clone(store)),
                Err(err) => {
                    tracing::warn!("clear failed, recording memory-only: {err}");
                    let _ = self.event_tx.send(RecordingEvent::StorageDegraded {
                        reason: err.to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        let recorder = match self
            .recorder_factory
            .create(Arc::clone(&stream), &config.mime_type)
        {
            Ok(recorder) => recorder,
            Err(RecorderError::UnsupportedFormat(mime)) => {
                tracing::warn!("format '{mime}' unsupported, using host default");
                self.recorder_factory.create(Arc::clone(&stream), "")?
            }
            Err(err) => return Err(err.into()),
        };

        let index = self.next_session_index;
        self.next_session_index += 1;

        let mut session = CaptureSession::new(recorder, stream, session_store, index);
        session.begin(config.slice_interval())?;
        self.session = Some(session);

        *self.state.write() = RecordingState::Recording;
        let _ = self.event_tx.send(RecordingEvent::Started);

        tracing::info!(session = index, "recording started");
        Ok(())
    }

    /// Stop recording and reconstruct the playable artifact
    pub async fn stop(&mut self) -> Result<RecordingOutcome, CoordinatorError> {
        if self.state() != RecordingState::Recording {
            return Err(CoordinatorError::NotRecording);
        }
        let mut session = self.session.take().ok_or(CoordinatorError::NotRecording)?;

        session.stop().await?;

        let buffered = session.buffered_chunks();
        let source = resolve_chunk_source(session.store().map(|store| store.as_ref()), &buffered);
        let artifact = reconstruct(&source, session.mime_type());

        let outcome = RecordingOutcome {
            chunk_count: source.chunks.len(),
            duration_ms: session.info().duration_ms(),
            from_durable_store: source.origin == ChunkOrigin::DurableStore,
            artifact: artifact.clone(),
        };
        self.history.push(session.info().clone());

        *self.state.write() = RecordingState::Idle;
        let _ = self.event_tx.send(RecordingEvent::Stopped);
        let _ = self.event_tx.send(RecordingEvent::ArtifactReady {
            total_bytes: artifact.len(),
            artifact,
        });

        tracing::info!(
            chunks = outcome.chunk_count,
            size = %format_size(outcome.artifact.len()),
            "recording stopped"
        );
        Ok(outcome)
    }

    /// Switch to another capture device.
    ///
    /// Stops any active recording first, releases every track of the old
    /// stream, then acquires the new one; two live stream/recorder pairs
    /// never coexist. The chosen device is persisted for the next run.
    pub async fn switch_device(&mut self, device_id: &str) -> Result<(), CoordinatorError> {
        if self.state() == RecordingState::Recording {
            self.stop().await?;
        }

        if let Some(old) = self.stream.take() {
            old.stop_tracks();
            tracing::debug!(device = old.id(), "released previous stream");
        }

        let constraints = StreamConstraints::for_device(Some(device_id));
        let stream = self.acquirer.acquire(&constraints).await?;
        self.stream = Some(stream);

        self.settings.device_id = Some(device_id.to_string());
        if let Err(err) = self.settings.save(&self.settings_path) {
            tracing::warn!("device preference not persisted: {err}");
        }

        let _ = self.event_tx.send(RecordingEvent::DeviceSwitched {
            device_id: device_id.to_string(),
        });

        tracing::info!(device = device_id, "switched capture device");
        Ok(())
    }

    /// Duration of the active recording, or of the last completed one
    pub fn duration_ms(&self) -> u64 {
        if self.state() == RecordingState::Recording {
            self.session
                .as_ref()
                .map(|s| s.info().elapsed_ms())
                .unwrap_or(0)
        } else {
            self.history.last().map(|s| s.duration_ms()).unwrap_or(0)
        }
    }
}
