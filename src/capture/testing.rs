//! In-crate fakes for the capture collaborators, used by the recorder and
//! playback tests.

use super::traits::{
    AcquisitionError, ChunkRecorder, Emission, MediaStream, RecorderError, RecorderFactory,
    StreamAcquirer, StreamConstraints,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// A stream handle whose tracks can be stopped and inspected
pub(crate) struct FakeStream {
    id: String,
    active: AtomicBool,
}

impl FakeStream {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            active: AtomicBool::new(true),
        }
    }
}

impl MediaStream for FakeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop_tracks(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Hands out [`FakeStream`]s and records whether any previously issued
/// stream was still live at acquisition time.
#[derive(Default)]
pub(crate) struct FakeAcquirer {
    pub(crate) fail_with: Mutex<Option<AcquisitionError>>,
    pub(crate) issued: Mutex<Vec<Arc<FakeStream>>>,
    pub(crate) saw_live_stream_on_acquire: AtomicBool,
}

#[async_trait]
impl StreamAcquirer for FakeAcquirer {
    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Arc<dyn MediaStream>, AcquisitionError> {
        if let Some(err) = self.fail_with.lock().clone() {
            return Err(err);
        }

        let mut issued = self.issued.lock();
        if issued.iter().any(|s| s.is_active()) {
            self.saw_live_stream_on_acquire.store(true, Ordering::SeqCst);
        }

        let id = constraints
            .device_id
            .clone()
            .unwrap_or_else(|| "default-device".to_string());
        let stream = Arc::new(FakeStream::new(id));
        issued.push(Arc::clone(&stream));

        Ok(stream)
    }
}

/// A recorder that replays a scripted emission sequence immediately, then
/// holds the final flush until `stop` is requested.
pub(crate) struct ScriptedRecorder {
    emissions: Vec<Vec<u8>>,
    final_emission: Vec<u8>,
    mime: String,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl ScriptedRecorder {
    pub(crate) fn new(
        emissions: Vec<Vec<u8>>,
        final_emission: Vec<u8>,
        mime: impl Into<String>,
    ) -> Self {
        Self {
            emissions,
            final_emission,
            mime: mime.into(),
            stop_tx: None,
        }
    }
}

#[async_trait]
impl ChunkRecorder for ScriptedRecorder {
    fn start(
        &mut self,
        _slice_interval: Duration,
    ) -> Result<mpsc::Receiver<Emission>, RecorderError> {
        let (tx, rx) = mpsc::channel(16);
        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);

        let emissions = self.emissions.clone();
        let final_data = self.final_emission.clone();
        tokio::spawn(async move {
            for data in emissions {
                if tx.send(Emission {
                    data,
                    is_final: false,
                })
                .await
                .is_err()
                {
                    return;
                }
            }
            let _ = stop_rx.await;
            let _ = tx
                .send(Emission {
                    data: final_data,
                    is_final: true,
                })
                .await;
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), RecorderError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        Ok(())
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }
}

/// Builds [`ScriptedRecorder`]s, rejecting mime types outside its supported
/// set. An empty mime request yields the host default format.
pub(crate) struct FakeRecorderFactory {
    pub(crate) emissions: Vec<Vec<u8>>,
    pub(crate) final_emission: Vec<u8>,
    pub(crate) supported: Vec<String>,
    pub(crate) default_mime: String,
}

impl FakeRecorderFactory {
    pub(crate) fn scripted(emissions: Vec<Vec<u8>>, final_emission: Vec<u8>) -> Self {
        Self {
            emissions,
            final_emission,
            supported: vec!["video/mp4".to_string()],
            default_mime: "video/webm;codecs=vp8,opus".to_string(),
        }
    }
}

impl RecorderFactory for FakeRecorderFactory {
    fn create(
        &self,
        _stream: Arc<dyn MediaStream>,
        mime_type: &str,
    ) -> Result<Box<dyn ChunkRecorder>, RecorderError> {
        let effective = if mime_type.is_empty() {
            self.default_mime.clone()
        } else if self.supported.iter().any(|m| m == mime_type) {
            mime_type.to_string()
        } else {
            return Err(RecorderError::UnsupportedFormat(mime_type.to_string()));
        };

        Ok(Box::new(ScriptedRecorder::new(
            self.emissions.clone(),
            self.final_emission.clone(),
            effective,
        )))
    }
}
