//! Recording format table
//!
//! The set of container/codec combinations a host recorder commonly
//! supports, used to populate format pickers and to describe what a session
//! actually recorded. Whether a given format works is still the recorder
//! collaborator's call; an unsupported request falls back to the host
//! default at session start.

/// One selectable recording format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingFormat {
    /// Full mime type, e.g. `video/webm;codecs=vp9,opus`
    pub mime: &'static str,

    /// File extension for the reconstructed artifact
    pub extension: &'static str,

    /// Codec summary for display
    pub codecs: &'static str,

    /// Compatibility note for display
    pub note: &'static str,
}

/// Formats offered for selection, preferred first
pub const SUPPORTED_FORMATS: &[RecordingFormat] = &[
    RecordingFormat {
        mime: "video/mp4",
        extension: "mp4",
        codecs: "h264,aac",
        note: "widest playback support",
    },
    RecordingFormat {
        mime: "video/webm;codecs=vp9,opus",
        extension: "webm",
        codecs: "vp9,opus",
        note: "best compression",
    },
    RecordingFormat {
        mime: "video/webm;codecs=vp8,opus",
        extension: "webm",
        codecs: "vp8,opus",
        note: "older hosts",
    },
    RecordingFormat {
        mime: "video/x-matroska",
        extension: "mkv",
        codecs: "host default",
        note: "fallback container",
    },
];

/// Look up a format by its mime type
pub fn by_mime(mime: &str) -> Option<&'static RecordingFormat> {
    SUPPORTED_FORMATS.iter().find(|f| f.mime == mime)
}

/// File extension for a mime type, `bin` when unknown
pub fn extension_for(mime: &str) -> &'static str {
    by_mime(mime).map(|f| f.extension).unwrap_or("bin")
}
