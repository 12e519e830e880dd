//! Host boundary.
//!
//! The engine never talks to an editor directly. Everything it needs comes
//! through [`BoardHost`]: the document source, the netlist, the pad list,
//! a way to store the patched netlist, and a notification channel.
//!
//! [`FileHost`] implements the boundary over plain files, for the CLI and
//! for offline runs on exported data.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::board::HostPad;
use crate::error::HostError;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyLevel {
    /// Informational.
    Info,
    /// The run finished and changed something.
    Success,
    /// The run finished, but something deserves attention.
    Warning,
    /// The run failed.
    Error,
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Operations the engine needs from its host.
///
/// Calls are made one at a time, in order; implementations need not be
/// re-entrant.
#[allow(async_fn_in_trait)] // hosts are driven on a single-threaded runtime
pub trait BoardHost {
    /// The raw board document, one record per line.
    async fn document_source(&mut self) -> Result<String, HostError>;

    /// The current netlist document.
    async fn netlist_document(&mut self) -> Result<Value, HostError>;

    /// Every pad on the board, with absolute geometry.
    async fn all_pads(&mut self) -> Result<Vec<HostPad>, HostError>;

    /// Replaces the netlist document.
    async fn set_netlist_document(&mut self, document: &Value) -> Result<(), HostError>;

    /// Shows a message to the user.
    async fn notify(&mut self, level: NotifyLevel, message: &str);
}

/// A host backed by files on disk.
#[derive(Debug, Clone)]
pub struct FileHost {
    source: PathBuf,
    netlist: PathBuf,
    pads: Option<PathBuf>,
    output: PathBuf,
}

impl FileHost {
    /// Creates a host reading `source` and `netlist`; the netlist is
    /// written back in place unless [`FileHost::with_output`] is used.
    pub fn new(source: impl Into<PathBuf>, netlist: impl Into<PathBuf>) -> Self {
        let netlist = netlist.into();
        Self {
            source: source.into(),
            output: netlist.clone(),
            netlist,
            pads: None,
        }
    }

    /// Reads pads from a JSON array file.
    #[must_use]
    pub fn with_pads(mut self, pads: impl Into<PathBuf>) -> Self {
        self.pads = Some(pads.into());
        self
    }

    /// Writes the patched netlist to `output` instead.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Where the netlist will be written.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    async fn read_text(path: &Path) -> Result<String, HostError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| HostError::io(path, e))?;
        Ok(decode_text(&bytes).into_owned())
    }
}

impl BoardHost for FileHost {
    async fn document_source(&mut self) -> Result<String, HostError> {
        Self::read_text(&self.source).await
    }

    async fn netlist_document(&mut self) -> Result<Value, HostError> {
        let text = Self::read_text(&self.netlist).await?;
        serde_json::from_str(&text)
            .map_err(|e| HostError::json(self.netlist.display().to_string(), e))
    }

    async fn all_pads(&mut self) -> Result<Vec<HostPad>, HostError> {
        let Some(path) = &self.pads else {
            return Ok(Vec::new());
        };
        let text = Self::read_text(path).await?;
        serde_json::from_str(&text).map_err(|e| HostError::json(path.display().to_string(), e))
    }

    async fn set_netlist_document(&mut self, document: &Value) -> Result<(), HostError> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| HostError::json("netlist document", e))?;

        let mut temp_name = self.output.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = self.output.with_file_name(temp_name);

        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|e| HostError::io(&temp_path, e))?;
        tokio::fs::rename(&temp_path, &self.output)
            .await
            .map_err(|e| HostError::io(&self.output, e))?;

        tracing::debug!(path = %self.output.display(), "Wrote netlist");
        Ok(())
    }

    async fn notify(&mut self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Info | NotifyLevel::Success => tracing::info!(%level, "{message}"),
            NotifyLevel::Warning => tracing::warn!("{message}"),
            NotifyLevel::Error => tracing::error!("{message}"),
        }
    }
}

/// Decodes text, honouring a byte order mark. Without one, UTF-8 is
/// assumed and invalid sequences are replaced.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (encoding, bom_len) =
        encoding_rs::Encoding::for_bom(bytes).unwrap_or((encoding_rs::UTF_8, 0));
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "Replaced undecodable bytes");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_utf8() {
        assert_eq!(decode_text(b"[\"LINE\"]"), "[\"LINE\"]");
    }

    #[test]
    fn decode_strips_utf8_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFabc"), "abc");
    }

    #[test]
    fn decode_utf16_with_bom() {
        assert_eq!(decode_text(b"\xFF\xFEa\x00b\x00"), "ab");
    }

    #[test]
    fn notify_level_display() {
        assert_eq!(NotifyLevel::Success.to_string(), "success");
    }
}
