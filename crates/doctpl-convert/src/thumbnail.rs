//! First-page PNG thumbnails of a PDF.

use std::fs;
use std::time::Duration;

use crate::error::{ConversionError, Result};
use crate::process::{read_output, run, Tool};

pub const DEFAULT_THUMBNAIL_TIMEOUT: Duration = Duration::from_secs(30);

pub trait Thumbnailer: Send + Sync {
    /// Rasterizes the first page of `pdf` into a PNG of `width` x `height`.
    fn thumbnail(&self, pdf: &[u8], width: u32, height: u32) -> Result<Vec<u8>>;
}

/// Poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmThumbnailer {
    tool: Tool,
    timeout: Option<Duration>,
}

impl Default for PdftoppmThumbnailer {
    fn default() -> Self {
        Self {
            tool: Tool::new("pdftoppm"),
            timeout: Some(DEFAULT_THUMBNAIL_TIMEOUT),
        }
    }
}

impl PdftoppmThumbnailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tool = tool;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Thumbnailer for PdftoppmThumbnailer {
    fn thumbnail(&self, pdf: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        if !cfg!(unix) {
            return Err(ConversionError::Unsupported("pdftoppm thumbnails"));
        }
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("document.pdf");
        fs::write(&input, pdf)?;
        let prefix = dir.path().join("thumbnail");

        let mut cmd = self.tool.command();
        cmd.args(["-png", "-f", "1", "-l", "1", "-scale-to-x"])
            .arg(width.to_string())
            .arg("-scale-to-y")
            .arg(height.to_string())
            .arg("-singlefile")
            .arg(&input)
            .arg(&prefix);
        run(&mut cmd, self.timeout)?;

        read_output(&cmd, &prefix.with_extension("png"))
    }
}
