//! DOCX to PDF through a headless office suite.

use std::fs;
use std::time::Duration;

use crate::error::{ConversionError, Result};
use crate::process::{read_output, run, Tool};

pub const DEFAULT_OFFICE_TIMEOUT: Duration = Duration::from_secs(120);

/// Turns a word-processing document into a fixed-page PDF.
pub trait PdfConverter: Send + Sync {
    fn convert(&self, docx: &[u8]) -> Result<Vec<u8>>;
}

/// LibreOffice (`soffice`) in headless mode.
///
/// Each conversion gets its own temp directory, used both for the files and
/// as the office user profile, so concurrent conversions do not contend for
/// the profile lock.
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    tool: Tool,
    timeout: Option<Duration>,
}

impl Default for OfficeConverter {
    fn default() -> Self {
        Self {
            tool: Tool::new("soffice"),
            timeout: Some(DEFAULT_OFFICE_TIMEOUT),
        }
    }
}

impl OfficeConverter {
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

impl PdfConverter for OfficeConverter {
    fn convert(&self, docx: &[u8]) -> Result<Vec<u8>> {
        if !cfg!(unix) {
            return Err(ConversionError::Unsupported("office PDF conversion"));
        }
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("document.docx");
        fs::write(&input, docx)?;

        let profile = dir.path().join("profile");
        let mut cmd = self.tool.command();
        cmd.arg(format!("-env:UserInstallation=file://{}", profile.display()))
            .args([
                "--headless",
                "--invisible",
                "--nologo",
                "--convert-to",
                "pdf",
                "--outdir",
            ])
            .arg(dir.path())
            .arg(&input);
        run(&mut cmd, self.timeout)?;

        let pdf = read_output(&cmd, &input.with_extension("pdf"))?;
        log::info!("converted {} byte document to {} byte PDF", docx.len(), pdf.len());
        Ok(pdf)
    }
}
