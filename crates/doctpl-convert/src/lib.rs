//! External conversions for rendered templates.
//!
//! PDF conversion and thumbnail rasterization are delegated to well-known
//! command-line tools (LibreOffice and Poppler). Each adapter writes its
//! input to a private temp directory, runs the tool with a timeout, and reads
//! the result back.

pub mod error;
pub mod office;
pub mod process;
pub mod thumbnail;

pub use error::{ConversionError, Result};
pub use office::{OfficeConverter, PdfConverter};
pub use process::Tool;
pub use thumbnail::{PdftoppmThumbnailer, Thumbnailer};
