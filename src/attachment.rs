//! Attachment retrieval
//!
//! A document bundle is a zip archive holding the human-readable report plus
//! the XBRL instance. Only the first `.xbrl` member in archive order is used.

use std::io::{Cursor, Read};
use tracing::debug;
use zip::{result::ZipError, ZipArchive};

use crate::api::FilingSource;
use crate::error::Result;

/// File extension of the structured-data member
pub const XBRL_EXTENSION: &str = ".xbrl";

/// Upper bound on the buffer reserved from a member's declared size.
/// The header value is untrusted; the actual read still grows as needed.
const PREALLOC_LIMIT: u64 = 16 * 1024 * 1024;

fn is_xbrl_member(name: &str) -> bool {
    !name.ends_with('/') && name.to_ascii_lowercase().ends_with(XBRL_EXTENSION)
}

/// Bytes of the first XBRL member, or `None` when the bundle has none
pub fn find_xbrl_member(bundle: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut archive = ZipArchive::new(Cursor::new(bundle))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() || !is_xbrl_member(file.name()) {
            continue;
        }

        debug!("Using bundle member {}", file.name());
        let mut contents = Vec::with_capacity(file.size().min(PREALLOC_LIMIT) as usize);
        file.read_to_end(&mut contents).map_err(ZipError::Io)?;
        return Ok(Some(contents));
    }

    Ok(None)
}

/// Download a document's bundle and pull out its XBRL instance
pub async fn retrieve_attachment(source: &dyn FilingSource, doc_id: &str) -> Result<Option<Vec<u8>>> {
    let bundle = source.download_bundle(doc_id).await?;
    debug!("Downloaded bundle for {} ({} bytes)", doc_id, bundle.len());
    find_xbrl_member(&bundle)
}
