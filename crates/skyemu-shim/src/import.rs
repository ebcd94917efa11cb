// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document import: picker request, result handling and the copy into
// app-private storage that the native core can open by path.

use std::fs;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;
use tracing::{debug, error, info, instrument, warn};

use skyemu_bridge::traits::NativeDocumentPicker;
use skyemu_core::config::ShimConfig;
use skyemu_core::error::{Result, ShimError};
use skyemu_core::human_errors::humanize_error;
use skyemu_core::types::{ActivityResult, DocumentLocator, ImportState, FILE_PICKER_REQUEST_CODE};

use crate::native::NativeCore;

/// Result of handling one activity result.
#[derive(Debug)]
pub enum ImportOutcome {
    /// The result was for another request.
    NotOurs,
    /// The player backed out, or the picker returned nothing.
    Cancelled,
    /// Copied and handed to the native core.
    Imported(PathBuf),
    Failed(ShimError),
}

/// Reduce a provider-supplied name to one safe path component.
pub fn sanitize_file_name(raw: &str) -> Result<String> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(ShimError::InvalidFileName(raw.to_owned()));
    }
    Ok(name.to_owned())
}

/// Name to store the document under: the provider's display name for
/// `content` URIs, else the last segment of the decoded path.
pub fn resolve_display_name<P>(picker: &P, document: &DocumentLocator) -> String
where
    P: NativeDocumentPicker + ?Sized,
{
    if document.is_content() {
        match picker.query_display_name(document) {
            Ok(Some(name)) if !name.trim().is_empty() => return name,
            Ok(_) => debug!(uri = %document, "provider has no display name"),
            Err(e) => warn!(uri = %document, error = %e, "display name query failed"),
        }
    }
    document.last_path_segment()
}

/// Stream `source` into `dest`.
///
/// The bytes land in a temporary sibling first and are renamed over `dest`
/// only once complete, so a failed copy leaves any earlier import intact.
pub fn copy_document(source: impl Read, dest: &Path, buffer_size: usize) -> Result<u64> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    let mut reader = BufReader::with_capacity(buffer_size.max(1), source);
    let bytes = io::copy(&mut reader, &mut staged)?;
    staged.flush()?;
    staged.as_file().sync_all()?;
    staged.persist(dest).map_err(|e| ShimError::Io(e.error))?;
    Ok(bytes)
}

/// Tracks one import at a time through the picker round trip.
#[derive(Debug)]
pub struct DocumentImporter {
    state: Mutex<ImportState>,
    copy_buffer_size: usize,
    import_subdir: Option<String>,
}

impl DocumentImporter {
    pub fn new(config: &ShimConfig) -> Self {
        Self {
            state: Mutex::new(ImportState::Idle),
            copy_buffer_size: config.copy_buffer_size,
            import_subdir: config.import_subdir.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ImportState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: ImportState) {
        *self.lock() = state;
    }

    pub fn state(&self) -> ImportState {
        self.lock().clone()
    }

    /// Ask the platform for a document.
    pub fn launch<P>(&self, picker: &P) -> Result<()>
    where
        P: NativeDocumentPicker + ?Sized,
    {
        picker.launch_document_picker(FILE_PICKER_REQUEST_CODE)?;
        self.set_state(ImportState::PickerLaunched);
        info!("document picker launched");
        Ok(())
    }

    /// Handle `onActivityResult`. On success the native core gets exactly one
    /// `load_file`; on failure it gets `import_failed` instead.
    pub fn on_activity_result<P>(
        &self,
        picker: &P,
        core: Option<&dyn NativeCore>,
        request_code: i32,
        result_code: i32,
        data: Option<DocumentLocator>,
    ) -> ImportOutcome
    where
        P: NativeDocumentPicker + ?Sized,
    {
        if request_code != FILE_PICKER_REQUEST_CODE {
            return ImportOutcome::NotOurs;
        }

        let document = match (ActivityResult::from_code(result_code), data) {
            (ActivityResult::Ok, Some(document)) => document,
            (result, _) => {
                info!(?result, "document pick cancelled");
                self.set_state(ImportState::Idle);
                return ImportOutcome::Cancelled;
            }
        };

        self.set_state(ImportState::CallbackReceived);
        match self.import(picker, core, &document) {
            Ok(path) => {
                self.set_state(ImportState::Copied { path: path.clone() });
                ImportOutcome::Imported(path)
            }
            Err(e) => {
                error!(uri = %document, error = %e, "document import failed");
                self.set_state(ImportState::Failed {
                    reason: e.to_string(),
                });
                if let Some(core) = core {
                    core.import_failed(&humanize_error(&e));
                }
                ImportOutcome::Failed(e)
            }
        }
    }

    #[instrument(skip(self, picker, core, document), fields(uri = %document))]
    fn import<P>(&self, picker: &P, core: Option<&dyn NativeCore>, document: &DocumentLocator) -> Result<PathBuf>
    where
        P: NativeDocumentPicker + ?Sized,
    {
        let core = core.ok_or(ShimError::NativeCoreMissing)?;

        let name = sanitize_file_name(&resolve_display_name(picker, document))?;

        let mut dir = picker.external_files_dir()?;
        if let Some(subdir) = &self.import_subdir {
            dir.push(subdir);
        }
        fs::create_dir_all(&dir)?;
        let dest = dir.join(&name);

        let source = picker.open_document(document)?;
        let bytes = copy_document(source, &dest, self.copy_buffer_size)?;
        info!(path = %dest.display(), bytes, "document copied");

        core.load_file(&dest);
        Ok(dest)
    }
}
