// Source staging: per-request source file + binary path, removed on drop

use crate::error::StagingError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Staged source and its (not yet built) binary, named by a fresh UUID so
/// concurrent requests never collide. Both files are removed when this is
/// dropped, whichever way the request ends.
#[derive(Debug)]
pub struct StagedArtifact {
    id: Uuid,
    source_path: PathBuf,
    binary_path: PathBuf,
}

impl StagedArtifact {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }
}

impl Drop for StagedArtifact {
    fn drop(&mut self) {
        // Best-effort: cleanup failures are logged, never propagated
        for path in [&self.source_path, &self.binary_path] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(
                        execution_id = %self.id,
                        path = %path.display(),
                        error = %e,
                        "Failed to remove staged file"
                    );
                }
            }
        }
        debug!(execution_id = %self.id, "Staged files released");
    }
}

/// Write `source` to `<work_dir>/src_<uuid>.<extension>` and reserve
/// `<work_dir>/bin_<uuid>` for the compiler output.
pub async fn stage(work_dir: &Path, source: &str, extension: &str) -> Result<StagedArtifact, StagingError> {
    tokio::fs::create_dir_all(work_dir)
        .await
        .map_err(|e| StagingError::WorkDir {
            path: work_dir.display().to_string(),
            source: e,
        })?;

    let id = Uuid::new_v4();
    let artifact = StagedArtifact {
        id,
        source_path: work_dir.join(format!("src_{}.{}", id, extension)),
        binary_path: work_dir.join(format!("bin_{}", id)),
    };

    // The guard exists before the write, so a partial file is still removed
    tokio::fs::write(&artifact.source_path, source)
        .await
        .map_err(StagingError::WriteSource)?;

    debug!(
        execution_id = %id,
        source_path = %artifact.source_path.display(),
        "Source staged"
    );

    Ok(artifact)
}
