use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::StorageError;

use super::DocumentStorage;

/// Stores uploads on the local filesystem under `{upload_directory}/{user_id}/`.
pub struct LocalStorage {
    upload_directory: PathBuf,
}

impl LocalStorage {
    pub fn new<P: AsRef<Path>>(upload_directory: P) -> Self {
        Self {
            upload_directory: upload_directory.as_ref().to_path_buf(),
        }
    }

    pub fn upload_directory(&self) -> &Path {
        &self.upload_directory
    }

    pub fn store(
        &self,
        content: &[u8],
        user_id: &str,
        filename: &str,
    ) -> Result<PathBuf, StorageError> {
        validate_component(user_id)?;
        validate_component(filename)?;

        let dir_path = self.upload_directory.join(user_id);
        self.ensure_directory(&dir_path)?;

        let file_path = self.store_with_atomic_creation(&dir_path, filename, content)?;
        info!("File saved locally: {}", file_path.display());
        Ok(file_path)
    }

    /// Creates the file with `create_new` so concurrent writers never clobber
    /// each other; on conflict tries `name_2.ext`, `name_3.ext`, ...
    fn store_with_atomic_creation(
        &self,
        dir_path: &Path,
        filename: &str,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        use std::io::Write;

        let (base, ext) = match filename.rfind('.') {
            Some(dot_pos) if dot_pos > 0 => (&filename[..dot_pos], Some(&filename[dot_pos..])),
            _ => (filename, None),
        };

        for counter in 1..=1000 {
            let try_filename = if counter == 1 {
                filename.to_string()
            } else {
                match ext {
                    Some(ext) => format!("{}_{}{}", base, counter, ext),
                    None => format!("{}_{}", base, counter),
                }
            };

            let try_path = dir_path.join(&try_filename);

            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&try_path)
            {
                Ok(mut file) => {
                    file.write_all(content)
                        .map_err(|e| StorageError::WriteFile {
                            path: try_path.clone(),
                            source: e,
                        })?;
                    return Ok(try_path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("{} exists, trying next name", try_path.display());
                    continue;
                }
                Err(e) => {
                    return Err(StorageError::WriteFile {
                        path: try_path,
                        source: e,
                    });
                }
            }
        }

        Err(StorageError::FileExists(dir_path.join(filename)))
    }

    fn ensure_directory(&self, path: &Path) -> Result<(), StorageError> {
        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}

impl DocumentStorage for LocalStorage {
    fn save(&self, content: &[u8], filename: &str, user_id: &str) -> Result<String, StorageError> {
        self.store(content, user_id, filename)
            .map(|path| path.display().to_string())
    }
}

/// A single path component: non-empty, no separators, not `.`/`..`.
fn validate_component(name: &str) -> Result<(), StorageError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(StorageError::InvalidFileName(name.to_string()));
    }
    Ok(())
}
