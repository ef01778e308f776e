// Directory Store - Certificate store backed by a directory of certificate files

use super::{CertificateStore, RejectedEntry, StoreContents, StoreId};
use crate::certificates::parser::{
    LoadedCertificate, looks_like_pem, parse_certificate, parse_pem, parse_pkcs12,
};
use crate::error::{CertificateError, StoreError};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const CERTIFICATE_EXTENSIONS: &[&str] = &["pem", "crt", "cer", "der"];
const PKCS12_EXTENSIONS: &[&str] = &["pfx", "p12"];

/// Store whose entries are files in one directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    id: StoreId,
    path: PathBuf,
    password: Option<String>,
}

impl DirectoryStore {
    pub fn new(id: StoreId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
            password: None,
        }
    }

    /// Password used for the PKCS#12 files in this directory
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self, path: &Path) -> Result<Vec<LoadedCertificate>, CertificateError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let bytes = fs::read(path).map_err(|e| CertificateError::Parse {
            details: format!("unable to read {}: {}", path.display(), e),
        })?;

        if PKCS12_EXTENSIONS.contains(&extension.as_str()) {
            let password = self.password.as_deref().unwrap_or("");
            return Ok(vec![parse_pkcs12(&bytes, password)?]);
        }

        if looks_like_pem(&bytes) {
            parse_pem(&bytes)
        } else {
            Ok(vec![parse_certificate(&bytes, None)?])
        }
    }
}

fn is_store_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            CERTIFICATE_EXTENSIONS.contains(&e.as_str()) || PKCS12_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

impl CertificateStore for DirectoryStore {
    fn id(&self) -> StoreId {
        self.id
    }

    fn open(&self) -> Result<StoreContents, StoreError> {
        if self.path.is_file() {
            return Err(StoreError::NotADirectory(self.path.clone()));
        }

        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Store {} has no directory at {}", self.id, self.path.display());
                return Ok(StoreContents::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && is_store_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        let mut contents = StoreContents::default();
        let mut seen = HashSet::new();

        for path in files {
            match self.read_file(&path) {
                Ok(certificates) => {
                    for certificate in certificates {
                        if seen.insert(certificate.thumbprint().to_string()) {
                            contents.certificates.push(certificate);
                        }
                    }
                }
                Err(error) => {
                    debug!("Rejected {} in store {}: {}", path.display(), self.id, error);
                    contents.rejected.push(RejectedEntry { path, error });
                }
            }
        }

        Ok(contents)
    }
}
