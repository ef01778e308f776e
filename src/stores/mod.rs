// Certificate Stores - Named host certificate stores behind a common interface

pub mod catalog;
pub mod directory;

pub use catalog::{StoreCatalog, StoreSnapshot};
pub use directory::DirectoryStore;

use crate::certificates::parser::{LoadedCertificate, normalize_thumbprint};
use crate::error::{CertificateError, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Whose stores are being read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreLocation {
    CurrentUser,
    LocalMachine,
}

impl StoreLocation {
    pub fn all() -> [StoreLocation; 2] {
        [StoreLocation::CurrentUser, StoreLocation::LocalMachine]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreLocation::CurrentUser => "CurrentUser",
            StoreLocation::LocalMachine => "LocalMachine",
        }
    }
}

/// Which store at a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreName {
    /// Personal certificates, usually with private keys
    My,
    /// Trusted root authorities
    Root,
    /// Intermediate authorities
    #[serde(alias = "CA")]
    CertificateAuthority,
}

impl StoreName {
    pub fn all() -> [StoreName; 3] {
        [StoreName::My, StoreName::Root, StoreName::CertificateAuthority]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreName::My => "My",
            StoreName::Root => "Root",
            StoreName::CertificateAuthority => "CertificateAuthority",
        }
    }
}

/// Identifier of one store, written `Location/Name`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoreId {
    pub location: StoreLocation,
    pub name: StoreName,
}

impl StoreId {
    pub const fn new(location: StoreLocation, name: StoreName) -> Self {
        Self { location, name }
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location.as_str(), self.name.as_str())
    }
}

impl FromStr for StoreId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (location, name) = s
            .split_once(['/', '\\'])
            .ok_or_else(|| format!("invalid store id '{}', expected Location/Name", s))?;

        let location = match location.trim().to_ascii_lowercase().as_str() {
            "currentuser" => StoreLocation::CurrentUser,
            "localmachine" => StoreLocation::LocalMachine,
            other => return Err(format!("unknown store location '{}'", other)),
        };

        let name = match name.trim().to_ascii_lowercase().as_str() {
            "my" => StoreName::My,
            "root" => StoreName::Root,
            "ca" | "certificateauthority" => StoreName::CertificateAuthority,
            other => return Err(format!("unknown store name '{}'", other)),
        };

        Ok(Self { location, name })
    }
}

impl TryFrom<String> for StoreId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StoreId> for String {
    fn from(id: StoreId) -> Self {
        id.to_string()
    }
}

/// A store file that could not be turned into a certificate
#[derive(Debug)]
pub struct RejectedEntry {
    pub path: PathBuf,
    pub error: CertificateError,
}

/// Everything read from a store in one pass
#[derive(Debug, Default)]
pub struct StoreContents {
    pub certificates: Vec<LoadedCertificate>,
    pub rejected: Vec<RejectedEntry>,
}

/// Read-only access to one certificate store
pub trait CertificateStore: Send + Sync {
    /// Identifier this store answers to
    fn id(&self) -> StoreId;

    /// Open the store and read every entry
    fn open(&self) -> Result<StoreContents, StoreError>;

    /// Find an entry by thumbprint
    fn find_by_thumbprint(&self, thumbprint: &str) -> Result<Option<LoadedCertificate>, StoreError> {
        let wanted = normalize_thumbprint(thumbprint);
        Ok(self
            .open()?
            .certificates
            .into_iter()
            .find(|certificate| certificate.thumbprint() == wanted))
    }
}

/// Where a store lives on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub location: StoreLocation,
    pub name: StoreName,
    /// Directory holding the store's certificate files
    pub path: PathBuf,
    /// Password for PKCS#12 files in the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl StoreConfig {
    pub fn new(location: StoreLocation, name: StoreName, path: impl Into<PathBuf>) -> Self {
        Self {
            location,
            name,
            path: path.into(),
            password: None,
        }
    }

    pub fn id(&self) -> StoreId {
        StoreId::new(self.location, self.name)
    }

    /// Store layout of a Linux web-app host
    ///
    /// Current-user stores follow the .NET on-disk layout under `$HOME`. The
    /// local-machine personal and intermediate stores are where App Service
    /// drops certificates named in `WEBSITE_LOAD_CERTIFICATES`.
    pub fn default_layout() -> Vec<StoreConfig> {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/home"));
        let dotnet = home.join(".dotnet/corefx/cryptography/x509stores");

        vec![
            StoreConfig::new(StoreLocation::CurrentUser, StoreName::My, dotnet.join("my")),
            StoreConfig::new(StoreLocation::CurrentUser, StoreName::Root, dotnet.join("root")),
            StoreConfig::new(
                StoreLocation::CurrentUser,
                StoreName::CertificateAuthority,
                dotnet.join("ca"),
            ),
            StoreConfig::new(StoreLocation::LocalMachine, StoreName::My, "/var/ssl/private"),
            StoreConfig::new(StoreLocation::LocalMachine, StoreName::Root, "/etc/ssl/certs"),
            StoreConfig::new(
                StoreLocation::LocalMachine,
                StoreName::CertificateAuthority,
                "/var/ssl/certs",
            ),
        ]
    }
}
