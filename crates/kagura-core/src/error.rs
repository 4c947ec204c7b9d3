use std::io;
use std::path::PathBuf;

/// Failures on the host side of the ABI bridge.
#[derive(Debug)]
pub enum BridgeError {
    /// `Library::new` failed.
    Load { path: PathBuf, message: String },
    /// The well-known vtable symbol is missing from the module.
    SymbolMissing { path: PathBuf, message: String },
    /// Major version mismatch; no other entry point was called.
    AbiMismatch { host: u32, module: u32 },
    /// `create_game` returned null.
    CreateFailed,
    /// `serialize_game` returned null.
    SerializeFailed,
    /// `deserialize_game` returned null.
    DeserializeFailed,
    /// The encoded form contained an interior NUL and cannot cross as a
    /// C string.
    EncodedFormNul,
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::Load { path, message } => {
                write!(f, "module load failed '{}': {}", path.display(), message)
            }
            BridgeError::SymbolMissing { path, message } => {
                write!(
                    f,
                    "module '{}' does not export the vtable symbol: {}",
                    path.display(),
                    message
                )
            }
            BridgeError::AbiMismatch { host, module } => {
                write!(
                    f,
                    "ABI major version mismatch: host speaks {}.{}.{}, module speaks {}.{}.{}",
                    kagura_module_api::abi_major(*host),
                    kagura_module_api::abi_minor(*host),
                    kagura_module_api::abi_patch(*host),
                    kagura_module_api::abi_major(*module),
                    kagura_module_api::abi_minor(*module),
                    kagura_module_api::abi_patch(*module),
                )
            }
            BridgeError::CreateFailed => write!(f, "create_game returned null"),
            BridgeError::SerializeFailed => write!(f, "serialize_game returned null"),
            BridgeError::DeserializeFailed => write!(f, "deserialize_game returned null"),
            BridgeError::EncodedFormNul => {
                write!(f, "encoded state contains an interior NUL byte")
            }
        }
    }
}

impl std::error::Error for BridgeError {}

/// Failures of one hot-reload attempt. Any of these leaves the previous
/// module and game state running.
#[derive(Debug)]
pub enum ReloadError {
    Serialize(BridgeError),
    ShadowCopy { path: PathBuf, error: io::Error },
    Load(BridgeError),
    Deserialize(BridgeError),
}

impl std::fmt::Display for ReloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReloadError::Serialize(e) => write!(f, "reload: serialize step failed: {e}"),
            ReloadError::ShadowCopy { path, error } => {
                write!(f, "reload: shadow copy of '{}' failed: {}", path.display(), error)
            }
            ReloadError::Load(e) => write!(f, "reload: load step failed: {e}"),
            ReloadError::Deserialize(e) => write!(f, "reload: deserialize step failed: {e}"),
        }
    }
}

impl std::error::Error for ReloadError {}

#[derive(Debug)]
pub enum AssetError {
    Io(PathBuf, io::Error),
    Backend(String),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::Io(path, e) => write!(f, "{}: {}", path.display(), e),
            AssetError::Backend(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for AssetError {}
