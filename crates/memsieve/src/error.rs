use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid operand spec: {0}")]
    InvalidOperandSpec(String),

    #[error("Invalid scan operator: {0}")]
    InvalidOperator(String),

    #[error(
        "Incompatible regions: {left_base:#x}+{left_size:#x} vs {right_base:#x}+{right_size:#x}"
    )]
    IncompatibleRegions {
        left_base: u64,
        left_size: u64,
        right_base: u64,
        right_size: u64,
    },

    #[error("Address {address:#x} out of range for region {base:#x}+{size:#x}")]
    AddressOutOfRange { address: u64, base: u64, size: u64 },

    #[error("Region is read-only: {0}")]
    ReadOnlyRegion(String),

    #[error("Invalid byte pattern: {0}")]
    InvalidPattern(String),

    #[error("Set is complemented and has no bounded table ({0} excluded addresses)")]
    UnboundedSet(usize),

    #[error("No snapshot taken yet")]
    NoSnapshot,

    #[error("Stale handle")]
    StaleHandle,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Errors raised while parsing a scan request, before any byte is read
    pub fn is_spec_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidOperandSpec(_) | Error::InvalidOperator(_) | Error::InvalidPattern(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.is_not_found());

        let other_io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err2 = Error::Io(other_io_err);
        assert!(!err2.is_not_found());
    }

    #[test]
    fn test_error_is_spec_error() {
        assert!(Error::InvalidOperandSpec("x".to_string()).is_spec_error());
        assert!(Error::InvalidOperator("=>".to_string()).is_spec_error());
        assert!(!Error::StaleHandle.is_spec_error());
    }

    #[test]
    fn test_address_out_of_range_message() {
        let err = Error::AddressOutOfRange {
            address: 0x2000,
            base: 0x1000,
            size: 0x10,
        };
        assert_eq!(
            err.to_string(),
            "Address 0x2000 out of range for region 0x1000+0x10"
        );
    }
}
