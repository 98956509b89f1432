use thiserror::Error;

/// Errors produced by the commit templating and the prefix search
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WishError {
    #[error("Malformed commit record: {reason}")]
    MalformedInput { reason: String },

    #[error("No matching hash found after {attempts} attempts")]
    NoMatchFound { attempts: u64 },

    #[error("No wished hash prefix supplied")]
    NoPrefixSupplied,
}

pub type Result<T> = std::result::Result<T, WishError>;

impl WishError {
    /// Process exit code the command line tool reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            WishError::NoPrefixSupplied => 1,
            WishError::NoMatchFound { .. } => 2,
            WishError::MalformedInput { .. } => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            WishError::NoPrefixSupplied.exit_code(),
            WishError::NoMatchFound { attempts: 1 }.exit_code(),
            WishError::MalformedInput {
                reason: "no author line".to_string(),
            }
            .exit_code(),
        ];
        assert_eq!(codes, [1, 2, 3]);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            WishError::NoMatchFound { attempts: 10 }.to_string(),
            "No matching hash found after 10 attempts"
        );
        assert_eq!(
            WishError::MalformedInput {
                reason: "no committer line".to_string()
            }
            .to_string(),
            "Malformed commit record: no committer line"
        );
    }
}
