use derive_more::{Display, Error};
use std::process::ExitCode;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Why the process is exiting unsuccessfully.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("metadata backend unavailable")]
    Backend,
    #[display("run failed")]
    Run,
    #[display("run interrupted")]
    Interrupted,
}

impl ErrorKind {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config => ExitCode::from(2),
            Self::Backend | Self::Run | Self::Interrupted => ExitCode::FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ErrorKind::Config.exit_code(), ExitCode::from(2));
        assert_eq!(ErrorKind::Backend.exit_code(), ExitCode::FAILURE);
        assert_eq!(ErrorKind::Interrupted.exit_code(), ExitCode::FAILURE);
    }
}
