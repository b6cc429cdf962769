use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to start `{program}` in {cwd}")]
    NotFound {
        program: String,
        cwd: PathBuf,
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status})\n{stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{program}` output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },
}
