use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File at {:?} not found.", path)]
    FileNotFound { path: std::path::PathBuf },

    #[error("File at {:?} is invalid{}.", path, Error::format_msg_as_detail(msg))]
    FileNotValid {
        path: std::path::PathBuf,
        msg: Option<String>,
    },

    #[error("Malformed {}{}", context, Error::format_msg_as_detail(msg))]
    MalformedRecord {
        context: String,
        msg: Option<String>,
    },

    #[error("Invalid configuration: {msg}")]
    Configuration { msg: String },

    #[error(
        "Stage '{}' failed after {} attempt(s){}",
        stage,
        attempts,
        Error::format_msg_as_detail(msg)
    )]
    StageFailure {
        stage: String,
        attempts: usize,
        msg: Option<String>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] bincode::Error),
}

impl Error {
    #[cold]
    pub fn file_not_found<P: AsRef<std::path::Path>>(path: P) -> Self {
        Error::FileNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[cold]
    pub fn file_not_valid<P: AsRef<std::path::Path>, M: Into<String>>(
        path: P,
        msg: Option<M>,
    ) -> Self {
        Error::FileNotValid {
            path: path.as_ref().to_path_buf(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn malformed_record<C: Into<String>, M: Into<String>>(context: C, msg: Option<M>) -> Self {
        Error::MalformedRecord {
            context: context.into(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn configuration<M: Into<String>>(msg: M) -> Self {
        Error::Configuration { msg: msg.into() }
    }

    #[cold]
    pub fn stage_failure<S: Into<String>, M: Into<String>>(
        stage: S,
        attempts: usize,
        msg: Option<M>,
    ) -> Self {
        Error::StageFailure {
            stage: stage.into(),
            attempts,
            msg: msg.map(|m| m.into()),
        }
    }

    pub fn format_msg_as_detail(msg: &Option<String>) -> String {
        match msg {
            Some(m) => format!(" ({})", m),
            None => String::new(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
