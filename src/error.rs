use std::path::PathBuf;
use std::process::ExitCode;

/// Run-level failures. Row-level problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("stats source unavailable: {0:#}")]
    SourceUnavailable(anyhow::Error),

    #[error("dataset {} not found", path.display())]
    MissingDataset { path: PathBuf },

    #[error("failed to read dataset {}: {source:#}", path.display())]
    DatasetRead {
        path: PathBuf,
        source: anyhow::Error,
    },

    #[error("fetch failed for {context}: {source:#}")]
    Fetch {
        context: String,
        source: anyhow::Error,
    },

    #[error("no new game log rows for {context}")]
    EmptyFetch { context: String },

    #[error("failed to write dataset {}: {source:#}", path.display())]
    Persistence {
        path: PathBuf,
        source: anyhow::Error,
    },
}

impl UpdateError {
    /// Nothing to merge is a no-op, kept apart from real failures.
    pub fn is_no_op(&self) -> bool {
        matches!(self, UpdateError::EmptyFetch { .. })
    }

    /// 2 when there was nothing to merge, 1 for every real failure.
    pub fn exit_status(&self) -> u8 {
        if self.is_no_op() { 2 } else { 1 }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Prints the outcome for an entry point and hands back its exit code.
    pub fn report(self) -> ExitCode {
        if self.is_no_op() {
            println!("Nothing to update: {self}");
        } else {
            tracing::error!("{self}");
            println!("Update failed: {self}");
        }
        self.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn empty_fetch_is_the_only_no_op() {
        let empty = UpdateError::EmptyFetch {
            context: "2024-25 Playoffs".to_string(),
        };
        assert!(empty.is_no_op());
        assert_eq!(empty.exit_status(), 2);

        let failures = [
            UpdateError::SourceUnavailable(anyhow!("no client")),
            UpdateError::MissingDataset {
                path: PathBuf::from("games.csv"),
            },
            UpdateError::DatasetRead {
                path: PathBuf::from("games.csv"),
                source: anyhow!("bad header"),
            },
            UpdateError::Fetch {
                context: "2024-25 Regular Season".to_string(),
                source: anyhow!("http 429"),
            },
            UpdateError::Persistence {
                path: PathBuf::from("games.csv"),
                source: anyhow!("disk full"),
            },
        ];
        for err in &failures {
            assert!(!err.is_no_op(), "{err}");
            assert_eq!(err.exit_status(), 1, "{err}");
        }
    }

    #[test]
    fn messages_carry_the_path_and_cause() {
        let err = UpdateError::Persistence {
            path: PathBuf::from("out/games.csv"),
            source: anyhow!("disk full"),
        };
        assert_eq!(
            err.to_string(),
            "failed to write dataset out/games.csv: disk full"
        );
    }
}
