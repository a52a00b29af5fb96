//! Hydration errors

use reef_host::LoadError;

/// Errors surfaced by island activation
#[derive(Debug, thiserror::Error)]
pub enum HydrateError {
    /// A declared module failed to load
    #[error(transparent)]
    Load(#[from] LoadError),

    /// An init strategy returned an error
    #[error("init strategy {name:?} failed")]
    Strategy {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = HydrateError::Strategy {
            name: "vue".into(),
            source: anyhow::anyhow!("mount failed"),
        };
        assert_eq!(err.to_string(), "init strategy \"vue\" failed");

        let err = HydrateError::from(LoadError::NotFound("x.js".into()));
        assert_eq!(err.to_string(), "module not found: x.js");
    }
}
