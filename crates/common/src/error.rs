/// Failures from external collaborators: renderer resource creation and
/// asset fetching. All of them are fatal to session startup.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("asset fetch failed for {path}: {reason}")]
    AssetFetch { path: String, reason: String },
    #[error("program {label} failed to compile: {reason}")]
    ProgramCompile { label: String, reason: String },
    #[error("GPU resource creation failed: {0}")]
    Gpu(String),
    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_resource() {
        let err = ResourceError::AssetFetch {
            path: "boat/model.obj".into(),
            reason: "not found".into(),
        };
        assert!(err.to_string().contains("boat/model.obj"));

        let err = ResourceError::UnknownHandle {
            kind: "texture",
            id: 7,
        };
        assert_eq!(err.to_string(), "unknown texture handle 7");
    }
}
