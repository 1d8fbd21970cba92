//! Tests for error types.

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("source directory not found");
        assert_eq!(
            err.to_string(),
            "configuration error: source directory not found"
        );
    }

    #[test]
    fn test_transform_error_empty_slug() {
        let err = TransformError::EmptySlug {
            title: "!!!".to_string(),
        };
        assert_eq!(err.to_string(), "title '!!!' produces an empty slug");
    }

    #[test]
    fn test_transform_error_conversion() {
        let transform_err = TransformError::Frontmatter("unexpected end of input".to_string());
        let err: Error = transform_err.into();
        assert!(matches!(err, Error::Transform(_)));
    }

    #[test]
    fn test_watcher_error_conversion() {
        let watch_err = WatcherError::WatchFailed {
            path: "/tmp/notes".to_string(),
            reason: "permission denied".to_string(),
        };
        let err: Error = watch_err.into();
        assert!(matches!(err, Error::Watcher(_)));
    }

    #[test]
    fn test_watcher_error_process_failed() {
        let err = WatcherError::ProcessFailed {
            path: "/notes/post.md".to_string(),
            reason: "read failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to process file '/notes/post.md': read failed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<i32> {
            Err(Error::config("inner error"))
        }

        fn outer() -> Result<i32> {
            let _ = inner()?;
            Ok(0)
        }

        let result = outer();
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "configuration error: inner error"
        );
    }
}
