//! Checks run before any network activity

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::file::UploadFile;

/// Reject oversized files and extensions outside `allow_ext`
pub fn check(config: &UploadConfig, file: &UploadFile) -> Result<(), UploadError> {
    if config.max_size > 0 && file.size > config.max_size {
        return Err(UploadError::FileTooLarge {
            name: file.name.clone(),
            size: file.size,
            max_size: config.max_size,
        });
    }

    if !is_extension_allowed(&config.allow_ext, &file.extension()) {
        return Err(UploadError::ExtensionNotAllowed {
            name: file.name.clone(),
            extension: file.extension(),
        });
    }

    Ok(())
}

/// Membership test against the allow-list; an empty list allows everything
pub fn is_extension_allowed(allow_ext: &[String], extension: &str) -> bool {
    allow_ext.is_empty()
        || allow_ext
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(extension))
}

/// Message shown for transport-level failures
pub fn generic_error(file_name: &str) -> String {
    format!("Upload failed: {}.", file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_size: u64, allow_ext: &[&str]) -> UploadConfig {
        UploadConfig {
            max_size,
            allow_ext: allow_ext.iter().map(|ext| ext.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_size_limit() {
        let file = UploadFile::new("big.png", vec![0; 1001]);

        let err = check(&config(1000, &[]), &file).unwrap_err();
        assert!(err.is_policy_violation());
        assert!(err.to_string().contains("big.png"));

        assert!(check(&config(1001, &[]), &file).is_ok());
        assert!(check(&config(0, &[]), &file).is_ok());
    }

    #[test]
    fn test_extension_membership() {
        let allow = ["png", ".JPG"].map(String::from);

        assert!(is_extension_allowed(&allow, "png"));
        assert!(is_extension_allowed(&allow, "jpg"));
        // Anything outside the list is refused, not only some entries
        assert!(!is_extension_allowed(&allow, "exe"));
        assert!(!is_extension_allowed(&allow, "pn"));
        assert!(is_extension_allowed(&[], "exe"));
    }

    #[test]
    fn test_disallowed_extension_names_file() {
        let err = check(&config(0, &["png"]), &UploadFile::new("setup.EXE", vec![1])).unwrap_err();
        assert_eq!(
            err,
            UploadError::ExtensionNotAllowed {
                name: "setup.EXE".to_string(),
                extension: "exe".to_string()
            }
        );
        assert_eq!(err.to_string(), "setup.EXE: file type is not allowed");
    }
}
