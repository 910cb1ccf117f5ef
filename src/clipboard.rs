use thiserror::Error;

#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(#[from] arboard::Error);

/// Put `text` on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_owned())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

/// A short user-facing outcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Outcome of the automatic copy after a successful run.
pub fn processed_notification(copied: &Result<(), ClipboardError>) -> Notification {
    match copied {
        Ok(()) => Notification::success("Code processed successfully! Copied to clipboard."),
        Err(e) => {
            tracing::warn!("auto-copy failed: {e}");
            Notification::warning(
                "Code processed, but failed to copy to clipboard. Please copy manually.",
            )
        }
    }
}

/// Outcome of an explicit copy of the current result.
pub fn manual_copy(result: Option<&str>) -> Notification {
    let Some(text) = result.filter(|t| !t.is_empty()) else {
        return Notification::error("No processed code to copy");
    };

    match copy_to_clipboard(text) {
        Ok(()) => Notification::success("Copied to clipboard!"),
        Err(e) => {
            tracing::warn!("manual copy failed: {e}");
            Notification::error("Failed to copy to clipboard")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_copy_reports_success() {
        let n = processed_notification(&Ok(()));
        assert_eq!(n.kind, NotificationKind::Success);
        assert!(n.message.contains("Copied to clipboard"));
    }

    #[test]
    fn failed_copy_degrades_to_warning() {
        let err = ClipboardError(arboard::Error::ClipboardNotSupported);
        let n = processed_notification(&Err(err));
        assert_eq!(n.kind, NotificationKind::Warning);
        assert!(n.message.contains("Please copy manually"));
    }

    #[test]
    fn nothing_to_copy_is_an_error() {
        assert_eq!(manual_copy(None), Notification::error("No processed code to copy"));
        assert_eq!(manual_copy(Some("")), Notification::error("No processed code to copy"));
    }
}
