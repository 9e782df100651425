//! Two-step deletion: stage a target, then confirm or cancel

/// Holds the entity a deletion was requested for until the user confirms
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteDialog<T> {
    target: Option<T>,
}

impl<T> Default for DeleteDialog<T> {
    fn default() -> Self {
        Self { target: None }
    }
}

impl<T> DeleteDialog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `target`, replacing anything staged before
    pub fn request(&mut self, target: T) {
        self.target = Some(target);
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Close the dialog, returning what was staged
    pub fn cancel(&mut self) -> Option<T> {
        self.target.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_then_cancel() {
        let mut dialog = DeleteDialog::new();
        assert!(!dialog.is_open());

        dialog.request(3);
        dialog.request(4);
        assert!(dialog.is_open());
        assert_eq!(dialog.target(), Some(&4));

        assert_eq!(dialog.cancel(), Some(4));
        assert!(!dialog.is_open());
        assert_eq!(dialog.cancel(), None);
    }
}
