//! Transient notifications ("toasts") queued by the screens.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub variant: ToastVariant,
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn success(description: impl Into<String>) -> Self {
        Self::info("Success", description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Default,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Destructive,
            title: "Error".to_string(),
            description: description.into(),
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.variant, ToastVariant::Destructive)
    }
}

/// FIFO of toasts waiting to be shown; the renderer drains it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toaster {
    queue: Vec<Toast>,
}

impl Toaster {
    pub fn push(&mut self, toast: Toast) {
        self.queue.push(toast);
    }

    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_queue_in_order() {
        let mut toaster = Toaster::default();
        toaster.push(Toast::success("first"));
        toaster.push(Toast::error("second"));

        let drained = toaster.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].description, "first");
        assert!(drained[1].is_error());
        assert!(toaster.drain().is_empty());
    }
}
