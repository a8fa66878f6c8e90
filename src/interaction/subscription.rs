use std::sync::{Arc, Weak};

/// Handle tying an input source to a panel.
///
/// Inputs are only accepted through the subscription returned by the most
/// recent `TimelinePanel::attach_input`. Dropping the handle detaches the
/// source; pending brush commits are discarded on the next tick.
#[derive(Debug)]
pub struct InputSubscription {
    token: Arc<()>,
}

impl InputSubscription {
    /// Detaches explicitly; equivalent to dropping the handle.
    pub fn detach(self) {}
}

/// Panel-side view of the current subscription.
#[derive(Debug, Default)]
pub(crate) struct InputAttachment {
    token: Option<Weak<()>>,
}

impl InputAttachment {
    pub(crate) fn attach(&mut self) -> InputSubscription {
        let token = Arc::new(());
        self.token = Some(Arc::downgrade(&token));
        InputSubscription { token }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| token.strong_count() > 0)
    }

    pub(crate) fn accepts(&self, subscription: &InputSubscription) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| token.ptr_eq(&Arc::downgrade(&subscription.token)))
    }
}

#[cfg(test)]
mod tests {
    use super::InputAttachment;

    #[test]
    fn newer_attachment_supersedes_older_handle() {
        let mut attachment = InputAttachment::default();
        let first = attachment.attach();
        let second = attachment.attach();

        assert!(!attachment.accepts(&first));
        assert!(attachment.accepts(&second));
        assert!(attachment.is_live());

        drop(second);
        assert!(!attachment.is_live());
    }
}
