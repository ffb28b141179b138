use std::future::Future;

use tokio::sync::watch;

/// One-shot shutdown signal shared between the engine and its background tasks.
pub struct Shutdown {
    sender: watch::Sender<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender,
        }
    }

    /// Signal every waiter. Calling it twice is a no-op.
    pub fn shutdown(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once `shutdown` has been called, including calls made before `wait`.
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut receiver = self.sender.subscribe();
        async move {
            loop {
                let done = *receiver.borrow_and_update();
                if done || receiver.changed().await.is_err() {
                    break;
                }
            }
        }
    }
}
