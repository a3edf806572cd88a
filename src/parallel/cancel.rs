use crate::error::{CancelCause, ReduceError};
use crossbeam::channel::{Receiver, Sender, bounded, never};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Monotonic, cloneable cancellation signal.
///
/// The token exposes a [`done`](Self::done) receiver that never yields a value
/// and becomes disconnected the moment the token is cancelled. Disconnected
/// receivers are always ready, so `done()` can sit in any `crossbeam::select!`
/// next to the channel an operation is actually waiting on.
///
/// Clones share state: cancelling any clone cancels all of them. Once
/// cancelled, a token never becomes inactive again and its cause never
/// changes.
#[derive(Clone)]
pub struct CancellationToken {
    shared: Option<Arc<Shared>>,
    done: Receiver<()>,
}

struct Shared {
    cause: OnceLock<CancelCause>,
    trigger: Mutex<Option<Sender<()>>>,
}

impl CancellationToken {
    /// Create a token in the inactive state
    pub fn new() -> Self {
        let (trigger, done) = bounded(0);
        Self {
            shared: Some(Arc::new(Shared {
                cause: OnceLock::new(),
                trigger: Mutex::new(Some(trigger)),
            })),
            done,
        }
    }

    /// A token that can never fire.
    ///
    /// `cancel` on it is a no-op and `done()` blocks forever.
    pub fn never() -> Self {
        Self {
            shared: None,
            done: never(),
        }
    }

    /// Cancel with [`CancelCause::Requested`]
    pub fn cancel(&self) -> bool {
        self.cancel_with(CancelCause::Requested)
    }

    /// Cancel with an explicit cause.
    ///
    /// Returns `true` only for the call that actually moved the token to the
    /// cancelled state. Later calls keep the first cause.
    pub fn cancel_with(&self, cause: CancelCause) -> bool {
        let Some(shared) = &self.shared else {
            return false;
        };

        // Cause must be visible before `done` disconnects
        if shared.cause.set(cause).is_err() {
            return false;
        }

        let trigger = shared
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(trigger);

        tracing::debug!(
            "Cancellation token fired: {}",
            shared.cause.get().map(ToString::to_string).unwrap_or_default()
        );
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cause().is_some()
    }

    pub fn cause(&self) -> Option<&CancelCause> {
        self.shared.as_ref().and_then(|shared| shared.cause.get())
    }

    /// Receiver that becomes ready (disconnected) once the token is cancelled
    pub fn done(&self) -> &Receiver<()> {
        &self.done
    }

    /// `Err(Cancelled)` if the token has fired, `Ok(())` otherwise
    pub fn check(&self) -> Result<(), ReduceError> {
        match self.cause() {
            Some(cause) => Err(ReduceError::Cancelled(cause.clone())),
            None => Ok(()),
        }
    }

    /// The error to report after `done()` has been observed
    pub(crate) fn error(&self) -> ReduceError {
        ReduceError::Cancelled(self.cause().cloned().unwrap_or(CancelCause::Requested))
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancellable", &self.shared.is_some())
            .field("cause", &self.cause())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::{RecvTimeoutError, TryRecvError};
    use std::time::Duration;

    #[test]
    fn test_new_token_is_inactive() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
        assert_eq!(token.done().try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_cancel_disconnects_done() {
        let token = CancellationToken::new();
        assert!(token.cancel());
        assert!(token.is_cancelled());
        assert_eq!(token.done().try_recv(), Err(TryRecvError::Disconnected));
        assert_eq!(
            token.check(),
            Err(ReduceError::Cancelled(CancelCause::Requested))
        );
    }

    #[test]
    fn test_cancel_is_monotonic_and_keeps_first_cause() {
        let token = CancellationToken::new();
        assert!(token.cancel_with(CancelCause::Reason("first".into())));
        assert!(!token.cancel_with(CancelCause::Reason("second".into())));
        assert!(!token.cancel());
        assert_eq!(token.cause(), Some(&CancelCause::Reason("first".into())));
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.done().try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_never_token_cannot_fire() {
        let token = CancellationToken::never();
        assert!(!token.cancel());
        assert!(!token.is_cancelled());
        assert_eq!(
            token.done().recv_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Timeout)
        );
    }

    #[test]
    fn test_cancel_from_another_thread_wakes_waiter() {
        let token = CancellationToken::new();
        let remote = token.clone();

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.cancel_with(CancelCause::Reason("shutdown".into()));
        });

        assert_eq!(
            token.done().recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        );
        assert!(token.is_cancelled());
        handle.join().unwrap();
    }
}
