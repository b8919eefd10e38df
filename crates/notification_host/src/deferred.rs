//! Single-assignment deferred values shared between a resolver and any number of awaiters.

use std::{cell::RefCell, fmt, rc::Rc};

use futures::{
    channel::oneshot,
    future::{FutureExt, Shared},
};

/// Cloneable future observing a [`Deferred`].
///
/// Yields `Err(Canceled)` when every resolver was dropped without resolving.
pub type DeferredFuture<T> = Shared<oneshot::Receiver<T>>;

/// Resolving half of a [`Deferred`]. Only the first resolution counts.
pub struct Resolver<T> {
    sender: Rc<RefCell<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Rc::clone(&self.sender),
        }
    }
}

impl<T> Resolver<T> {
    /// Settles the deferred with `value`.
    ///
    /// Returns `false` when it was already settled; `value` is dropped in that case.
    pub fn resolve(&self, value: T) -> bool {
        let Some(sender) = self.sender.borrow_mut().take() else {
            return false;
        };
        // Every awaiter may have gone away; the deferred still counts as settled.
        let _ = sender.send(value);
        true
    }

    /// Returns `true` once the deferred has been settled.
    pub fn is_settled(&self) -> bool {
        self.sender.borrow().is_none()
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// A value produced once, asynchronously, and observed by every holder of its future.
pub struct Deferred<T> {
    resolver: Resolver<T>,
    future: DeferredFuture<T>,
}

impl<T: Clone> Deferred<T> {
    /// Creates an unsettled deferred.
    pub fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            resolver: Resolver {
                sender: Rc::new(RefCell::new(Some(sender))),
            },
            future: receiver.shared(),
        }
    }

    /// Creates a deferred already settled with `value`.
    pub fn resolved(value: T) -> Self {
        let deferred = Self::new();
        deferred.resolve(value);
        deferred
    }

    /// Returns a resolver that can outlive this value.
    pub fn resolver(&self) -> Resolver<T> {
        self.resolver.clone()
    }

    /// See [`Resolver::resolve`].
    pub fn resolve(&self, value: T) -> bool {
        self.resolver.resolve(value)
    }

    /// Returns a future observing the eventual value.
    pub fn future(&self) -> DeferredFuture<T> {
        self.future.clone()
    }

    /// Returns `true` once the deferred has been settled.
    pub fn is_settled(&self) -> bool {
        self.resolver.is_settled()
    }
}

impl<T: Clone> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.resolver.is_settled())
            .finish()
    }
}
