//! A single named interception point and its ordered subscriber list.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use super::definitions::HookPoint;
use super::policy::{CombinePolicy, HookValue};

/// Error reported by a hook subscriber.
///
/// A faulting subscriber is logged and treated as if it had not run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookFault(pub String);

impl HookFault {
    /// Creates a new fault with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for HookFault {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for HookFault {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Subscriber callback: receives the call arguments and the running value
/// (previous output for chains, the call-site default otherwise).
pub type HookCallback<A, R> = Arc<dyn Fn(&A, R) -> Result<R, HookFault> + Send + Sync>;

/// One entry in a channel's invocation list.
pub(crate) struct Subscriber<A, R> {
    /// Plugin that registered the callback.
    pub(crate) owner: String,
    /// The callback itself.
    pub(crate) callback: HookCallback<A, R>,
}

impl<A, R> Clone for Subscriber<A, R> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            callback: Arc::clone(&self.callback),
        }
    }
}

/// An interception point with an ordered, duplicate-preserving list of
/// subscribers and a fixed combination policy.
pub struct HookChannel<A, R> {
    /// Which interception point this is.
    point: HookPoint,
    /// How subscriber outputs are combined.
    policy: CombinePolicy,
    /// Invocation list, in subscription order.
    subscribers: RwLock<Vec<Subscriber<A, R>>>,
}

impl<A, R> fmt::Debug for HookChannel<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChannel")
            .field("point", &self.point)
            .field("policy", &self.policy)
            .field("subscribers", &self.subscribers.read().len())
            .finish()
    }
}

impl<A: 'static, R: HookValue> HookChannel<A, R> {
    fn with_policy(point: HookPoint, policy: CombinePolicy) -> Self {
        Self {
            point,
            policy,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Creates a channel whose subscribers transform the value in turn.
    pub fn chain(point: HookPoint) -> Self {
        Self::with_policy(point, CombinePolicy::Chain)
    }

    /// Creates a channel where the first differing output wins.
    pub fn override_once(point: HookPoint) -> Self {
        Self::with_policy(point, CombinePolicy::OverrideOnce)
    }

    /// Returns the interception point.
    pub fn point(&self) -> HookPoint {
        self.point
    }

    /// Returns the combination policy.
    pub fn policy(&self) -> CombinePolicy {
        self.policy
    }

    /// Returns the number of subscriber entries.
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Appends a callback. The same callback may be subscribed more than
    /// once; each entry is invoked separately.
    ///
    /// Returns the callback so it can later be passed to [`unsubscribe`].
    ///
    /// [`unsubscribe`]: HookChannel::unsubscribe
    pub fn subscribe(&self, owner: &str, callback: HookCallback<A, R>) -> HookCallback<A, R> {
        debug!(hook = %self.point, plugin = %owner, "Adding hook subscriber");
        self.subscribers.write().push(Subscriber {
            owner: owner.to_string(),
            callback: Arc::clone(&callback),
        });
        callback
    }

    /// Wraps a closure and subscribes it.
    pub fn subscribe_fn<F>(&self, owner: &str, f: F) -> HookCallback<A, R>
    where
        F: Fn(&A, R) -> Result<R, HookFault> + Send + Sync + 'static,
    {
        self.subscribe(owner, Arc::new(f))
    }

    /// Removes the first entry holding `callback`. Returns whether one was found.
    pub fn unsubscribe(&self, callback: &HookCallback<A, R>) -> bool {
        let mut subscribers = self.subscribers.write();
        match subscribers
            .iter()
            .position(|s| Arc::ptr_eq(&s.callback, callback))
        {
            Some(index) => {
                let removed = subscribers.remove(index);
                debug!(hook = %self.point, plugin = %removed.owner, "Removing hook subscriber");
                true
            }
            None => false,
        }
    }

    /// Removes every entry registered by `owner`. Returns how many were removed.
    pub fn unsubscribe_owner(&self, owner: &str) -> usize {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.owner != owner);
        let removed = before - subscribers.len();
        if removed > 0 {
            debug!(hook = %self.point, plugin = %owner, removed, "Removed plugin subscribers");
        }
        removed
    }

    /// Copies the invocation list so callbacks run without the lock held.
    pub(crate) fn snapshot(&self) -> Vec<Subscriber<A, R>> {
        self.subscribers.read().clone()
    }
}

impl<A: 'static> HookChannel<A, ()> {
    /// Creates a notification channel; outputs are ignored.
    pub fn side_effect(point: HookPoint) -> Self {
        Self::with_policy(point, CombinePolicy::SideEffect)
    }

    /// Subscribes an infallible observer.
    pub fn observe<F>(&self, owner: &str, f: F) -> HookCallback<A, ()>
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.subscribe_fn(owner, move |args, ()| {
            f(args);
            Ok(())
        })
    }
}

impl<A: 'static> HookChannel<A, bool> {
    /// Creates a channel whose boolean outputs are OR-ed.
    pub fn logical_or(point: HookPoint) -> Self {
        Self::with_policy(point, CombinePolicy::LogicalOr)
    }
}

/// Type-erased view of a channel, used for registry-wide operations.
pub trait ChannelInfo: Send + Sync {
    /// The interception point.
    fn point(&self) -> HookPoint;
    /// The combination policy.
    fn policy(&self) -> CombinePolicy;
    /// Number of subscriber entries.
    fn subscriber_count(&self) -> usize;
    /// Removes every entry registered by `owner`.
    fn remove_owner(&self, owner: &str) -> usize;
}

impl<A: 'static, R: HookValue> ChannelInfo for HookChannel<A, R> {
    fn point(&self) -> HookPoint {
        HookChannel::point(self)
    }

    fn policy(&self) -> CombinePolicy {
        HookChannel::policy(self)
    }

    fn subscriber_count(&self) -> usize {
        self.len()
    }

    fn remove_owner(&self, owner: &str) -> usize {
        self.unsubscribe_owner(owner)
    }
}
