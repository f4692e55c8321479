//! Hook dispatch: runs every subscriber of a channel and combines results.
//!
//! - The invocation list is snapshotted first, so subscribers added or
//!   removed by a running callback only affect later dispatches.
//! - Each subscriber runs inside its own isolation boundary: an `Err` or a
//!   panic is logged and the subscriber is treated as if it had not run.
//! - Dispatch is synchronous and never fails from the caller's view.

use tracing::{error, trace};

use crate::isolation::isolate;

use super::channel::{HookChannel, Subscriber};
use super::definitions::HookPoint;
use super::policy::{CombinePolicy, HookValue};

impl<A: 'static, R: HookValue> HookChannel<A, R> {
    /// Dispatches to every subscriber and combines outputs per policy.
    ///
    /// `default` is returned when there are no subscribers. It is also the
    /// starting value for chains, the comparison baseline for override-once
    /// channels, and the input handed to non-chain subscribers.
    pub fn dispatch(&self, args: &A, default: R) -> R {
        let subscribers = self.snapshot();
        if subscribers.is_empty() {
            return default;
        }

        let point = self.point();
        trace!(
            hook = %point,
            policy = %self.policy(),
            subscribers = subscribers.len(),
            "Dispatching hook"
        );

        match self.policy() {
            CombinePolicy::SideEffect => {
                for subscriber in &subscribers {
                    let _ = invoke(point, subscriber, args, default.clone());
                }
                default
            }
            CombinePolicy::Chain => {
                let mut current = default;
                for subscriber in &subscribers {
                    if let Some(next) = invoke(point, subscriber, args, current.clone()) {
                        current = next;
                    }
                }
                current
            }
            CombinePolicy::OverrideOnce => {
                let mut current = default.clone();
                let mut committed = false;
                for subscriber in &subscribers {
                    let Some(candidate) = invoke(point, subscriber, args, default.clone()) else {
                        continue;
                    };
                    if committed || candidate == current {
                        continue;
                    }
                    current = candidate;
                    committed = true;
                }
                current
            }
            CombinePolicy::LogicalOr => {
                // Only subscriber outputs are combined; the default stands in
                // when every subscriber faulted.
                let mut result: Option<R> = None;
                for subscriber in &subscribers {
                    if let Some(output) = invoke(point, subscriber, args, default.clone()) {
                        result = Some(match result {
                            Some(acc) => acc.disjoin(output),
                            None => output,
                        });
                    }
                }
                result.unwrap_or(default)
            }
        }
    }
}

/// Runs one subscriber inside its isolation boundary.
fn invoke<A, R>(point: HookPoint, subscriber: &Subscriber<A, R>, args: &A, input: R) -> Option<R> {
    match isolate(|| (subscriber.callback)(args, input)) {
        Ok(Ok(output)) => Some(output),
        Ok(Err(fault)) => {
            error!(
                hook = %point,
                plugin = %subscriber.owner,
                error = %fault,
                "Hook subscriber failed"
            );
            None
        }
        Err(panic) => {
            error!(
                hook = %point,
                plugin = %subscriber.owner,
                error = %panic,
                "Hook subscriber panicked"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::hooks::channel::HookFault;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[test]
    fn test_empty_channel_returns_default() {
        let chain: HookChannel<(), i32> = HookChannel::chain(HookPoint::TakeHealth);
        assert_eq!(chain.dispatch(&(), 3), 3);

        let or: HookChannel<(), bool> = HookChannel::logical_or(HookPoint::DashPressed);
        assert!(!or.dispatch(&(), false));
    }

    #[test]
    fn test_chain_composes_in_order() {
        let channel: HookChannel<(), i32> = HookChannel::chain(HookPoint::TakeDamage);
        channel.subscribe_fn("add", |_, v| Ok(v + 1));
        let double = channel.subscribe_fn("double", |_, v| Ok(v * 2));
        channel.subscribe_fn("sub", |_, v| Ok(v - 3));

        // ((5 + 1) * 2) - 3
        assert_eq!(channel.dispatch(&(), 5), 9);

        channel.unsubscribe(&double);
        // (5 + 1) - 3
        assert_eq!(channel.dispatch(&(), 5), 3);
    }

    #[test]
    fn test_override_once_first_difference_wins() {
        let channel: HookChannel<String, String> =
            HookChannel::override_once(HookPoint::LanguageGet);
        let calls = counter();

        let c = Arc::clone(&calls);
        channel.subscribe_fn("same", move |_, v| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(v)
        });
        let c = Arc::clone(&calls);
        channel.subscribe_fn("first", move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok("first".to_string())
        });
        let c = Arc::clone(&calls);
        channel.subscribe_fn("second", move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok("second".to_string())
        });

        let result = channel.dispatch(&"KEY".to_string(), "internal".to_string());
        assert_eq!(result, "first");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_override_once_all_equal_keeps_default() {
        let channel: HookChannel<String, i32> = HookChannel::override_once(HookPoint::GetPlayerInt);
        channel.subscribe_fn("a", |_, v| Ok(v));
        channel.subscribe_fn("b", |_, v| Ok(v));
        assert_eq!(channel.dispatch(&"geo".to_string(), 40), 40);
    }

    #[test]
    fn test_logical_or_runs_every_subscriber() {
        let channel: HookChannel<(), bool> = HookChannel::logical_or(HookPoint::DashPressed);
        let calls = counter();
        for answer in [false, true, false, true] {
            let c = Arc::clone(&calls);
            channel.subscribe_fn("p", move |_, _| {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(answer)
            });
        }

        assert!(channel.dispatch(&(), false));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_logical_or_false_when_nobody_agrees() {
        let channel: HookChannel<(), bool> = HookChannel::logical_or(HookPoint::DashPressed);
        channel.subscribe_fn("a", |_, _| Ok(false));
        channel.subscribe_fn("b", |_, _| Ok(false));
        assert!(!channel.dispatch(&(), false));
        // A `true` default does not leak into the result.
        assert!(!channel.dispatch(&(), true));
    }

    #[test]
    fn test_side_effect_runs_all_and_returns_default() {
        let channel: HookChannel<String, ()> = HookChannel::side_effect(HookPoint::SceneChanged);
        let seen = Arc::new(Mutex::new(Vec::new()));
        for owner in ["a", "b"] {
            let seen = Arc::clone(&seen);
            channel.observe(owner, move |scene: &String| {
                seen.lock().push(format!("{owner}:{scene}"));
            });
        }

        channel.dispatch(&"Town".to_string(), ());
        assert_eq!(*seen.lock(), vec!["a:Town", "b:Town"]);
    }

    #[test]
    fn test_failing_subscriber_is_skipped_in_chain() {
        let channel: HookChannel<(), i32> = HookChannel::chain(HookPoint::TakeDamage);
        channel.subscribe_fn("add", |_, v| Ok(v + 1));
        channel.subscribe_fn("err", |_, _| Err(HookFault::new("bad state")));
        channel.subscribe_fn("panic", |_, _| panic!("subscriber exploded"));
        channel.subscribe_fn("double", |_, v| Ok(v * 2));

        assert_eq!(channel.dispatch(&(), 1), 4);
    }

    #[test]
    fn test_failing_subscriber_does_not_commit_override() {
        let channel: HookChannel<String, bool> =
            HookChannel::override_once(HookPoint::GetPlayerBool);
        channel.subscribe_fn("panic", |_, _| panic!("no"));
        channel.subscribe_fn("flip", |_, v| Ok(!v));
        assert!(channel.dispatch(&"hasDash".to_string(), false));
    }

    #[test]
    fn test_failing_subscriber_does_not_affect_or() {
        let channel: HookChannel<(), bool> = HookChannel::logical_or(HookPoint::DashPressed);
        channel.subscribe_fn("err", |_, _| Err("nope".into()));
        channel.subscribe_fn("no", |_, _| Ok(false));
        assert!(!channel.dispatch(&(), false));
    }

    #[test]
    fn test_subscribe_during_dispatch_affects_next_dispatch_only() {
        let channel: Arc<HookChannel<(), i32>> =
            Arc::new(HookChannel::chain(HookPoint::SoulGain));
        let inner = Arc::clone(&channel);
        channel.subscribe_fn("grow", move |_, v| {
            inner.subscribe_fn("late", |_, v| Ok(v + 100));
            Ok(v + 1)
        });

        assert_eq!(channel.dispatch(&(), 0), 1);
        assert_eq!(channel.len(), 2);
        // Second dispatch sees the subscriber added by the first one.
        assert_eq!(channel.dispatch(&(), 0), 101);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_does_not_skip_in_flight() {
        let channel: Arc<HookChannel<(), i32>> =
            Arc::new(HookChannel::chain(HookPoint::SoulGain));
        let calls = counter();

        let c = Arc::clone(&calls);
        let second = channel.subscribe_fn("second", move |_, v| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(v + 10)
        });
        let inner = Arc::clone(&channel);
        let target = Arc::clone(&second);
        // Insert the remover ahead of `second` by rebuilding the list.
        channel.unsubscribe(&second);
        channel.subscribe_fn("remover", move |_, v| {
            inner.unsubscribe(&target);
            Ok(v)
        });
        channel.subscribe("second", second);

        assert_eq!(channel.dispatch(&(), 0), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(channel.dispatch(&(), 0), 0);
    }
}
