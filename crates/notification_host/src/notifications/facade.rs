//! Future-based permission and dispatch helpers over a [`NotificationHost`].

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use futures::channel::oneshot::Canceled;

use crate::{
    deferred::{Deferred, DeferredFuture, Resolver},
    AutoClose, EventListener, FacadeConfig, HostNotification, HostNotificationOptions,
    NotificationError, NotificationEvent, NotificationEventKind, NotificationHandle,
    NotificationHost, NotificationOutcome, NotificationRequest, PermissionState, SubscriptionId,
};

/// Object-safe boxed future returned by [`NotificationFacade`] operations.
pub type NotificationFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Result of a permission check or request.
pub type PermissionResult = Result<PermissionState, NotificationError>;

/// Result of a sent notification.
pub type SendResult = Result<NotificationOutcome, NotificationError>;

/// A dispatched notification together with the future of its outcome.
pub struct SentNotification<N> {
    /// Live handle; closing it settles `outcome` through the close pathway.
    pub handle: NotificationHandle<N>,
    /// Settles once with the first of click, error, close or the forced dismissal timer.
    pub outcome: NotificationFuture<'static, SendResult>,
}

/// Permission and notification helpers bound to one host.
///
/// The facade owns a single permission slot shared by every clone. The first
/// [`is_permitted`](Self::is_permitted) or [`request_permissions`](Self::request_permissions)
/// call fills it; later calls reuse it until
/// [`reset_permission_cache`](Self::reset_permission_cache) clears it. Everything is
/// single-threaded: returned futures are `!Send` and are driven by the host's event loop.
pub struct NotificationFacade<H> {
    host: Rc<H>,
    config: FacadeConfig,
    permission: Rc<RefCell<Option<DeferredFuture<PermissionResult>>>>,
}

impl<H> Clone for NotificationFacade<H> {
    fn clone(&self) -> Self {
        Self {
            host: Rc::clone(&self.host),
            config: self.config,
            permission: Rc::clone(&self.permission),
        }
    }
}

impl<H> std::fmt::Debug for NotificationFacade<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationFacade")
            .field("config", &self.config)
            .field("permission_slot", &self.permission.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl<H: NotificationHost + 'static> NotificationFacade<H> {
    /// Creates a facade with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, FacadeConfig::default())
    }

    /// Creates a facade with an explicit configuration.
    pub fn with_config(host: H, config: FacadeConfig) -> Self {
        Self {
            host: Rc::new(host),
            config,
            permission: Rc::new(RefCell::new(None)),
        }
    }

    /// Host binding used by this facade.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Active configuration.
    pub fn config(&self) -> FacadeConfig {
        self.config
    }

    /// Reports whether the host exposes a notification capability.
    ///
    /// Other operations do not check this first; on an unsupported host they fail with
    /// [`NotificationError::MissingCapability`] raised by the host binding.
    pub fn is_supported(&self) -> bool {
        self.host.is_supported()
    }

    /// Returns the memoized permission state.
    ///
    /// The first call reads the host permission and fills the slot; every later call returns the
    /// slot's future without querying the host again. A failed host query is returned directly and
    /// leaves the slot empty.
    pub fn is_permitted(&self) -> NotificationFuture<'static, PermissionResult> {
        let current = self.permission_future();
        Box::pin(async move { settle_permission(current?.await) })
    }

    /// Requests notification permission, prompting only when it is not already granted.
    ///
    /// The returned future first awaits the memoized permission (filling the slot when empty).
    /// `Granted` resolves immediately. Otherwise a new pending request replaces the slot, the host
    /// prompt is invoked and its answer resolves the request. A prompt that cannot be invoked
    /// rejects the request, and a prompt dropped without answering rejects it with
    /// [`NotificationError::PermissionRequest`].
    ///
    /// Requests started while an earlier one is unanswered each get their own pending value and
    /// resolve independently; the slot only tracks the latest one.
    pub fn request_permissions(&self) -> NotificationFuture<'static, PermissionResult> {
        let current = self.permission_future();
        let facade = self.clone();
        Box::pin(async move {
            let state = settle_permission(current?.await)?;
            if state.is_granted() {
                return Ok(state);
            }
            let request = facade.begin_permission_request();
            settle_permission(request.await)
        })
    }

    /// Clears the permission slot so the next check queries the host again.
    pub fn reset_permission_cache(&self) {
        self.permission.borrow_mut().take();
    }

    /// Returns `true` once a permission check or request has filled the slot.
    pub fn has_permission_slot(&self) -> bool {
        self.permission.borrow().is_some()
    }

    /// Creates and displays a notification.
    ///
    /// Unless auto-close is [`AutoClose::Disabled`], the notification is closed after the
    /// requested delay (or the configured default). The timer cannot be cancelled; closing early
    /// through the handle makes the later close a no-op on well-behaved hosts.
    ///
    /// # Errors
    ///
    /// Returns the host binding's error when the notification cannot be constructed.
    pub fn create(
        &self,
        request: NotificationRequest,
    ) -> Result<NotificationHandle<H::Notification>, NotificationError> {
        let NotificationRequest {
            title,
            body,
            icon_url,
            auto_close,
        } = request;
        let body = body.filter(|body| !body.is_empty());
        let icon_url = icon_url.filter(|icon| !icon.is_empty());
        let options = HostNotificationOptions {
            body: body.clone(),
            icon: icon_url.clone(),
        };
        let notification = Rc::new(self.host.create_notification(&title, &options)?);

        let auto_close_ms = auto_close.delay_ms(self.config.default_timeout_ms);
        if let Some(delay_ms) = auto_close_ms {
            let target = Rc::clone(&notification);
            self.host.schedule(delay_ms, Box::new(move || target.close()));
        }

        Ok(NotificationHandle {
            notification,
            title,
            body,
            icon_url,
            auto_close_ms,
        })
    }

    /// Creates a notification and returns its handle with a future of its outcome.
    ///
    /// On hosts without close events the auto-close delay is forced to the explicit non-zero
    /// delay, or the configured default otherwise, and a fallback timer settles the outcome as
    /// [`NotificationOutcome::Dismissed`] when it elapses. The outcome therefore always settles
    /// on such hosts.
    ///
    /// # Errors
    ///
    /// Returns the host binding's error when the notification cannot be constructed.
    pub fn dispatch(
        &self,
        mut request: NotificationRequest,
    ) -> Result<SentNotification<H::Notification>, NotificationError> {
        let mut forced_ms = None;
        if !self.host.supports_close_event() {
            let delay_ms = request
                .auto_close
                .explicit_ms()
                .unwrap_or(self.config.default_timeout_ms);
            request.auto_close = AutoClose::After(delay_ms);
            forced_ms = Some(delay_ms);
        }

        let handle = self.create(request)?;

        let deferred = Deferred::new();
        let race = Rc::new(OutcomeRace {
            resolver: deferred.resolver(),
            subscriptions: RefCell::new(None),
        });
        let ids = NotificationEventKind::ALL
            .into_iter()
            .map(|kind| {
                let race = Rc::clone(&race);
                let listener: EventListener = Rc::new(move |event: &NotificationEvent| {
                    race.settle(outcome_for(kind, event));
                });
                handle.notification.subscribe(kind, listener)
            })
            .collect();
        race.track(Rc::clone(&handle.notification), ids);

        if let Some(delay_ms) = forced_ms {
            let race = Rc::clone(&race);
            self.host.schedule(
                delay_ms,
                Box::new(move || race.settle(Ok(NotificationOutcome::Dismissed))),
            );
        }

        let future = deferred.future();
        // Every resolver gone without an event means the host dropped the notification.
        let outcome = Box::pin(async move {
            future
                .await
                .unwrap_or(Ok(NotificationOutcome::Dismissed))
        });
        Ok(SentNotification { handle, outcome })
    }

    /// Creates a notification and returns a future of its outcome.
    ///
    /// Resolves [`NotificationOutcome::Clicked`] on click and
    /// [`NotificationOutcome::Dismissed`] on close or forced timeout; rejects with
    /// [`NotificationError::NotificationFailed`] carrying the host event on error. Construction
    /// failures are returned through the future as well. See [`dispatch`](Self::dispatch).
    pub fn send(&self, request: NotificationRequest) -> NotificationFuture<'static, SendResult> {
        match self.dispatch(request) {
            Ok(sent) => sent.outcome,
            Err(err) => Box::pin(futures::future::ready(Err(err))),
        }
    }

    fn permission_future(&self) -> Result<DeferredFuture<PermissionResult>, NotificationError> {
        if let Some(future) = self.permission.borrow().as_ref() {
            return Ok(future.clone());
        }
        let state = PermissionState::from_host_value(&self.host.permission()?);
        let future = Deferred::resolved(Ok(state)).future();
        *self.permission.borrow_mut() = Some(future.clone());
        Ok(future)
    }

    fn begin_permission_request(&self) -> DeferredFuture<PermissionResult> {
        let deferred = Deferred::new();
        let resolver = deferred.resolver();
        let future = deferred.future();
        drop(deferred);
        *self.permission.borrow_mut() = Some(future.clone());

        let on_answer = resolver.clone();
        let prompt = self.host.request_permission(Box::new(move |value: String| {
            on_answer.resolve(Ok(PermissionState::from_host_value(&value)));
        }));
        if let Err(err) = prompt {
            resolver.resolve(Err(err));
        }
        future
    }
}

fn settle_permission(result: Result<PermissionResult, Canceled>) -> PermissionResult {
    result.unwrap_or_else(|Canceled| {
        Err(NotificationError::PermissionRequest(
            "permission prompt closed without an answer".to_string(),
        ))
    })
}

fn outcome_for(kind: NotificationEventKind, event: &NotificationEvent) -> SendResult {
    match kind {
        NotificationEventKind::Click => Ok(NotificationOutcome::Clicked),
        NotificationEventKind::Close => Ok(NotificationOutcome::Dismissed),
        NotificationEventKind::Error => Err(NotificationError::NotificationFailed {
            event: event.clone(),
        }),
    }
}

/// One-shot race between notification events and the forced dismissal timer.
struct OutcomeRace<N> {
    resolver: Resolver<SendResult>,
    subscriptions: RefCell<Option<(Rc<N>, Vec<SubscriptionId>)>>,
}

impl<N: HostNotification> OutcomeRace<N> {
    fn settle(&self, result: SendResult) {
        if self.resolver.resolve(result) {
            self.teardown();
        }
    }

    fn track(&self, notification: Rc<N>, ids: Vec<SubscriptionId>) {
        *self.subscriptions.borrow_mut() = Some((notification, ids));
        if self.resolver.is_settled() {
            self.teardown();
        }
    }

    fn teardown(&self) {
        let tracked = self.subscriptions.borrow_mut().take();
        if let Some((notification, ids)) = tracked {
            for id in ids {
                notification.unsubscribe(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::task::{Context, Poll};

    use futures::{executor::block_on, task::noop_waker_ref};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{MemoryNotificationHost, PromptBehavior};

    fn poll_once<T>(future: &mut NotificationFuture<'static, T>) -> Poll<T> {
        let mut cx = Context::from_waker(noop_waker_ref());
        future.as_mut().poll(&mut cx)
    }

    fn facade_with(host: &MemoryNotificationHost) -> NotificationFacade<MemoryNotificationHost> {
        NotificationFacade::new(host.clone())
    }

    #[test]
    fn concurrent_permission_checks_share_one_answer() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);

        let first = facade.is_permitted();
        host.set_permission("granted");
        let second = facade.is_permitted();
        let third = facade.clone().is_permitted();

        assert_eq!(block_on(first), Ok(PermissionState::Unknown));
        assert_eq!(block_on(second), Ok(PermissionState::Unknown));
        assert_eq!(block_on(third), Ok(PermissionState::Unknown));
        assert!(facade.has_permission_slot());
    }

    #[test]
    fn reset_permission_cache_queries_the_host_again() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);
        assert_eq!(block_on(facade.is_permitted()), Ok(PermissionState::Unknown));

        host.set_permission("denied");
        facade.reset_permission_cache();
        assert!(!facade.has_permission_slot());
        assert_eq!(block_on(facade.is_permitted()), Ok(PermissionState::Denied));
    }

    #[test]
    fn granted_permission_skips_the_prompt() {
        let host = MemoryNotificationHost::default();
        host.set_permission("granted");
        let facade = facade_with(&host);

        assert_eq!(
            block_on(facade.request_permissions()),
            Ok(PermissionState::Granted)
        );
        assert_eq!(host.prompt_count(), 0);
    }

    #[test]
    fn denied_permission_prompts_once_per_request() {
        let host = MemoryNotificationHost::default();
        host.set_permission("denied");
        host.set_prompt_behavior(PromptBehavior::Answer("denied".into()));
        let facade = facade_with(&host);

        assert_eq!(
            block_on(facade.request_permissions()),
            Ok(PermissionState::Denied)
        );
        assert_eq!(host.prompt_count(), 1);
        assert_eq!(
            block_on(facade.request_permissions()),
            Ok(PermissionState::Denied)
        );
        assert_eq!(host.prompt_count(), 2);
    }

    #[test]
    fn prompt_answer_replaces_the_memoized_state() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);

        assert_eq!(
            block_on(facade.request_permissions()),
            Ok(PermissionState::Granted)
        );
        assert_eq!(block_on(facade.is_permitted()), Ok(PermissionState::Granted));
        assert_eq!(
            block_on(facade.request_permissions()),
            Ok(PermissionState::Granted)
        );
        assert_eq!(host.prompt_count(), 1);
    }

    #[test]
    fn failed_prompt_invocation_rejects_the_request() {
        let host = MemoryNotificationHost::default();
        host.set_prompt_behavior(PromptBehavior::Fail("prompt blocked".into()));
        let facade = facade_with(&host);

        let expected = Err(NotificationError::PermissionRequest(
            "prompt blocked".into(),
        ));
        assert_eq!(block_on(facade.request_permissions()), expected);
        // The rejected request now occupies the slot.
        assert_eq!(block_on(facade.is_permitted()), expected);
        assert_eq!(host.prompt_count(), 1);
    }

    #[test]
    fn abandoned_prompt_rejects_the_request() {
        let host = MemoryNotificationHost::default();
        host.set_prompt_behavior(PromptBehavior::Defer);
        let facade = facade_with(&host);

        let mut request = facade.request_permissions();
        assert!(poll_once(&mut request).is_pending());
        host.abandon_pending_prompts();
        assert!(matches!(
            poll_once(&mut request),
            Poll::Ready(Err(NotificationError::PermissionRequest(_)))
        ));
    }

    #[test]
    fn unsupported_host_fails_permission_checks_without_filling_the_slot() {
        let host = MemoryNotificationHost::default();
        host.set_supported(false);
        let facade = facade_with(&host);

        assert!(!facade.is_supported());
        assert!(matches!(
            block_on(facade.is_permitted()),
            Err(NotificationError::MissingCapability(_))
        ));
        assert!(!facade.has_permission_slot());
    }

    #[test]
    fn request_started_after_a_pending_one_waits_for_its_answer() {
        let host = MemoryNotificationHost::default();
        host.set_prompt_behavior(PromptBehavior::Defer);
        let facade = facade_with(&host);

        let mut first = facade.request_permissions();
        assert!(poll_once(&mut first).is_pending());
        let mut second = facade.request_permissions();
        assert!(poll_once(&mut second).is_pending());
        assert_eq!(host.prompt_count(), 1);

        assert!(host.answer_next_prompt("granted"));
        assert_eq!(poll_once(&mut first), Poll::Ready(Ok(PermissionState::Granted)));
        assert_eq!(poll_once(&mut second), Poll::Ready(Ok(PermissionState::Granted)));
        assert_eq!(host.prompt_count(), 1);
    }

    #[test]
    fn overlapping_requests_resolve_independently() {
        let host = MemoryNotificationHost::default();
        host.set_prompt_behavior(PromptBehavior::Defer);
        let facade = facade_with(&host);
        assert_eq!(block_on(facade.is_permitted()), Ok(PermissionState::Unknown));

        let mut first = facade.request_permissions();
        let mut second = facade.request_permissions();
        assert!(poll_once(&mut first).is_pending());
        assert!(poll_once(&mut second).is_pending());
        assert_eq!(host.prompt_count(), 2);

        assert!(host.answer_next_prompt("granted"));
        assert_eq!(poll_once(&mut first), Poll::Ready(Ok(PermissionState::Granted)));
        assert!(poll_once(&mut second).is_pending());

        assert!(host.answer_next_prompt("denied"));
        assert_eq!(poll_once(&mut second), Poll::Ready(Ok(PermissionState::Denied)));
        // The slot tracks the latest request.
        assert_eq!(block_on(facade.is_permitted()), Ok(PermissionState::Denied));
    }

    #[test]
    fn create_passes_body_and_icon_to_the_host() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);

        let handle = facade
            .create(
                NotificationRequest::new("Upload done")
                    .body("3 files")
                    .icon_url("/icons/upload.png"),
            )
            .expect("create");

        let notification = host.last_notification().expect("notification");
        assert_eq!(notification.title(), "Upload done");
        assert_eq!(
            notification.options(),
            &HostNotificationOptions {
                body: Some("3 files".into()),
                icon: Some("/icons/upload.png".into()),
            }
        );
        assert_eq!(handle.body(), Some("3 files"));
        assert_eq!(handle.icon_url(), Some("/icons/upload.png"));
    }

    #[test]
    fn create_drops_empty_body_and_icon() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);

        facade
            .create(NotificationRequest::new("t").body("").icon_url(""))
            .expect("create");
        assert_eq!(
            host.last_notification().expect("notification").options(),
            &HostNotificationOptions::default()
        );
    }

    #[test]
    fn create_auto_closes_after_the_default_delay() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);

        let handle = facade
            .create(NotificationRequest::new("t"))
            .expect("create");
        assert_eq!(handle.auto_close_ms(), Some(4000));
        let notification = host.last_notification().expect("notification");

        host.advance(3999);
        assert!(!notification.is_closed());
        host.advance(1);
        assert_eq!(notification.closed_at_ms(), Some(4000));
    }

    #[test]
    fn create_honours_explicit_and_disabled_timeouts() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);

        facade
            .create(NotificationRequest::new("quick").auto_close(AutoClose::After(250)))
            .expect("create");
        let quick = host.last_notification().expect("notification");
        let sticky_handle = facade
            .create(NotificationRequest::new("sticky").auto_close(AutoClose::Disabled))
            .expect("create");
        let sticky = host.last_notification().expect("notification");
        assert_eq!(sticky_handle.auto_close_ms(), None);
        assert_eq!(host.pending_timer_count(), 1);

        host.advance(60_000);
        assert_eq!(quick.closed_at_ms(), Some(250));
        assert!(!sticky.is_closed());

        sticky_handle.close();
        assert_eq!(sticky.closed_at_ms(), Some(60_000));
    }

    #[test]
    fn configured_default_timeout_applies() {
        let host = MemoryNotificationHost::default();
        let facade = NotificationFacade::with_config(
            host.clone(),
            FacadeConfig {
                default_timeout_ms: 1000,
            },
        );
        facade
            .create(NotificationRequest::new("t"))
            .expect("create");
        host.advance(1000);
        assert!(host.last_notification().expect("notification").is_closed());
    }

    #[test]
    fn click_settles_clicked_once_and_unsubscribes() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);

        let mut outcome = facade.send(NotificationRequest::new("t"));
        let notification = host.last_notification().expect("notification");
        assert_eq!(notification.listener_count(), 3);
        assert!(poll_once(&mut outcome).is_pending());

        notification.click();
        assert_eq!(notification.listener_count(), 0);
        notification.fail("late");
        notification.close();
        assert_eq!(
            poll_once(&mut outcome),
            Poll::Ready(Ok(NotificationOutcome::Clicked))
        );
    }

    #[test]
    fn error_event_rejects_with_the_host_event() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);

        let outcome = facade.send(NotificationRequest::new("t"));
        let notification = host.last_notification().expect("notification");
        host.advance(10);
        notification.fail("display failed");
        notification.click();

        let err = block_on(outcome).unwrap_err();
        let event = err.event().expect("event");
        assert_eq!(event.kind, NotificationEventKind::Error);
        assert_eq!(event.message.as_deref(), Some("display failed"));
        assert_eq!(event.timestamp_ms, Some(10.0));
        assert_eq!(notification.listener_count(), 0);
    }

    #[test]
    fn auto_close_settles_dismissed_through_the_close_event() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);

        let outcome = facade.send(NotificationRequest::new("t"));
        assert_eq!(host.pending_timer_count(), 1);
        host.advance(4000);
        assert_eq!(block_on(outcome), Ok(NotificationOutcome::Dismissed));
    }

    #[test]
    fn host_without_close_events_gets_a_forced_dismissal() {
        let host = MemoryNotificationHost::default();
        host.set_close_event_supported(false);
        let facade = facade_with(&host);

        let mut outcome =
            facade.send(NotificationRequest::new("t").auto_close(AutoClose::Disabled));
        let notification = host.last_notification().expect("notification");
        host.advance(3999);
        assert!(poll_once(&mut outcome).is_pending());
        host.advance(1);
        assert!(notification.is_closed());
        assert_eq!(
            poll_once(&mut outcome),
            Poll::Ready(Ok(NotificationOutcome::Dismissed))
        );
        assert_eq!(notification.listener_count(), 0);
    }

    #[test]
    fn forced_dismissal_uses_an_explicit_delay() {
        let host = MemoryNotificationHost::default();
        host.set_close_event_supported(false);
        let facade = facade_with(&host);

        let mut outcome =
            facade.send(NotificationRequest::new("t").auto_close(AutoClose::After(500)));
        host.advance(500);
        assert_eq!(
            poll_once(&mut outcome),
            Poll::Ready(Ok(NotificationOutcome::Dismissed))
        );
    }

    #[test]
    fn click_before_forced_dismissal_wins() {
        let host = MemoryNotificationHost::default();
        host.set_close_event_supported(false);
        let facade = facade_with(&host);

        let outcome = facade.send(NotificationRequest::new("t"));
        host.advance(100);
        host.last_notification().expect("notification").click();
        host.advance(10_000);
        assert_eq!(block_on(outcome), Ok(NotificationOutcome::Clicked));
    }

    #[test]
    fn closing_a_dispatched_handle_dismisses() {
        let host = MemoryNotificationHost::default();
        let facade = facade_with(&host);

        let SentNotification {
            handle,
            mut outcome,
        } = facade
            .dispatch(NotificationRequest::new("t").auto_close(AutoClose::Disabled))
            .expect("dispatch");
        assert_eq!(host.pending_timer_count(), 0);
        assert!(poll_once(&mut outcome).is_pending());

        handle.close();
        assert_eq!(
            poll_once(&mut outcome),
            Poll::Ready(Ok(NotificationOutcome::Dismissed))
        );
    }

    #[test]
    fn send_on_unsupported_host_rejects() {
        let host = MemoryNotificationHost::default();
        host.set_supported(false);
        let facade = facade_with(&host);

        assert!(matches!(
            block_on(facade.send(NotificationRequest::new("t"))),
            Err(NotificationError::MissingCapability(_))
        ));
        assert!(facade.create(NotificationRequest::new("t")).is_err());
        assert!(host.notifications().is_empty());
    }
}
