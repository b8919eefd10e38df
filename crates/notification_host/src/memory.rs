//! In-memory scripted notification host with a manual clock.
//!
//! [`MemoryNotificationHost`] records every created notification, lets callers fire `click`,
//! `error` and `close` events by hand, answers permission prompts according to a
//! [`PromptBehavior`] and only runs scheduled tasks when [`MemoryNotificationHost::advance`]
//! moves its clock forward.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{
    EventListener, HostNotification, HostNotificationOptions, NotificationError,
    NotificationEvent, NotificationEventKind, NotificationHost, PermissionCallback,
    ScheduledTask, SubscriptionId, HOST_PERMISSION_DEFAULT,
};

/// How [`MemoryNotificationHost`] answers the interactive permission prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptBehavior {
    /// Answer synchronously with the given host value and adopt it as the current permission.
    Answer(String),
    /// Keep the callback until [`MemoryNotificationHost::answer_next_prompt`] is called.
    Defer,
    /// Fail the prompt invocation with the given message.
    Fail(String),
}

struct TimerEntry {
    due_ms: u64,
    seq: u64,
    task: ScheduledTask,
}

#[derive(Default)]
struct ManualClock {
    now_ms: Rc<Cell<u64>>,
    next_seq: u64,
    timers: Vec<TimerEntry>,
}

impl ManualClock {
    fn schedule(&mut self, delay_ms: u32, task: ScheduledTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(TimerEntry {
            due_ms: self.now_ms.get() + u64::from(delay_ms),
            seq,
            task,
        });
    }

    fn take_due(&mut self, target_ms: u64) -> Option<TimerEntry> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= target_ms)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.seq))
            .map(|(index, _)| index)?;
        Some(self.timers.remove(index))
    }
}

struct HostState {
    supported: Cell<bool>,
    close_event_supported: Cell<bool>,
    permission: RefCell<String>,
    prompt: RefCell<PromptBehavior>,
    prompt_count: Cell<usize>,
    pending_prompts: RefCell<Vec<PermissionCallback>>,
    notifications: RefCell<Vec<MemoryNotification>>,
    clock: RefCell<ManualClock>,
}

#[derive(Clone)]
/// Scripted in-memory [`NotificationHost`].
///
/// Defaults: supported, emits close events, permission `default`, prompts answer `granted`.
pub struct MemoryNotificationHost {
    state: Rc<HostState>,
}

impl Default for MemoryNotificationHost {
    fn default() -> Self {
        Self {
            state: Rc::new(HostState {
                supported: Cell::new(true),
                close_event_supported: Cell::new(true),
                permission: RefCell::new(HOST_PERMISSION_DEFAULT.to_string()),
                prompt: RefCell::new(PromptBehavior::Answer("granted".to_string())),
                prompt_count: Cell::new(0),
                pending_prompts: RefCell::new(Vec::new()),
                notifications: RefCell::new(Vec::new()),
                clock: RefCell::new(ManualClock::default()),
            }),
        }
    }
}

impl std::fmt::Debug for MemoryNotificationHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryNotificationHost")
            .field("supported", &self.state.supported.get())
            .field("permission", &self.state.permission.borrow())
            .field("now_ms", &self.now_ms())
            .finish_non_exhaustive()
    }
}

impl MemoryNotificationHost {
    /// Sets whether the host exposes a notification capability.
    pub fn set_supported(&self, supported: bool) {
        self.state.supported.set(supported);
    }

    /// Sets whether notifications emit `close` events.
    pub fn set_close_event_supported(&self, supported: bool) {
        self.state.close_event_supported.set(supported);
    }

    /// Sets the raw current permission value.
    pub fn set_permission(&self, value: impl Into<String>) {
        *self.state.permission.borrow_mut() = value.into();
    }

    /// Sets how future permission prompts are answered.
    pub fn set_prompt_behavior(&self, behavior: PromptBehavior) {
        *self.state.prompt.borrow_mut() = behavior;
    }

    /// Number of times the interactive prompt was invoked, including failed invocations.
    pub fn prompt_count(&self) -> usize {
        self.state.prompt_count.get()
    }

    /// Number of deferred prompts still waiting for an answer.
    pub fn pending_prompt_count(&self) -> usize {
        self.state.pending_prompts.borrow().len()
    }

    /// Answers the oldest deferred prompt and adopts `value` as the current permission.
    ///
    /// Returns `false` when no prompt is waiting.
    pub fn answer_next_prompt(&self, value: &str) -> bool {
        let callback = {
            let mut pending = self.state.pending_prompts.borrow_mut();
            if pending.is_empty() {
                return false;
            }
            pending.remove(0)
        };
        self.set_permission(value);
        callback(value.to_string());
        true
    }

    /// Drops every deferred prompt without answering it.
    pub fn abandon_pending_prompts(&self) {
        self.state.pending_prompts.borrow_mut().clear();
    }

    /// Every notification created so far, oldest first.
    pub fn notifications(&self) -> Vec<MemoryNotification> {
        self.state.notifications.borrow().clone()
    }

    /// The most recently created notification.
    pub fn last_notification(&self) -> Option<MemoryNotification> {
        self.state.notifications.borrow().last().cloned()
    }

    /// Current manual clock time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.state.clock.borrow().now_ms.get()
    }

    /// Number of scheduled tasks that have not run yet.
    pub fn pending_timer_count(&self) -> usize {
        self.state.clock.borrow().timers.len()
    }

    /// Moves the clock forward by `ms`, running due tasks in deadline order.
    ///
    /// Tasks scheduled while advancing run too when they fall due inside the window.
    pub fn advance(&self, ms: u64) {
        let target_ms = self.now_ms() + ms;
        loop {
            let due = self.state.clock.borrow_mut().take_due(target_ms);
            let Some(timer) = due else {
                break;
            };
            self.state.clock.borrow().now_ms.set(timer.due_ms);
            (timer.task)();
        }
        self.state.clock.borrow().now_ms.set(target_ms);
    }

    fn missing_capability() -> NotificationError {
        NotificationError::MissingCapability("memory host is configured as unsupported".into())
    }
}

impl NotificationHost for MemoryNotificationHost {
    type Notification = MemoryNotification;

    fn is_supported(&self) -> bool {
        self.state.supported.get()
    }

    fn supports_close_event(&self) -> bool {
        self.state.close_event_supported.get()
    }

    fn permission(&self) -> Result<String, NotificationError> {
        if !self.is_supported() {
            return Err(Self::missing_capability());
        }
        Ok(self.state.permission.borrow().clone())
    }

    fn request_permission(&self, on_result: PermissionCallback) -> Result<(), NotificationError> {
        if !self.is_supported() {
            return Err(Self::missing_capability());
        }
        self.state
            .prompt_count
            .set(self.state.prompt_count.get() + 1);
        let behavior = self.state.prompt.borrow().clone();
        match behavior {
            PromptBehavior::Answer(value) => {
                self.set_permission(value.clone());
                on_result(value);
                Ok(())
            }
            PromptBehavior::Defer => {
                self.state.pending_prompts.borrow_mut().push(on_result);
                Ok(())
            }
            PromptBehavior::Fail(message) => Err(NotificationError::PermissionRequest(message)),
        }
    }

    fn create_notification(
        &self,
        title: &str,
        options: &HostNotificationOptions,
    ) -> Result<Self::Notification, NotificationError> {
        if !self.is_supported() {
            return Err(Self::missing_capability());
        }
        let notification = MemoryNotification {
            inner: Rc::new(NotificationState {
                title: title.to_string(),
                options: options.clone(),
                emits_close: self.supports_close_event(),
                now_ms: Rc::clone(&self.state.clock.borrow().now_ms),
                closed_at_ms: Cell::new(None),
                next_id: Cell::new(1),
                listeners: RefCell::new(Vec::new()),
            }),
        };
        self.state
            .notifications
            .borrow_mut()
            .push(notification.clone());
        Ok(notification)
    }

    fn schedule(&self, delay_ms: u32, task: ScheduledTask) {
        self.state.clock.borrow_mut().schedule(delay_ms, task);
    }
}

struct NotificationState {
    title: String,
    options: HostNotificationOptions,
    emits_close: bool,
    now_ms: Rc<Cell<u64>>,
    closed_at_ms: Cell<Option<u64>>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, NotificationEventKind, EventListener)>>,
}

#[derive(Clone)]
/// Notification created by [`MemoryNotificationHost`].
pub struct MemoryNotification {
    inner: Rc<NotificationState>,
}

impl std::fmt::Debug for MemoryNotification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryNotification")
            .field("title", &self.inner.title)
            .field("options", &self.inner.options)
            .field("closed_at_ms", &self.inner.closed_at_ms.get())
            .finish_non_exhaustive()
    }
}

impl MemoryNotification {
    /// Title passed to the constructor.
    pub fn title(&self) -> &str {
        &self.inner.title
    }

    /// Options passed to the constructor.
    pub fn options(&self) -> &HostNotificationOptions {
        &self.inner.options
    }

    /// Returns `true` once the notification was closed.
    pub fn is_closed(&self) -> bool {
        self.inner.closed_at_ms.get().is_some()
    }

    /// Clock time at which the notification was closed.
    pub fn closed_at_ms(&self) -> Option<u64> {
        self.inner.closed_at_ms.get()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Fires a `click` event.
    pub fn click(&self) {
        self.emit(NotificationEvent::new(NotificationEventKind::Click));
    }

    /// Fires an `error` event carrying `message`.
    pub fn fail(&self, message: &str) {
        self.emit(NotificationEvent::new(NotificationEventKind::Error).with_message(message));
    }

    /// Delivers `event` to every listener registered for its kind.
    pub fn emit(&self, event: NotificationEvent) {
        let event = event.with_timestamp_ms(self.inner.now_ms.get() as f64);
        let targets: Vec<(SubscriptionId, EventListener)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(id, _, listener)| (*id, Rc::clone(listener)))
            .collect();
        for (id, listener) in targets {
            // An earlier listener may have unsubscribed this one.
            if self.is_subscribed(id) {
                listener(&event);
            }
        }
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.inner
            .listeners
            .borrow()
            .iter()
            .any(|(existing, _, _)| *existing == id)
    }
}

impl HostNotification for MemoryNotification {
    fn close(&self) {
        if self.is_closed() {
            return;
        }
        self.inner.closed_at_ms.set(Some(self.inner.now_ms.get()));
        if self.inner.emits_close {
            self.emit(NotificationEvent::new(NotificationEventKind::Close));
        }
    }

    fn subscribe(&self, kind: NotificationEventKind, listener: EventListener) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push((id, kind, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(existing, _, _)| *existing != id);
    }
}
