//! Host binding contracts consumed by [`crate::NotificationFacade`], plus a no-op binding.
//!
//! A binding wraps one platform's notification capability: the permission query and prompt,
//! the notification constructor, per-notification event subscriptions and a one-shot delayed
//! task scheduler. Everything runs on the host's single-threaded event loop, so callbacks are
//! plain `Rc`/`Box` closures without `Send` bounds.

use std::rc::Rc;

use crate::{NotificationError, NotificationEvent, NotificationEventKind};

/// Listener invoked for every matching event until it is unsubscribed.
pub type EventListener = Rc<dyn Fn(&NotificationEvent)>;

/// Single-argument completion callback handed to the interactive permission prompt.
///
/// Receives the raw host permission value.
pub type PermissionCallback = Box<dyn FnOnce(String)>;

/// Delayed one-shot task handed to the host scheduler.
pub type ScheduledTask = Box<dyn FnOnce()>;

/// Stable host strategy selected for the current build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed notifications.
    Browser,
    /// Desktop composition with the no-op binding.
    DesktopStub,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::DesktopStub => "desktop-stub",
        }
    }
}

/// Identifier returned by [`HostNotification::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Options passed to the host notification constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostNotificationOptions {
    /// Body text.
    pub body: Option<String>,
    /// Icon URL.
    pub icon: Option<String>,
}

/// One live host notification.
pub trait HostNotification {
    /// Closes the notification. Hosts with close-event support emit `close` afterwards.
    fn close(&self);

    /// Registers `listener` for events of `kind`.
    fn subscribe(&self, kind: NotificationEventKind, listener: EventListener) -> SubscriptionId;

    /// Removes a listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Host notification capability.
pub trait NotificationHost {
    /// Live notification type produced by [`Self::create_notification`].
    type Notification: HostNotification + 'static;

    /// Reports whether the host exposes a notification capability at all.
    fn is_supported(&self) -> bool;

    /// Reports whether notifications emit a `close` event when they go away.
    fn supports_close_event(&self) -> bool;

    /// Returns the raw current permission value (`granted`, `denied` or anything else).
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::MissingCapability`] when the host has no notification
    /// capability.
    fn permission(&self) -> Result<String, NotificationError>;

    /// Opens the interactive permission prompt; `on_result` receives the raw answer.
    ///
    /// # Errors
    ///
    /// Returns an error when the prompt cannot be invoked at all.
    fn request_permission(&self, on_result: PermissionCallback) -> Result<(), NotificationError>;

    /// Constructs and displays a notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::MissingCapability`] when the host cannot construct
    /// notifications.
    fn create_notification(
        &self,
        title: &str,
        options: &HostNotificationOptions,
    ) -> Result<Self::Notification, NotificationError>;

    /// Runs `task` once after `delay_ms` milliseconds.
    fn schedule(&self, delay_ms: u32, task: ScheduledTask);
}

fn unsupported() -> NotificationError {
    NotificationError::MissingCapability("notifications are not available on this host".into())
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op notification binding for unsupported targets.
pub struct NoopNotificationHost;

#[derive(Debug, Clone, Copy, Default)]
/// Notification type of [`NoopNotificationHost`]; never constructed by it.
pub struct NoopNotification;

impl HostNotification for NoopNotification {
    fn close(&self) {}

    fn subscribe(&self, _kind: NotificationEventKind, _listener: EventListener) -> SubscriptionId {
        SubscriptionId(0)
    }

    fn unsubscribe(&self, _id: SubscriptionId) {}
}

impl NotificationHost for NoopNotificationHost {
    type Notification = NoopNotification;

    fn is_supported(&self) -> bool {
        false
    }

    fn supports_close_event(&self) -> bool {
        false
    }

    fn permission(&self) -> Result<String, NotificationError> {
        Err(unsupported())
    }

    fn request_permission(&self, _on_result: PermissionCallback) -> Result<(), NotificationError> {
        Err(unsupported())
    }

    fn create_notification(
        &self,
        _title: &str,
        _options: &HostNotificationOptions,
    ) -> Result<Self::Notification, NotificationError> {
        Err(unsupported())
    }

    fn schedule(&self, _delay_ms: u32, _task: ScheduledTask) {}
}
