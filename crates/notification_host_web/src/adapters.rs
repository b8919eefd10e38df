use notification_host::{
    EventListener, HostNotification, HostNotificationOptions, HostStrategy, NoopNotification,
    NoopNotificationHost, NotificationError, NotificationEventKind, NotificationHost,
    PermissionCallback, ScheduledTask, SubscriptionId,
};

use crate::{WebNotification, WebNotificationHost};

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "desktop-host-stub")]
    {
        HostStrategy::DesktopStub
    }

    #[cfg(not(feature = "desktop-host-stub"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    selected_host_strategy().as_str()
}

/// Adapter enum that erases the concrete notification binding behind [`NotificationHost`].
#[derive(Debug, Clone, Copy)]
pub enum NotificationHostAdapter {
    /// Browser Notification API-backed delivery.
    Browser(WebNotificationHost),
    /// No-op fallback used when desktop transport is intentionally stubbed.
    DesktopStub(NoopNotificationHost),
}

/// Live notification produced by [`NotificationHostAdapter`].
#[derive(Debug)]
pub enum AdapterNotification {
    /// Browser notification.
    Browser(WebNotification),
    /// Placeholder; the stub binding never constructs one.
    DesktopStub(NoopNotification),
}

impl HostNotification for AdapterNotification {
    fn close(&self) {
        match self {
            Self::Browser(notification) => notification.close(),
            Self::DesktopStub(notification) => notification.close(),
        }
    }

    fn subscribe(&self, kind: NotificationEventKind, listener: EventListener) -> SubscriptionId {
        match self {
            Self::Browser(notification) => notification.subscribe(kind, listener),
            Self::DesktopStub(notification) => notification.subscribe(kind, listener),
        }
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        match self {
            Self::Browser(notification) => notification.unsubscribe(id),
            Self::DesktopStub(notification) => notification.unsubscribe(id),
        }
    }
}

impl NotificationHost for NotificationHostAdapter {
    type Notification = AdapterNotification;

    fn is_supported(&self) -> bool {
        match self {
            Self::Browser(host) => host.is_supported(),
            Self::DesktopStub(host) => host.is_supported(),
        }
    }

    fn supports_close_event(&self) -> bool {
        match self {
            Self::Browser(host) => host.supports_close_event(),
            Self::DesktopStub(host) => host.supports_close_event(),
        }
    }

    fn permission(&self) -> Result<String, NotificationError> {
        match self {
            Self::Browser(host) => host.permission(),
            Self::DesktopStub(host) => host.permission(),
        }
    }

    fn request_permission(&self, on_result: PermissionCallback) -> Result<(), NotificationError> {
        match self {
            Self::Browser(host) => host.request_permission(on_result),
            Self::DesktopStub(host) => host.request_permission(on_result),
        }
    }

    fn create_notification(
        &self,
        title: &str,
        options: &HostNotificationOptions,
    ) -> Result<Self::Notification, NotificationError> {
        match self {
            Self::Browser(host) => host
                .create_notification(title, options)
                .map(AdapterNotification::Browser),
            Self::DesktopStub(host) => host
                .create_notification(title, options)
                .map(AdapterNotification::DesktopStub),
        }
    }

    fn schedule(&self, delay_ms: u32, task: ScheduledTask) {
        match self {
            Self::Browser(host) => host.schedule(delay_ms, task),
            Self::DesktopStub(host) => host.schedule(delay_ms, task),
        }
    }
}

/// Builds the notification binding for the compile-time selected host strategy.
pub fn notification_host_adapter() -> NotificationHostAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => NotificationHostAdapter::Browser(WebNotificationHost),
        HostStrategy::DesktopStub => NotificationHostAdapter::DesktopStub(NoopNotificationHost),
    }
}
