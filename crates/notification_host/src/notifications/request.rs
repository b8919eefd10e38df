//! Notification request, handle and outcome models.

use std::rc::Rc;

use crate::HostNotification;

/// Auto-close policy for a created notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoClose {
    /// Close after the facade's configured default delay.
    #[default]
    Default,
    /// Never close automatically.
    Disabled,
    /// Close after the given number of milliseconds.
    After(u32),
}

impl AutoClose {
    /// Returns the effective delay, or `None` when auto-close is disabled.
    pub const fn delay_ms(self, default_ms: u32) -> Option<u32> {
        match self {
            Self::Default => Some(default_ms),
            Self::Disabled => None,
            Self::After(ms) => Some(ms),
        }
    }

    /// Returns the delay when one was given explicitly and is non-zero.
    pub const fn explicit_ms(self) -> Option<u32> {
        match self {
            Self::After(ms) if ms > 0 => Some(ms),
            _ => None,
        }
    }
}

/// Title, optional body/icon and auto-close policy of a notification to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Notification title.
    pub title: String,
    /// Optional body text. Empty strings are treated as absent.
    pub body: Option<String>,
    /// Optional icon URL. Empty strings are treated as absent.
    pub icon_url: Option<String>,
    /// Auto-close policy.
    pub auto_close: AutoClose,
}

impl NotificationRequest {
    /// Creates a request with only a title and the default auto-close policy.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: None,
            icon_url: None,
            auto_close: AutoClose::Default,
        }
    }

    /// Sets the body text.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the icon URL.
    pub fn icon_url(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }

    /// Sets the auto-close policy.
    pub fn auto_close(mut self, auto_close: AutoClose) -> Self {
        self.auto_close = auto_close;
        self
    }
}

/// Caller-owned handle to a displayed notification.
pub struct NotificationHandle<N> {
    pub(crate) notification: Rc<N>,
    pub(crate) title: String,
    pub(crate) body: Option<String>,
    pub(crate) icon_url: Option<String>,
    pub(crate) auto_close_ms: Option<u32>,
}

impl<N: HostNotification> NotificationHandle<N> {
    /// Closes the notification early.
    pub fn close(&self) {
        self.notification.close();
    }

    /// Notification title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body text passed to the host, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Icon URL passed to the host, if any.
    pub fn icon_url(&self) -> Option<&str> {
        self.icon_url.as_deref()
    }

    /// Scheduled auto-close delay, or `None` when auto-close is disabled.
    pub fn auto_close_ms(&self) -> Option<u32> {
        self.auto_close_ms
    }

    /// Underlying host notification.
    pub fn host_notification(&self) -> &N {
        &self.notification
    }
}

impl<N> std::fmt::Debug for NotificationHandle<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationHandle")
            .field("title", &self.title)
            .field("body", &self.body)
            .field("icon_url", &self.icon_url)
            .field("auto_close_ms", &self.auto_close_ms)
            .finish_non_exhaustive()
    }
}

/// Settled outcome of a sent notification. Host failures are reported as errors instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationOutcome {
    /// The user clicked the notification.
    Clicked,
    /// The notification closed, or the forced dismissal timer elapsed, without a click.
    Dismissed,
}

impl NotificationOutcome {
    /// Returns `true` for [`Self::Clicked`].
    pub const fn is_clicked(self) -> bool {
        matches!(self, Self::Clicked)
    }
}

impl From<NotificationOutcome> for bool {
    fn from(outcome: NotificationOutcome) -> Self {
        outcome.is_clicked()
    }
}
