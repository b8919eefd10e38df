//! Process-wide default facade bound to the compile-time selected host.
//!
//! The free functions below share one [`NotificationFacade`] per thread, so the permission slot
//! is shared by every caller that does not construct its own facade.

use notification_host::{
    NotificationError, NotificationFacade, NotificationFuture, NotificationHandle,
    NotificationRequest, PermissionResult, SendResult,
};

use crate::{notification_host_adapter, AdapterNotification, NotificationHostAdapter};

thread_local! {
    static DEFAULT_FACADE: NotificationFacade<NotificationHostAdapter> =
        NotificationFacade::new(notification_host_adapter());
}

/// Returns the process-local default facade.
pub fn default_facade() -> NotificationFacade<NotificationHostAdapter> {
    DEFAULT_FACADE.with(|facade| facade.clone())
}

/// See [`NotificationFacade::is_supported`].
pub fn is_supported() -> bool {
    default_facade().is_supported()
}

/// See [`NotificationFacade::is_permitted`].
pub fn is_permitted() -> NotificationFuture<'static, PermissionResult> {
    default_facade().is_permitted()
}

/// See [`NotificationFacade::request_permissions`].
pub fn request_permissions() -> NotificationFuture<'static, PermissionResult> {
    default_facade().request_permissions()
}

/// See [`NotificationFacade::create`].
///
/// # Errors
///
/// Returns the host binding's error when the notification cannot be constructed.
pub fn create(
    request: NotificationRequest,
) -> Result<NotificationHandle<AdapterNotification>, NotificationError> {
    default_facade().create(request)
}

/// See [`NotificationFacade::send`].
pub fn send(request: NotificationRequest) -> NotificationFuture<'static, SendResult> {
    default_facade().send(request)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn default_facade_uses_default_config() {
        assert_eq!(default_facade().config().default_timeout_ms, 4000);
        assert!(!is_supported());
    }

    #[test]
    fn native_default_operations_report_missing_capability() {
        assert!(matches!(
            block_on(is_permitted()),
            Err(NotificationError::MissingCapability(_))
        ));
        assert!(matches!(
            create(NotificationRequest::new("t")),
            Err(NotificationError::MissingCapability(_))
        ));
        assert!(matches!(
            block_on(send(NotificationRequest::new("t"))),
            Err(NotificationError::MissingCapability(_))
        ));
        assert!(!default_facade().has_permission_slot());
    }
}
