//! Notification host binding backed by the Web Notifications API.

#[cfg(target_arch = "wasm32")]
use std::collections::HashMap;
use std::cell::{Cell, RefCell};

use leptos::logging;
use notification_host::{
    EventListener, HostNotification, HostNotificationOptions, NotificationError,
    NotificationEventKind, NotificationHost, PermissionCallback, ScheduledTask, SubscriptionId,
};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

#[cfg(target_arch = "wasm32")]
type DomListener = Closure<dyn FnMut(web_sys::Event)>;

#[derive(Debug, Clone, Copy, Default)]
/// Browser notification binding backed by `window.Notification`.
///
/// Outside `wasm32` the binding reports the capability as missing.
pub struct WebNotificationHost;

/// Live browser notification created by [`WebNotificationHost`].
pub struct WebNotification {
    #[cfg(target_arch = "wasm32")]
    inner: web_sys::Notification,
    #[cfg(target_arch = "wasm32")]
    listeners: RefCell<HashMap<u64, (NotificationEventKind, DomListener)>>,
    #[cfg(not(target_arch = "wasm32"))]
    listeners: RefCell<Vec<u64>>,
    next_id: Cell<u64>,
}

impl std::fmt::Debug for WebNotification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebNotification")
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl WebNotification {
    fn next_subscription_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

#[cfg(target_arch = "wasm32")]
impl HostNotification for WebNotification {
    fn close(&self) {
        self.inner.close();
    }

    fn subscribe(&self, kind: NotificationEventKind, listener: EventListener) -> SubscriptionId {
        let id = self.next_subscription_id();
        let closure = DomListener::wrap(Box::new(move |event: web_sys::Event| {
            listener(&event_from_dom(kind, &event));
        }));
        if let Err(err) = self
            .inner
            .add_event_listener_with_callback(kind.event_name(), closure.as_ref().unchecked_ref())
        {
            logging::warn!(
                "notification `{}` listener registration failed: {}",
                kind.event_name(),
                js_error_to_string(err)
            );
        }
        self.listeners.borrow_mut().insert(id, (kind, closure));
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let Some((kind, closure)) = self.listeners.borrow_mut().remove(&id.0) else {
            return;
        };
        let _ = self.inner.remove_event_listener_with_callback(
            kind.event_name(),
            closure.as_ref().unchecked_ref(),
        );
        // Unsubscribing usually happens from inside this listener's own invocation.
        closure.forget();
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HostNotification for WebNotification {
    fn close(&self) {}

    fn subscribe(&self, _kind: NotificationEventKind, _listener: EventListener) -> SubscriptionId {
        let id = self.next_subscription_id();
        self.listeners.borrow_mut().push(id);
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|existing| *existing != id.0);
    }
}

#[cfg(target_arch = "wasm32")]
impl NotificationHost for WebNotificationHost {
    type Notification = WebNotification;

    fn is_supported(&self) -> bool {
        web_sys::window()
            .map(|window| {
                js_sys::Reflect::has(&window, &JsValue::from_str("Notification")).unwrap_or(false)
            })
            .unwrap_or(false)
    }

    fn supports_close_event(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        let Ok(constructor) = js_sys::Reflect::get(&window, &JsValue::from_str("Notification"))
        else {
            return false;
        };
        if constructor.is_undefined() {
            return false;
        }
        js_sys::Reflect::get(&constructor, &JsValue::from_str("prototype"))
            .and_then(|prototype| js_sys::Reflect::has(&prototype, &JsValue::from_str("onclose")))
            .unwrap_or(false)
    }

    fn permission(&self) -> Result<String, NotificationError> {
        if !self.is_supported() {
            return Err(unsupported());
        }
        Ok(permission_host_value(web_sys::Notification::permission()).to_string())
    }

    fn request_permission(&self, on_result: PermissionCallback) -> Result<(), NotificationError> {
        if !self.is_supported() {
            return Err(unsupported());
        }
        let promise = web_sys::Notification::request_permission().map_err(|err| {
            let message = js_error_to_string(err);
            logging::warn!("notification permission prompt failed: {message}");
            NotificationError::PermissionRequest(message)
        })?;
        wasm_bindgen_futures::spawn_local(async move {
            match wasm_bindgen_futures::JsFuture::from(promise).await {
                Ok(value) => on_result(value.as_string().unwrap_or_default()),
                // Dropping the callback rejects the pending request.
                Err(err) => logging::warn!(
                    "notification permission prompt rejected: {}",
                    js_error_to_string(err)
                ),
            }
        });
        Ok(())
    }

    fn create_notification(
        &self,
        title: &str,
        options: &HostNotificationOptions,
    ) -> Result<Self::Notification, NotificationError> {
        if !self.is_supported() {
            return Err(unsupported());
        }
        let dom_options = web_sys::NotificationOptions::new();
        if let Some(body) = &options.body {
            dom_options.set_body(body);
        }
        if let Some(icon) = &options.icon {
            dom_options.set_icon(icon);
        }
        let inner = web_sys::Notification::new_with_options(title, &dom_options).map_err(|err| {
            let message = js_error_to_string(err);
            logging::warn!("notification dispatch failed: {message}");
            NotificationError::MissingCapability(message)
        })?;
        Ok(WebNotification {
            inner,
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        })
    }

    fn schedule(&self, delay_ms: u32, task: ScheduledTask) {
        let Some(window) = web_sys::window() else {
            logging::warn!("notification timer dropped: window unavailable");
            return;
        };
        let callback = Closure::once_into_js(move || task());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        if let Err(err) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            logging::warn!(
                "notification timer registration failed: {}",
                js_error_to_string(err)
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl NotificationHost for WebNotificationHost {
    type Notification = WebNotification;

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

    fn schedule(&self, delay_ms: u32, _task: ScheduledTask) {
        logging::warn!("notification timer ({delay_ms} ms) dropped: no browser scheduler");
    }
}

fn unsupported() -> NotificationError {
    #[cfg(target_arch = "wasm32")]
    let message = "window.Notification is not available";
    #[cfg(not(target_arch = "wasm32"))]
    let message = "Browser notifications are only available when compiled for wasm32";
    NotificationError::MissingCapability(message.to_string())
}

#[cfg(target_arch = "wasm32")]
fn permission_host_value(permission: web_sys::NotificationPermission) -> &'static str {
    match permission {
        web_sys::NotificationPermission::Granted => notification_host::HOST_PERMISSION_GRANTED,
        web_sys::NotificationPermission::Denied => notification_host::HOST_PERMISSION_DENIED,
        _ => notification_host::HOST_PERMISSION_DEFAULT,
    }
}

#[cfg(target_arch = "wasm32")]
fn event_from_dom(
    kind: NotificationEventKind,
    event: &web_sys::Event,
) -> notification_host::NotificationEvent {
    let mut converted =
        notification_host::NotificationEvent::new(kind).with_timestamp_ms(event.time_stamp());
    if let Some(message) = js_sys::Reflect::get(event, &JsValue::from_str("message"))
        .ok()
        .and_then(|value| value.as_string())
    {
        converted = converted.with_message(message);
    }
    converted
}

#[cfg(target_arch = "wasm32")]
fn js_error_to_string(err: JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{err:?}")
}
