//! Host notification contracts and a future-based facade over them.
//!
//! This crate is the API-first boundary for desktop notifications. [`NotificationHost`] describes
//! the platform capability (permission query and prompt, notification construction, lifecycle
//! events, delayed tasks) and [`NotificationFacade`] layers the caller-facing operations on top:
//! support check, memoized permission check, permission request, `create` and `send`. Concrete
//! browser bindings live in `notification_host_web`; [`MemoryNotificationHost`] is a scripted
//! in-memory binding for tests and headless callers.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod deferred;
pub mod error;
pub mod host;
pub mod memory;
pub mod notifications;
pub mod permission;

pub use config::{FacadeConfig, DEFAULT_TIMEOUT_MS};
pub use deferred::{Deferred, DeferredFuture, Resolver};
pub use error::{NotificationError, NotificationEvent, NotificationEventKind};
pub use host::{
    EventListener, HostNotification, HostNotificationOptions, HostStrategy, NoopNotification,
    NoopNotificationHost, NotificationHost, PermissionCallback, ScheduledTask, SubscriptionId,
};
pub use memory::{MemoryNotification, MemoryNotificationHost, PromptBehavior};
pub use notifications::{
    AutoClose, NotificationFacade, NotificationFuture, NotificationHandle, NotificationOutcome,
    NotificationRequest, PermissionResult, SendResult, SentNotification,
};
pub use permission::{
    PermissionState, HOST_PERMISSION_DEFAULT, HOST_PERMISSION_DENIED, HOST_PERMISSION_GRANTED,
};
