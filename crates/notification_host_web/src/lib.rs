//! Browser (`wasm32`) implementation of the [`notification_host`] binding contracts.
//!
//! This crate wires `window.Notification` into [`notification_host::NotificationHost`], selects
//! the binding at compile time (`desktop-host-stub` swaps in the no-op binding) and exposes a
//! thread-local default [`notification_host::NotificationFacade`] with free-function shortcuts.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and the binding adapter used for runtime wiring.
pub mod adapters;
pub mod defaults;
pub mod notifications;

pub use adapters::{
    host_strategy_name, notification_host_adapter, selected_host_strategy, AdapterNotification,
    NotificationHostAdapter,
};
pub use defaults::{create, default_facade, is_permitted, is_supported, request_permissions, send};
pub use notifications::{WebNotification, WebNotificationHost};
