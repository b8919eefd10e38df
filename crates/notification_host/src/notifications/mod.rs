//! Notification facade, request models and dispatch outcome types.

mod facade;
mod request;

pub use facade::{
    NotificationFacade, NotificationFuture, PermissionResult, SendResult, SentNotification,
};
pub use request::{AutoClose, NotificationHandle, NotificationOutcome, NotificationRequest};
