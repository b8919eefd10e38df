//! Notification permission model and host value conversion.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Host permission value reported once the user allowed notifications.
pub const HOST_PERMISSION_GRANTED: &str = "granted";
/// Host permission value reported once the user refused notifications.
pub const HOST_PERMISSION_DENIED: &str = "denied";
/// Host permission value reported while the user has not decided yet.
pub const HOST_PERMISSION_DEFAULT: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Normalized notification permission.
///
/// At the API boundary the state maps onto `Option<bool>`: `Some(true)` for granted,
/// `Some(false)` for denied and `None` when the host still has to ask the user. Serde uses the
/// same `true`/`false`/`null` encoding.
pub enum PermissionState {
    /// Notifications may be displayed.
    Granted,
    /// The user refused notifications.
    Denied,
    /// Undecided; an interactive request is required.
    Unknown,
}

impl PermissionState {
    /// Converts a raw host permission value.
    ///
    /// Total over all inputs: anything other than `granted` or `denied` is [`Self::Unknown`].
    pub fn from_host_value(value: &str) -> Self {
        match value {
            HOST_PERMISSION_GRANTED => Self::Granted,
            HOST_PERMISSION_DENIED => Self::Denied,
            _ => Self::Unknown,
        }
    }

    /// Returns the host value this state is reported as.
    pub const fn host_value(self) -> &'static str {
        match self {
            Self::Granted => HOST_PERMISSION_GRANTED,
            Self::Denied => HOST_PERMISSION_DENIED,
            Self::Unknown => HOST_PERMISSION_DEFAULT,
        }
    }

    /// Returns the boolean-or-unknown form of this state.
    pub const fn as_option(self) -> Option<bool> {
        match self {
            Self::Granted => Some(true),
            Self::Denied => Some(false),
            Self::Unknown => None,
        }
    }

    /// Builds a state from its boolean-or-unknown form.
    pub const fn from_option(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Granted,
            Some(false) => Self::Denied,
            None => Self::Unknown,
        }
    }

    /// Returns `true` only for [`Self::Granted`].
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl From<PermissionState> for Option<bool> {
    fn from(state: PermissionState) -> Self {
        state.as_option()
    }
}

impl From<Option<bool>> for PermissionState {
    fn from(value: Option<bool>) -> Self {
        Self::from_option(value)
    }
}

impl Serialize for PermissionState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PermissionState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<bool>::deserialize(deserializer).map(Self::from_option)
    }
}
