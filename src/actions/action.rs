//! # Actions exchanged between the engine and its consumers.
//!
//! The [`ActionKind`] enum is the closed vocabulary, grouped in two families:
//! - **App actions**: lifecycle (`start`, `started`, `stop`), storage, connectivity,
//!   errors and UI relays (`set-location`, `show-menu`)
//! - **Auth actions**: relayed from the identity provider (`auth-changed`,
//!   `sign-in-done`, `sign-in-fail`)
//!
//! An [`Action`] is immutable once built. The payload shape is fixed per kind and is
//! only ever produced by the constructors below.
//!
//! ## Example
//! ```rust
//! use actionvisor::{Action, ActionKind};
//!
//! let a = Action::online(true);
//! assert_eq!(a.kind(), ActionKind::Online);
//! assert_eq!(a.online_value(), Some(true));
//! assert_eq!(a.kind().as_str(), "online");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::SourceError;

/// Classification of actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    // === App actions ===
    /// Serious fault to be reported by the consumer.
    ///
    /// Payload: `{ "error": { "kind": label, "message": text } }`
    Error,

    /// Connectivity changed.
    ///
    /// Payload: `{ "online": bool }`
    Online,

    /// Router relay.
    ///
    /// Payload: `{ "location": object }`
    SetLocation,

    /// UI relay.
    ///
    /// Payload: `{ "show": bool }`
    ShowMenu,

    /// Request to start the engine (client side only).
    Start,

    /// Load settled (successfully or not); runtime sources attach after this.
    Started,

    /// Request to stop the engine; cancels everything in flight.
    Stop,

    /// Persisted state was loaded.
    ///
    /// Payload: `{ "state": object }`
    StorageLoaded,

    // === Auth actions ===
    /// Identity provider reported a session change.
    ///
    /// Payload: `{ "user": snapshot | null }`
    AuthChanged,

    /// Sign-in completed after redirect.
    ///
    /// Payload: `{ "user": snapshot }`
    SignInDone,

    /// Sign-in after redirect failed.
    ///
    /// Payload: `{ "error": { "kind": label, "message": text } }`
    SignInFail,
}

impl ActionKind {
    /// Stable wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Error => "error",
            ActionKind::Online => "online",
            ActionKind::SetLocation => "set-location",
            ActionKind::ShowMenu => "show-menu",
            ActionKind::Start => "start",
            ActionKind::Started => "started",
            ActionKind::Stop => "stop",
            ActionKind::StorageLoaded => "storage-loaded",
            ActionKind::AuthChanged => "auth-changed",
            ActionKind::SignInDone => "sign-in-done",
            ActionKind::SignInFail => "sign-in-fail",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable `{ kind, payload }` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl Action {
    #[inline]
    fn bare(kind: ActionKind) -> Self {
        Self {
            kind,
            payload: None,
        }
    }

    #[inline]
    fn with_payload(kind: ActionKind, payload: Value) -> Self {
        Self {
            kind,
            payload: Some(payload),
        }
    }

    /// Returns the action kind.
    #[inline]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Returns the payload, if the kind carries one.
    #[inline]
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Shorthand for `self.kind() == kind`.
    #[inline]
    pub fn is(&self, kind: ActionKind) -> bool {
        self.kind == kind
    }

    /// `error` action describing a source fault.
    pub fn app_error(err: &SourceError) -> Self {
        Self::with_payload(ActionKind::Error, json!({ "error": error_body(err) }))
    }

    /// `online` action.
    pub fn online(online: bool) -> Self {
        Self::with_payload(ActionKind::Online, json!({ "online": online }))
    }

    /// `set-location` action.
    pub fn set_location(location: Value) -> Self {
        Self::with_payload(ActionKind::SetLocation, json!({ "location": location }))
    }

    /// `show-menu` action.
    pub fn show_menu(show: bool) -> Self {
        Self::with_payload(ActionKind::ShowMenu, json!({ "show": show }))
    }

    /// `start` action.
    pub fn start() -> Self {
        Self::bare(ActionKind::Start)
    }

    /// `started` action.
    pub fn started() -> Self {
        Self::bare(ActionKind::Started)
    }

    /// `stop` action.
    pub fn stop() -> Self {
        Self::bare(ActionKind::Stop)
    }

    /// `storage-loaded` action carrying the loaded state.
    pub fn storage_loaded(state: Value) -> Self {
        Self::with_payload(ActionKind::StorageLoaded, json!({ "state": state }))
    }

    /// `auth-changed` action; `None` means signed out.
    pub fn auth_changed(user: Option<Value>) -> Self {
        Self::with_payload(
            ActionKind::AuthChanged,
            json!({ "user": user.unwrap_or(Value::Null) }),
        )
    }

    /// `sign-in-done` action.
    pub fn sign_in_done(user: Value) -> Self {
        Self::with_payload(ActionKind::SignInDone, json!({ "user": user }))
    }

    /// `sign-in-fail` action.
    pub fn sign_in_fail(err: &SourceError) -> Self {
        Self::with_payload(ActionKind::SignInFail, json!({ "error": error_body(err) }))
    }

    /// Reads `payload.online` of an `online` action.
    pub fn online_value(&self) -> Option<bool> {
        if self.kind != ActionKind::Online {
            return None;
        }
        self.payload.as_ref()?.get("online")?.as_bool()
    }

    /// Reads `payload.state` of a `storage-loaded` action.
    pub fn loaded_state(&self) -> Option<&Value> {
        if self.kind != ActionKind::StorageLoaded {
            return None;
        }
        self.payload.as_ref()?.get("state")
    }

    /// Reads `payload.user` of `auth-changed` / `sign-in-done` (null maps to `None`).
    pub fn user(&self) -> Option<&Value> {
        if !matches!(self.kind, ActionKind::AuthChanged | ActionKind::SignInDone) {
            return None;
        }
        self.payload
            .as_ref()?
            .get("user")
            .filter(|user| !user.is_null())
    }

    /// Reads `payload.error.kind` of `error` / `sign-in-fail`.
    pub fn error_label(&self) -> Option<&str> {
        if !matches!(self.kind, ActionKind::Error | ActionKind::SignInFail) {
            return None;
        }
        self.payload.as_ref()?.get("error")?.get("kind")?.as_str()
    }
}

fn error_body(err: &SourceError) -> Value {
    json!({ "kind": err.as_label(), "message": err.as_message() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_as_kebab_case() {
        let wire = serde_json::to_value(ActionKind::StorageLoaded).unwrap();
        assert_eq!(wire, json!("storage-loaded"));
        assert_eq!(ActionKind::SignInFail.as_str(), "sign-in-fail");
        assert_eq!(ActionKind::SetLocation.to_string(), "set-location");
    }

    #[test]
    fn bare_actions_omit_payload() {
        let wire = serde_json::to_value(Action::started()).unwrap();
        assert_eq!(wire, json!({ "kind": "started" }));
    }

    #[test]
    fn storage_loaded_payload_shape() {
        let a = Action::storage_loaded(json!({ "theme": "dark" }));
        assert_eq!(a.payload(), Some(&json!({ "state": { "theme": "dark" } })));
        assert_eq!(a.loaded_state(), Some(&json!({ "theme": "dark" })));
    }

    #[test]
    fn auth_changed_signed_out_is_null_user() {
        let a = Action::auth_changed(None);
        assert_eq!(a.payload(), Some(&json!({ "user": null })));
        assert_eq!(a.user(), None);
    }

    #[test]
    fn error_payload_carries_label_and_message() {
        let a = Action::app_error(&SourceError::storage("corrupt"));
        assert_eq!(a.kind(), ActionKind::Error);
        assert_eq!(a.error_label(), Some("source_storage"));
        assert_eq!(
            a.payload().and_then(|p| p["error"]["message"].as_str()),
            Some("storage: corrupt")
        );
    }

    #[test]
    fn deserializes_dispatched_action() {
        let a: Action = serde_json::from_value(json!({
            "kind": "show-menu",
            "payload": { "show": true }
        }))
        .unwrap();
        assert_eq!(a, Action::show_menu(true));
        assert_eq!(a.online_value(), None);
    }
}
