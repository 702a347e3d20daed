//! Push notification payloads.
//!
//! Two payload variants exist, selected by event type:
//!
//! - **Group alert**: fixed copy announcing new group activity, delivered
//!   on a dedicated, pre-provisioned device channel with its own sound.
//! - **Chat message**: fixed title with the (truncated) message text as
//!   body, deliberately carrying **no** channel override so devices play
//!   their default sound instead of the alert channel's forced one.

use serde::Serialize;

/// Maximum chat body length before truncation, in characters.
pub const CHAT_BODY_MAX_CHARS: usize = 80;

/// Channel id for group-activity alerts, pre-provisioned on devices.
pub const ALERT_CHANNEL_ID: &str = "muster_alerts_v1";

/// Notification sound for the alert channel.
pub const ALERT_SOUND: &str = "chime";

const ELLIPSIS: char = '\u{2026}';

/// Client-routable message tag, carried in the payload's data section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// New group activity alert.
    Alert,
    /// New chat message.
    Chat,
}

/// A device notification channel override with its sound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    /// Channel identifier, matching a channel provisioned on the device.
    pub channel_id: String,
    /// Sound played for notifications on this channel.
    pub sound: String,
}

/// A channel-specific push payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Client-routable message tag.
    pub kind: MessageKind,
    /// Channel override; `None` means the device default channel/sound.
    pub channel: Option<Channel>,
}

impl PushMessage {
    /// Builds the group-activity alert payload.
    #[must_use]
    pub fn group_alert() -> Self {
        Self {
            title: "New group activity".to_string(),
            body: "Your group has a new activity waiting. Take a look!".to_string(),
            kind: MessageKind::Alert,
            channel: Some(Channel {
                channel_id: ALERT_CHANNEL_ID.to_string(),
                sound: ALERT_SOUND.to_string(),
            }),
        }
    }

    /// Builds the chat-message payload.
    ///
    /// The body is the message text truncated to
    /// [`CHAT_BODY_MAX_CHARS`] characters with an ellipsis when longer.
    /// No channel override: chat must not ring the alert channel's sound.
    #[must_use]
    pub fn chat_message(text: &str) -> Self {
        Self {
            title: "New chat message".to_string(),
            body: truncated_body(text),
            kind: MessageKind::Chat,
            channel: None,
        }
    }
}

fn truncated_body(text: &str) -> String {
    if text.chars().count() > CHAT_BODY_MAX_CHARS {
        let mut body: String = text.chars().take(CHAT_BODY_MAX_CHARS).collect();
        body.push(ELLIPSIS);
        body
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_alert_uses_the_dedicated_channel() {
        let msg = PushMessage::group_alert();
        assert_eq!(msg.kind, MessageKind::Alert);
        let channel = msg.channel.expect("alert must override the channel");
        assert_eq!(channel.channel_id, ALERT_CHANNEL_ID);
        assert_eq!(channel.sound, ALERT_SOUND);
    }

    #[test]
    fn chat_message_has_no_channel_override() {
        let msg = PushMessage::chat_message("hi");
        assert_eq!(msg.kind, MessageKind::Chat);
        assert!(msg.channel.is_none());
        assert_eq!(msg.body, "hi");
    }

    #[test]
    fn chat_body_is_truncated_at_eighty_characters() {
        let exact: String = "a".repeat(CHAT_BODY_MAX_CHARS);
        assert_eq!(PushMessage::chat_message(&exact).body, exact);

        let long: String = "a".repeat(CHAT_BODY_MAX_CHARS + 1);
        let body = PushMessage::chat_message(&long).body;
        assert_eq!(body.chars().count(), CHAT_BODY_MAX_CHARS + 1);
        assert!(body.ends_with('\u{2026}'));
    }

    #[test]
    fn truncation_never_splits_a_character() {
        let long: String = "ü".repeat(CHAT_BODY_MAX_CHARS + 5);
        let body = PushMessage::chat_message(&long).body;
        assert_eq!(body.chars().count(), CHAT_BODY_MAX_CHARS + 1);
        assert!(body.starts_with('ü'));
    }
}
