//! Messages the engine hands to the transport.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::identity::Destination;

/// Text and/or an image reference, optionally routed somewhere specific.
///
/// A message without a destination goes to the game's channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichMessage {
    pub destination: Option<Destination>,
    pub text: Option<String>,
    pub image: Option<PathBuf>,
    /// Send the text even when the image is sent.
    pub send_both: bool,
}

/// What the transport should actually send for a [`RichMessage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageParts<'a> {
    pub text: Option<&'a str>,
    pub image: Option<&'a Path>,
}

impl RichMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn image(image: impl Into<PathBuf>) -> Self {
        Self {
            image: Some(image.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn send_both(mut self, send_both: bool) -> Self {
        self.send_both = send_both;
        self
    }

    #[must_use]
    pub fn to(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Route to `destination` unless already routed.
    #[must_use]
    pub fn or_to(mut self, destination: &Destination) -> Self {
        if self.destination.is_none() {
            self.destination = Some(destination.clone());
        }
        self
    }

    /// Resolve what to send.
    ///
    /// The image goes out when images are enabled and one is attached. The
    /// text goes out when there is no image to send or `send_both` is set.
    #[must_use]
    pub fn parts(&self, use_images: bool) -> MessageParts<'_> {
        let image = self.image.as_deref().filter(|_| use_images);
        let text = self
            .text
            .as_deref()
            .filter(|_| image.is_none() || self.send_both);
        MessageParts { text, image }
    }
}

/// Plain output produced by a command or continuation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    /// Text for whoever asked, or the game channel.
    Text(String),
    Message(RichMessage),
}

impl Output {
    /// Convert to a message, routing plain text to `reply_to`.
    #[must_use]
    pub fn into_message(self, reply_to: Option<&Destination>) -> RichMessage {
        match self {
            Self::Text(text) => {
                let msg = RichMessage::text(text);
                match reply_to {
                    Some(dest) => msg.to(dest.clone()),
                    None => msg,
                }
            }
            Self::Message(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::Identity;

    #[test]
    fn test_parts_image_only() {
        let msg = RichMessage::image("coup/duke.jpg").with_text("Duke");
        let parts = msg.parts(true);
        assert_eq!(parts.image, Some(Path::new("coup/duke.jpg")));
        assert_eq!(parts.text, None);
    }

    #[test]
    fn test_parts_send_both() {
        let msg = RichMessage::image("board.png").with_text("Board").send_both(true);
        let parts = msg.parts(true);
        assert!(parts.image.is_some());
        assert_eq!(parts.text, Some("Board"));
    }

    #[test]
    fn test_parts_without_images_falls_back_to_text() {
        let msg = RichMessage::image("board.png").with_text("Board");
        let parts = msg.parts(false);
        assert_eq!(parts.image, None);
        assert_eq!(parts.text, Some("Board"));
    }

    #[test]
    fn test_text_routing() {
        let dest = Destination::channel("lobby");
        let msg = Output::Text("hi".into()).into_message(Some(&dest));
        assert_eq!(msg.destination, Some(dest.clone()));

        let dm = Destination::Direct(Identity::new("a"));
        let routed = RichMessage::text("secret").to(dm.clone()).or_to(&dest);
        assert_eq!(routed.destination, Some(dm));
    }
}
