//! Degraded-mode replies for when no provider can answer.

use std::sync::OnceLock;

use regex::Regex;

use crate::result::{ChatReply, FailureClass};

const FALLBACK_MESSAGE: &str = "I can't reach my language service right now, so I can't hold a full conversation at the moment.\n\n\
I can still create images for you. Ask for one directly, for example:\n\
- \"Draw a lighthouse at sunset\"\n\
- \"Generate an image of a red bicycle in the rain\"\n\
- \"Create a picture of a cozy cabin in the snow\"\n\n\
Please try again in a little while for everything else.";

const DIRECT_IMAGE_NOTE: &str = "My language service is unavailable right now, but here is the image you asked for:";

pub struct FallbackResponder;

impl FallbackResponder {
    pub fn message() -> &'static str {
        FALLBACK_MESSAGE
    }

    pub fn respond(failure: FailureClass) -> ChatReply {
        let error = match failure {
            FailureClass::NoProviders => "no providers configured",
            _ => "all providers failed",
        };
        ChatReply::failed(FALLBACK_MESSAGE.to_string(), failure, error)
    }

    /// Reply for a direct image request served without a model.
    pub fn direct_image(url: String, failure: FailureClass) -> ChatReply {
        let reply = format!("{}\n\n![image]({})", DIRECT_IMAGE_NOTE, url);
        let mut out = Self::respond(failure);
        out.reply = reply;
        out.with_image(url)
    }

    /// Extract the subject from messages like "draw a cat" or
    /// "generate an image of a red bicycle".
    pub fn direct_image_prompt(message: &str) -> Option<String> {
        let captures = direct_image_pattern().captures(message.trim())?;
        let prompt = captures.name("prompt")?.as_str().trim();
        if prompt.is_empty() {
            None
        } else {
            Some(prompt.to_string())
        }
    }
}

fn direct_image_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:please\s+)?(?:(?:generate|create|make|show)\s+(?:me\s+)?(?:an?\s+)?(?:image|picture|photo|illustration|drawing)\s+(?:of\s+)?|(?:draw|paint|sketch)\s+(?:me\s+)?)(?P<prompt>.+?)[\s.!?]*$",
        )
        .expect("direct image pattern is valid")
    })
}
