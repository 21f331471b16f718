//! Directives embedded in staff-composed replies.
//!
//! `[img:/uploads/abc.jpg]` sends an image, `[sticker:<packageId>:<stickerId>]`
//! sends a sticker. An image marker wins over a sticker marker, which wins
//! over plain text.

use crate::models::message::MessageBody;

const IMAGE_OPEN: &str = "[img:";
const STICKER_OPEN: &str = "[sticker:";

pub fn parse_reply(composed: &str) -> MessageBody {
    if let Some(path) = find_marker(composed, IMAGE_OPEN) {
        if !path.is_empty() {
            return MessageBody::Image {
                url: path.to_string(),
            };
        }
    }

    if let Some(inner) = find_marker(composed, STICKER_OPEN) {
        if let Some((package_id, sticker_id)) = inner.split_once(':') {
            let (package_id, sticker_id) = (package_id.trim(), sticker_id.trim());
            if is_numeric_id(package_id) && is_numeric_id(sticker_id) {
                return MessageBody::Sticker {
                    package_id: package_id.to_string(),
                    sticker_id: sticker_id.to_string(),
                };
            }
        }
    }

    MessageBody::Text {
        text: composed.trim().to_string(),
    }
}

pub fn image_marker(url: &str) -> String {
    format!("{}{}]", IMAGE_OPEN, url)
}

fn find_marker<'a>(composed: &'a str, open: &str) -> Option<&'a str> {
    let start = composed.find(open)? + open.len();
    let len = composed[start..].find(']')?;
    Some(composed[start..start + len].trim())
}

fn is_numeric_id(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit())
}
