use std::fmt;

use log::warn;
use machine_learning::Label;

/// Where the frame of an adversarial round came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Synthetic,
    Source,
}

impl Origin {
    /// The label the discriminator should learn for this origin.
    pub fn label(self) -> Label {
        match self {
            Origin::Synthetic => Label::Negative,
            Origin::Source => Label::Positive,
        }
    }
}

impl From<bool> for Origin {
    fn from(real: bool) -> Self {
        if real { Origin::Source } else { Origin::Synthetic }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Synthetic => write!(f, "synthetic"),
            Origin::Source => write!(f, "source"),
        }
    }
}

/// The leading byte of a tagged frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub label: Label,
    /// Whether the raw byte was invalid and replaced by `Label::Negative`.
    pub coerced: bool,
}

impl Tag {
    /// Reads a tag byte, anything other than 0 or 1 becomes 0.
    pub fn coerce(byte: u8) -> Self {
        match Label::from_byte(byte) {
            Some(label) => Self {
                label,
                coerced: false,
            },
            None => Self {
                label: Label::Negative,
                coerced: true,
            },
        }
    }
}

/// Prepends `label` to `body`.
pub fn tag(label: Label, body: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(body.len() + 1);
    frame.push(label.as_byte());
    frame.extend_from_slice(body);
    frame
}

/// Splits a tagged frame into its tag and body.
///
/// An empty frame has no tag to read, it is treated as an invalid one.
pub fn strip(frame: &[u8]) -> (Tag, &[u8]) {
    let Some((&byte, body)) = frame.split_first() else {
        warn!("received an empty tagged frame, using label 0");
        let tag = Tag {
            label: Label::Negative,
            coerced: true,
        };
        return (tag, frame);
    };

    let tag = Tag::coerce(byte);
    if tag.coerced {
        warn!(tag = byte; "invalid label, using 0");
    }

    (tag, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_tags_are_kept() {
        assert_eq!(Tag::coerce(0).label, Label::Negative);
        assert_eq!(Tag::coerce(1).label, Label::Positive);
        assert!(!Tag::coerce(1).coerced);
    }

    #[test]
    fn invalid_tags_become_zero() {
        for byte in [2, 5, 128, 255] {
            let tag = Tag::coerce(byte);
            assert_eq!(tag.label, Label::Negative);
            assert!(tag.coerced);
        }
    }

    #[test]
    fn strip_splits_the_first_byte() {
        let frame = tag(Label::Positive, b"abc");
        let (tag, body) = strip(&frame);

        assert_eq!(tag.label, Label::Positive);
        assert_eq!(body, b"abc");
    }

    #[test]
    fn empty_frame_is_an_invalid_tag() {
        let (tag, body) = strip(&[]);

        assert!(tag.coerced);
        assert_eq!(tag.label, Label::Negative);
        assert!(body.is_empty());
    }

    #[test]
    fn origin_maps_to_label() {
        assert_eq!(Origin::Synthetic.label().as_byte(), 0);
        assert_eq!(Origin::Source.label().as_byte(), 1);
    }
}
