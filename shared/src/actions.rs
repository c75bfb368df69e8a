//! Catalog of things a participant can say or do from the toolbar.

use crate::player::Gesture;

/// A named group of canned chat phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatCategory {
    pub name: &'static str,
    pub phrases: &'static [&'static str],
}

pub static CHAT_CATEGORIES: [ChatCategory; 5] = [
    ChatCategory {
        name: "Greetings",
        phrases: &["Hi!", "Hello", "Hey!", "Goodbye", "See you"],
    },
    ChatCategory {
        name: "Mood",
        phrases: &[
            "How are you doing?",
            "Great!",
            "Good",
            "Terrible",
            "Big mood",
            "That's a mood",
            "Oh no",
            "Happy to hear that",
        ],
    },
    ChatCategory {
        name: "Animals",
        phrases: &[
            "What are your favorite animals?",
            "Koalas, of course!",
            "Cats",
            "Dogs",
            "Ponies",
            "Turtles",
            "Frogs",
            "Fish",
            "Bottlebrush Yowies",
            "Birds",
            "Birds are not real!!",
            "Mowgli",
        ],
    },
    ChatCategory {
        name: "Emojis",
        phrases: &["😊", "😢", "✨", "🐨", "👌", "🤠"],
    },
    ChatCategory {
        name: "Interact",
        phrases: &[
            "Let's dance!",
            "Nice moves!",
            "Keep it up!",
            "#dab",
            "I'm sleepy...",
            "'Sko Dawgs!!",
        ],
    },
];

/// Toolbar name of the gesture category.
pub const GESTURE_CATEGORY: &str = "Dance";

pub fn chat_category(name: &str) -> Option<&'static ChatCategory> {
    CHAT_CATEGORIES.iter().find(|c| c.name == name)
}

pub fn is_catalog_phrase(message: &str) -> bool {
    CHAT_CATEGORIES
        .iter()
        .any(|c| c.phrases.iter().any(|p| *p == message))
}

pub fn gesture_labels() -> impl Iterator<Item = &'static str> {
    Gesture::SELECTABLE.into_iter().map(Gesture::label)
}
