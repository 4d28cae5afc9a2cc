use rand::seq::SliceRandom;
use serde::Serialize;

/// A line from a manga, sent in the welcome email and returned to the page
/// after a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub text: &'static str,
    pub character: &'static str,
    pub source: &'static str,
}

pub const QUOTES: &[Quote] = &[
    Quote {
        text: "Hard work is worthless for those that don't believe in themselves.",
        character: "Naruto Uzumaki",
        source: "Naruto",
    },
    Quote {
        text: "A lesson without pain is meaningless. For you cannot gain something without sacrificing something else in return.",
        character: "Edward Elric",
        source: "Fullmetal Alchemist",
    },
    Quote {
        text: "It's not the face that makes someone a monster, it's the choices they make with their lives.",
        character: "Naruto Uzumaki",
        source: "Naruto",
    },
    Quote {
        text: "If you don't take risks, you can't create a future!",
        character: "Monkey D. Luffy",
        source: "One Piece",
    },
    Quote {
        text: "The world is not beautiful, and that, in a way, lends it a sort of beauty.",
        character: "Kino",
        source: "Kino's Journey",
    },
    Quote {
        text: "Knowing you're different is only the beginning. If you accept these differences you'll be able to get past them and grow even closer.",
        character: "Miss Kobayashi",
        source: "Miss Kobayashi's Dragon Maid",
    },
    Quote {
        text: "Even if I'm not remembered as a hero, I'll keep moving forward until I've destroyed the things I set out to destroy.",
        character: "Eren Yeager",
        source: "Attack on Titan",
    },
    Quote {
        text: "The world isn't perfect. But it's there for us, doing the best it can. That's what makes it so damn beautiful.",
        character: "Roy Mustang",
        source: "Fullmetal Alchemist",
    },
];

pub fn random_quote() -> Quote {
    // `QUOTES` is a non-empty constant
    *QUOTES
        .choose(&mut rand::thread_rng())
        .unwrap_or(&QUOTES[0])
}

/// Manga titles ordered by how many quotes they contribute (most first).
/// Ties keep catalogue order.
pub fn top_sources(n: usize) -> Vec<&'static str> {
    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    for quote in QUOTES {
        match counts.iter_mut().find(|(source, _)| *source == quote.source) {
            Some((_, count)) => *count += 1,
            None => counts.push((quote.source, 1)),
        }
    }
    // stable sort, so equal counts stay in order of first appearance
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(n)
        .map(|(source, _)| source)
        .collect()
}
