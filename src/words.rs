//! Curated word pool for drawing prompts.

use rand::seq::IndexedRandom;

/// The full candidate pool. Small enough to live in the binary, large
/// enough that three draws per turn never feel repetitive.
pub const WORDS: &[&str] = &[
    "cat",
    "dog",
    "house",
    "car",
    "tree",
    "sun",
    "moon",
    "star",
    "flower",
    "bird",
    "fish",
    "apple",
    "cake",
    "book",
    "chair",
    "table",
    "phone",
    "computer",
    "pizza",
    "guitar",
    "mountain",
    "ocean",
    "butterfly",
    "rainbow",
    "elephant",
    "giraffe",
    "penguin",
    "dinosaur",
    "rocket",
    "castle",
    "princess",
    "dragon",
    "wizard",
    "treasure",
    "island",
    "bridge",
    "bicycle",
    "airplane",
    "train",
    "boat",
    "umbrella",
    "glasses",
    "hat",
    "shoe",
    "watch",
    "camera",
    "headphones",
    "microphone",
    "television",
    "refrigerator",
    "sandwich",
];

/// Draw `n` distinct words uniformly at random without replacement.
/// Returns fewer than `n` only if the pool itself is smaller than `n`.
pub fn draw(n: usize) -> Vec<String> {
    WORDS
        .choose_multiple(&mut rand::rng(), n)
        .map(|w| w.to_string())
        .collect()
}
