//! Guess evaluation: exact matching, the permissive "close" heuristic,
//! and the time-based score curves.
//!
//! The close-match heuristic is intentionally generous. It exists to give
//! encouraging feedback, not to bound edit distance, so the four conditions
//! below are kept literal rather than collapsed into a generic metric.

use rand::seq::IndexedRandom;

/// Case-insensitive, whitespace-trimmed equality.
pub fn is_exact_match(guess: &str, secret: &str) -> bool {
    guess.trim().to_lowercase() == secret.trim().to_lowercase()
}

/// True when the guess is near the secret without matching it.
///
/// Conditions, any of which qualifies:
/// 1. lengths differ by at most 1 and at most 2 positions disagree
/// 2. one string contains the other and lengths differ by at most 3
/// 3. plural/singular variation (trailing "s")
/// 4. deleting one character from the longer yields the shorter
pub fn is_close_match(guess: &str, secret: &str) -> bool {
    let guess = guess.trim().to_lowercase();
    let secret = secret.trim().to_lowercase();

    // An exact match is correct, not close
    if guess == secret {
        return false;
    }

    let g: Vec<char> = guess.chars().collect();
    let s: Vec<char> = secret.chars().collect();
    let len_diff = g.len().abs_diff(s.len());

    // 1. Near-equal length with up to 2 positional differences (typos)
    if len_diff <= 1 {
        let max_len = g.len().max(s.len());
        let differences = (0..max_len)
            .filter(|&i| g.get(i) != s.get(i))
            .count();
        if differences <= 2 {
            return true;
        }
    }

    // 2. Partial match: one word contains the other
    if (secret.contains(&guess) || guess.contains(&secret)) && len_diff <= 3 {
        return true;
    }

    // 3. Plural/singular variation
    if format!("{}s", guess) == secret || format!("{}s", secret) == guess {
        return true;
    }

    // 4. A single missing/extra letter anywhere in the word
    if len_diff <= 1 {
        let (longer, shorter) = if g.len() > s.len() { (&g, &s) } else { (&s, &g) };
        for i in 0..longer.len() {
            let mut without: Vec<char> = longer.clone();
            without.remove(i);
            if without == *shorter {
                return true;
            }
        }
    }

    false
}

/// Points for a correct guesser: 100 at the buzzer-beater end of the scale,
/// decaying toward 50 as the turn drags on.
pub fn guesser_points(elapsed_ms: u64, limit_ms: u64) -> u32 {
    (100.0 - 50.0 * (elapsed_ms as f64 / limit_ms as f64)).floor() as u32
}

/// Points for the drawer on each correct guess: 50 for an instant guess,
/// growing toward 100. Rewards drawers who make the word eventually
/// guessable rather than trivially obvious.
pub fn drawer_points(elapsed_ms: u64, limit_ms: u64) -> u32 {
    (50.0 + 50.0 * (elapsed_ms as f64 / limit_ms as f64)).floor() as u32
}

const CLOSE_MESSAGES: &[&str] = &[
    "Close!",
    "So close!",
    "Almost!",
    "You're getting warmer!",
    "Very close!",
    "Nearly there!",
    "Close guess!",
    "Warm!",
];

/// A random encouragement line for a close guess.
pub fn close_message() -> &'static str {
    CLOSE_MESSAGES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("Close!")
}
