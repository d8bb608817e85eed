//! Token-set text similarity
//!
//! Order-independent, case-insensitive similarity between a user statement
//! and stored note content. The score is the classic token-set ratio: split
//! both texts into word tokens, form the sorted intersection and the two
//! sorted remainders, and take the best normalized edit similarity among the
//! three pairings. Reordered words and one-sided extra words therefore cost
//! little, which is exactly what matching "genset maos sudah selesai
//! diperbaiki" against "genset turun lagi" needs.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Lowercase word tokens of a text, in order.
pub fn tokens(text: &str) -> Vec<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Number of distinct tokens the two texts share.
pub fn shared_token_count(a: &str, b: &str) -> usize {
    let set_a: BTreeSet<String> = tokens(a).into_iter().collect();
    let set_b: BTreeSet<String> = tokens(b).into_iter().collect();
    set_a.intersection(&set_b).count()
}

/// Token-set similarity in [0.0, 1.0].
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<String> = tokens(a).into_iter().collect();
    let set_b: BTreeSet<String> = tokens(b).into_iter().collect();
    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&String> = set_a.intersection(&set_b).collect();
    let only_a: Vec<&String> = set_a.difference(&set_b).collect();
    let only_b: Vec<&String> = set_b.difference(&set_a).collect();

    let base = join(&intersection, &[]);
    let combined_a = join(&intersection, &only_a);
    let combined_b = join(&intersection, &only_b);

    let r1 = ratio(&base, &combined_a);
    let r2 = ratio(&base, &combined_b);
    let r3 = ratio(&combined_a, &combined_b);
    r1.max(r2).max(r3)
}

fn join(head: &[&String], tail: &[&String]) -> String {
    let mut parts: Vec<&str> = head.iter().map(|s| s.as_str()).collect();
    parts.extend(tail.iter().map(|s| s.as_str()));
    parts.join(" ")
}

/// Normalized edit similarity between two strings.
fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let max_len = a_chars.len().max(b_chars.len());
    let dist = levenshtein(&a_chars, &b_chars);
    1.0 - (dist as f64 / max_len as f64)
}

/// Levenshtein distance with a single rolling row.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
