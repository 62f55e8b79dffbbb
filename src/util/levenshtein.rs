//! Levenshtein edit distance for fuzzy term matching.

use std::cmp::min;

/// Calculate the Levenshtein distance between two strings.
///
/// This is the minimum number of single-character insertions, deletions or
/// substitutions needed to turn one string into the other.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s2_len = s2.chars().count();
    levenshtein_distance_threshold(s1, s2, s1.chars().count().max(s2_len))
        .unwrap_or(s2_len)
}

/// Calculate Levenshtein distance with a maximum threshold for early termination.
///
/// Returns `None` as soon as the distance is known to exceed `threshold`.
#[allow(clippy::needless_range_loop)]
pub fn levenshtein_distance_threshold(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1.abs_diff(len2) > threshold {
        return None;
    }
    if len1 == 0 || len2 == 0 {
        return Some(len1.max(len2));
    }

    // Two rows are enough
    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr_row[0] = i;
        let mut min_in_row = i;

        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);
            curr_row[j] = min(
                min(prev_row[j] + 1, curr_row[j - 1] + 1),
                prev_row[j - 1] + cost,
            );
            min_in_row = min(min_in_row, curr_row[j]);
        }

        if min_in_row > threshold {
            return None;
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[len2];
    (distance <= threshold).then_some(distance)
}

/// Maximum number of edits allowed for a term under a fuzziness setting.
///
/// Values below 1 are a fraction of the term length (rounded); values of 1
/// or more are an absolute edit count.
pub fn max_edits(term_len: usize, fuzziness: f64) -> usize {
    if fuzziness <= 0.0 || !fuzziness.is_finite() {
        0
    } else if fuzziness < 1.0 {
        (term_len as f64 * fuzziness).round() as usize
    } else {
        fuzziness as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("hello", ""), 5);
        assert_eq!(levenshtein_distance("", "world"), 5);
        assert_eq!(levenshtein_distance("hello", "hello"), 0);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("laptop", "labtop"), 1);
    }

    #[test]
    fn test_levenshtein_distance_threshold() {
        assert_eq!(levenshtein_distance_threshold("hello", "helo", 1), Some(1));
        assert_eq!(levenshtein_distance_threshold("hello", "world", 2), None);
        assert_eq!(levenshtein_distance_threshold("a", "abcd", 2), None);
        assert_eq!(levenshtein_distance_threshold("café", "cafe", 1), Some(1));
    }

    #[test]
    fn test_max_edits() {
        assert_eq!(max_edits(6, 0.2), 1);
        assert_eq!(max_edits(2, 0.2), 0);
        assert_eq!(max_edits(10, 0.2), 2);
        assert_eq!(max_edits(4, 2.0), 2);
        assert_eq!(max_edits(4, 0.0), 0);
    }
}
