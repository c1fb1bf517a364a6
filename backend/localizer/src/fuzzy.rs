//! Fuzzy string scores on a 0-100 scale.
//!
//! Similarity is the insert/delete ratio `2 * lcs / (len_a + len_b)`, where
//! `lcs` is the length of the longest common subsequence of chars. A dropped
//! or extra letter costs one edit and a misread letter costs two.

/// Whole-string insert/delete similarity.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    to_percent(indel_similarity(&a, &b))
}

/// Best similarity between the shorter string and any equally long window of
/// the longer one. Empty input on either side scores 0.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    let mut best = 0.0_f64;
    for window in longer.windows(shorter.len()) {
        let score = indel_similarity(shorter, window);
        if score > best {
            best = score;
            if best >= 1.0 {
                break;
            }
        }
    }
    to_percent(best)
}

fn indel_similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_len(a, b)) as f64 / total as f64
}

/// Longest common subsequence length, one DP row at a time.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev.last().copied().unwrap_or(0)
}

fn to_percent(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADLINE: &str = "Storm Hits Region Hard";

    #[test]
    fn exact_substring_scores_100() {
        assert_eq!(partial_ratio(HEADLINE, "Storm Hits"), 100);
        assert_eq!(partial_ratio("Region Hard", HEADLINE), 100);
    }

    #[test]
    fn one_substitution_in_five_scores_80() {
        assert_eq!(partial_ratio("abcde", "ab de"), 80);
        assert_eq!(partial_ratio("abcdefghij", "abcd fghij"), 90);
    }

    #[test]
    fn misread_letter_scores_high() {
        assert_eq!(partial_ratio(HEADLINE, "St0rm Hits"), 90);
    }

    #[test]
    fn dropped_letter_scores_high() {
        assert_eq!(partial_ratio(HEADLINE, "Storm Hts"), 89);
        assert_eq!(partial_ratio(HEADLINE, "Regon Hard"), 90);
    }

    #[test]
    fn inserted_letter_scores_high() {
        assert_eq!(partial_ratio(HEADLINE, "Stormn Hits"), 91);
    }

    #[test]
    fn unrelated_text_scores_low() {
        assert!(partial_ratio(HEADLINE, "Weather forecast") < 60);
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert_eq!(partial_ratio("", "Storm Hits"), 0);
        assert_eq!(partial_ratio("Storm Hits", ""), 0);
        assert_eq!(partial_ratio("", ""), 0);
    }

    #[test]
    fn handles_multibyte_text() {
        assert_eq!(partial_ratio("Überschwemmung trifft Köln", "trifft Köln"), 100);
        assert_eq!(ratio("Köln", "Koln"), 75);
    }

    #[test]
    fn partial_ratio_is_symmetric() {
        let pairs = [("Storm Hits", "Hits Region"), ("abc", "xabcx"), ("hello", "help")];
        for (a, b) in pairs {
            assert_eq!(partial_ratio(a, b), partial_ratio(b, a));
        }
    }

    #[test]
    fn ratio_compares_whole_strings() {
        assert_eq!(ratio("Storm", "Storm"), 100);
        assert_eq!(ratio("abcde", "ab de"), 80);
        // One deletion: 2 * 4 / (5 + 4).
        assert_eq!(ratio("Storm", "Strm"), 89);
        assert_eq!(ratio("", ""), 100);
    }
}
