use std::collections::BTreeMap;

/// The most frequent value. Ties go to the smallest of the tied values so the
/// result never depends on iteration order.
pub fn mode(values: &[usize]) -> Option<usize> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut best: Option<(usize, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// The mode of the character lengths of `values`.
pub fn mode_length<S: AsRef<str>>(values: &[S]) -> Option<usize> {
    let lengths: Vec<usize> = values
        .iter()
        .map(|value| value.as_ref().chars().count())
        .collect();
    mode(&lengths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode() {
        let numbers = [1, 2, 3, 4, 5, 5, 5, 6, 7, 8, 9];
        assert_eq!(mode(&numbers), Some(5));
    }

    #[test]
    fn test_mode_empty() {
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn test_mode_tie_picks_smallest() {
        assert_eq!(mode(&[7, 3, 7, 3, 9]), Some(3));
        assert_eq!(mode(&[4, 2]), Some(2));
    }

    #[test]
    fn test_mode_length() {
        let strings = [
            "one", "two", "three", "four", "five", "five", "five", "six", "seven", "eight", "nine",
        ];
        assert_eq!(mode_length(&strings), Some(4));
    }

    #[test]
    fn test_mode_length_counts_chars() {
        assert_eq!(mode_length(&["ὠνουμένη", "abcdefgh", "x"]), Some(8));
    }
}
