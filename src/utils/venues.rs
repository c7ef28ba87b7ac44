use std::collections::HashMap;

/// Most frequently picked venue across both pairs' preference lists.
///
/// Lists are concatenated in submission order; blank entries are dropped.
/// Ties break by first occurrence in the concatenated input, not
/// alphabetically, so the result is stable across runs.
pub fn most_popular_venue<'a, I>(lists: I) -> Option<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for list in lists {
        for venue in list {
            let venue = venue.trim();
            if venue.is_empty() {
                continue;
            }
            let count = counts.entry(venue).or_insert(0);
            if *count == 0 {
                order.push(venue);
            }
            *count += 1;
        }
    }

    // max_by_key would keep the last maximum; walk in first-occurrence order
    // and only replace on a strictly higher count.
    let mut best: Option<(&str, usize)> = None;
    for venue in order {
        let count = counts[venue];
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((venue, count));
        }
    }
    best.map(|(venue, _)| venue.to_string())
}

/// First message of a matched chat, posted once by the system.
pub fn venue_recommendation_message(venue: &str) -> String {
    format!(
        "You both matched! Based on everyone's picks, how about meeting at {}?",
        venue
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn picks_the_most_frequent_venue() {
        let a = strs(&["Giordano's", "The Violet Hour"]);
        let b = strs(&["Giordano's"]);
        let got = most_popular_venue([a.as_slice(), b.as_slice()]);
        assert_eq!(got.as_deref(), Some("Giordano's"));
    }

    #[test]
    fn tie_breaks_by_first_occurrence() {
        // X:2 Y:2, X appears first in concatenated order
        let a = strs(&["X", "Y", "X"]);
        let b = strs(&["Y"]);
        let got = most_popular_venue([a.as_slice(), b.as_slice()]);
        assert_eq!(got.as_deref(), Some("X"));
    }

    #[test]
    fn tie_break_is_not_alphabetical() {
        let a = strs(&["Zanies", "Aba"]);
        let got = most_popular_venue([a.as_slice()]);
        assert_eq!(got.as_deref(), Some("Zanies"));
    }

    #[test]
    fn empty_and_blank_entries_are_ignored() {
        let a = strs(&["", "  ", "Kingston Mines"]);
        let got = most_popular_venue([a.as_slice()]);
        assert_eq!(got.as_deref(), Some("Kingston Mines"));
    }

    #[test]
    fn no_venues_means_no_recommendation() {
        let a: Vec<String> = vec![];
        assert_eq!(most_popular_venue([a.as_slice()]), None);
        assert_eq!(most_popular_venue(std::iter::empty::<&[String]>()), None);
    }

    #[test]
    fn later_list_can_still_win_on_count() {
        let a = strs(&["A"]);
        let b = strs(&["B", "B"]);
        let got = most_popular_venue([a.as_slice(), b.as_slice()]);
        assert_eq!(got.as_deref(), Some("B"));
    }
}
