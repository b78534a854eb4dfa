//! Element id generation

use std::collections::HashSet;

/// Prefix of generated ids
pub const ID_PREFIX: &str = "snap-it";

/// Next free id at or after `counter`, skipping ids already in the
/// document. Returns the id and the counter to use next time.
pub fn next_id(counter: u32, existing: &HashSet<String>) -> (String, u32) {
    let mut counter = counter;
    loop {
        let id = format!("{}{}", ID_PREFIX, counter);
        counter += 1;
        if !existing.contains(&id) {
            return (id, counter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential() {
        let existing = HashSet::new();
        let (a, c) = next_id(0, &existing);
        let (b, c) = next_id(c, &existing);
        assert_eq!((a.as_str(), b.as_str(), c), ("snap-it0", "snap-it1", 2));
    }

    #[test]
    fn test_skips_existing() {
        let existing: HashSet<String> = ["snap-it0", "snap-it1", "snap-it3"]
            .iter().map(|s| s.to_string()).collect();
        let (a, c) = next_id(0, &existing);
        assert_eq!(a, "snap-it2");
        let (b, _) = next_id(c, &existing);
        assert_eq!(b, "snap-it4");
    }
}
