use crate::data::LUNCH_BREAK;

/// Afternoon block boundaries that, when configured, are tried before any
/// other adjacent pair.
const PREFERRED_BLOCKS: [(&str, &str); 2] = [("2:00-2:55", "2:55-3:50"), ("2:55-3:50", "3:50-4:45")];

/// A lab double period: two adjacent non-lunch slot indices.
pub type Block = (usize, usize);

/// Adjacent slot pairs usable as lab blocks, preferred afternoon blocks first.
pub fn lab_blocks(slots: &[String]) -> Vec<Block> {
    let adjacent: Vec<Block> = (0..slots.len().saturating_sub(1))
        .filter(|&i| slots[i] != LUNCH_BREAK && slots[i + 1] != LUNCH_BREAK)
        .map(|i| (i, i + 1))
        .collect();

    let position = |name: &str| slots.iter().position(|s| s == name);
    let mut ordered: Vec<Block> = PREFERRED_BLOCKS
        .iter()
        .filter_map(|(a, b)| Some((position(a)?, position(b)?)))
        .filter(|pair| adjacent.contains(pair))
        .collect();
    ordered.dedup();

    for pair in adjacent {
        if !ordered.contains(&pair) {
            ordered.push(pair);
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pairs_skip_lunch() {
        let s = slots(&["9", "10", LUNCH_BREAK, "12", "13"]);
        assert_eq!(lab_blocks(&s), vec![(0, 1), (3, 4)]);
    }

    #[test]
    fn test_preferred_afternoon_blocks_first() {
        let s = slots(&[
            "9:00-9:55",
            "9:55-10:50",
            LUNCH_BREAK,
            "2:00-2:55",
            "2:55-3:50",
            "3:50-4:45",
        ]);
        assert_eq!(lab_blocks(&s), vec![(3, 4), (4, 5), (0, 1)]);
    }

    #[test]
    fn test_preferred_names_must_be_adjacent() {
        let s = slots(&["2:00-2:55", LUNCH_BREAK, "2:55-3:50", "x"]);
        assert_eq!(lab_blocks(&s), vec![(2, 3)]);
    }

    #[test]
    fn test_degenerate_slot_lists() {
        assert!(lab_blocks(&[]).is_empty());
        assert!(lab_blocks(&slots(&["only"])).is_empty());
    }
}
