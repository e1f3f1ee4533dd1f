//! Time-budget packing for the time scheduler.
//!
//! Picks the subset of items whose summed cost is as large as possible without
//! exceeding the budget. Costs are whole seconds, so a 0/1 subset-sum table over
//! `0..=budget` solves it exactly.

/// Returns the indices (ascending) of the chosen items.
///
/// If no single item fits into the budget, the cheapest item is returned on its
/// own so callers never starve on oversized work. Zero-cost items never change
/// the table and are not selected.
pub fn select_within_budget(costs: &[u64], budget: u64) -> Vec<usize> {
    if costs.is_empty() {
        return Vec::new();
    }

    let budget = budget as usize;
    // choice[t] = (item, previous total) that first reached total t
    let mut choice: Vec<Option<(usize, usize)>> = vec![None; budget + 1];
    let mut reachable = vec![false; budget + 1];
    reachable[0] = true;

    for (item, &cost) in costs.iter().enumerate() {
        if cost == 0 || cost > budget as u64 {
            continue;
        }
        let cost = cost as usize;
        // Descending so every item is used at most once
        for total in (cost..=budget).rev() {
            if reachable[total - cost] && !reachable[total] {
                reachable[total] = true;
                choice[total] = Some((item, total - cost));
            }
        }
    }

    let best = (0..=budget).rev().find(|&t| reachable[t]).unwrap_or(0);
    if best == 0 {
        return cheapest(costs).into_iter().collect();
    }

    let mut selected = Vec::new();
    let mut total = best;
    while let Some((item, previous)) = choice[total] {
        selected.push(item);
        total = previous;
    }
    selected.sort_unstable();
    selected
}

fn cheapest(costs: &[u64]) -> Option<usize> {
    costs
        .iter()
        .enumerate()
        .min_by_key(|&(_, &cost)| cost)
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(costs: &[u64], selected: &[usize]) -> u64 {
        selected.iter().map(|&i| costs[i]).sum()
    }

    #[test]
    fn test_fills_budget_exactly_when_possible() {
        let costs = [8, 7, 3];
        let selected = select_within_budget(&costs, 10);
        assert_eq!(selected, vec![1, 2]);
        assert_eq!(total(&costs, &selected), 10);
    }

    #[test]
    fn test_small_budget_takes_only_what_fits() {
        let costs = [8, 7, 3];
        assert_eq!(select_within_budget(&costs, 3), vec![2]);
    }

    #[test]
    fn test_everything_fits() {
        let costs = [15, 10, 2];
        let selected = select_within_budget(&costs, 27);
        assert_eq!(selected, vec![0, 1, 2]);
        assert_eq!(total(&costs, &selected), 27);
    }

    #[test]
    fn test_prefers_fuller_package_over_greedy_choice() {
        // greedy on the first item would stop at 6
        let costs = [6, 5, 5];
        let selected = select_within_budget(&costs, 10);
        assert_eq!(selected, vec![1, 2]);
    }

    #[test]
    fn test_oversized_items_fall_back_to_cheapest() {
        let costs = [500, 300, 900];
        assert_eq!(select_within_budget(&costs, 180), vec![1]);
    }

    #[test]
    fn test_oversized_items_are_skipped_when_others_fit() {
        let costs = [500, 100, 900, 70];
        assert_eq!(select_within_budget(&costs, 180), vec![1, 3]);
    }

    #[test]
    fn test_empty_input() {
        assert!(select_within_budget(&[], 180).is_empty());
    }
}
