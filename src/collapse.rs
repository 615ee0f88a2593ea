use serde::Serialize;

/// Items shown before a "show more" affordance, per list type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollapseThresholds {
    pub quotes: usize,
    pub articles: usize,
    pub financial: usize,
    pub network: usize,
    pub bias_sources: usize,
    pub positions: usize,
}

impl Default for CollapseThresholds {
    fn default() -> Self {
        CollapseThresholds {
            quotes: 5,
            articles: 6,
            financial: 12,
            network: 5,
            bias_sources: 5,
            positions: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collapsed<T> {
    pub visible: Vec<T>,
    pub hidden: Vec<T>,
}

impl<T> Collapsed<T> {
    pub fn total(&self) -> usize {
        self.visible.len() + self.hidden.len()
    }

    pub fn needs_toggle(&self) -> bool {
        !self.hidden.is_empty()
    }
}

/// First `threshold` items visible, the rest hidden. Order is preserved;
/// sort before calling.
pub fn split_visible<T: Clone>(items: &[T], threshold: usize) -> Collapsed<T> {
    if items.len() <= threshold {
        return Collapsed {
            visible: items.to_vec(),
            hidden: Vec::new(),
        };
    }
    let (visible, hidden) = items.split_at(threshold);
    Collapsed {
        visible: visible.to_vec(),
        hidden: hidden.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_threshold_items_are_all_visible() {
        let c = split_visible(&[1, 2, 3, 4, 5], 5);
        assert_eq!(c.visible.len(), 5);
        assert!(c.hidden.is_empty());
        assert!(!c.needs_toggle());
    }

    #[test]
    fn one_over_threshold_hides_the_last() {
        let c = split_visible(&[1, 2, 3, 4, 5, 6], 5);
        assert_eq!(c.visible, vec![1, 2, 3, 4, 5]);
        assert_eq!(c.hidden, vec![6]);
        assert_eq!(c.total(), 6);
    }

    #[test]
    fn empty_and_zero_threshold() {
        let empty: Collapsed<u8> = split_visible(&[], 5);
        assert_eq!(empty.total(), 0);
        let all_hidden = split_visible(&["a", "b"], 0);
        assert!(all_hidden.visible.is_empty());
        assert_eq!(all_hidden.hidden, vec!["a", "b"]);
    }

    #[test]
    fn default_thresholds() {
        let t = CollapseThresholds::default();
        assert_eq!((t.quotes, t.articles, t.financial), (5, 6, 12));
        assert_eq!((t.network, t.bias_sources, t.positions), (5, 5, 5));
    }
}
