//! Proximity-based rectangle merging.
//!
//! A sticker whose artwork is visually split (a speech bubble hovering a few
//! pixels above a character, a detached exclamation mark) is detected as
//! several components. Merging unions the bounding boxes of components that
//! sit within a small gap of each other so the downstream extractor treats
//! them as one sticker.

use crate::rect::Rect;

/// Default merge gap in pixels: wide enough to rejoin a detached speech-bubble
/// tail, narrow enough to keep adjacent grid cells apart.
pub const DEFAULT_MERGE_GAP: u32 = 15;

/// Union rectangles until no two remain within `gap` pixels of each other
/// on both axes simultaneously.
///
/// Runs fixed-point passes: within a pass every surviving rectangle absorbs
/// each later rectangle that is near it (bounding-box union), and passes
/// repeat until one performs no merge. Merging is therefore transitive, and
/// re-running on the output with the same `gap` is a no-op. Cost is O(k²)
/// per pass for k rectangles, which is fine at sticker-sheet scale.
#[must_use]
pub fn merge_rects(rects: Vec<Rect>, gap: u32) -> Vec<Rect> {
    let mut rects = rects;

    loop {
        let mut merged_any = false;
        let mut absorbed = vec![false; rects.len()];
        let mut next = Vec::with_capacity(rects.len());

        for i in 0..rects.len() {
            if absorbed[i] {
                continue;
            }
            let mut current = rects[i];
            for j in (i + 1)..rects.len() {
                if absorbed[j] {
                    continue;
                }
                if current.is_near(&rects[j], gap) {
                    current = current.union(&rects[j]);
                    absorbed[j] = true;
                    merged_any = true;
                }
            }
            next.push(current);
        }

        rects = next;
        if !merged_any {
            return rects;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min_x: u32, max_x: u32, min_y: u32, max_y: u32) -> Rect {
        Rect {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(merge_rects(Vec::new(), DEFAULT_MERGE_GAP).is_empty());
    }

    #[test]
    fn single_rect_is_unchanged_for_any_gap() {
        let r = rect(10, 19, 10, 19);
        assert_eq!(merge_rects(vec![r], 1), vec![r]);
        assert_eq!(merge_rects(vec![r], 1000), vec![r]);
    }

    #[test]
    fn squares_with_gap_ten_merge_at_fifteen_but_not_five() {
        // two 20x20 squares, 10px apart on both axes
        let a = rect(0, 19, 0, 19);
        let b = rect(30, 49, 30, 49);

        let merged = merge_rects(vec![a, b], 15);
        assert_eq!(merged, vec![rect(0, 49, 0, 49)]);

        let kept = merge_rects(vec![a, b], 5);
        assert_eq!(kept, vec![a, b]);
    }

    #[test]
    fn gap_equal_to_threshold_does_not_merge() {
        // strict `<`: a 15px gap stays separate at gap = 15
        let a = rect(0, 19, 0, 19);
        let b = rect(35, 54, 0, 19);
        assert_eq!(merge_rects(vec![a, b], 15).len(), 2);
        assert_eq!(merge_rects(vec![a, b], 16).len(), 1);
    }

    #[test]
    fn nearness_on_one_axis_only_does_not_merge() {
        let a = rect(0, 19, 0, 19);
        let b = rect(22, 41, 100, 119);
        assert_eq!(merge_rects(vec![a, b], 15).len(), 2);
    }

    #[test]
    fn merging_is_transitive_across_a_chain() {
        // a-b and b-c are close; a-c are not. All three must collapse.
        let a = rect(0, 9, 0, 9);
        let b = rect(15, 24, 0, 9);
        let c = rect(30, 39, 0, 9);
        assert!(!a.is_near(&c, 10));

        let merged = merge_rects(vec![a, b, c], 10);
        assert_eq!(merged, vec![rect(0, 39, 0, 9)]);
    }

    #[test]
    fn chain_merges_even_when_links_only_form_across_passes() {
        // c is near b but b is listed after c; the union that reaches c
        // only exists after the first pass completes.
        let a = rect(0, 9, 0, 9);
        let c = rect(30, 39, 0, 9);
        let b = rect(15, 24, 0, 9);

        let merged = merge_rects(vec![a, c, b], 10);
        assert_eq!(merged, vec![rect(0, 39, 0, 9)]);
    }

    #[test]
    fn merge_is_idempotent() {
        let input = vec![
            rect(0, 19, 0, 19),
            rect(25, 44, 0, 19),
            rect(100, 119, 100, 119),
        ];
        let once = merge_rects(input, DEFAULT_MERGE_GAP);
        let twice = merge_rects(once.clone(), DEFAULT_MERGE_GAP);
        assert_eq!(once, twice);
    }

    #[test]
    fn overlapping_rects_always_merge() {
        let a = rect(0, 20, 0, 20);
        let b = rect(10, 30, 10, 30);
        assert_eq!(merge_rects(vec![a, b], 1), vec![rect(0, 30, 0, 30)]);
    }
}
