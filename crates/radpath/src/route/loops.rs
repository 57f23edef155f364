use std::collections::HashSet;

use super::types::{Point, Step};

/// Assign a loop id to every trail step for colour grouping.
///
/// Walking the start node of each step, a node already seen under the current loop
/// id, but not among the last `lenience` nodes since the loop began, starts the next
/// loop id. Ids cycle modulo `palette_size`, and each id remembers every node seen
/// under it, including on earlier cycles.
///
/// The id of the first node is dropped and the last id repeated, so each loop ends
/// one step early and colours do not bleed into each other. The result has exactly
/// one entry per step.
pub fn segment_loops(steps: &[Step], lenience: usize, palette_size: usize) -> Vec<usize> {
    if steps.is_empty() {
        return Vec::new();
    }
    let palette_size = palette_size.max(1);

    let mut seen: Vec<HashSet<Point>> = vec![HashSet::new(); palette_size];
    let mut current: Vec<Point> = Vec::new();
    let mut loop_id = 0;
    let mut colours = Vec::with_capacity(steps.len() + 1);

    for node in steps.iter().map(|s| s.from) {
        let recent = &current[current.len().saturating_sub(lenience)..];
        if seen[loop_id].contains(&node) && !recent.contains(&node) {
            loop_id = (loop_id + 1) % palette_size;
            current.clear();
        }
        colours.push(loop_id);
        current.push(node);
        seen[loop_id].insert(node);
    }

    colours.push(loop_id);
    colours.remove(0);
    colours
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    /// A heptagon walked once, then a spur out of its first corner.
    fn heptagon_then_spur() -> Vec<Step> {
        let corners: Vec<Point> = (0..7).map(|i| p(i * 10, (i % 2) * 10)).collect();
        let mut steps: Vec<Step> = (0..7)
            .map(|i| Step::new(corners[i], corners[(i + 1) % 7]))
            .collect();
        steps.push(Step::new(corners[0], p(-10, -10)));
        steps
    }

    #[test]
    fn test_empty_trail() {
        assert!(segment_loops(&[], 5, 20).is_empty());
    }

    #[test]
    fn test_triangle_is_one_loop() {
        let a = p(0, 0);
        let b = p(10, 0);
        let c = p(0, 10);
        let steps = [Step::new(a, b), Step::new(b, c), Step::new(c, a)];
        assert_eq!(segment_loops(&steps, 5, 20), vec![0, 0, 0]);
    }

    #[test]
    fn test_revisit_outside_lenience_starts_new_loop() {
        let colours = segment_loops(&heptagon_then_spur(), 5, 20);
        // The revisit of the first corner (8th start node) opens loop 1; shifting by
        // one makes the step before it already carry the new colour.
        assert_eq!(colours, vec![0, 0, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_revisit_inside_lenience_keeps_loop() {
        let colours = segment_loops(&heptagon_then_spur(), 10, 20);
        assert_eq!(colours, vec![0; 8]);
    }

    #[test]
    fn test_ids_wrap_around_palette() {
        let colours = segment_loops(&heptagon_then_spur(), 5, 1);
        assert!(colours.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_one_colour_per_step() {
        let steps = heptagon_then_spur();
        assert_eq!(segment_loops(&steps, 5, 20).len(), steps.len());
    }
}
