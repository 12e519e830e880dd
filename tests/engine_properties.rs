//! Property tests for the spatial index, clustering, outlines and naming.

use std::collections::BTreeSet;

use physical_nets::board::{Primitive, PrimitiveKind};
use physical_nets::config::EngineConfig;
use physical_nets::engine::{
    cluster_primitives, is_generated_name, DisjointSet, Grid, NameAllocator,
};
use physical_nets::geometry::{
    rounded_rect_vertices, touches, BBox, Copper, LayerSpan, Point, Shape, TouchRules,
};
use proptest::prelude::*;

fn bbox_strategy() -> impl Strategy<Value = BBox> {
    (-2000.0..2000.0f64, -2000.0..2000.0f64, 0.0..400.0f64, 0.0..400.0f64).prop_map(
        |(x, y, w, h)| BBox {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        },
    )
}

fn point_strategy() -> impl Strategy<Value = Point> {
    (-60.0..60.0f64, -60.0..60.0f64).prop_map(|(x, y)| Point::new(x, y))
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (point_strategy(), point_strategy(), 0.0..6.0f64)
            .prop_map(|(start, end, width)| Shape::Segment { start, end, width }),
        (point_strategy(), 0.5..20.0f64).prop_map(|(center, radius)| Shape::Round { center, radius }),
        (point_strategy(), 0.5..40.0f64, 0.5..40.0f64).prop_map(|(center, width, height)| {
            Shape::Rect {
                center,
                width,
                height,
            }
        }),
        prop::collection::vec(point_strategy(), 3..7)
            .prop_map(|vertices| Shape::Polygon { vertices }),
    ]
}

fn copper(shape: Shape) -> Copper {
    Copper::new(LayerSpan::Single(1), shape)
}

/// Connected components by breadth-first search over every pairwise touch.
fn reference_components(coppers: &[Copper], rules: &TouchRules) -> BTreeSet<BTreeSet<usize>> {
    let mut seen = vec![false; coppers.len()];
    let mut components = BTreeSet::new();
    for start in 0..coppers.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut component = BTreeSet::from([start]);
        let mut queue = vec![start];
        while let Some(current) = queue.pop() {
            for next in 0..coppers.len() {
                if !seen[next] && touches(&coppers[current], &coppers[next], rules) {
                    seen[next] = true;
                    component.insert(next);
                    queue.push(next);
                }
            }
        }
        components.insert(component);
    }
    components
}

proptest! {
    #[test]
    fn touching_shapes_are_always_candidates(
        a in shape_strategy(),
        b in shape_strategy(),
        cell_size in 5.0..200.0f64,
    ) {
        let rules = TouchRules::default();
        let (a, b) = (copper(a), copper(b));
        if touches(&a, &b, &rules) {
            let pairs = Grid::build(&[a.bbox, b.bbox], cell_size, rules.max_reach()).candidate_pairs();
            prop_assert!(pairs.contains(&(0, 1)));
        }
    }

    #[test]
    fn clusters_match_touch_reachability(
        segments in prop::collection::vec(
            (point_strategy(), point_strategy(), 0.5..4.0f64),
            1..25,
        ),
    ) {
        let primitives: Vec<Primitive> = segments
            .into_iter()
            .enumerate()
            .map(|(i, (start, end, width))| {
                Primitive::new(
                    format!("s{i:02}"),
                    PrimitiveKind::Line,
                    None,
                    copper(Shape::Segment { start, end, width }),
                )
            })
            .collect();
        let config = EngineConfig::default();

        let clustered: BTreeSet<BTreeSet<usize>> = cluster_primitives(&primitives, &config)
            .clusters
            .iter()
            .map(|cluster| cluster.members().iter().copied().collect())
            .collect();
        let coppers: Vec<Copper> = primitives.iter().map(|p| p.copper.clone()).collect();

        prop_assert_eq!(clustered, reference_components(&coppers, &config.touch_rules()));
    }

    #[test]
    fn grid_never_misses_an_overlapping_pair(
        boxes in prop::collection::vec(bbox_strategy(), 1..40),
        cell_size in 10.0..300.0f64,
        padding in 0.0..20.0f64,
    ) {
        let pairs = Grid::build(&boxes, cell_size, padding).candidate_pairs();
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                let a = boxes[i].expanded(padding);
                let b = boxes[j].expanded(padding);
                if a.overlaps(&b) {
                    prop_assert!(pairs.contains(&(i, j)), "missing pair ({}, {})", i, j);
                }
            }
        }
        for &(i, j) in &pairs {
            prop_assert!(i < j);
        }
    }

    #[test]
    fn rounded_rect_stays_within_its_box(
        cx in -500.0..500.0f64,
        cy in -500.0..500.0f64,
        width in 0.5..200.0f64,
        height in 0.5..200.0f64,
        radius in 0.0..150.0f64,
        segments in 1u32..12,
    ) {
        let vertices = rounded_rect_vertices(Point::new(cx, cy), width, height, 0.0, radius, segments);
        let r = radius.min(width.min(height) / 2.0);
        let expected = if r > 0.0 { 4 * (segments as usize + 1) } else { 4 };
        prop_assert_eq!(vertices.len(), expected);
        for v in &vertices {
            prop_assert!((v.x - cx).abs() <= width / 2.0 + 1e-9);
            prop_assert!((v.y - cy).abs() <= height / 2.0 + 1e-9);
        }
    }

    #[test]
    fn allocated_names_never_collide(
        used in prop::collection::btree_set("(NET|net|Net)[1-9][0-9]?", 0..30),
        count in 1usize..20,
    ) {
        let taken: BTreeSet<String> = used.iter().map(|n| n.to_ascii_uppercase()).collect();
        let mut allocator = NameAllocator::new(&used);
        let mut minted = BTreeSet::new();
        for _ in 0..count {
            let name = allocator.allocate();
            prop_assert!(is_generated_name(&name));
            prop_assert!(!taken.contains(&name));
            prop_assert!(minted.insert(name));
        }
    }

    #[test]
    fn disjoint_set_groups_partition_the_indices(
        len in 1usize..60,
        unions in prop::collection::vec((0usize..60, 0usize..60), 0..80),
    ) {
        let mut sets = DisjointSet::new(len);
        for (a, b) in unions {
            if a < len && b < len {
                sets.union(a, b);
            }
        }
        let groups = sets.groups();
        let mut seen: Vec<usize> = groups.iter().flatten().copied().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..len).collect::<Vec<_>>());
        for group in &groups {
            let root = sets.find(group[0]);
            for &member in group {
                prop_assert_eq!(sets.find(member), root);
            }
        }
    }
}

#[test]
fn first_free_name_skips_taken_ones_case_insensitively() {
    let used: BTreeSet<String> = ["net1", "NET2", "Net4"].into_iter().map(String::from).collect();
    let mut allocator = NameAllocator::new(&used);
    assert_eq!(allocator.allocate(), "NET3");
    assert_eq!(allocator.allocate(), "NET5");
}
