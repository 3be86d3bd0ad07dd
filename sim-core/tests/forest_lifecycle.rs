use grove_core::{
    config::{Config, TreeParams},
    draw::DrawPrimitive,
    forest::Forest,
    noise_field::PerlinField,
};
use rand::{SeedableRng, rngs::StdRng};

fn busy_forest(rng: &mut StdRng) -> Forest {
    let cfg = Config {
        tree_count: 3,
        min_iterations: 3,
        max_iterations: 4,
        growth_rate: 0.2,
        tree: TreeParams {
            color_change_speed: 0.2,
            drop_leaf_rate: 0.01,
            leaf_spawn_rate: 0.5,
        },
        ..Config::default()
    };
    Forest::new(cfg, rng)
}

#[test]
fn long_run_keeps_every_invariant() {
    let mut rng = StdRng::seed_from_u64(2024);
    let field = PerlinField::new(17);
    let mut forest = busy_forest(&mut rng);
    let branch_counts: Vec<usize> = forest.trees().iter().map(|t| t.branch_count()).collect();
    assert!(branch_counts.iter().all(|&n| n == 1 + 3 + 9 + 27));

    let mut saw_fallen = false;
    for frame in 0..2_500 {
        let out = forest.advance(frame, &field, &mut rng);

        let lines = out
            .iter()
            .filter(|p| matches!(p, DrawPrimitive::Line { .. }))
            .count();
        assert_eq!(lines, branch_counts.iter().sum::<usize>());

        for (tree, &count) in forest.trees().iter().zip(&branch_counts) {
            // The skeleton never changes size after construction.
            assert_eq!(tree.branch_count(), count);

            for b in tree.branches() {
                assert!(b.displacement.length() <= b.max_displacement + 1e-4);
            }

            let mut attached_per_branch = vec![0; count];
            for leaf in tree.leaves() {
                assert!(!leaf.is_decomposed(), "decomposed leaf survived filtering");
                assert!(leaf.position.y <= forest.config().ground_height);
                if leaf.attached {
                    attached_per_branch[leaf.branch] += 1;
                    assert!(tree.branches()[leaf.branch].has_leaf);
                    assert!(!tree.branches()[leaf.branch].finished);
                } else {
                    saw_fallen = true;
                }
            }
            assert!(attached_per_branch.iter().all(|&n| n <= 1));
        }
    }
    assert!(saw_fallen);
}

#[test]
fn fallen_leaves_eventually_decompose_and_vanish() {
    let mut rng = StdRng::seed_from_u64(99);
    let field = PerlinField::new(3);
    let mut forest = busy_forest(&mut rng);

    for frame in 0..100 {
        forest.advance(frame, &field, &mut rng);
    }
    assert!(forest.leaf_count() > 0);

    forest.suppress_spawning();
    forest.set_drop_leaf_rate(1.0);
    for frame in 100..1_200 {
        forest.advance(frame, &field, &mut rng);
    }
    assert_eq!(forest.leaf_count(), 0);

    // Spring is back: tips sprout again.
    forest.reset_seasons();
    for frame in 1_200..1_260 {
        forest.advance(frame, &field, &mut rng);
    }
    assert!(forest.leaf_count() > 0);
}
