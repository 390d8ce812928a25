use rhythm_core::chart::Chart;
use rhythm_core::gameplay::{ActiveSet, SpawnScheduler};

#[test]
fn test_spawn_before_target_by_lead_time() {
    let chart = Chart::load(vec![(1.0, 0), (2.0, 1), (3.0, 2)], 4).unwrap();
    let mut spawner = SpawnScheduler::new();
    let mut active = ActiveSet::new();

    // Nothing is due before 1.0 - 0.5
    assert!(spawner.tick(&chart, 0.4, 0.5, &mut active).is_empty());

    let spawned = spawner.tick(&chart, 0.5, 0.5, &mut active);
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].index, 0);
    assert_eq!(spawned[0].spawned_at, 0.5);
    assert_eq!(spawner.next_index(), 1);
}

#[test]
fn test_spawn_catches_up_in_chart_order_after_a_long_frame() {
    let chart = Chart::load(vec![(1.0, 0), (1.1, 1), (1.2, 2), (5.0, 3)], 4).unwrap();
    let mut spawner = SpawnScheduler::new();
    let mut active = ActiveSet::new();

    let spawned = spawner.tick(&chart, 1.0, 0.5, &mut active);
    let indices: Vec<usize> = spawned.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(active.len(), 3);
    assert!(!spawner.is_exhausted(&chart));

    spawner.tick(&chart, 4.5, 0.5, &mut active);
    assert!(spawner.is_exhausted(&chart));

    // Terminal: further ticks never spawn again
    assert!(spawner.tick(&chart, 100.0, 0.5, &mut active).is_empty());
    assert_eq!(active.len(), 4);
}

#[test]
fn test_lead_time_larger_than_target_spawns_immediately() {
    let chart = Chart::load(vec![(1.0, 0)], 4).unwrap();
    let mut spawner = SpawnScheduler::new();
    let mut active = ActiveSet::new();

    // Activation point is -0.5; the first tick at position 0 spawns it.
    let spawned = spawner.tick(&chart, 0.0, 1.5, &mut active);
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].spawned_at, 0.0);
}

#[test]
fn test_spawn_on_empty_chart_is_terminal() {
    let chart = Chart::load(Vec::new(), 4).unwrap();
    let mut spawner = SpawnScheduler::new();
    let mut active = ActiveSet::new();

    assert!(spawner.is_exhausted(&chart));
    assert!(spawner.tick(&chart, 10.0, 1.5, &mut active).is_empty());
}

#[test]
fn test_take_remaining_returns_unspawned_indices() {
    let chart = Chart::load(vec![(1.0, 0), (2.0, 1), (3.0, 2)], 4).unwrap();
    let mut spawner = SpawnScheduler::new();
    let mut active = ActiveSet::new();

    spawner.tick(&chart, 0.6, 0.5, &mut active);
    assert_eq!(spawner.take_remaining(&chart), 1..3);
    assert!(spawner.is_exhausted(&chart));
    assert_eq!(spawner.take_remaining(&chart), 3..3);
}
