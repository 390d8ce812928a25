#[cfg(test)]
mod tests {
    use rhythm_core::chart::{Chart, Outcome};
    use rhythm_core::gameplay::{
        ActiveEvent, JudgeCause, JudgeMachine, JudgeWindows, SpawnScheduler,
    };

    fn create_test_chart() -> Chart {
        // Note 0: Time 1.0, Lane 1
        // Note 1: Time 1.5, Lane 2
        // Note 2: Time 2.0, Lane 1
        Chart::load(vec![(1.0, 1), (1.5, 2), (2.0, 1)], 4).unwrap()
    }

    /// Judge with every chart event already active.
    fn judge_with_all_active(chart: &Chart) -> JudgeMachine {
        let mut judge = JudgeMachine::new(JudgeWindows::default());
        let mut spawner = SpawnScheduler::new();
        spawner.tick(chart, 0.0, f64::MAX, judge.active_mut());
        assert_eq!(judge.active().len(), chart.len());
        judge
    }

    #[test]
    fn test_perfect_judgment() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        let result = judge.on_key_press(1, 1.0).expect("Should trigger judgment");

        assert_eq!(result.outcome, Outcome::Perfect);
        assert_eq!(result.index, 0);
        assert_eq!(result.error, 0.0);
        assert_eq!(result.cause, JudgeCause::Hit);
        assert!(!judge.active().contains(0));
    }

    #[test]
    fn test_late_great_judgment() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        // 90ms late
        let result = judge.on_key_press(1, 1.09).expect("Should trigger judgment");
        assert_eq!(result.outcome, Outcome::Great);
        assert_eq!(result.index, 0);
        assert!(result.error > 0.0);
    }

    #[test]
    fn test_late_miss_judgment() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        // 140ms late
        let result = judge.on_key_press(1, 1.14).expect("Should trigger judgment");
        assert_eq!(result.outcome, Outcome::Miss);
        assert_eq!(result.cause, JudgeCause::Hit);
    }

    #[test]
    fn test_early_great_has_negative_error() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        let result = judge.on_key_press(1, 0.93).expect("Should trigger judgment");
        assert_eq!(result.outcome, Outcome::Great);
        assert!((result.error - -0.07).abs() < 1e-9);
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        let result = judge.on_key_press(1, 1.05).unwrap();
        assert_eq!(result.outcome, Outcome::Perfect);

        let result = judge.on_key_press(2, 1.6).unwrap();
        assert_eq!(result.outcome, Outcome::Great);
    }

    #[test]
    fn test_ignored_input_too_early() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        // Note 0 at 1.0, miss window 150ms: 0.5 is still approaching
        assert!(judge.on_key_press(1, 0.5).is_none());

        // Nothing removed
        assert_eq!(judge.active().len(), 3);
    }

    #[test]
    fn test_press_on_empty_lane_is_noop() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        assert!(judge.on_key_press(3, 1.0).is_none());
        assert_eq!(judge.active().len(), 3);
    }

    #[test]
    fn test_nearest_event_wins() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        // Lane 1 has notes at 1.0 and 2.0; 1.9 is closer to note 2
        let result = judge.on_key_press(1, 1.9).unwrap();
        assert_eq!(result.index, 2);
        assert_eq!(result.outcome, Outcome::Great);
        assert!(judge.active().contains(0));
    }

    #[test]
    fn test_equidistant_prefers_earlier_target() {
        let chart = Chart::load(vec![(1.0, 0), (1.5, 0)], 4).unwrap();
        let windows = JudgeWindows {
            perfect_ms: 50.0,
            great_ms: 100.0,
            miss_ms: 300.0,
        };
        let mut judge = JudgeMachine::new(windows);
        for (index, event) in chart.events().iter().enumerate() {
            judge.active_mut().insert(ActiveEvent::new(index, event, 0.0));
        }

        // 250ms from both targets
        let result = judge.on_key_press(0, 1.25).unwrap();
        assert_eq!(result.index, 0);
        assert_eq!(result.outcome, Outcome::Miss);
        assert!(judge.active().contains(1));
    }

    #[test]
    fn test_simultaneous_events_resolve_in_chart_order() {
        let chart = Chart::load(vec![(1.0, 0), (1.0, 0)], 4).unwrap();
        let mut judge = judge_with_all_active(&chart);

        assert_eq!(judge.on_key_press(0, 1.0).unwrap().index, 0);
        assert_eq!(judge.on_key_press(0, 1.0).unwrap().index, 1);
        assert!(judge.on_key_press(0, 1.0).is_none());
    }

    #[test]
    fn test_check_misses() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        // Current time 1.0. Note 0 is at 1.0. Not missed.
        assert!(judge.tick(1.0).is_empty());

        // 1.15: exactly on the miss window edge, not missed yet.
        assert!(judge.tick(1.15).is_empty());

        // 1.2: Note 0 expired.
        let misses = judge.tick(1.2);
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].outcome, Outcome::Miss);
        assert_eq!(misses[0].cause, JudgeCause::Expired);
        assert_eq!(misses[0].index, 0);
        assert!(misses[0].error > 0.15);

        // Not reported twice.
        assert!(judge.tick(1.22).is_empty());

        // Notes 1 (1.5) and 2 (2.0) both expire by 2.21.
        let misses = judge.tick(2.21);
        assert_eq!(misses.len(), 2);
        assert_eq!(misses[0].index, 1);
        assert_eq!(misses[1].index, 2);
        assert!(judge.active().is_empty());
    }

    #[test]
    fn test_lane_independence_out_of_order_input() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        // Hit Lane 2 first (at 1.5).
        let result = judge.on_key_press(2, 1.5).expect("Hit Lane 2");
        assert_eq!(result.index, 1);

        // Lane 1 should still be available at 1.0
        let result = judge.on_key_press(1, 1.0).expect("Hit Lane 1");
        assert_eq!(result.index, 0);

        // No misses at 1.6
        assert!(judge.tick(1.6).is_empty());
    }

    #[test]
    fn test_expire_all_drains_active_set() {
        let chart = create_test_chart();
        let mut judge = judge_with_all_active(&chart);

        let flushed = judge.expire_all(1.0);
        assert_eq!(flushed.len(), 3);
        assert!(flushed.iter().all(|j| j.outcome == Outcome::Miss));
        assert!(judge.active().is_empty());
    }

    #[test]
    fn test_classify_thresholds() {
        let windows = JudgeWindows::default();
        assert_eq!(windows.classify(0.0), Outcome::Perfect);
        assert_eq!(windows.classify(-0.05), Outcome::Perfect);
        assert_eq!(windows.classify(0.0501), Outcome::Great);
        assert_eq!(windows.classify(-0.1), Outcome::Great);
        assert_eq!(windows.classify(0.1001), Outcome::Miss);
        assert_eq!(windows.classify(0.5), Outcome::Miss);
        assert!(windows.is_valid());
    }
}
