use glam::Vec2;
use proptest::prelude::*;

use rally::config::{ConvergenceConfig, Oriented, ProgressConfig, ProgressSource};
use rally::sim::{
    Arena, Ball, CollisionEvent, ConvergenceAnimator, ProgressTracker, ResolveParams,
    advance_and_resolve,
};

fn any_event() -> impl Strategy<Value = CollisionEvent> {
    prop::sample::select(vec![
        CollisionEvent::LeftWall,
        CollisionEvent::RightWall,
        CollisionEvent::TopWall,
        CollisionEvent::BottomWall,
        CollisionEvent::Paddle,
        CollisionEvent::PaddleGraze,
    ])
}

proptest! {
    #[test]
    fn hit_count_is_monotonic_and_bounded(
        phrase in "[a-z ]{0,48}",
        step in 1usize..10,
        walls in any::<bool>(),
        events in prop::collection::vec(any_event(), 0..64),
    ) {
        let config = ProgressConfig {
            phrase,
            step,
            source: if walls { ProgressSource::Walls } else { ProgressSource::Paddle },
            ..ProgressConfig::default()
        };
        let mut tracker = ProgressTracker::new(&config, !walls);

        let mut prev = 0;
        let mut converging = false;
        for event in events {
            tracker.on_collision(event);
            prop_assert!(tracker.hit_count() >= prev);
            prop_assert!(tracker.hit_count() <= tracker.phrase_len());
            prop_assert_eq!(tracker.revealed_prefix().chars().count(), tracker.revealed_len());
            prop_assert!(!converging || tracker.should_converge());
            converging = tracker.should_converge();
            prev = tracker.hit_count();
        }
    }

    #[test]
    fn wall_bounces_preserve_speed(
        fx in 0.1f32..0.9,
        fy in 0.1f32..0.9,
        vx in -12.0f32..12.0,
        vy in -12.0f32..12.0,
        radius in 4.0f32..40.0,
    ) {
        let arena = Arena::new(800.0, 600.0);
        let mut ball = Ball::new(arena.at_fraction(Vec2::new(fx, fy)), Vec2::new(vx, vy), radius);
        ball.spawn_guard = false;
        let params = ResolveParams::default();

        for _ in 0..500 {
            let before = ball.vel;
            let events = advance_and_resolve(&mut ball, &arena, None, &params);
            prop_assert_eq!(ball.vel.x.abs(), before.x.abs());
            prop_assert_eq!(ball.vel.y.abs(), before.y.abs());
            prop_assert!(!events.contains(CollisionEvent::Escaped));
        }
    }

    #[test]
    fn convergence_shrinks_and_terminates(
        fx in 0.0f32..1.0,
        fy in 0.0f32..1.0,
        radius in 8.0f32..60.0,
        min_radius in 2.0f32..8.0,
        portrait in any::<bool>(),
    ) {
        let arena = if portrait { Arena::new(600.0, 1000.0) } else { Arena::new(1000.0, 600.0) };
        let config = ConvergenceConfig {
            min_radius: Oriented::uniform(min_radius),
            ..ConvergenceConfig::default()
        };
        let target = ConvergenceAnimator::target(&arena, &config);
        let mut ball = Ball::new(arena.at_fraction(Vec2::new(fx, fy)), Vec2::ZERO, radius);
        let mut animator = ConvergenceAnimator::default();
        prop_assert!(animator.activate());
        prop_assert!(!animator.activate());

        let mut arrived = false;
        for _ in 0..2000 {
            let prev_radius = ball.radius;
            ball.pos += ball.vel;
            arrived = animator.step(&mut ball, &arena, &config);
            prop_assert!(ball.radius <= prev_radius);
            prop_assert!(ball.radius >= min_radius);
            if arrived {
                break;
            }
        }
        prop_assert!(arrived);
        prop_assert_eq!(ball.pos, target);
        prop_assert_eq!(ball.vel, Vec2::ZERO);
    }
}
