use proptest::prelude::*;
use snake_ql::config::{AgentConfig, GameConfig};
use snake_ql::dqn::Agent;
use snake_ql::game::{FOOD_REWARD, Game};
use snake_ql::game_input::GameInput;
use snake_ql::replay_buffer::{ReplayBuffer, Transition};
use snake_ql::snake::Move;
use snake_ql::utils::Point;

fn moves() -> impl Strategy<Value = Vec<Move>> {
    prop::collection::vec((0usize..3).prop_map(|i| Move::ALL[i]), 1..300)
}

proptest! {
    #[test]
    fn length_tracks_food_eaten(seed in any::<u64>(), plan in moves()) {
        let mut game = Game::new(GameConfig::default(), Some(seed)).unwrap();
        let mut eaten = 0;
        for mv in plan {
            let out = game.step(mv).unwrap();
            if out.done {
                break;
            }
            if out.reward == FOOD_REWARD {
                eaten += 1;
            }
            prop_assert_eq!(game.snake().len(), 3 + eaten);
            prop_assert_eq!(out.score as usize, eaten);
        }
    }

    #[test]
    fn collision_predicate_matches_definition(
        seed in any::<u64>(),
        plan in moves(),
        cx in -2i32..34,
        cy in -2i32..26,
    ) {
        let mut game = Game::new(GameConfig::default(), Some(seed)).unwrap();
        for mv in plan {
            if game.step(mv).unwrap().done {
                break;
            }
        }
        let p = Point::new(cx * 20, cy * 20);
        let outside = p.x < 0 || p.y < 0 || p.x >= 640 || p.y >= 480;
        let on_body = game.snake().body().iter().skip(1).any(|s| *s == p);
        prop_assert_eq!(game.is_collision(Some(p)), outside || on_body);
    }

    #[test]
    fn encoder_is_binary_and_deterministic(seed in any::<u64>(), plan in moves()) {
        let mut game = Game::new(GameConfig::default(), Some(seed)).unwrap();
        for mv in plan {
            if game.step(mv).unwrap().done {
                game.reset().unwrap();
            }
            let a = GameInput::from_game(&game);
            prop_assert_eq!(a, GameInput::from_game(&game));
            prop_assert!(a.iter().all(|&v| v <= 1));
            // exactly one heading bit
            prop_assert_eq!(a[3..7].iter().filter(|&&v| v == 1).count(), 1);
        }
    }

    #[test]
    fn replay_memory_is_a_ring(capacity in 1usize..64, pushes in 0usize..200) {
        let mut memory = ReplayBuffer::new(capacity);
        for i in 0..pushes {
            let mut state = [0u8; 11];
            state[0] = (i % 256) as u8;
            memory.push(Transition { state, action: Move::Straight, reward: i as f32, next_state: state, done: false });
        }
        prop_assert_eq!(memory.len(), pushes.min(capacity));
        let kept: Vec<f32> = memory.iter().map(|t| t.reward).collect();
        let expected: Vec<f32> = (pushes.saturating_sub(capacity)..pushes).map(|i| i as f32).collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn exploration_never_negative(n in 0u32..10_000) {
        let p = Agent::exploration_probability(&AgentConfig::default(), n);
        prop_assert!((0.0..1.0).contains(&p));
        if n >= 80 {
            prop_assert_eq!(p, 0.0);
        }
    }
}
