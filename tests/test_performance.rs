//! Performance tests for map composition and turn processing

use codecrawl::{compose_map, generate_dungeon, GameState, RandomStream};
use std::time::Instant;

#[test]
fn test_map_composition_performance() {
    let state = GameState::new(Vec::new(), 12345, 160, 63);

    let start = Instant::now();
    let iterations = 100;
    for _ in 0..iterations {
        let cells = compose_map(&state);
        assert_eq!(cells.len(), state.dungeon().height as usize);
    }

    let elapsed = start.elapsed();
    let avg_frame_time = elapsed / iterations;
    println!("Average map composition time: {:?}", avg_frame_time);

    // Generous bound; a frame at 60 FPS is ~16ms
    assert!(
        avg_frame_time.as_millis() < 50,
        "Map composition too slow: {:?}",
        avg_frame_time
    );
}

#[test]
fn test_generation_performance() {
    let start = Instant::now();
    let iterations = 50;
    for seed in 0..iterations {
        let mut rng = RandomStream::new(u64::from(seed));
        let dungeon = generate_dungeon(120, 60, &mut rng, None);
        assert!(!dungeon.rooms.is_empty());
    }

    let avg = start.elapsed() / iterations;
    println!("Average generation time: {:?}", avg);
    assert!(avg.as_millis() < 100, "Generation too slow: {:?}", avg);
}

#[test]
fn test_turn_performance() {
    let mut state = GameState::new(Vec::new(), 777, 80, 43);
    let directions = [(1, 0), (0, 1), (-1, 0), (0, -1), (1, 1), (-1, -1)];

    let start = Instant::now();
    let turns = 500u32;
    for turn in 0..turns {
        let (dx, dy) = directions[turn as usize % directions.len()];
        state.move_player(dx, dy);
    }

    let avg = start.elapsed() / turns;
    println!("Average turn time: {:?}", avg);
    assert!(avg.as_millis() < 20, "Turn processing too slow: {:?}", avg);
}
