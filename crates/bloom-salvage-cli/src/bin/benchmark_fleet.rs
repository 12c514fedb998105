use bloom_salvage_core::fleet::FleetSizer;
use bloom_salvage_core::{synthetic_bloom, Cell, DriftField, MissionConfig, SearchConfig};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::time::Instant;

fn main() {
    let (width, height) = (1000, 1000);
    let seed = 42;
    let mut rng = ChaCha12Rng::seed_from_u64(seed);

    let config = MissionConfig::default();
    let intake = config.zone.intake;
    // Bloom 150 cells west of the intake, pushed roughly toward it.
    let center = Cell::new(intake.x - 150, intake.y);
    let mask = synthetic_bloom(width, height, center, 40.0, 0.7, seed).expect("valid bloom");
    let velocity = [
        0.3 + rng.random::<f64>() * 0.2,
        (rng.random::<f64>() - 0.5) * 0.1,
    ];
    let field = DriftField::uniform(width, height, velocity).expect("valid field");
    println!(
        "Benchmarking fleet search: {} occupied cells, drift [{:.3}, {:.3}] m/s",
        mask.occupied_count(),
        velocity[0],
        velocity[1]
    );

    let start = Instant::now();
    let sequential = FleetSizer::new(&mask, &field, &config)
        .and_then(|s| s.search())
        .expect("search succeeds");
    let duration_sequential = start.elapsed();
    println!(
        "Sequential: N = {} after {} trials in {:?}",
        sequential.min_fleet_size,
        sequential.trials.len(),
        duration_sequential
    );

    for window in [2, 4, 8, 16] {
        let config = MissionConfig {
            search: SearchConfig {
                parallel_window: window,
                ..SearchConfig::default()
            },
            ..config.clone()
        };
        let start = Instant::now();
        let parallel = FleetSizer::new(&mask, &field, &config)
            .and_then(|s| s.search())
            .expect("search succeeds");
        let duration = start.elapsed();
        assert_eq!(parallel.min_fleet_size, sequential.min_fleet_size);
        println!(
            "Window {:>2}: {:?} ({:.2}x)",
            window,
            duration,
            duration_sequential.as_secs_f64() / duration.as_secs_f64().max(f64::EPSILON)
        );
    }
}
