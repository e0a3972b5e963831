//! Staircase Evo CLI - Run evolution from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;

use staircase_evo::{
    compute::{EpisodeRunner, evolution::EvolutionEngine},
    replay::{RecorderConfig, record_episode},
    schema::EvolutionConfig,
};

fn print_usage(program: &str) {
    eprintln!("Usage: {} <config.json> [--replay <replay.json>]", program);
    eprintln!();
    eprintln!("Evolve staircase profiles from JSON configuration.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Path to evolution configuration file");
    eprintln!("  --replay     Record the best member's episode to this file");
    eprintln!();
    eprintln!("Example configuration is generated with --example flag.");
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let replay_path = match args.iter().position(|a| a == "--replay") {
        Some(i) => match args.get(i + 1) {
            Some(path) => Some(PathBuf::from(path)),
            None => {
                print_usage(&args[0]);
                std::process::exit(1);
            }
        },
        None => None,
    };

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: EvolutionConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    println!("Staircase Evolution");
    println!("===================");
    println!(
        "World: {}px wide, {} steps of {:.2}px",
        config.world.width,
        config.world.steps,
        config.world.step_width()
    );
    println!(
        "Population: {} ({} survivors), {} generations",
        config.population.size, config.population.survivors, config.population.max_generations
    );
    println!(
        "Goal height: {} -> {} ({}/generation)",
        config.goal.initial_height, config.goal.min_height, config.goal.decay_per_generation
    );
    println!("Time budget: {}ms", config.evaluation.time_budget_ms);
    println!();

    let world = config.world.clone();
    let time_budget = config.evaluation.time_budget();

    let mut engine = EvolutionEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    });

    println!("Running evolution...");
    let result = engine.run_with_callback(|progress| {
        let best = progress
            .best_candidate
            .as_ref()
            .map(|b| b.fitness.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  Generation {}/{}: goal={:.1}, completed={}/{}, best: {}",
            progress.generation,
            progress.total_generations,
            progress.goal_height,
            progress.completed,
            progress.population_size,
            best
        );
    });

    println!();
    println!("Stopped: {:?}", result.stats.stop_reason);
    println!(
        "Generations: {} ({} episodes, {:.1} episodes/s)",
        result.stats.generations, result.stats.total_evaluations, result.stats.evaluations_per_second
    );
    match result.stats.best_time {
        Some(t) => println!("Best time seen: {:.3}s", t),
        None => println!("Best time seen: none"),
    }
    println!("Time: {:.2}s", result.stats.elapsed_seconds);

    let Some(best) = result.best else {
        println!("No member was evaluated.");
        return;
    };

    println!();
    println!(
        "Best member #{} (generation {}, goal height {:.1}): {}",
        best.id, best.generation, best.goal_height, best.fitness
    );

    if let Some(path) = replay_path {
        let runner = EpisodeRunner::new(world);
        let replay = record_episode(
            &runner,
            best.profile.heights(),
            best.goal_height,
            time_budget,
            RecorderConfig::default(),
        );

        if let Err(e) = replay.save_json(&path) {
            eprintln!("Error writing replay: {}", e);
            std::process::exit(1);
        }
        println!("Replay written to {} ({})", path.display(), replay);
    }
}

fn print_example_config() {
    let config = EvolutionConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
