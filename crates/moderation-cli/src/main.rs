use std::collections::BTreeMap;
use std::env;

use contracts::SessionConfig;
use moderation_core::ModerationWorld;

fn print_usage() {
    println!("moderation-cli <command>");
    println!("commands:");
    println!("  status");
    println!("  step <n> [delta-ms]");
    println!("  simulate <run_id> <seed> [duration-ms] [delta-ms]");
    println!("    runs a deterministic unattended session to its outcome");
    println!("  trace <run_id> <seed> [duration-ms] [delta-ms]");
    println!("    same as simulate, printing the event log as JSON lines");
    println!("    default delta-ms: 100");
}

fn parse_u64(value: Option<&String>, label: &str) -> Result<u64, String> {
    let raw = value.ok_or_else(|| format!("missing {label}"))?;
    raw.parse::<u64>()
        .map_err(|_| format!("invalid {label}: {raw}"))
}

fn parse_u64_or(value: Option<&String>, label: &str, fallback: u64) -> Result<u64, String> {
    match value {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| format!("invalid {label}: {raw}")),
        None => Ok(fallback),
    }
}

fn session_config(args: &[String]) -> Result<(SessionConfig, u64), String> {
    let run_id = args
        .get(2)
        .cloned()
        .ok_or_else(|| "missing run_id".to_string())?;
    let seed = parse_u64(args.get(3), "seed")?;
    let duration_ms = parse_u64_or(args.get(4), "duration-ms", contracts::DEFAULT_SESSION_DURATION_MS)?;
    let delta_ms = parse_u64_or(args.get(5), "delta-ms", 100)?;
    if delta_ms == 0 {
        return Err("delta-ms must be nonzero".to_string());
    }
    let config = SessionConfig {
        run_id,
        seed,
        duration_ms,
        ..SessionConfig::default()
    };
    Ok((config, delta_ms))
}

fn event_type_counts(world: &ModerationWorld) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::<String, usize>::new();
    for event in world.events() {
        let key = format!("{:?}", event.event_type);
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn run_simulation(args: &[String], print_events: bool) -> Result<(), String> {
    let (config, delta_ms) = session_config(args)?;
    let seed = config.seed;
    let mut world = ModerationWorld::new(config);
    world.start();
    let committed = world.run_to_completion(delta_ms);

    if print_events {
        for event in world.events() {
            let line = serde_json::to_string(event)
                .map_err(|err| format!("failed to encode event: {err}"))?;
            println!("{line}");
        }
    }

    let status = world.status();
    let outcome = status
        .outcome
        .map(|outcome| outcome.as_str())
        .unwrap_or("none");
    println!(
        "simulated run_id={} seed={} committed={} outcome={} engagement={} stability={} phase={} replay_hash={:016x}",
        world.run_id(),
        seed,
        committed,
        outcome,
        world.engagement(),
        world.stability(),
        status.phase_index + 1,
        world.replay_hash()
    );
    if !print_events {
        for (event_type, count) in event_type_counts(&world) {
            println!("  {event_type}: {count}");
        }
    }
    Ok(())
}

fn run_steps(args: &[String]) -> Result<(), String> {
    let steps = parse_u64(args.get(2), "n")?;
    let delta_ms = parse_u64_or(args.get(3), "delta-ms", 100)?;
    let mut world = ModerationWorld::new(SessionConfig::default());
    world.start();
    let committed = world.step_n(steps, delta_ms);
    let metrics = world.last_step_metrics();
    println!("stepped={} {}", committed, world.status());
    println!(
        "last_step: advanced_ms={} spawned={} exited={}",
        metrics.advanced_ms, metrics.spawned_pairs, metrics.exited_pairs
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let result = match command {
        Some("status") => {
            let world = ModerationWorld::new(SessionConfig::default());
            println!("{}", world.status());
            Ok(())
        }
        Some("step") => run_steps(&args),
        Some("simulate") => run_simulation(&args, false),
        Some("trace") => run_simulation(&args, true),
        _ => {
            print_usage();
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        print_usage();
        std::process::exit(2);
    }
}
