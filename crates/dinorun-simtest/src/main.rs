//! dinorun Headless Generation Harness
//!
//! Drives the arena the way an evolutionary optimizer would: one batch of
//! policies per generation, fitness back out. Policies are randomly sampled
//! feed-forward networks; nothing is trained. Every tick is checked against
//! the arena's invariants and the run exits non-zero on any failure.
//!
//! Usage:
//!   cargo run -p dinorun-simtest
//!   cargo run -p dinorun-simtest -- --generations 20 --population 100 --verbose
//!   cargo run -p dinorun-simtest -- --config arena.json --snapshots ticks.jsonl

mod mlp;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dinorun_core::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use mlp::FeedForward;

#[derive(Parser)]
#[command(name = "dinorun-simtest")]
#[command(about = "Headless generation harness for the dinorun arena")]
struct Cli {
    /// Arena configuration file (JSON); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generations to run
    #[arg(short, long, default_value = "5")]
    generations: u32,

    /// Policies per generation
    #[arg(short, long, default_value = "50")]
    population: usize,

    /// Hidden units of the sampled networks
    #[arg(long, default_value = "8")]
    hidden: usize,

    /// Seed for network sampling
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Tick cap applied when the configuration sets none
    #[arg(long, default_value = "5000")]
    max_ticks: u64,

    /// Write every tick's snapshot as a JSON line
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Print passing checks too
    #[arg(short, long)]
    verbose: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ArenaConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ArenaConfig::default(),
    };
    if config.max_ticks.is_none() {
        config.max_ticks = Some(cli.max_ticks);
    }

    println!("=== dinorun Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration
    results.extend(validate_config(&config));

    // 2. Jump arc
    results.extend(validate_jump_arc(&config)?);

    // 3. Speed ramp
    results.extend(validate_speed_ramp(&config)?);

    // 4. First-tick collision
    results.extend(validate_first_tick_collision(&config)?);

    // 5. Sampled generations
    let mut snapshots = match &cli.snapshots {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => None,
    };
    results.extend(run_generations(&cli, &config, snapshots.as_mut())?);
    if let Some(mut writer) = snapshots {
        writer.flush().context("flushing snapshots")?;
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || cli.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Same arena, but with obstacles lifted out of reach so nothing dies
fn untouchable(config: &ArenaConfig) -> ArenaConfig {
    let mut config = config.clone();
    config.obstacles.lane_y = config.agent.ground_y - 10_000.0;
    config.max_ticks = None;
    config
}

fn constant(value: f32, arity: usize) -> FnPolicy<impl Fn(&[f32]) -> Vec<f32>> {
    FnPolicy(move |_: &[f32]| vec![value; arity])
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(config: &ArenaConfig) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    results.push(match config.validate() {
        Ok(()) => TestResult::new("config_valid", true, "all constants accepted"),
        Err(e) => TestResult::new("config_valid", false, e.to_string()),
    });

    let roundtrip = config
        .to_json()
        .and_then(|json| ArenaConfig::from_json(&json))
        .map(|back| back == *config);
    results.push(TestResult::new(
        "config_json_roundtrip",
        matches!(roundtrip, Ok(true)),
        format!("{:?}", roundtrip.map_err(|e| e.to_string())),
    ));

    results
}

// ── 2. Jump arc ─────────────────────────────────────────────────────────

fn validate_jump_arc(config: &ArenaConfig) -> Result<Vec<TestResult>> {
    println!("--- Jump arc ---");
    let mut results = Vec::new();

    let mut arena = Arena::new(untouchable(config))?;
    let entity = arena.populate(1)[0];
    let policies = [constant(1.0, 3)];

    let mut landings = Vec::new();
    let mut below_ground = 0;
    let mut apex = f32::MAX;
    for _ in 0..400 {
        let outcome = arena.step(&policies);
        let Some(agent) = arena.agent(entity) else {
            break;
        };
        if agent.y > agent.ground_y() {
            below_ground += 1;
        }
        apex = apex.min(agent.y);
        if agent.motion == MotionState::Grounded {
            landings.push(outcome.tick);
        }
    }

    results.push(TestResult::new(
        "jump_never_below_ground",
        below_ground == 0,
        format!("{} ticks below ground, apex y={:.1}", below_ground, apex),
    ));

    let periodic = landings.len() >= 2
        && landings
            .iter()
            .enumerate()
            .all(|(i, tick)| *tick == landings[0] * (i as u64 + 1));
    results.push(TestResult::new(
        "jump_arc_periodic",
        periodic,
        format!(
            "{} landings, first at tick {}",
            landings.len(),
            landings.first().copied().unwrap_or(0)
        ),
    ));

    Ok(results)
}

// ── 3. Speed ramp ───────────────────────────────────────────────────────

fn validate_speed_ramp(config: &ArenaConfig) -> Result<Vec<TestResult>> {
    println!("--- Speed ramp ---");
    let mut results = Vec::new();
    let d = &config.difficulty;

    let mut arena = Arena::new(untouchable(config))?;
    arena.populate(1);
    let policies = [constant(0.0, 3)];

    let expected_ticks = if d.increment > 0.0 {
        ((d.ceiling - d.baseline) / d.increment).ceil() as u64
    } else {
        0
    };

    let mut monotonic = true;
    let mut clamped_at = None;
    let mut last = arena.speed();
    for _ in 0..expected_ticks + 50 {
        let outcome = arena.step(&policies);
        monotonic &= outcome.speed >= last && outcome.speed <= d.ceiling;
        if clamped_at.is_none() && outcome.speed >= d.ceiling {
            clamped_at = Some(outcome.tick);
        }
        last = outcome.speed;
    }

    results.push(TestResult::new(
        "speed_monotonic_and_bounded",
        monotonic,
        format!("final speed {:.3}, ceiling {:.3}", last, d.ceiling),
    ));

    // accumulated float error may shift the clamp by a tick
    let clamped_near_expected = match clamped_at {
        Some(tick) => tick.abs_diff(expected_ticks.max(1)) <= 1,
        None => d.increment == 0.0,
    };
    results.push(TestResult::new(
        "speed_ceiling_reached",
        clamped_near_expected,
        format!("clamped at {:?}, expected ~{}", clamped_at, expected_ticks),
    ));

    Ok(results)
}

// ── 4. First-tick collision ─────────────────────────────────────────────

fn validate_first_tick_collision(config: &ArenaConfig) -> Result<Vec<TestResult>> {
    println!("--- First-tick collision ---");
    let mut results = Vec::new();

    // standing on the agent's feet, lined up with it after the first advance
    let first_speed = (config.difficulty.baseline + config.difficulty.increment)
        .min(config.difficulty.ceiling);
    let blocker = Obstacle::new(
        ObstacleKind::Ground(GroundKind::Large),
        config.agent.x + first_speed,
        config.agent.ground_y + config.agent.height,
    );
    let mut arena = Arena::with_obstacles(untouchable(config), vec![blocker])?;
    let report = arena.run_generation(&[constant(0.0, 3)]);

    let expected = -config.fitness.penalty;
    results.push(TestResult::new(
        "first_tick_elimination",
        report.ticks == 1 && report.fitness == vec![expected],
        format!("ticks={}, fitness={:?}", report.ticks, report.fitness),
    ));

    Ok(results)
}

// ── 5. Sampled generations ──────────────────────────────────────────────

/// One line of the snapshot file: every tick, then the generation's report
#[derive(Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum SnapshotLine<'a> {
    Tick(&'a ArenaSnapshot),
    Report(&'a GenerationReport),
}

fn write_line(writer: &mut BufWriter<File>, line: &SnapshotLine<'_>) -> Result<()> {
    writeln!(writer, "{}", serde_json::to_string(line)?)?;
    Ok(())
}

fn run_generations(
    cli: &Cli,
    config: &ArenaConfig,
    mut snapshots: Option<&mut BufWriter<File>>,
) -> Result<Vec<TestResult>> {
    println!("--- Sampled generations ---");
    let mut results = Vec::new();

    let mut arena = Arena::new(config.clone())?;
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let inputs = config.decision.layout.arity();
    let outputs = config.decision.mode.output_arity();
    let penalty = config.fitness.penalty;

    for _ in 0..cli.generations {
        let generation = arena.generation();
        let policies: Vec<FeedForward> = (0..cli.population)
            .map(|_| FeedForward::random(&mut rng, inputs, cli.hidden, outputs))
            .collect();

        let mut violations: Vec<String> = Vec::new();
        let mut write_error = None;
        let mut last_speed = config.difficulty.baseline;
        let mut previous: Vec<(bool, f32)> = vec![(true, 0.0); policies.len()];

        let report = arena.run_generation_observed(&policies, |snapshot| {
            if snapshot.speed < last_speed || snapshot.speed > config.difficulty.ceiling {
                violations.push(format!("tick {}: speed {:.3}", snapshot.tick, snapshot.speed));
            }
            last_speed = snapshot.speed;

            for agent in &snapshot.agents {
                if agent.y > config.agent.ground_y {
                    violations.push(format!(
                        "tick {}: agent {} below ground",
                        snapshot.tick, agent.slot
                    ));
                }
                let (was_alive, before) = previous[agent.slot];
                let consistent = if agent.alive {
                    agent.fitness >= before
                } else if was_alive {
                    agent.fitness == before - penalty
                } else {
                    agent.fitness == before
                };
                if !consistent {
                    violations.push(format!(
                        "tick {}: agent {} fitness {} -> {}",
                        snapshot.tick, agent.slot, before, agent.fitness
                    ));
                }
                previous[agent.slot] = (agent.alive, agent.fitness);
            }

            if let Some(writer) = snapshots.as_mut() {
                if write_error.is_none() {
                    write_error = write_line(writer, &SnapshotLine::Tick(snapshot)).err();
                }
            }
        });
        if let Some(e) = write_error {
            return Err(e).context("writing snapshots");
        }
        if let Some(writer) = snapshots.as_mut() {
            write_line(writer, &SnapshotLine::Report(&report)).context("writing snapshots")?;
        }

        for violation in &violations {
            log::warn!("Generation {}: {}", generation, violation);
        }
        log::info!(
            "gen {:>3}: {:>5} ticks, score {:>4}, best {:>8.2}, mean {:>8.2}, top speed {:.1}{}",
            report.generation,
            report.ticks,
            report.score,
            report.best().unwrap_or(0.0),
            report.mean().unwrap_or(0.0),
            report.top_speed,
            if report.truncated { " (capped)" } else { "" }
        );

        results.push(TestResult::new(
            format!("gen{}_invariants", generation),
            violations.is_empty(),
            match violations.first() {
                Some(first) => format!("{} violations, first: {}", violations.len(), first),
                None => format!("{} ticks clean", report.ticks),
            },
        ));
        results.push(TestResult::new(
            format!("gen{}_report", generation),
            report.generation == generation
                && report.fitness.len() == policies.len()
                && arena.generation() == generation + 1
                && arena.agent_count() == 0
                && arena.score() == 0,
            format!(
                "{} fitness values, arena now at generation {}",
                report.fitness.len(),
                arena.generation()
            ),
        ));
    }

    Ok(results)
}
