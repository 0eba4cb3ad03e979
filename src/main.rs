//! Benchmark harness: solves generated supply-chain instances under each
//! execution mode and prints average timings.
//!
//! Usage: `rilp [products factories warehouses stores] [repetitions]`

use std::env;
use std::process;
use std::time::Instant;

use colored::Colorize;

use rilp::supply_chain::{build_supply_chain_program, ScGenCfg, ScParams};
use rilp::{IpStatus, SolverConfig};

struct ModeOutcome {
    avg_ms: f64,
    avg_nodes: f64,
}

fn run_mode(params: &ScParams, config: SolverConfig, repetitions: u32) -> ModeOutcome {
    let mut total_ms = 0.0;
    let mut total_nodes = 0u64;

    for _ in 0..repetitions {
        let program =
            build_supply_chain_program(params, config).expect("generated instance is well-formed");

        let start = Instant::now();
        let solution = program.solve().expect("generated instance is well-formed");
        total_ms += start.elapsed().as_secs_f64() * 1e3;
        total_nodes += solution.nodes_solved;

        if solution.status != IpStatus::Bounded {
            eprintln!("unexpected status {} on a generated instance", solution.status);
            process::exit(1);
        }
    }

    ModeOutcome {
        avg_ms: total_ms / repetitions as f64,
        avg_nodes: total_nodes as f64 / repetitions as f64,
    }
}

fn parse_args() -> (ScGenCfg, u32) {
    let numbers: Vec<usize> = env::args()
        .skip(1)
        .map(|arg| {
            arg.parse().unwrap_or_else(|_| {
                eprintln!("usage: rilp [products factories warehouses stores] [repetitions]");
                process::exit(2);
            })
        })
        .collect();

    let cfg = match numbers.len() {
        0 | 1 => ScGenCfg::with_dims(3, 3, 3, 3),
        4 | 5 => ScGenCfg::with_dims(numbers[0], numbers[1], numbers[2], numbers[3]),
        _ => {
            eprintln!("usage: rilp [products factories warehouses stores] [repetitions]");
            process::exit(2);
        }
    };
    let repetitions = match numbers.len() {
        1 => numbers[0] as u32,
        5 => numbers[4] as u32,
        _ => 10,
    };
    (cfg, repetitions.max(1))
}

fn main() {
    env_logger::init();

    let (cfg, repetitions) = parse_args();
    let params = ScParams::generate(&cfg);

    println!(
        "{}",
        format!(
            "Supply-chain instance ({} products, {} factories, {} warehouses, {} stores), {} runs per mode",
            cfg.products, cfg.factories, cfg.warehouses, cfg.stores, repetitions
        )
        .bold()
    );

    let scalar = run_mode(&params, SolverConfig::sequential(), repetitions);
    let par_elim = run_mode(
        &params,
        SolverConfig {
            parallel_elimination: true,
            parallel_search: false,
        },
        repetitions,
    );
    let par_both = run_mode(&params, SolverConfig::parallel(), repetitions);

    let elim_speedup = scalar.avg_ms / par_elim.avg_ms;
    let search_speedup = par_elim.avg_ms / par_both.avg_ms;

    println!("{}", "-".repeat(60).dimmed());
    println!("Average LP nodes solved per run: {:.0}", scalar.avg_nodes);
    println!(
        "[elimination: {}, search: {}] {:>10.3} ms/run",
        "scalar".yellow(),
        "sequential".yellow(),
        scalar.avg_ms
    );
    println!(
        "[elimination: {}, search: {}] {:>10.3} ms/run | x {:.2}",
        "parallel".green(),
        "sequential".yellow(),
        par_elim.avg_ms,
        elim_speedup
    );
    println!(
        "[elimination: {}, search: {}] {:>10.3} ms/run | x {:.2}",
        "parallel".green(),
        "parallel".green(),
        par_both.avg_ms,
        search_speedup
    );
    println!("{}", "-".repeat(60).dimmed());
}
