use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use packflow::metrics;
use packflow::sample::SampleCompany;
use packflow::{EngineConfig, Optimizer, ReferenceSolverFactory};

#[derive(Parser)]
#[command(about = "Run synthetic companies through the packflow optimizer")]
struct Args {
    /// Worker threads solving closed solvers
    #[arg(short, long, default_value_t = EngineConfig::default().worker_threads)]
    workers: usize,

    /// Number of synthetic companies
    #[arg(short, long, default_value_t = 8)]
    companies: usize,

    /// Packs submitted by each company
    #[arg(short, long, default_value_t = 200)]
    packs: usize,

    /// Upper bound on problems per pack
    #[arg(short = 'm', long, default_value_t = 10)]
    max_problems: usize,

    /// Polygons per min-cost solver
    #[arg(long, default_value_t = EngineConfig::default().min_capacity)]
    min_capacity: usize,

    /// Polygons per count solver
    #[arg(long, default_value_t = EngineConfig::default().cnt_capacity)]
    cnt_capacity: usize,

    /// Delay before each pack is handed out, in microseconds
    #[arg(long, default_value_t = 0)]
    delay_us: u64,

    /// Seed for the workload generator
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
}

fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("packflow: failed to install tracing subscriber: {err}");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();
    metrics::spawn_reporter();

    let config = EngineConfig {
        min_capacity: args.min_capacity,
        cnt_capacity: args.cnt_capacity,
        worker_threads: args.workers,
    };
    if let Err(err) = config.validate() {
        error!(%err, "invalid configuration");
        return ExitCode::FAILURE;
    }

    let companies: Vec<Arc<SampleCompany>> = (0..args.companies)
        .map(|i| {
            let seed = args.seed.wrapping_add(i as u64);
            let company = SampleCompany::new(seed, args.packs, args.max_problems);
            let company = if args.delay_us > 0 {
                company.with_delay(Duration::from_micros(args.delay_us))
            } else {
                company
            };
            Arc::new(company)
        })
        .collect();

    let factory = match ReferenceSolverFactory::from_config(&config) {
        Ok(factory) => factory,
        Err(err) => {
            error!(%err, "invalid solver configuration");
            return ExitCode::FAILURE;
        }
    };
    let mut optimizer = Optimizer::new(Arc::new(factory));
    for company in &companies {
        if let Err(err) = optimizer.add_company(company.clone()) {
            error!(%err, "failed to register company");
            return ExitCode::FAILURE;
        }
    }

    info!(
        companies = args.companies,
        packs = args.packs,
        workers = config.worker_threads,
        min_capacity = config.min_capacity,
        cnt_capacity = config.cnt_capacity,
        "packflow: starting"
    );
    let start = Instant::now();
    if let Err(err) = optimizer.start(config.worker_threads) {
        error!(%err, "failed to start optimizer");
        return ExitCode::FAILURE;
    }
    if let Err(err) = optimizer.stop() {
        error!(%err, "optimizer stopped with errors");
        return ExitCode::FAILURE;
    }
    let elapsed = start.elapsed();

    let mut failed = 0;
    for (i, company) in companies.iter().enumerate() {
        if !company.all_processed() {
            error!(company = i, errors = company.errors(), "company did not get every pack back");
            failed += 1;
        }
    }
    let total = args.companies * args.packs;
    info!(
        packs = total,
        elapsed_ms = elapsed.as_millis() as u64,
        packs_per_sec = total as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        "packflow: done"
    );

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        info!("all companies processed");
        ExitCode::SUCCESS
    }
}
