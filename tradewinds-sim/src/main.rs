use anyhow::{bail, Context, Result};
use clap::Parser;
use tradewinds_core::{
    AutoPolicy, CrewQuality, JsonFileStore, StateStore, TradeMode, VoyageConfig, VoyageEngine,
    VoyagePhase, VoyageReport,
};
use tradewinds_data::Registries;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a trading voyage and print the report", long_about = None)]
struct Args {
    /// Ship template id
    #[arg(long, default_value = "cog")]
    ship: String,

    /// Route id
    #[arg(long, default_value = "amber-run")]
    route: String,

    /// Dice seed; the same seed replays the same voyage
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Starting capital in gold pieces
    #[arg(long, default_value_t = 5000)]
    gold: u32,

    /// Trade on consignment instead of speculation
    #[arg(long)]
    consignment: bool,

    /// Crew commission percent for consignment voyages
    #[arg(long, default_value_t = 25)]
    commission: u32,

    /// Crew quality: landlubber, green, average, trained, crack, old-salts
    #[arg(long, default_value = "average")]
    crew: String,

    /// Man the oars when becalmed
    #[arg(long)]
    rowing: bool,

    /// Write the full voyage report as JSON
    #[arg(long)]
    report: Option<std::path::PathBuf>,

    /// Write the event stream as JSONL
    #[arg(long)]
    events: Option<std::path::PathBuf>,

    /// Persist voyage snapshots under this directory
    #[arg(long)]
    save_dir: Option<std::path::PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// List available ships and routes and exit
    #[arg(long)]
    list: bool,
}

fn parse_crew_quality(name: &str) -> Result<CrewQuality> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "landlubber" => CrewQuality::Landlubber,
        "green" => CrewQuality::Green,
        "average" => CrewQuality::Average,
        "trained" => CrewQuality::Trained,
        "crack" => CrewQuality::Crack,
        "old-salts" | "old_salts" => CrewQuality::OldSalts,
        other => bail!("unknown crew quality: {other}"),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let data = Registries::builtin();

    if args.list {
        println!("Ships:");
        let mut ships: Vec<_> = data.ships.template_ids().collect();
        ships.sort();
        for id in ships {
            let t = data.ships.template(id).expect("listed id");
            println!(
                "  {id:10} hull {:3}  capacity {:3} loads  {} mi/day",
                t.hull_max,
                t.cargo_capacity,
                t.base_speed_mi()
            );
        }
        println!("Routes:");
        let mut routes: Vec<_> = data.ports.route_ids().collect();
        routes.sort();
        for id in routes {
            let r = data.ports.route(id).expect("listed id");
            let kind = if r.circuit { "circuit" } else { "one-way" };
            println!("  {id:15} {} ({kind}): {}", r.name, r.ports.join(" -> "));
        }
        return Ok(());
    }

    let mut config = VoyageConfig::example();
    config.ship_id = args.ship;
    config.route_id = args.route;
    config.starting_gold = args.gold;
    config.enable_rowing = args.rowing;
    config.crew_quality = parse_crew_quality(&args.crew)?;
    if args.consignment {
        config.trade_mode = TradeMode::Consignment;
        config.commission_rate_pct = Some(args.commission);
    }

    let mut engine = VoyageEngine::start(
        config,
        &data,
        args.seed,
        None, // no weather host attached; the engine falls back to 2d10+5 winds
        Box::new(AutoPolicy::default()),
    )
    .context("voyage configuration rejected")?;

    log::info!("Voyage {} under way (seed {})", engine.state().id, args.seed);

    let mut store = match &args.save_dir {
        Some(dir) => Some(JsonFileStore::new(dir).context("cannot open save directory")?),
        None => None,
    };

    let mut prev_treasury = engine.state().treasury;
    loop {
        let phase = engine.simulate_day()?;

        let state = engine.state();
        let delta = state.treasury - prev_treasury;
        prev_treasury = state.treasury;
        let color = if delta > 0 {
            "\x1b[32m+"
        } else if delta < 0 {
            "\x1b[31m"
        } else {
            "\x1b[90m"
        };
        log::info!(
            "Day {:3} | {} | {:4} mi | hull {:2}/{:2} | treasury {:6} gp ({color}{delta}\x1b[0m)",
            state.total_days,
            state.date,
            state.total_distance,
            state.ship.hull.value,
            state.ship.hull.max,
            state.treasury,
        );

        if let Some(store) = store.as_mut() {
            store.save(state)?;
        }
        if matches!(phase, VoyagePhase::Final | VoyagePhase::Failed) {
            break;
        }
    }

    let report = VoyageReport::from_state(engine.state());
    println!("{}", report.summary());

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_vec_pretty(&report)?)
            .with_context(|| format!("cannot write report to {}", path.display()))?;
        log::info!("Report written to {}", path.display());
    }
    if let Some(path) = &args.events {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot write events to {}", path.display()))?;
        tradewinds_core::events::write_jsonl(&report.events, file)?;
        log::info!("Events written to {}", path.display());
    }

    if engine.state().phase == VoyagePhase::Failed {
        bail!("voyage failed: {} lost at sea", report.ship);
    }
    Ok(())
}
