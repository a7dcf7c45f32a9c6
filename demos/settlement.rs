use clap::Parser;
use log::info;

use dnf_rs::eval::SCALE;
use dnf_rs::reference::ExprId;
use dnf_rs::store::ExpressionStore;
use dnf_rs::types::Var;

#[derive(Debug, Parser)]
struct Cli {
    /// Number of binary events to partition over.
    #[arg(value_name = "INT", default_value = "3")]
    events: u64,

    /// Settled probability of every event, in percent.
    #[arg(long, value_name = "INT", default_value = "50")]
    percent: u128,

    /// Print the DOT rendering of the final partition.
    #[arg(long)]
    dot: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let store = ExpressionStore::default();
    println!("store = {:?}", store);

    // Start from TRUE and split every position on every event: the leaves
    // form a partition of all outcomes.
    let mut positions = vec![ExprId::TRUE];
    for v in 1..=args.events {
        let var = Var::new(v);
        let mut next = Vec::with_capacity(positions.len() * 2);
        for p in positions {
            let (with, without) = store.split_expression(p, var)?;
            next.push(with);
            next.push(without);
        }
        positions = next;
    }
    info!("{} positions after {} splits", positions.len(), args.events);

    let value = SCALE * args.percent.min(100) / 100;
    let vars: Vec<Var> = (1..=args.events).map(Var::new).collect();
    let values = vec![value; vars.len()];

    let mut total = 0;
    for &p in &positions {
        let v = store.evaluate_expression_with_values(p, &vars, &values)?;
        println!("{} = {} -> {}", p, store.to_formula_string(p)?, v);
        total += v;
    }
    println!("sum over the partition = {} (scale = {})", total, SCALE);

    // Recombine pairwise along the last event back to TRUE.
    let mut level = positions.clone();
    for v in (1..=args.events).rev() {
        let var = Var::new(v);
        level = level
            .chunks(2)
            .map(|pair| store.merge_expressions_on_variable(pair[0], pair[1], var))
            .collect::<Result<_, _>>()?;
    }
    println!("merged back: {:?}", level);

    // Settle the first event to true.
    if let Some(&first) = vars.first() {
        let settled = store.simplify_expression(positions[0], &[first], &[SCALE])?;
        println!("{} after settling {} = {}", positions[0], first, store.to_formula_string(settled)?);
        println!("{}", store.expression_info(settled)?);
    }

    if args.dot {
        println!("{}", store.to_dot(&positions)?);
    }

    let events = store.drain_events();
    println!("{} distinct expressions created", events.len());
    println!("store = {:?}", store);

    Ok(())
}
