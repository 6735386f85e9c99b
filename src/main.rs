use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::prelude::*;

use ainfinity_modules::a_infinity::{dynkin::DynkinGraph, module::A8Module};
use ainfinity_modules::base_ring::{field_generals::Field, finite_field::Zp, rationals::Rational};
use ainfinity_modules::linear_algebra::vector_space::Degree;

/// Twist a Yoneda module of a Brieskorn-Pham category along a word of objects
/// and report how its cohomology spreads out.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Config {
    /// characteristic of the coefficient field, 0 for the rationals
    #[arg(long, default_value_t = 2)]
    prime: u64,

    #[arg(short, default_value_t = 2)]
    p: usize,

    #[arg(short, default_value_t = 3)]
    q: usize,

    /// Calabi-Yau dimension
    #[arg(short = 'n', long, default_value_t = 2)]
    dimension: Degree,

    /// degree of the short arrows
    #[arg(short = 'd', long, default_value_t = 1)]
    grading: Degree,

    /// object whose Yoneda module is twisted
    #[arg(long, default_value_t = 1)]
    start: usize,

    /// objects to twist around, in order
    #[arg(long, value_delimiter = ',', default_value = "2,2,2")]
    twist: Vec<usize>,

    /// check the A∞ relations after every step
    #[arg(long, default_value_t = false)]
    verify: bool,
}

fn report(step: &str, module: &A8Module<'_, usize, impl Field + 'static>) -> anyhow::Result<()> {
    let total = module.total()?;
    let width = module.width()?;
    println!(
        "{step:>12}  dim {:>6}  total {total:?}  width {}",
        module.dimension(),
        width.map_or_else(|| "-".to_string(), |(low, high)| format!("{low}..{high}"))
    );
    Ok(())
}

fn run<F: Field + 'static>(config: &Config) -> anyhow::Result<()> {
    let graph = DynkinGraph::brieskorn_pham(config.p, config.q, config.grading);
    let category = graph
        .categorify::<F>(config.dimension)
        .context("building the category")?;
    info!(
        objects = graph.vertices().count(),
        operations = category.operations().count(),
        "category ready"
    );
    if config.verify {
        category.verify().context("category relations")?;
    }
    let mut module = category
        .yoneda(&config.start)
        .with_context(|| format!("Yoneda module of {}", config.start))?;
    report(&format!("Y({})", config.start), &module)?;
    for object in &config.twist {
        module = module
            .twist(object)
            .with_context(|| format!("twisting around {object}"))?;
        if config.verify {
            module
                .verify()
                .with_context(|| format!("module relations after twisting around {object}"))?;
        }
        report(&format!("T({object})"), &module)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ainfinity_modules=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    info!(?config, "starting");
    match config.prime {
        0 => run::<Rational>(&config),
        2 => run::<Zp<2>>(&config),
        3 => run::<Zp<3>>(&config),
        5 => run::<Zp<5>>(&config),
        7 => run::<Zp<7>>(&config),
        11 => run::<Zp<11>>(&config),
        13 => run::<Zp<13>>(&config),
        other => bail!("no coefficient field of characteristic {other}, use 0, 2, 3, 5, 7, 11 or 13"),
    }
}
