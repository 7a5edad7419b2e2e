use anyhow::Context;
use auto_pca::config::PipelineConfig;
use auto_pca::dataset;
use auto_pca::pipeline;
use clap::Parser;
use log::error;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(
    name = "auto-pca",
    version,
    about = "Principal component analysis and least-squares regression on auto-mpg style data."
)]
struct Args {
    /// Delimited input file with a header row.
    #[clap(long)]
    data: PathBuf,

    /// TOML pipeline configuration. Built-in defaults apply when omitted.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Number of principal components to keep.
    #[clap(long)]
    components: Option<usize>,

    /// Fraction of rows held out for testing.
    #[clap(long)]
    test_fraction: Option<f64>,

    /// Seed for the train/test shuffle.
    #[clap(long)]
    seed: Option<u64>,

    /// Write the projected training rows and target to this CSV file.
    #[clap(long)]
    export_projection: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[clap(long)]
    json: bool,
}

fn resolve_config(args: &Args) -> anyhow::Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(k) = args.components {
        config.n_components = k;
    }
    if let Some(fraction) = args.test_fraction {
        config.test_fraction = fraction;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let records = dataset::load_csv(&args.data, config.delimiter_byte())?;
    let output = pipeline::run_records(&config, &records)?;

    if let Some(path) = &args.export_projection {
        dataset::write_projection_csv(
            path,
            output.projected_train.view(),
            output.train.target.view(),
            &output.train.target_name,
        )?;
    }

    if args.json {
        let json = serde_json::to_string_pretty(&output.report)
            .context("failed to serialize report")?;
        println!("{}", json);
    } else {
        println!("{}", output.report);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{:#}", e);
        process::exit(1);
    }
}
