//! Line-delimited JSON front end: one clustering request per stdin line, one reply per stdout line.
use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use rand::prelude::*;
use std::io::{self, BufRead, Write};
use stepwise_kmeans::wire::{generate_dataset, ClusterRequest};

#[derive(Parser)]
#[clap(version, about = "Run k-means clustering requests read from stdin")]
struct Opts {
    /// Reply with every iteration, even for requests that did not ask for it
    #[clap(short, long)]
    step: bool,

    /// Seed for requests that carry no seed of their own
    #[clap(long)]
    seed: Option<u64>,

    /// Print a random dataset of this many points and exit
    #[clap(short, long, value_name = "N")]
    generate: Option<usize>,
}

fn process_line(line: &str, opts: &Opts) -> serde_json::Value {
    let reply = serde_json::from_str::<ClusterRequest>(line)
        .map_err(|e| format!("malformed request: {}", e))
        .and_then(|mut request| {
            request.step |= opts.step;
            request.run(opts.seed).map_err(|e| e.to_string())
        })
        .and_then(|reply| serde_json::to_value(reply).map_err(|e| e.to_string()));
    match reply {
        Ok(value) => value,
        Err(msg) => {
            log::warn!("{}", msg);
            serde_json::json!({ "error": msg })
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().filter_or("RUST_LOG", "warn"));
    let opts = Opts::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(n) = opts.generate {
        let mut rnd = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        serde_json::to_writer(&mut out, &generate_dataset(n, &mut rnd)).context("failed to write dataset")?;
        writeln!(out).context("failed to write dataset")?;
        return Ok(());
    }

    for (line_nr, line) in io::stdin().lock().lines().enumerate() {
        let line = line.with_context(|| format!("failed to read input line {}", line_nr + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = process_line(&line, &opts);
        serde_json::to_writer(&mut out, &reply).with_context(|| format!("failed to write reply {}", line_nr + 1))?;
        writeln!(out).context("failed to write reply")?;
        out.flush().context("failed to flush stdout")?;
    }
    Ok(())
}
