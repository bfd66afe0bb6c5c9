use std::time::Instant;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use console::style;
use tsumiki::{Config, DEFAULT_PORT, Runner, Task, Toolchain};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Task to run: html, js, sass, img, fonts, clean, watch, connect, dev,
    /// dist, work or default.
    #[clap(index = 1, default_value = "default")]
    task: Task,

    /// Project directory containing `src/`.
    #[clap(short = 'C', long, default_value = ".")]
    root: Utf8PathBuf,

    /// Port of the development server.
    #[clap(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tsumiki::logging::init();

    let root = args
        .root
        .canonicalize_utf8()
        .with_context(|| format!("couldn't resolve project directory {}", args.root))?;

    let config = Config::for_task(args.task)
        .with_root(root)
        .with_port(args.port);

    eprintln!(
        "Running {} {} in {} mode.",
        style("tsumiki").red(),
        style(args.task).bold(),
        style(config.environment()).blue()
    );

    let s = Instant::now();
    let runner = Runner::new(config, Toolchain::native());
    let services = runner.run(args.task)?;

    eprintln!(
        "Finished {} in {}ms.",
        style(args.task).bold(),
        s.elapsed().as_millis()
    );

    for service in services {
        tracing::debug!("waiting for {}", service.task());
        service.join()?;
    }

    Ok(())
}
