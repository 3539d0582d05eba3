//! Fetch and resolve commands.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::engine::YtDlp;
use crate::pipeline::Pipeline;
use crate::tags::LoftyTagWriter;

use super::{ConsoleObserver, SongInput, read_songs};

/// Search, download, rename and tag every song in the input
pub fn cmd_fetch(rt: &Runtime, input: &SongInput, config: Config) -> anyhow::Result<()> {
    let parsed = read_songs(input)?;
    if parsed.is_empty() {
        anyhow::bail!("No valid songs to fetch");
    }

    println!(
        "Fetching {} songs into {:?}\n",
        parsed.descriptors.len(),
        config.output.directory
    );

    let engine = YtDlp::new(&config.download.engine);
    let tag_writer = LoftyTagWriter;
    let observer = ConsoleObserver;
    let pipeline = Pipeline::new(&engine, &engine, config)
        .with_tag_writer(Some(&tag_writer))
        .with_observer(&observer);

    let report = rt.block_on(pipeline.run(parsed));

    println!();
    println!("{}", report);

    if report.is_failure() {
        anyhow::bail!(
            "{}",
            report
                .acquisition_error
                .as_deref()
                .unwrap_or("Nothing was fetched")
        );
    }
    Ok(())
}

/// Resolve songs without downloading anything
pub fn cmd_resolve(rt: &Runtime, input: &SongInput, config: Config) -> anyhow::Result<()> {
    let parsed = read_songs(input)?;
    if parsed.is_empty() {
        anyhow::bail!("No valid songs to resolve");
    }

    let engine = YtDlp::new(&config.download.engine);
    let observer = ConsoleObserver;
    let pipeline = Pipeline::new(&engine, &engine, config).with_observer(&observer);

    let resolution = rt.block_on(pipeline.resolve(&parsed.descriptors));

    println!(
        "\nMatched {} of {} songs [DRY RUN - nothing downloaded]",
        resolution.resolved.len(),
        resolution.total()
    );
    for source in &resolution.resolved {
        println!("  ✓ {} → {}", source.descriptor, source.remote_url);
    }
    for entry in &resolution.unresolved {
        println!("  ✗ {}: {}", entry.descriptor, entry.reason);
    }
    Ok(())
}
