mod config;
mod source;

use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::bail;
use clap::Parser;
use dash_scheduler::{
    timeline::BasicTimelineConverter, RequestOptions, SchedulerConfig, SchedulerEvent,
    SegmentScheduler, Track,
};

use crate::{
    config::Config,
    source::{ConfigEnumerator, ConfigLoader},
};

/// Print the fragment requests a DASH player would issue for one representation, as JSON lines
#[derive(Parser, Debug, Clone)]
#[clap(version, author)]
pub struct PlanArgs {
    /// Stream description
    #[clap(short, long, default_value = "stream.toml")]
    config: PathBuf,

    /// Presentation time to start from, in seconds
    #[clap(short, long, default_value = "0")]
    time: f64,

    /// Stop after this many media requests
    #[clap(short, long, default_value = "1000")]
    max: usize,

    /// Leave the initialization request out
    #[clap(long)]
    skip_init: bool,
}

fn plan(args: &PlanArgs, config: Config, out: &mut impl Write) -> anyhow::Result<()> {
    let mut representation = config.representation()?;
    let is_dynamic = config.stream.dynamic;

    let timeline = Arc::new(BasicTimelineConverter::new(config.clock()));
    let (mut scheduler, mut events) = SegmentScheduler::new(SchedulerConfig {
        settings: config.settings.clone(),
        timeline_converter: timeline.clone(),
        segment_enumerator: Arc::new(ConfigEnumerator::new(
            config.representation.addressing.clone(),
            timeline.clone(),
        )),
        base_url_resolver: Arc::new(config.base_url()),
        segment_loader: Arc::new(ConfigLoader::new(config.references()?)),
    });
    scheduler.initialize(Track {
        media_type: config.media_type(),
        is_dynamic,
    });

    scheduler.refresh(&mut representation, false);
    while let Some(notification) = scheduler.try_next_notification() {
        scheduler.handle_notification(&mut representation, notification);
    }

    let mut ready = false;
    while let Ok(SchedulerEvent::RepresentationUpdated {
        representation_id,
        error,
        ..
    }) = events.try_recv()
    {
        if let Some(error) = error {
            bail!("representation {representation_id} is unusable: {error}");
        }
        ready = true;
    }
    if !ready {
        bail!("representation {} never became ready", representation.id);
    }
    tracing::info!(
        representation_id = %representation.id,
        is_dynamic,
        segments = representation.available_segments_number,
        range = ?representation.segment_availability_range,
        "Representation ready"
    );

    if !args.skip_init {
        match scheduler.init_request(&representation) {
            Some(request) => writeln!(out, "{}", serde_json::to_string(&request)?)?,
            None => tracing::warn!("Unable to build the initialization request"),
        }
    }

    let mut count = 0;
    let mut request =
        scheduler.resolve_at_time(&mut representation, args.time, RequestOptions::default());
    while let Some(current) = request {
        writeln!(out, "{}", serde_json::to_string(&current)?)?;
        if current.is_complete() {
            tracing::info!(count, "Reached the end of the representation");
            return Ok(());
        }

        count += 1;
        if count >= args.max {
            tracing::info!(count, "Request limit reached");
            return Ok(());
        }
        request = scheduler.advance(&mut representation);
    }

    if is_dynamic {
        tracing::info!(
            count,
            index = ?scheduler.index(),
            live_edge = ?timeline.expected_live_edge(),
            "Caught up with the live edge"
        );
    } else {
        tracing::warn!(count, index = ?scheduler.index(), "No request for the next segment");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .try_from_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = PlanArgs::parse();
    let config = Config::load(&args.config)?;

    let stdout = std::io::stdout();
    plan(&args, config, &mut stdout.lock())
}
