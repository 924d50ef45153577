use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Installs the process-wide subscriber. `verbose` raises the default
/// level for our own crates; dependencies stay at `warn` regardless, since
/// `reqwest`/`tokio` chatter is rarely what a `corral` invocation is run to
/// see.
pub(crate) fn setup(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    let targets = Targets::new()
        .with_target(
            "corral_source",
            default_level
                .parse::<tracing::level_filters::LevelFilter>()
                .unwrap(),
        )
        .with_target(
            "corral_resolver",
            default_level
                .parse::<tracing::level_filters::LevelFilter>()
                .unwrap(),
        )
        .with_target(
            "corral_analyzer",
            default_level
                .parse::<tracing::level_filters::LevelFilter>()
                .unwrap(),
        )
        .with_target(
            "corral_cli",
            default_level
                .parse::<tracing::level_filters::LevelFilter>()
                .unwrap(),
        )
        .with_default(tracing::level_filters::LevelFilter::WARN);

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(false)
            .without_time()
            .with_filter(EnvFilter::from_default_env())
            .with_filter(targets),
    );
    let _ = subscriber.try_init();
}
