use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use dataprov_engine::{DataProvider, InMemoryStore};
use dataprov_types::{FetchSpec, Params, ProviderSettings, StoreMethod};
use dataprov_util::{load_fixture, load_settings, load_settings_from};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let settings = match matches.get_one::<PathBuf>("settings") {
        Some(path) => load_settings_from(path)?,
        None => load_settings()?,
    };
    init_tracing(&settings);
    run(&matches, settings).await
}

fn init_tracing(settings: &ProviderSettings) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_filter(settings))
        .with_writer(std::io::stderr)
        .try_init();
}

/// `RUST_LOG` first, then the settings `log_filter`, then `info`. Directives
/// that fail to parse fall back to `info`.
fn tracing_filter(settings: &ProviderSettings) -> EnvFilter {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|directives| !directives.trim().is_empty())
        .or_else(|| settings.log_filter.clone())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn build_cli() -> Command {
    Command::new("dataprov")
        .about("Fetch records from a fixture-backed store the way a data provider component would")
        .arg(
            Arg::new("fixture")
                .long("fixture")
                .short('f')
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a JSON/YAML fixture mapping model names to records"),
        )
        .arg(Arg::new("model").required(true).help("Model name to fetch"))
        .arg(Arg::new("record_id").help("Record id; implies findRecord unless --query is given"))
        .arg(
            Arg::new("method")
                .long("method")
                .short('m')
                .value_parser(value_parser!(StoreMethod))
                .help("Explicit store method (query, queryRecord, findRecord, findAll, peekAll, peekRecord)"),
        )
        .arg(Arg::new("query").long("query").short('q').help("Query object as JSON"))
        .arg(Arg::new("options").long("options").help("Store options object as JSON"))
        .arg(
            Arg::new("throw-error")
                .long("throw-error")
                .action(ArgAction::SetTrue)
                .help("Exit with an error when the fetch fails"),
        )
        .arg(
            Arg::new("reload")
                .long("reload")
                .value_parser(value_parser!(u32))
                .default_value("0")
                .help("Number of reloads to run after the initial fetch"),
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_parser(value_parser!(PathBuf))
                .help("Settings file (defaults to DATAPROV_SETTINGS_PATH or the config dir)"),
        )
}

async fn run(matches: &ArgMatches, settings: ProviderSettings) -> Result<()> {
    let fixture_path = matches
        .get_one::<PathBuf>("fixture")
        .context("expected --fixture")?;
    let fixture = load_fixture(fixture_path)?;
    let store = Arc::new(InMemoryStore::from_fixture(fixture));

    let spec = spec_from_matches(matches)?;
    info!(model = %spec.model_name, fixture = %fixture_path.display(), "starting provider");

    let provider = DataProvider::builder(store, spec).settings(&settings).build();
    provider.mount().await?;

    let reloads = matches.get_one::<u32>("reload").copied().unwrap_or_default();
    let handle = provider.reload_handle();
    for _ in 0..reloads {
        handle.reload().await?;
    }

    println!("{}", serde_json::to_string_pretty(&provider.projection())?);
    Ok(())
}

fn spec_from_matches(matches: &ArgMatches) -> Result<FetchSpec> {
    let model = matches.get_one::<String>("model").context("expected a model name")?;
    let mut spec = FetchSpec::new(model.as_str()).with_throw_error(matches.get_flag("throw-error"));

    if let Some(id) = matches.get_one::<String>("record_id") {
        spec = spec.with_record_id(id.as_str());
    }
    if let Some(method) = matches.get_one::<StoreMethod>("method") {
        spec = spec.with_store_method(*method);
    }
    if let Some(raw) = matches.get_one::<String>("query") {
        spec = spec.with_query(parse_params("--query", raw)?);
    }
    if let Some(raw) = matches.get_one::<String>("options") {
        spec = spec.with_options(parse_params("--options", raw)?);
    }
    Ok(spec)
}

fn parse_params(flag: &str, raw: &str) -> Result<Params> {
    let value: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("{flag} must be valid JSON"))?;
    Params::from_value(value).ok_or_else(|| anyhow!("{flag} must be a JSON object"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn debug_enabled(settings: &ProviderSettings) -> bool {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_filter(settings))
            .finish();
        tracing::subscriber::with_default(subscriber, || tracing::enabled!(Level::DEBUG))
    }

    fn with_log_filter(filter: &str) -> ProviderSettings {
        ProviderSettings {
            log_filter: Some(filter.to_string()),
            ..ProviderSettings::default()
        }
    }

    #[test]
    fn log_filter_setting_controls_level() {
        temp_env::with_var_unset("RUST_LOG", || {
            assert!(debug_enabled(&with_log_filter("debug")));
            assert!(!debug_enabled(&ProviderSettings::default()));
        });
    }

    #[test]
    fn rust_log_wins_over_log_filter() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            assert!(!debug_enabled(&with_log_filter("debug")));
        });
        temp_env::with_var("RUST_LOG", Some("trace"), || {
            assert!(debug_enabled(&ProviderSettings::default()));
        });
    }

    fn matches(args: &[&str]) -> ArgMatches {
        build_cli().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn builds_spec_from_flags() {
        let m = matches(&[
            "dataprov",
            "--fixture",
            "users.yml",
            "user",
            "1",
            "--query",
            r#"{"name":"Huey"}"#,
            "--throw-error",
        ]);
        let spec = spec_from_matches(&m).unwrap();
        assert_eq!(spec.model_name, "user");
        assert_eq!(spec.record_id(), Some("1"));
        assert!(spec.has_query());
        assert!(spec.throw_error);
        assert_eq!(spec.store_method, None);
    }

    #[test]
    fn parses_explicit_method() {
        let m = matches(&["dataprov", "-f", "users.yml", "user", "--method", "peekAll"]);
        let spec = spec_from_matches(&m).unwrap();
        assert_eq!(spec.store_method, Some(StoreMethod::PeekAll));
    }

    #[test]
    fn rejects_non_object_query() {
        let err = parse_params("--query", "[1, 2]").unwrap_err();
        assert!(err.to_string().contains("JSON object"));
        assert!(parse_params("--query", "{").is_err());
    }
}
