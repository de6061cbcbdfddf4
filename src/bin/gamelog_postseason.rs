use std::process::ExitCode;

use tracing::error;

use nba_gamelog::config::{UpdateConfig, postseason_args};
use nba_gamelog::error::UpdateError;
use nba_gamelog::stats_api::StatsNbaClient;
use nba_gamelog::telemetry;
use nba_gamelog::update::{FetchPlan, UpdateOptions, run_update};

fn main() -> ExitCode {
    telemetry::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = UpdateConfig::from_env();
    config.apply_args(&args);

    let (phases, since) = match postseason_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            error!("{err:#}");
            println!("Invalid arguments: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let source = match StatsNbaClient::new(&config.stats_base_url, config.http_timeout) {
        Ok(source) => source,
        Err(err) => return UpdateError::SourceUnavailable(err).report(),
    };

    let opts = UpdateOptions::from_config(&config);
    let plan = FetchPlan::Phases { phases, since };
    match run_update(&source, &plan, &opts) {
        Ok(report) => {
            println!("Postseason update complete");
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => err.report(),
    }
}
