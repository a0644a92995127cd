use goose::config::{GooseDefault, GooseDefaultType};
use goose::prelude::*;

use drupal_benchmark::report::{self, BenchmarkMetadata, ReportConfig};
use drupal_benchmark::session;
use drupal_benchmark::user::admin_user;
use drupal_benchmark::BenchmarkError;

#[tokio::main]
async fn main() -> Result<(), BenchmarkError> {
    // Every user needs the login url, so don't start without it.
    let login_url = session::login_url_from_env()?;
    let report_config = ReportConfig::from_env();

    let goose_attack = GooseAttack::initialize()?.register_scenario(admin_user());

    // Default to the host in the login url, an explicit --host still wins.
    let goose_metrics = match session::login_host(&login_url) {
        Some(host) => {
            goose_attack
                .set_default(GooseDefault::Host, host.as_str())?
                .execute()
                .await?
        }
        None => goose_attack.execute().await?,
    };

    report::deliver(&report_config, BenchmarkMetadata::from_env(), &goose_metrics).await?;

    Ok(())
}
