use tokengate::settings::*;

// $ cargo run --bin settings_demo -- --settings=settings/release.toml
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let project_settings = parse_settings(cli.settings.as_deref())?;
    println!("Loaded settings: {:#?}", project_settings);

    println!(
        "store={} path={:?}",
        project_settings.store.backend, project_settings.store.path
    );
    println!("provider={}", project_settings.provider.backend);
    if let Some(auth0) = &project_settings.provider.auth0 {
        println!(
            "auth0 client secret set in file: {}",
            !auth0.client_secret.is_empty()
        );
    }
    println!(
        "session header={} secure cookie={}",
        project_settings.session.header, project_settings.session.cookie_secure
    );

    let is_err = parse_settings(Some("settings/missing.toml")).is_err();
    println!("Error on missing file: {:?}", is_err);
    Ok(())
}
