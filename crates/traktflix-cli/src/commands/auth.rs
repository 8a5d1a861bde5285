use crate::commands::App;
use crate::output::Output;
use crate::ui::Countdown;
use color_eyre::eyre::{eyre, Result};
use tracing::info;
use traktflix_sources::trakt::poll_for_token;
use traktflix_sources::TraktClient;

pub async fn run_auth(app: &App, output: &Output) -> Result<()> {
    let mut client = app.trakt_client()?;
    if client.is_authenticated() {
        output.warn("A Trakt credential is already stored, it will be replaced");
    }
    authenticate(&mut client, output).await
}

/// Device code flow: print the link, then poll until approved, expired or Ctrl-C.
pub async fn authenticate(client: &mut TraktClient, output: &Output) -> Result<()> {
    let code = client
        .generate_auth_code()
        .await
        .map_err(|e| eyre!("generate auth code: {}", e))?;

    // Printed even in quiet mode, the flow can't go on without it
    println!("Please open the following URL in your browser:\n{}", code.verification_link());
    output.info(format!("You have {} seconds to complete the authentication...", code.expires_in));

    let countdown = Countdown::new(code.expires_in, output.is_quiet());
    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let result = poll_for_token(client, &code, cancel, |remaining| countdown.set_remaining(remaining)).await;
    countdown.finish();

    match result {
        Ok(()) => {
            info!("Trakt authorization stored");
            output.success("Authentication successful");
            Ok(())
        }
        Err(e) => {
            output.error(format!("Authentication failed: {}", e));
            Err(eyre!("authenticate: {}", e))
        }
    }
}
