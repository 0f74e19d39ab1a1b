use pushover::{ClientOptions, PushoverClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // PUSHOVER_TOKEN, PUSHOVER_USER_KEY and optionally PUSHOVER_BASE_URL.
    let options = ClientOptions::from_env();
    let message = std::env::var("PUSHOVER_MESSAGE")
        .unwrap_or_else(|_| "Hello from the pushover demo.".to_owned());

    let client = PushoverClient::new(options)?;
    match client.notify(message).await {
        Ok(response) => println!("sent, request id: {}", response.request),
        Err(err) => {
            eprintln!("send failed: {err}");
            for detail in err.service_errors() {
                eprintln!("  {detail}");
            }
            return Err(err.into());
        }
    }

    Ok(())
}
