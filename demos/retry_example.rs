use std::time::Duration;

use netdoctor::{
    AssistantConfig, GenerateRequest, RequestOptions, ReqwestTransport, RetryPolicy,
    RetryingClient, Turn, interpret_response,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Retry up to 5 times, starting at half a second and never waiting more than 8.
    let policy = RetryPolicy::new()
        .with_max_retries(5)
        .with_initial_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(8));
    let config = AssistantConfig::from_defaults()?
        .with_retry(policy)
        .with_timeout(Duration::from_secs(30));

    println!("Client configured with retry settings:");
    println!("- Endpoint: {}", config.endpoint);
    println!("- Max retries: {}", policy.max_retries);
    println!("- Delays: {:?}", policy.schedule());
    println!("- Timeout: {:?}", config.timeout);
    println!();

    let transport = ReqwestTransport::with_timeout(config.timeout)?;
    let client = RetryingClient::new(transport, policy);

    let request = GenerateRequest::new(
        vec![Turn::user("Mi equipo no obtiene dirección IP por DHCP.")],
        config.system_instruction(),
    );
    let options = RequestOptions::post_json(&request)?;

    println!("Sending message with automatic retry on failures...");
    let outcome = match client.send(&config.endpoint, &options).await {
        Ok(response) => interpret_response(&response),
        Err(err) => Err(err),
    };
    match outcome {
        Ok(turn) => {
            println!("Success! Reply received:");
            println!("{}", turn.text());
        }
        Err(e) => {
            println!("Failed after all retries: {e}");
            if e.is_rate_limit() {
                println!("This was a rate limit error - the client retried with backoff");
            } else if e.is_transport() {
                println!("This was a network error - the client retried with backoff");
            } else {
                println!("This error is not retried");
            }
        }
    }

    Ok(())
}
