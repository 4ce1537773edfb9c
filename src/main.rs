use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match provider_booking::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("provider-booking failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
