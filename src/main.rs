use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match wedding_rsvp::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("wedding_rsvp stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}
