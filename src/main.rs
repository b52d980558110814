use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    topicq::app::startup::startup().await
}
