use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match billed_lib::run().await {
        Ok(code) => code,
        Err(e) => {
            log::error!("起動に失敗しました: {}", e.details());
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
