use reglite::cli::{Args, Runner};
use reglite::logging::Logger;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    let logger = Logger::new(args.verbose);

    let runner = match Runner::new(args) {
        Ok(runner) => runner,
        Err(e) => {
            logger.error(&format!("Invalid arguments: {}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = runner.run().await {
        logger.error(&e.to_string());
        std::process::exit(1);
    }
}
