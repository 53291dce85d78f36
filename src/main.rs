use std::io::{self, BufRead, Write};

use playscout::view::{render_dataset, render_popular, render_reviews};
use playscout::{Config, RecommenderClient, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("playscout=warn")),
        )
        .init();

    let config = Config::from_env()?;
    let client = RecommenderClient::new(&config)?;
    let mut session = Session::new(client);

    if let Some(warning) = session.startup_check().await {
        println!("{}", warning);
    }

    // One-shot mode: app name on the command line
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        session.search(&args.join(" "), None).await;
        print!("{}", session.render());
        return Ok(());
    }

    // Interactive mode
    println!("playscout - app recommendations");
    println!("Type an app name, or :popular, :reviews <app> [page], :dataset, :quit");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == ":quit" || line == ":q" {
            break;
        }

        if line == ":popular" {
            match session.popular(None).await {
                Ok(popular) => print!("{}", render_popular(&popular)),
                Err(err) => println!("{}", err),
            }
        } else if let Some(rest) = line.strip_prefix(":reviews ") {
            let (app_name, page) = split_reviews_args(rest);
            match session.reviews(app_name, page).await {
                Ok(page) => print!("{}", render_reviews(&page)),
                Err(err) => println!("Error loading reviews: {}", err),
            }
        } else if line == ":dataset" {
            match session.dataset().await {
                Ok(info) => print!("{}", render_dataset(&info)),
                Err(err) => println!("{}", err),
            }
        } else {
            session.search(line, None).await;
            print!("{}", session.render());
        }
    }

    Ok(())
}

/// Splits ":reviews <app> [page]".
///
/// A trailing integer is always taken as the page number, so an app name
/// that itself ends in a number needs an explicit page:
/// ":reviews Angry Birds 2 1".
fn split_reviews_args(rest: &str) -> (&str, u32) {
    if let Some((app_name, last)) = rest.rsplit_once(' ') {
        if let Ok(page) = last.parse::<u32>() {
            return (app_name.trim(), page.max(1));
        }
    }
    (rest.trim(), 1)
}
