use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use foodgram::cli::{self, NewUser};
use foodgram::config::Config;
use foodgram::{build_app, db};

#[derive(Parser)]
#[command(name = "foodgram", about = "Recipe sharing backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Create a user and print their invite code.
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// Grant admin rights over recipes and the catalog.
        #[arg(long)]
        staff: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let addr = config.bind_addr;
            let app = build_app(pool, config).await?;
            let listener = TcpListener::bind(addr).await?;

            tracing::info!("listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        Command::CreateUser {
            username,
            email,
            first_name,
            last_name,
            staff,
        } => {
            let user = cli::create_user(
                &pool,
                NewUser {
                    username,
                    email,
                    first_name,
                    last_name,
                    is_staff: staff,
                },
            )
            .await?;

            println!("Created user:");
            println!("  ID: {}", user.id);
            println!("  Username: {}", user.username);
            println!("  Staff: {}", user.is_staff);
            println!("  Invite Code: {}", user.invite_code);
        }
    }

    Ok(())
}
