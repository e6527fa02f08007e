use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use learnsmart_cli::accounts::{create_admin, set_role};
use learnsmart_models::UserRole;

#[derive(Parser)]
#[command(name = "learnsmart-cli")]
#[command(about = "LearnSmart CLI - Administrative tools for LearnSmart", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        /// Full name of the admin
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Change the role of an existing user
    SetRole {
        #[arg(short = 'e', long)]
        email: String,

        /// admin, instructor or student
        #[arg(short = 'r', long)]
        role: UserRole,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdmin {
            full_name,
            email,
            password,
        } => handle_create_admin(&pool, full_name, email, password).await,
        Commands::SetRole { email, role } => handle_set_role(&pool, &email, role).await,
    }
}

async fn handle_create_admin(
    pool: &sqlx::postgres::PgPool,
    full_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let full_name = full_name.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Full name")
            .interact_text()
            .expect("Failed to read full name")
    });

    let email = email.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Email address")
            .interact_text()
            .expect("Failed to read email")
    });

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .expect("Failed to read password")
    });

    match create_admin(pool, &full_name, &email, &password).await {
        Ok(id) => {
            println!("\n✅ Admin created successfully!");
            println!("   ID: {}", id);
            println!("   Email: {}", email.trim().to_lowercase());
            println!("   Name: {}", full_name);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_set_role(pool: &sqlx::postgres::PgPool, email: &str, role: UserRole) {
    match set_role(pool, email, role).await {
        Ok(()) => println!("✅ {} is now {}", email, role),
        Err(e) => {
            eprintln!("❌ Error updating role: {}", e);
            std::process::exit(1);
        }
    }
}
