use clap::Subcommand;
use serde_json::json;

use crate::cli::{
    connect,
    utils::{output_empty_collection, output_success},
    OutputFormat,
};
use crate::services::user_service::{self, CreateUserRequest};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user account")]
    Create {
        #[arg(help = "Login name")]
        username: String,
        #[arg(long, help = "Initial password (at least 8 characters)")]
        password: String,
        #[arg(long, help = "District the user may write to")]
        district: Option<i64>,
        #[arg(long, help = "Grant superuser privileges")]
        superuser: bool,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        phone_number: String,
    },

    #[command(about = "List user accounts")]
    List,
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = connect().await?;

    match cmd {
        UserCommands::Create {
            username,
            password,
            district,
            superuser,
            first_name,
            last_name,
            phone_number,
        } => {
            let request = CreateUserRequest {
                username,
                password,
                first_name,
                last_name,
                phone_number,
                district,
                is_superuser: superuser,
            };
            let user = user_service::create(&pool, &request).await?;
            output_success(
                &output_format,
                &format!("User '{}' created (ID: {})", user.username, user.id),
                Some(json!({ "user": user })),
            )
        }
        UserCommands::List => {
            let users = user_service::list(&pool).await?;
            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "users": users }))?);
                }
                OutputFormat::Text => {
                    println!("{:<6} {:<24} {:<10} {:<10} {}", "ID", "USERNAME", "DISTRICT", "SUPERUSER", "ACTIVE");
                    for user in users {
                        let district = user.district_id.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
                        println!(
                            "{:<6} {:<24} {:<10} {:<10} {}",
                            user.id, user.username, district, user.is_superuser, user.is_active
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
