//! habitleague - headless client for the Habit League backend
//!
//! Drives the same REST API as the mobile app: account management,
//! challenge browsing, and the geofenced daily-evidence submission flow.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use habitleague_core::{
    ChallengeJoin, Coordinate, LocationData, PaymentData, UserLogin, UserRegistration,
};
use habitleague_engine::{SubmissionOrchestrator, SubmissionOutcome};
use habitleague_networking::{ClientConfig, HabitLeagueClient};
use tracing_subscriber::EnvFilter;

mod providers;
mod session;

use providers::{FileMediaProvider, FixedLocationProvider};

/// habitleague - Habit League client
#[derive(Parser, Debug)]
#[command(name = "habitleague")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend base URL (defaults to $HABITLEAGUE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Path to the local session database
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new account and store the session
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Show the authenticated user's profile
    Profile,

    /// Browse challenges
    Challenges {
        #[command(subcommand)]
        command: ChallengeCommands,
    },

    /// Submit daily evidence for a challenge
    Submit {
        /// Challenge id
        challenge_id: i64,
        /// Path to the evidence photo (jpeg)
        #[arg(long)]
        image: PathBuf,
        /// Observed latitude in decimal degrees
        #[arg(long)]
        lat: f64,
        /// Observed longitude in decimal degrees
        #[arg(long)]
        lon: f64,
    },

    /// List the user's evidences
    Evidences,

    /// Show the user's evidence statistics
    Stats,

    /// List the user's achievements
    Achievements,

    /// List the user's payments
    Payments,
}

#[derive(Subcommand, Debug)]
enum ChallengeCommands {
    /// List all available challenges
    #[command(alias = "ls")]
    List,

    /// List the challenges you participate in
    Mine,

    /// Show one challenge, including its geofence
    Show {
        /// Challenge id
        id: i64,
    },

    /// List the most popular challenges
    Popular {
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },

    /// Join a challenge (pays the entry fee, registers your geofence)
    Join {
        /// Challenge id
        id: i64,
        /// Card payment method id from your payment provider
        #[arg(long)]
        payment_method: String,
        /// Geofence latitude in decimal degrees
        #[arg(long)]
        lat: f64,
        /// Geofence longitude in decimal degrees
        #[arg(long)]
        lon: f64,
        /// Human-readable name for your evidence location
        #[arg(long, default_value = "My location")]
        location_name: String,
        /// Tolerance radius in meters
        #[arg(long, default_value_t = 100.0)]
        tolerance: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = match cli.api_url {
        Some(ref url) => ClientConfig::new(url.clone()),
        None => ClientConfig::from_env(),
    };
    let db_path = cli.db.clone().unwrap_or_else(session::default_db_path);

    match cli.command {
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            let client = HabitLeagueClient::new(config);
            let registration = UserRegistration {
                first_name,
                last_name,
                email: email.clone(),
                password,
                bio: None,
                profile_photo_url: None,
                avatar_id: None,
            };
            let token = client.register(&registration).await?;
            session::save_session(&db_path, &email, None, &token).await?;
            println!("Registered {} and saved session", email);
        }

        Commands::Login { email, password } => {
            let client = HabitLeagueClient::new(config.clone());
            let credentials = UserLogin {
                email: email.clone(),
                password,
            };
            let token = client.login(&credentials).await?;

            // Resolve the user id for the session record; not fatal if the
            // profile endpoint is unavailable
            let authed = HabitLeagueClient::with_token(config, &token);
            let user_id = authed.get_profile().await.ok().map(|u| u.id);

            session::save_session(&db_path, &email, user_id, &token).await?;
            println!("Logged in as {}", email);
        }

        Commands::Profile => {
            let client = authenticated_client(config, &db_path).await?;
            let user = client.get_profile().await?;
            println!("{} {} <{}>", user.first_name, user.last_name, user.email);
            if let Some(bio) = user.bio {
                println!("{}", bio);
            }
        }

        Commands::Challenges { command } => {
            let client = authenticated_client(config, &db_path).await?;
            match command {
                ChallengeCommands::List => print_challenges(&client.get_challenges().await?),
                ChallengeCommands::Mine => print_challenges(&client.get_my_challenges().await?),
                ChallengeCommands::Popular { limit } => {
                    print_challenges(&client.get_popular_challenges(limit).await?)
                }
                ChallengeCommands::Join {
                    id,
                    payment_method,
                    lat,
                    lon,
                    location_name,
                    tolerance,
                } => {
                    let challenge = client.get_challenge(id).await?;
                    let join = ChallengeJoin {
                        payment: PaymentData {
                            challenge_id: Some(id),
                            amount: challenge.entry_fee,
                            currency: "USD".to_string(),
                            payment_method_id: payment_method,
                            card_last4: String::new(),
                            card_brand: String::new(),
                        },
                        location: LocationData {
                            challenge_id: Some(id),
                            latitude: lat,
                            longitude: lon,
                            location_name,
                            tolerance_radius: tolerance,
                        },
                    };
                    client.join_challenge(id, &join).await?;
                    println!("Joined {} (entry fee {})", challenge.name, challenge.entry_fee);
                }
                ChallengeCommands::Show { id } => {
                    let challenge = client.get_challenge(id).await?;
                    println!(
                        "#{} {} [{:?}] — {} days, entry fee {}",
                        challenge.id,
                        challenge.name,
                        challenge.status,
                        challenge.duration_days,
                        challenge.entry_fee
                    );
                    match challenge.location {
                        Some(fence) => println!(
                            "Geofence: {} ({}, {}) ± {} m",
                            fence.location_name,
                            fence.latitude,
                            fence.longitude,
                            fence.tolerance_radius
                        ),
                        None => println!("No geofence: evidence accepted from anywhere"),
                    }
                }
            }
        }

        Commands::Submit {
            challenge_id,
            image,
            lat,
            lon,
        } => {
            let client = authenticated_client(config, &db_path).await?;
            let challenge = client
                .get_challenge(challenge_id)
                .await
                .context("Failed to fetch challenge")?;

            let mut orchestrator = SubmissionOrchestrator::new(
                &client,
                FixedLocationProvider(Coordinate::new(lat, lon)),
                FileMediaProvider::new(image),
            );

            match orchestrator.submit(&challenge).await? {
                SubmissionOutcome::Completed {
                    evidence_id,
                    status,
                } => match evidence_id {
                    Some(id) => println!("Evidence #{} accepted ({})", id, status),
                    None => println!("Evidence accepted ({})", status),
                },
                SubmissionOutcome::Blocked => {
                    println!("Already submitted today; come back tomorrow")
                }
                SubmissionOutcome::RejectedLocally {
                    distance,
                    tolerance_radius,
                } => bail!(
                    "Outside the challenge geofence: {:.0} m away (tolerance {:.0} m)",
                    distance,
                    tolerance_radius
                ),
                SubmissionOutcome::LocationFailed { reason } => {
                    bail!("Could not determine location: {}", reason)
                }
                SubmissionOutcome::Cancelled => println!("Submission cancelled"),
                SubmissionOutcome::Failed { message } => bail!("Submission failed: {}", message),
            }
        }

        Commands::Evidences => {
            let client = authenticated_client(config, &db_path).await?;
            for evidence in client.get_my_evidences().await? {
                println!(
                    "#{} challenge {} at {} — ai:{} location:{}",
                    evidence.id,
                    evidence
                        .challenge_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "?".to_string()),
                    evidence.submitted_at.as_deref().unwrap_or("?"),
                    evidence.ai_validated,
                    evidence.location_valid
                );
            }
        }

        Commands::Stats => {
            let client = authenticated_client(config, &db_path).await?;
            let stats = client.get_my_evidence_stats().await?;
            println!("Total submissions: {}", stats.total_submissions);
            println!("AI validated:      {}", stats.ai_validated_count);
            println!("Location valid:    {}", stats.location_valid_count);
            println!("Current streak:    {}", stats.current_streak);
            println!("Longest streak:    {}", stats.longest_streak);
        }

        Commands::Achievements => {
            let client = authenticated_client(config, &db_path).await?;
            for achievement in client.get_my_achievements().await? {
                let mark = if achievement.is_unlocked { "x" } else { " " };
                println!("[{}] {} — {}", mark, achievement.name, achievement.description);
            }
        }

        Commands::Payments => {
            let client = authenticated_client(config, &db_path).await?;
            for payment in client.get_my_payments().await? {
                println!(
                    "#{} {} {} — {:?}",
                    payment.id, payment.amount, payment.currency, payment.status
                );
            }
        }
    }

    Ok(())
}

/// Build a client from the stored session, or fail with a login hint
async fn authenticated_client(
    config: ClientConfig,
    db_path: &PathBuf,
) -> Result<HabitLeagueClient> {
    match session::load_active_token(db_path).await? {
        Some(token) => Ok(HabitLeagueClient::with_token(config, &token)),
        None => bail!("No active session. Run `habitleague login` first"),
    }
}

fn print_challenges(challenges: &[habitleague_core::Challenge]) {
    for challenge in challenges {
        let fence = if challenge.location.is_some() {
            "geofenced"
        } else {
            "no geofence"
        };
        println!(
            "#{} {} [{:?}] — {} participants, {}",
            challenge.id, challenge.name, challenge.status, challenge.participant_count, fence
        );
    }
}
