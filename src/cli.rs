//! CLI commands for the Valoriza client
//!
//! Each command maps to one library flow and returns formatted text for the
//! terminal.

use clap::Subcommand;
use std::path::PathBuf;

use crate::client::{ApiClient, PlaceQuery};
use crate::engine::CheckInEngine;
use crate::error::{ApiError, Result};
use crate::missions::{self, MissionProgress};
use crate::notify::LogNotifier;
use crate::session::AppState;
use crate::types::{Category, CheckInOutcome, Place, Reward, User};

/// Valoriza CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email/username and password
    Login {
        /// Email or username
        #[arg(long)]
        identifier: String,
        /// Password (or set VALORIZA_PASSWORD)
        #[arg(long, env = "VALORIZA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Password (or set VALORIZA_PASSWORD)
        #[arg(long, env = "VALORIZA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the signed-in user
    Me,

    /// List places, optionally filtered
    Places {
        /// Category filter (cultura, gastronomia, historia, evento, turismo, outro)
        #[arg(long)]
        category: Option<Category>,
        /// Case-insensitive name search
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one place
    Place { id: u64 },

    /// Resolve a scanned QR payload and check in at its place
    Scan { code: String },

    /// Check in at a place by id
    CheckIn { id: u64 },

    /// Show daily mission progress
    Missions,

    /// Show the top users by points
    Ranking {
        /// Number of users to show
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// List redeemable rewards
    Rewards,

    /// Redeem a reward
    Redeem { id: u64 },

    /// Upload an image file
    Upload { file: PathBuf },
}

/// Execute a CLI command
pub async fn execute(
    command: Command,
    client: &mut ApiClient,
    state: &mut AppState,
) -> Result<String> {
    match command {
        Command::Login {
            identifier,
            password,
        } => {
            let auth = client.login(&identifier, &password).await?;
            client.set_token(auth.jwt.clone());
            let username = auth.user.username.clone();
            state.login(auth)?;
            Ok(format!("Welcome back, {}!", username))
        }

        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client.register(&username, &email, &password).await?;
            client.set_token(auth.jwt.clone());
            state.login(auth)?;
            Ok(format!("Account created. Welcome, {}!", username))
        }

        Command::Logout => {
            state.logout()?;
            Ok("Signed out. See you next time!".to_string())
        }

        Command::Me => {
            let user = client.me().await?;
            state.reconcile_user(user.clone())?;
            Ok(format_user(&user))
        }

        Command::Places { category, search } => {
            let query = PlaceQuery {
                category,
                search,
                sort: Some("nome:asc".to_string()),
            };
            let places = client.list_places(&query).await?;
            Ok(format_places(&places))
        }

        Command::Place { id } => {
            let place = client.get_place(id).await?;
            Ok(format_place(&place))
        }

        Command::Scan { code } => {
            let place = match client.find_place_by_code(&code).await? {
                Some(place) => place,
                None => return Ok(format!("QR code '{}' not recognized", code)),
            };
            check_in_at(client, state, place.id).await
        }

        Command::CheckIn { id } => check_in_at(client, state, id).await,

        Command::Missions => {
            let user = client.me().await?;
            let progress = missions::user_progress(client, user.id).await;
            Ok(format_progress(&progress))
        }

        Command::Ranking { limit } => {
            let users = client.ranking(limit).await?;
            Ok(format_ranking(&users))
        }

        Command::Rewards => {
            let rewards = client.list_rewards().await?;
            Ok(format_rewards(&rewards, state.points()))
        }

        Command::Redeem { id } => {
            let user = client.me().await?;
            let rewards = client.list_rewards().await?;
            let reward = rewards
                .into_iter()
                .find(|r| r.id == id)
                .ok_or_else(|| ApiError::NotFound(format!("reward {}", id)))?;

            if user.points < reward.cost {
                return Err(ApiError::InsufficientPoints {
                    needed: reward.cost,
                    available: user.points,
                });
            }

            client.redeem_reward(reward.id, user.id).await?;
            let refreshed = client.me().await?;
            state.reconcile_user(refreshed.clone())?;
            Ok(format!(
                "Reward \"{}\" redeemed! {} points remaining",
                reward.name, refreshed.points
            ))
        }

        Command::Upload { file } => {
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload.bin")
                .to_string();
            let bytes = tokio::fs::read(&file).await?;
            let uploaded = client.upload(&name, bytes).await?;

            let mut output = String::new();
            for f in &uploaded {
                output.push_str(&format!("Uploaded {} -> {}\n", f.name, f.url));
            }
            Ok(output)
        }
    }
}

/// Run a check-in and reconcile local state with the server afterwards
async fn check_in_at(client: &mut ApiClient, state: &mut AppState, place_id: u64) -> Result<String> {
    let notifier = LogNotifier;
    let outcome = {
        let engine = CheckInEngine::new(client, &notifier);
        engine.check_in(place_id).await?
    };

    state.record_visit(place_id);
    state.add_points_pending(outcome.points_earned);

    // The server record replaces the pending delta wholesale
    let refreshed = client.me().await?;
    state.reconcile_user(refreshed)?;

    Ok(format_outcome(place_id, &outcome))
}

fn format_outcome(place_id: u64, outcome: &CheckInOutcome) -> String {
    if outcome.points_earned == 0 {
        return format!("Already visited place {} today. No points earned.", place_id);
    }

    let mut output = format!(
        "Check-in complete: +{} points ({} place, {} missions)\n",
        outcome.points_earned, outcome.place_points, outcome.mission_points
    );
    for name in &outcome.completed_missions {
        output.push_str(&format!("  mission completed: {}\n", name));
    }
    output
}

fn format_user(user: &User) -> String {
    let mut output = String::new();
    output.push_str(&format!("User:           {}\n", user.username));
    if let Some(ref email) = user.email {
        output.push_str(&format!("Email:          {}\n", email));
    }
    output.push_str(&format!("Points:         {}\n", user.points));
    output.push_str(&format!("Scanned today:  {}\n", user.daily_scans.len()));
    output
}

fn format_place(place: &Place) -> String {
    let mut output = String::new();
    output.push_str(&format!("{} [{}]\n", place.name, place.category));
    output.push_str(&format!("Check-in award: {} points\n", place.award()));
    if let Some(ref description) = place.description {
        output.push_str(&format!("{}\n", description));
    }
    if let Some(ref address) = place.address {
        output.push_str(&format!("Address: {}\n", address));
    }
    output
}

fn format_places(places: &[Place]) -> String {
    if places.is_empty() {
        return "No places found".to_string();
    }

    let mut output = String::new();
    for place in places {
        output.push_str(&format!(
            "[{}] {} ({}) - {} pts\n",
            place.id,
            place.name,
            place.category,
            place.award()
        ));
    }
    output
}

fn format_progress(progress: &MissionProgress) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Missions: {}/{} completed ({:.0}%)\n",
        progress.stats.completed, progress.stats.total, progress.stats.percentage
    ));

    if !progress.available.is_empty() {
        output.push_str("\nAvailable:\n");
        for mission in &progress.available {
            output.push_str(&format!(
                "  [ ] {} (+{} pts) - {}\n",
                mission.name, mission.points, mission.rule
            ));
        }
    }
    if !progress.completed.is_empty() {
        output.push_str("\nCompleted:\n");
        for mission in &progress.completed {
            output.push_str(&format!("  [x] {} (+{} pts)\n", mission.name, mission.points));
        }
    }
    output
}

fn format_ranking(users: &[User]) -> String {
    if users.is_empty() {
        return "No users yet".to_string();
    }

    let mut output = String::new();
    output.push_str("Ranking\n");
    output.push_str("=======\n");
    for (i, user) in users.iter().enumerate() {
        output.push_str(&format!("{:>3}. {} - {} pts\n", i + 1, user.username, user.points));
    }
    output
}

fn format_rewards(rewards: &[Reward], points: u64) -> String {
    if rewards.is_empty() {
        return "No rewards available".to_string();
    }

    let mut output = format!("Your points: {}\n\n", points);
    for reward in rewards {
        let marker = if points >= reward.cost { "*" } else { " " };
        output.push_str(&format!(
            "{} [{}] {} - {} pts\n",
            marker, reward.id, reward.name, reward.cost
        ));
    }
    output.push_str("\n* = redeemable now\n");
    output
}
