//! Rust client SDK for the Valoriza Vilhena tourism gamification backend
//!
//! Valoriza Vilhena rewards visitors for scanning QR codes at points of
//! interest: each scan awards the place's points, and daily missions pay a
//! bonus when their rule passes. All durable state (users, places, missions,
//! points) lives in a Strapi headless CMS; this crate is the typed REST
//! client plus the check-in orchestration on top of it.
//!
//! # Example
//!
//! ```rust,no_run
//! use valoriza_client::{ApiClient, CheckInEngine, ClientConfig, LogNotifier};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = ApiClient::new(ClientConfig::default())?;
//! let auth = client.login("joao.silva@email.com", "senha123").await?;
//! client.set_token(auth.jwt);
//!
//! // Resolve a scanned QR payload and check in
//! let notifier = LogNotifier;
//! if let Some(place) = client.find_place_by_code("QR_PARQUE_ECOLOGICO_001").await? {
//!     let engine = CheckInEngine::new(&client, &notifier);
//!     let outcome = engine.check_in(place.id).await?;
//!     println!("earned {} points", outcome.points_earned);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cli;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod missions;
pub mod notify;
pub mod rules;
pub mod session;
pub mod types;

// Re-export main types
pub use backend::GameBackend;
pub use client::{ApiClient, PlaceQuery};
pub use config::Args;
pub use engine::CheckInEngine;
pub use error::{ApiError, Result};
pub use missions::{MissionProgress, MissionVerdict, ProgressStats};
pub use notify::{LogNotifier, Notifier};
pub use rules::{CheckInContext, Operator, Rule, Value};
pub use session::{AppState, Session, SessionStore};
pub use types::*;
