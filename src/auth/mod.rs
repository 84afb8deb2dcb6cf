use axum::{routing::{get, post}, Router};
use rand::seq::IndexedRandom;

mod login;
mod logout;
mod me;
mod password;
mod register;
mod user;

pub use user::{PublicUser, Role, User};
pub(crate) use user::find_by_id as find_user;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
        .route("/me", get(me::me))
}

/// Fallback display name for users who register without one.
pub(crate) fn generate_display_name() -> String {
    let adjectives = [
        "Quick", "Steady", "Precise", "Bold", "Bright", "Clever", "Golden", "Silver",
        "Rusty", "Brave", "Calm", "Eager", "Lucky", "Proud", "Swift", "Tidy",
    ];

    let nouns = [
        "Anvil", "Lathe", "Loom", "Forge", "Kiln", "Press", "Spindle", "Chisel",
        "Gear", "Rivet", "Bobbin", "Crucible", "Mill", "Shuttle", "Furnace", "Piston",
    ];

    let mut rng = rand::rng();
    format!(
        "{} {}",
        adjectives.choose(&mut rng).copied().unwrap_or("Quiet"),
        nouns.choose(&mut rng).copied().unwrap_or("Maker"),
    )
}
