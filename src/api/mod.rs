// API module entry
// Crop disease detection and sprayer control endpoints

mod error;
mod handlers;
mod types;

pub use error::ApiError;
pub use handlers::{health, predict_disease, spray, system_status};

/// Every route the service answers, listed in 404 responses
pub const ENDPOINTS: [&str; 4] = ["/health", "/predictDisease", "/spray", "/status"];
