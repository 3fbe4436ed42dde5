pub mod wunderground;

pub use wunderground::WundergroundClient;
