pub mod app_state;
pub mod articles;
pub mod config;
pub mod fetcher;
pub mod health;
pub mod markup;
pub mod postprocess;
pub mod product;
pub mod providers;
pub mod router;
