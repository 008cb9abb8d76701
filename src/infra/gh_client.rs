mod client;
mod models;
mod normalize;

pub use client::GithubReleaseClient;
