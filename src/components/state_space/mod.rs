mod component;
mod controller;
mod heap_config;
mod highlight;
mod layout;
mod render;
mod scene;
mod search;
mod store;
mod types;

pub use component::StateSpaceViewer;
pub use types::{GraphDoc, OverviewDoc, State, Transition};
