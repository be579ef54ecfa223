pub mod animator;
pub mod config;
pub mod constants;
pub mod estimator;
pub mod geo;
pub mod location;
pub mod location_input;
pub mod path;
pub mod providers;
pub mod renderer;
pub mod session;
pub mod style_viewport;
pub mod view;
pub mod viewport;
