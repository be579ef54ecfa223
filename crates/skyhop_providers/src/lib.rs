pub mod cache;
pub mod graphhopper_api;
pub mod osrm;
pub mod travel_client;
