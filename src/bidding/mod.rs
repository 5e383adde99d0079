pub mod adapter;
pub mod http_client;
pub mod params;
pub mod pulsepoint;
pub mod request_builder;
pub mod response_mapper;
