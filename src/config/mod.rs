pub mod adapter_config;

pub use adapter_config::AdapterConfig;
