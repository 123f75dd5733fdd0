// Shared write-path helpers
pub mod concurrency;
pub mod unique_validation;

// Master data
pub mod agencies;
pub mod items;
pub mod warehouses;

// Stock and relief packages
pub mod inventory;
pub mod inventory_reservation_service;
pub mod relief_packages;

// Disaster events and relief requests
pub mod disaster_events;
pub mod relief_requests;
