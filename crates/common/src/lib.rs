pub mod auth;
pub mod config;
pub mod domain;
pub mod garde;
pub mod postgres;
pub mod telemetry;

// Re-export mocks when the testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use auth::MockPasswordService;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockAccountRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockDeviceRegistrar;
