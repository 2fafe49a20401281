mod password;
mod traits;

pub use password::*;
pub use traits::*;

#[cfg(any(test, feature = "testing"))]
pub use traits::MockPasswordService;
