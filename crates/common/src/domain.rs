mod account;
mod device;
mod page;
mod result;

pub use account::*;
pub use device::*;
pub use page::*;
pub use result::*;
