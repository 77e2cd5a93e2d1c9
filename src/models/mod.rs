pub mod user;
pub mod otp;
pub mod booking;
pub mod cart;
pub mod category;
pub mod service;
pub mod banner;
pub mod consultant;
pub mod login_log;

pub use user::*;
pub use otp::*;
pub use booking::*;
pub use cart::*;
pub use category::*;
pub use service::*;
pub use banner::*;
pub use consultant::*;
pub use login_log::*;
