mod exposure;
mod highlights;
mod shadows;
mod white_balance;

pub use exposure::Exposure;
pub use highlights::Highlights;
pub use shadows::Shadows;
pub use white_balance::WhiteBalance;
