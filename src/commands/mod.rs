mod call;
mod init;
mod serve;

pub use call::call_method;
pub use init::init_config;
pub use serve::serve;
