//! External service integrations

pub mod crm;
pub mod housecall_pro;
pub mod service_titan;
