pub mod jwt;
pub mod quota;
pub mod tenant;
