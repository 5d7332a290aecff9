pub mod codes;
pub mod jwt;
pub mod password;
pub mod validation;
