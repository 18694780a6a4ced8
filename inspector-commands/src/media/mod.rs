pub mod avatar;
pub mod pep;
