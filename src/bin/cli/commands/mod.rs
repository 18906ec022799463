pub mod account;
pub mod favorite;
pub mod feedback;
pub mod nasa;
