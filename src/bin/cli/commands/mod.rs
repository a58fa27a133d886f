pub mod rating;
pub mod restaurant;
pub mod seed;
