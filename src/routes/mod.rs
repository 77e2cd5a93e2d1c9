pub mod auth;
pub mod banner;
pub mod booking;
pub mod cart;
pub mod consultant;
pub mod category;
pub mod service;
pub mod subcategory;
