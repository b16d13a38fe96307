pub mod auth;
pub mod contacts;
pub mod dashboard;
pub mod education;
pub mod experience;
pub mod health;
pub mod home;
pub mod personal_info;
pub mod portfolio;
pub mod services;
pub mod skills;
pub mod testimonials;
