pub mod account_repo;
pub mod contact_repo;
pub mod education_repo;
pub mod error;
pub mod experience_repo;
pub mod personal_info_repo;
pub mod portfolio_repo;
pub mod service_repo;
pub mod skill_repo;
pub mod testimonial_repo;
